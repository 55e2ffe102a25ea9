//! Column-to-value predicates: equality, ordering and pattern families.

use crate::error::{SqlError, SqlResult};
use crate::fragment::{DynFragment, Fragment};
use crate::param::{Param, ParamList};
use crate::placeholder::placeholders;
use std::collections::HashMap;

/// The right-hand side of a predicate pair.
///
/// Constructed through [`IntoOperand`] rather than directly, so bare values,
/// `Option`, vectors and sub-selects all read naturally at the call site.
#[derive(Clone)]
pub enum Operand {
    /// A single bound value: `col = ?`.
    Value(Param),
    /// SQL NULL: `col IS NULL` / `col IS NOT NULL`.
    Null,
    /// A homogeneous list: `col IN (?,?,?)`.
    List(Vec<Param>),
    /// A nested sub-select, spliced raw: `col IN (SELECT ...)`.
    Subquery(DynFragment),
}

/// Conversion into an [`Operand`].
///
/// `Option<T>` resolves at composition time: `Some` converts the inner
/// value, `None` becomes [`Operand::Null`].
pub trait IntoOperand {
    fn into_operand(self) -> Operand;
}

impl IntoOperand for Operand {
    fn into_operand(self) -> Operand {
        self
    }
}

impl<T: IntoOperand> IntoOperand for Option<T> {
    fn into_operand(self) -> Operand {
        match self {
            Some(value) => value.into_operand(),
            None => Operand::Null,
        }
    }
}

macro_rules! scalar_operand {
    ($($t:ty),* $(,)?) => {$(
        impl IntoOperand for $t {
            fn into_operand(self) -> Operand {
                Operand::Value(Param::new(self))
            }
        }

        impl IntoOperand for Vec<$t> {
            fn into_operand(self) -> Operand {
                Operand::List(self.into_iter().map(Param::new).collect())
            }
        }
    )*};
}

scalar_operand!(
    bool,
    i16,
    i32,
    i64,
    u32,
    f32,
    f64,
    String,
    &'static str,
    serde_json::Value,
);

/// Binary data binds as a single bytea value, not as an IN list.
impl IntoOperand for Vec<u8> {
    fn into_operand(self) -> Operand {
        Operand::Value(Param::new(self))
    }
}

/// The operator texts of one equality-family variant.
#[derive(Clone, Copy)]
struct Operators {
    equal: &'static str,
    in_kw: &'static str,
    null_kw: &'static str,
    in_empty: &'static str,
    /// Pattern operators take scalars only.
    like: bool,
}

impl Operators {
    const EQ: Operators = Operators {
        equal: "=",
        in_kw: "IN",
        null_kw: "IS",
        in_empty: "(1=0)",
        like: false,
    };
    const NOT_EQ: Operators = Operators {
        equal: "<>",
        in_kw: "NOT IN",
        null_kw: "IS NOT",
        in_empty: "(1=1)",
        like: false,
    };
    const LIKE: Operators = Operators {
        equal: "LIKE",
        in_kw: "IN",
        null_kw: "IS",
        in_empty: "(1=0)",
        like: true,
    };
    const ILIKE: Operators = Operators {
        equal: "ILIKE",
        in_kw: "IN",
        null_kw: "IS",
        in_empty: "(1=0)",
        like: true,
    };
}

fn equality_pair(
    column: &str,
    operand: &Operand,
    ops: Operators,
    params: &mut ParamList,
) -> SqlResult<String> {
    match operand {
        Operand::Subquery(fragment) => {
            let (sql, args) = fragment.compile()?;
            params.extend(&args);
            Ok(format!("{} {} ({})", column, ops.in_kw, sql))
        }
        Operand::Null => {
            if ops.like {
                return Err(SqlError::InvalidComparison(
                    "cannot use null with like operators",
                ));
            }
            Ok(format!("{} {} NULL", column, ops.null_kw))
        }
        Operand::List(items) => {
            if ops.like {
                return Err(SqlError::InvalidComparison(
                    "cannot use list with like operators",
                ));
            }
            if items.is_empty() {
                // The pair degenerates to a constant truth value; other
                // pairs still contribute their arguments.
                return Ok(ops.in_empty.to_string());
            }
            for item in items {
                params.push_param(item.clone());
            }
            Ok(format!(
                "{} {} ({})",
                column,
                ops.in_kw,
                placeholders(items.len())
            ))
        }
        Operand::Value(param) => {
            params.push_param(param.clone());
            Ok(format!("{} {} ?", column, ops.equal))
        }
    }
}

fn ordering_pair(
    column: &str,
    operand: &Operand,
    op: &'static str,
    params: &mut ParamList,
) -> SqlResult<String> {
    match operand {
        Operand::Subquery(fragment) => {
            let (sql, args) = fragment.compile()?;
            params.extend(&args);
            Ok(format!("{} IN ({})", column, sql))
        }
        Operand::Null => Err(SqlError::InvalidComparison(
            "cannot use null with ordering operators",
        )),
        Operand::List(_) => Err(SqlError::InvalidComparison(
            "cannot use list with ordering operators",
        )),
        Operand::Value(param) => {
            params.push_param(param.clone());
            Ok(format!("{} {} ?", column, op))
        }
    }
}

fn join_equality<'a, I>(pairs: I, ops: Operators, sep: &str) -> SqlResult<(String, ParamList)>
where
    I: IntoIterator<Item = (&'a str, &'a Operand)>,
{
    let mut params = ParamList::new();
    let mut parts = Vec::new();
    for (column, operand) in pairs {
        parts.push(equality_pair(column, operand, ops, &mut params)?);
    }
    Ok((parts.join(sep), params))
}

fn join_ordering<'a, I>(pairs: I, op: &'static str) -> SqlResult<(String, ParamList)>
where
    I: IntoIterator<Item = (&'a str, &'a Operand)>,
{
    let mut params = ParamList::new();
    let mut parts = Vec::new();
    for (column, operand) in pairs {
        parts.push(ordering_pair(column, operand, op, &mut params)?);
    }
    Ok((parts.join(" AND "), params))
}

macro_rules! equality_map {
    ($(#[$attr:meta])* $name:ident, $ops:expr, $sep:expr) => {
        $(#[$attr])*
        #[derive(Clone, Default)]
        pub struct $name(pub HashMap<String, Operand>);

        impl $name {
            pub fn new() -> Self {
                Self(HashMap::new())
            }

            /// Add one column/value pair.
            pub fn pair(mut self, column: impl Into<String>, value: impl IntoOperand) -> Self {
                self.0.insert(column.into(), value.into_operand());
                self
            }
        }

        impl<K: Into<String>, V: IntoOperand, const N: usize> From<[(K, V); N]> for $name {
            fn from(pairs: [(K, V); N]) -> Self {
                Self(
                    pairs
                        .into_iter()
                        .map(|(k, v)| (k.into(), v.into_operand()))
                        .collect(),
                )
            }
        }

        impl Fragment for $name {
            fn compile(&self) -> SqlResult<(String, ParamList)> {
                join_equality(self.0.iter().map(|(k, v)| (k.as_str(), v)), $ops, $sep)
            }
        }
    };
}

macro_rules! equality_pairs {
    ($(#[$attr:meta])* $name:ident, $ops:expr, $sep:expr) => {
        $(#[$attr])*
        #[derive(Clone, Default)]
        pub struct $name(pub Vec<(String, Operand)>);

        impl $name {
            pub fn new() -> Self {
                Self(Vec::new())
            }

            /// Append one column/value pair, preserving insertion order.
            pub fn pair(mut self, column: impl Into<String>, value: impl IntoOperand) -> Self {
                self.0.push((column.into(), value.into_operand()));
                self
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl<K: Into<String>, V: IntoOperand, const N: usize> From<[(K, V); N]> for $name {
            fn from(pairs: [(K, V); N]) -> Self {
                Self(
                    pairs
                        .into_iter()
                        .map(|(k, v)| (k.into(), v.into_operand()))
                        .collect(),
                )
            }
        }

        impl Fragment for $name {
            fn compile(&self) -> SqlResult<(String, ParamList)> {
                join_equality(self.0.iter().map(|(k, v)| (k.as_str(), v)), $ops, $sep)
            }
        }
    };
}

macro_rules! ordering_map {
    ($(#[$attr:meta])* $name:ident, $op:expr) => {
        $(#[$attr])*
        #[derive(Clone, Default)]
        pub struct $name(pub HashMap<String, Operand>);

        impl $name {
            pub fn new() -> Self {
                Self(HashMap::new())
            }

            /// Add one column/value pair.
            pub fn pair(mut self, column: impl Into<String>, value: impl IntoOperand) -> Self {
                self.0.insert(column.into(), value.into_operand());
                self
            }
        }

        impl<K: Into<String>, V: IntoOperand, const N: usize> From<[(K, V); N]> for $name {
            fn from(pairs: [(K, V); N]) -> Self {
                Self(
                    pairs
                        .into_iter()
                        .map(|(k, v)| (k.into(), v.into_operand()))
                        .collect(),
                )
            }
        }

        impl Fragment for $name {
            fn compile(&self) -> SqlResult<(String, ParamList)> {
                join_ordering(self.0.iter().map(|(k, v)| (k.as_str(), v)), $op)
            }
        }
    };
}

macro_rules! ordering_pairs {
    ($(#[$attr:meta])* $name:ident, $op:expr) => {
        $(#[$attr])*
        #[derive(Clone, Default)]
        pub struct $name(pub Vec<(String, Operand)>);

        impl $name {
            pub fn new() -> Self {
                Self(Vec::new())
            }

            /// Append one column/value pair, preserving insertion order.
            pub fn pair(mut self, column: impl Into<String>, value: impl IntoOperand) -> Self {
                self.0.push((column.into(), value.into_operand()));
                self
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl<K: Into<String>, V: IntoOperand, const N: usize> From<[(K, V); N]> for $name {
            fn from(pairs: [(K, V); N]) -> Self {
                Self(
                    pairs
                        .into_iter()
                        .map(|(k, v)| (k.into(), v.into_operand()))
                        .collect(),
                )
            }
        }

        impl Fragment for $name {
            fn compile(&self) -> SqlResult<(String, ParamList)> {
                join_ordering(self.0.iter().map(|(k, v)| (k.as_str(), v)), $op)
            }
        }
    };
}

equality_map!(
    /// Equality predicate over an unordered map: `a = ? AND b IN (?,?)`.
    ///
    /// Map iteration order is unspecified, so join order with multiple keys
    /// is too. Use [`EqPairs`] when the output text must be deterministic.
    Eq,
    Operators::EQ,
    " AND "
);
equality_map!(
    /// Negated equality over an unordered map: `a <> ? AND b NOT IN (?,?)`.
    NotEq,
    Operators::NOT_EQ,
    " AND "
);
equality_map!(
    /// Equality predicate joined with ` OR ` instead of ` AND `.
    EqOr,
    Operators::EQ,
    " OR "
);
equality_map!(
    /// Pattern match joined with ` OR `: `a LIKE ? OR b LIKE ?`.
    ///
    /// Null and list values are rejected with `InvalidComparison`.
    LikeOr,
    Operators::LIKE,
    " OR "
);
equality_map!(
    /// Case-insensitive pattern match joined with ` OR `.
    ILikeOr,
    Operators::ILIKE,
    " OR "
);

equality_pairs!(
    /// Ordered variant of [`Eq`]: join order equals insertion order.
    EqPairs,
    Operators::EQ,
    " AND "
);
equality_pairs!(
    /// Ordered variant of [`NotEq`].
    NotEqPairs,
    Operators::NOT_EQ,
    " AND "
);
equality_pairs!(
    /// Ordered variant of [`EqOr`].
    EqOrPairs,
    Operators::EQ,
    " OR "
);
equality_pairs!(
    /// Ordered variant of [`LikeOr`].
    LikeOrPairs,
    Operators::LIKE,
    " OR "
);
equality_pairs!(
    /// Ordered variant of [`ILikeOr`].
    ILikeOrPairs,
    Operators::ILIKE,
    " OR "
);

ordering_map!(
    /// Strictly-less-than predicate: `a < ?`, pairs joined with ` AND `.
    ///
    /// Null and list values are rejected with `InvalidComparison`;
    /// a sub-select value pairs with `IN` semantics.
    Lt,
    "<"
);
ordering_map!(
    /// Less-than-or-equal predicate: `a <= ?`.
    LtOrEq,
    "<="
);
ordering_map!(
    /// Strictly-greater-than predicate: `a > ?`.
    Gt,
    ">"
);
ordering_map!(
    /// Greater-than-or-equal predicate: `a >= ?`.
    GtOrEq,
    ">="
);

ordering_pairs!(
    /// Ordered variant of [`Lt`].
    LtPairs,
    "<"
);
ordering_pairs!(
    /// Ordered variant of [`LtOrEq`].
    LtOrEqPairs,
    "<="
);
ordering_pairs!(
    /// Ordered variant of [`Gt`].
    GtPairs,
    ">"
);
ordering_pairs!(
    /// Ordered variant of [`GtOrEq`].
    GtOrEqPairs,
    ">="
);

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(f: impl Fragment) -> (String, ParamList) {
        f.compile().unwrap()
    }

    #[test]
    fn eq_scalar() {
        let (sql, args) = compile(Eq::new().pair("id", 1i32));
        assert_eq!(sql, "id = ?");
        assert_eq!(args.len(), 1);
        assert_eq!(args.values()[0].downcast_ref::<i32>(), Some(&1));
    }

    #[test]
    fn eq_list() {
        let (sql, args) = compile(Eq::new().pair("id", vec![1i32, 2, 3]));
        assert_eq!(sql, "id IN (?,?,?)");
        assert_eq!(args.len(), 3);
        assert_eq!(args.values()[2].downcast_ref::<i32>(), Some(&3));
    }

    #[test]
    fn eq_empty_list_is_constant_false() {
        let (sql, args) = compile(Eq::new().pair("id", Vec::<i32>::new()));
        assert_eq!(sql, "(1=0)");
        assert!(args.is_empty());
    }

    #[test]
    fn not_eq_empty_list_is_constant_true() {
        let (sql, args) = compile(NotEq::new().pair("id", Vec::<i32>::new()));
        assert_eq!(sql, "(1=1)");
        assert!(args.is_empty());
    }

    #[test]
    fn empty_list_pair_keeps_other_pairs_args() {
        let (sql, args) = compile(
            EqPairs::new()
                .pair("id", Vec::<i32>::new())
                .pair("name", "five"),
        );
        assert_eq!(sql, "(1=0) AND name = ?");
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn null_compiles_to_is_null() {
        let (sql, args) = compile(Eq::new().pair("name", Operand::Null));
        assert_eq!(sql, "name IS NULL");
        assert!(args.is_empty());
    }

    #[test]
    fn not_eq_null_compiles_to_is_not_null() {
        let (sql, args) = compile(NotEq::new().pair("name", Operand::Null));
        assert_eq!(sql, "name IS NOT NULL");
        assert!(args.is_empty());
    }

    #[test]
    fn option_resolves_before_comparison() {
        let (sql, args) = compile(Eq::new().pair("id", Some(5i64)));
        assert_eq!(sql, "id = ?");
        assert_eq!(args.values()[0].downcast_ref::<i64>(), Some(&5));

        let (sql, args) = compile(Eq::new().pair("id", None::<i64>));
        assert_eq!(sql, "id IS NULL");
        assert!(args.is_empty());
    }

    #[test]
    fn byte_vector_binds_as_single_value() {
        let (sql, args) = compile(Eq::new().pair("id", vec![0x41u8, 0x42]));
        assert_eq!(sql, "id = ?");
        assert_eq!(args.len(), 1);
        assert_eq!(
            args.values()[0].downcast_ref::<Vec<u8>>(),
            Some(&vec![0x41u8, 0x42])
        );
    }

    #[test]
    fn not_eq_scalar() {
        let (sql, args) = compile(NotEq::new().pair("id", 1i32));
        assert_eq!(sql, "id <> ?");
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn pairs_preserve_insertion_order() {
        let (sql, args) = compile(EqPairs::new().pair("a", 1i32).pair("b", 2i32));
        assert_eq!(sql, "a = ? AND b = ?");
        assert_eq!(args.values()[0].downcast_ref::<i32>(), Some(&1));
        assert_eq!(args.values()[1].downcast_ref::<i32>(), Some(&2));
    }

    #[test]
    fn or_joined_pairs() {
        let (sql, _) = compile(EqOrPairs::new().pair("a", 1i32).pair("b", 2i32));
        assert_eq!(sql, "a = ? OR b = ?");
    }

    #[test]
    fn like_family() {
        let (sql, _) = compile(LikeOr::new().pair("name", "%irrel"));
        assert_eq!(sql, "name LIKE ?");
        let (sql, _) = compile(ILikeOr::new().pair("name", "%irrel"));
        assert_eq!(sql, "name ILIKE ?");
        let (sql, _) = compile(LikeOrPairs::new().pair("a", "x%").pair("b", "y%"));
        assert_eq!(sql, "a LIKE ? OR b LIKE ?");
    }

    #[test]
    fn like_rejects_null_and_list() {
        let err = LikeOr::new().pair("name", Operand::Null).compile();
        assert!(matches!(err, Err(SqlError::InvalidComparison(_))));
        let err = LikeOr::new().pair("name", vec!["a", "b"]).compile();
        assert!(matches!(err, Err(SqlError::InvalidComparison(_))));
    }

    #[test]
    fn ordering_operators() {
        let (sql, _) = compile(Lt::new().pair("id", 10i32));
        assert_eq!(sql, "id < ?");
        let (sql, _) = compile(LtOrEq::new().pair("id", 10i32));
        assert_eq!(sql, "id <= ?");
        let (sql, _) = compile(Gt::new().pair("id", 10i32));
        assert_eq!(sql, "id > ?");
        let (sql, _) = compile(GtOrEq::new().pair("id", 10i32));
        assert_eq!(sql, "id >= ?");
    }

    #[test]
    fn ordering_pairs_join_with_and() {
        let (sql, args) = compile(GtPairs::new().pair("a", 1i32).pair("b", 2i32));
        assert_eq!(sql, "a > ? AND b > ?");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn ordering_rejects_null_and_list() {
        let err = Lt::new().pair("id", vec![1i32, 2]).compile();
        assert!(matches!(err, Err(SqlError::InvalidComparison(_))));
        let err = Gt::new().pair("id", None::<i32>).compile();
        assert!(matches!(err, Err(SqlError::InvalidComparison(_))));
    }

    #[test]
    fn empty_predicate_compiles_to_empty() {
        let (sql, args) = compile(EqPairs::new());
        assert_eq!(sql, "");
        assert!(args.is_empty());
        assert!(EqPairs::new().is_empty());
        assert_eq!(EqPairs::new().pair("a", 1i32).len(), 1);
    }

    #[test]
    fn from_array_builds_ordered_pairs() {
        let eq = EqPairs::from([("a", 1i32), ("b", 2i32)]);
        let (sql, _) = compile(eq);
        assert_eq!(sql, "a = ? AND b = ?");
    }
}
