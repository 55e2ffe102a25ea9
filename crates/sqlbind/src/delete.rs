//! DELETE statement assembly.

use crate::client::{Mutation, Statement};
use crate::error::{SqlError, SqlResult};
use crate::fragment::{append_sql, DynFragment, Fragment};
use crate::param::ParamList;
use crate::placeholder::Placeholder;
use crate::statement::finalize;
use std::fmt::Write;
use std::sync::Arc;

/// Builds DELETE statements.
#[derive(Clone, Default)]
pub struct DeleteBuilder {
    placeholder: Placeholder,
    prefixes: Vec<DynFragment>,
    from: String,
    where_parts: Vec<DynFragment>,
    order_bys: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    suffixes: Vec<DynFragment>,
}

impl DeleteBuilder {
    pub(crate) fn new(placeholder: Placeholder) -> Self {
        Self {
            placeholder,
            ..Self::default()
        }
    }

    /// Prepend a fragment before the DELETE keyword.
    pub fn prefix(mut self, fragment: impl Fragment + Send + Sync + 'static) -> Self {
        self.prefixes.push(Arc::new(fragment));
        self
    }

    /// Set the table to delete from.
    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.from = table.into();
        self
    }

    /// Add a WHERE condition, joined with ` AND `.
    pub fn and_where(mut self, condition: impl Fragment + Send + Sync + 'static) -> Self {
        self.where_parts.push(Arc::new(condition));
        self
    }

    /// Add an ORDER BY expression.
    pub fn order_by(mut self, expr: impl Into<String>) -> Self {
        self.order_bys.push(expr.into());
        self
    }

    /// Set a LIMIT. Zero is a valid limit.
    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set an OFFSET. Zero is a valid offset.
    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Append a fragment after every other clause.
    pub fn suffix(mut self, fragment: impl Fragment + Send + Sync + 'static) -> Self {
        self.suffixes.push(Arc::new(fragment));
        self
    }
}

impl Fragment for DeleteBuilder {
    fn compile(&self) -> SqlResult<(String, ParamList)> {
        if self.from.is_empty() {
            return Err(SqlError::MissingClause("delete needs a target table"));
        }

        let mut sql = String::new();
        let mut params = ParamList::new();

        if !self.prefixes.is_empty() {
            append_sql(&self.prefixes, &mut sql, " ", &mut params)?;
            sql.push(' ');
        }

        sql.push_str("DELETE FROM ");
        sql.push_str(&self.from);

        if !self.where_parts.is_empty() {
            sql.push_str(" WHERE ");
            append_sql(&self.where_parts, &mut sql, " AND ", &mut params)?;
        }

        if !self.order_bys.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_bys.join(", "));
        }

        if let Some(limit) = self.limit {
            let _ = write!(sql, " LIMIT {limit}");
        }

        if let Some(offset) = self.offset {
            let _ = write!(sql, " OFFSET {offset}");
        }

        if !self.suffixes.is_empty() {
            sql.push(' ');
            append_sql(&self.suffixes, &mut sql, " ", &mut params)?;
        }

        Ok((sql, params))
    }
}

impl Statement for DeleteBuilder {
    fn to_sql(&self) -> SqlResult<(String, ParamList)> {
        let (sql, params) = self.compile()?;
        Ok(finalize(self.placeholder, sql, params))
    }
}

impl Mutation for DeleteBuilder {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::expr;
    use crate::predicate::Eq;
    use crate::statement::{delete, StatementBuilder};

    #[test]
    fn full_statement_clause_order() {
        let (sql, args) = delete()
            .prefix(expr("WITH prefix AS ?").bind(0i32))
            .from("a")
            .and_where(expr("b = ?").bind(1i32))
            .order_by("c")
            .limit(2)
            .offset(3)
            .suffix(expr("RETURNING ?").bind(4i32))
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "WITH prefix AS ? DELETE FROM a WHERE b = ? ORDER BY c LIMIT 2 OFFSET 3 RETURNING ?"
        );
        assert_eq!(args.len(), 3);
    }

    #[test]
    fn missing_table_fails() {
        let err = delete().and_where(Eq::new().pair("id", 1i32)).to_sql();
        assert!(matches!(err, Err(SqlError::MissingClause(_))));
    }

    #[test]
    fn dollar_rewrite() {
        let (sql, args) = StatementBuilder::new(Placeholder::Dollar)
            .delete()
            .from("users")
            .and_where(Eq::new().pair("id", vec![1i64, 2, 3]))
            .to_sql()
            .unwrap();
        assert_eq!(sql, "DELETE FROM users WHERE id IN ($1,$2,$3)");
        assert_eq!(args.len(), 3);
    }
}
