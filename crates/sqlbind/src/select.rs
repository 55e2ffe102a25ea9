//! SELECT statement assembly.

use crate::client::Statement;
use crate::error::{SqlError, SqlResult};
use crate::expr::alias;
use crate::fragment::{append_sql, DynFragment, Fragment};
use crate::param::ParamList;
use crate::placeholder::Placeholder;
use crate::predicate::{IntoOperand, Operand};
use crate::statement::finalize;
use std::fmt::Write;
use std::sync::Arc;

/// Builds SELECT statements clause by clause.
///
/// Methods consume and return `self` for chaining. Cloning snapshots every
/// accumulated clause, so a partially built query can branch into
/// independent continuations.
#[derive(Clone, Default)]
pub struct SelectBuilder {
    placeholder: Placeholder,
    prefixes: Vec<DynFragment>,
    distinct: bool,
    distinct_ons: Vec<String>,
    options: Vec<String>,
    columns: Vec<DynFragment>,
    from_parts: Vec<DynFragment>,
    joins: Vec<DynFragment>,
    where_parts: Vec<DynFragment>,
    group_bys: Vec<String>,
    having_parts: Vec<DynFragment>,
    order_bys: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    suffixes: Vec<DynFragment>,
}

impl SelectBuilder {
    pub(crate) fn new(placeholder: Placeholder) -> Self {
        Self {
            placeholder,
            ..Self::default()
        }
    }

    /// Prepend a fragment before the SELECT keyword, e.g. a WITH clause.
    pub fn prefix(mut self, fragment: impl Fragment + Send + Sync + 'static) -> Self {
        self.prefixes.push(Arc::new(fragment));
        self
    }

    /// Add DISTINCT to the statement.
    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Add a DISTINCT ON expression. Cannot be combined with [`distinct`];
    /// the clash is reported when the statement is built.
    ///
    /// [`distinct`]: Self::distinct
    pub fn distinct_on(mut self, expr: impl Into<String>) -> Self {
        self.distinct_ons.push(expr.into());
        self
    }

    /// Add a keyword option after SELECT, e.g. `SQL_NO_CACHE`.
    pub fn option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    /// Add one result column. Accepts plain text, an [`Expr`] with bound
    /// arguments, a predicate, or an aliased sub-select.
    ///
    /// [`Expr`]: crate::Expr
    pub fn column(mut self, column: impl Fragment + Send + Sync + 'static) -> Self {
        self.columns.push(Arc::new(column));
        self
    }

    /// Add several plain-text result columns.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for column in columns {
            self.columns.push(Arc::new(column.into()));
        }
        self
    }

    /// Set a FROM table. Repeated calls add comma-separated sources.
    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.from_parts.push(Arc::new(table.into()));
        self
    }

    /// Use a sub-select as the FROM source: `FROM (SELECT ...) AS alias`.
    pub fn from_select(mut self, select: SelectBuilder, name: &str) -> Self {
        self.from_parts.push(Arc::new(alias(select, name)));
        self
    }

    /// Append a raw join fragment, e.g. `CROSS JOIN j1` or a parameterized
    /// `expr("JOIN j2 ON j2.k = ?")`.
    pub fn join_clause(mut self, join: impl Fragment + Send + Sync + 'static) -> Self {
        self.joins.push(Arc::new(join));
        self
    }

    /// Append `JOIN <clause>`.
    pub fn join(self, clause: impl Into<String>) -> Self {
        let clause = clause.into();
        self.join_clause(format!("JOIN {clause}"))
    }

    /// Append `LEFT JOIN <clause>`.
    pub fn left_join(self, clause: impl Into<String>) -> Self {
        let clause = clause.into();
        self.join_clause(format!("LEFT JOIN {clause}"))
    }

    /// Append `RIGHT JOIN <clause>`.
    pub fn right_join(self, clause: impl Into<String>) -> Self {
        let clause = clause.into();
        self.join_clause(format!("RIGHT JOIN {clause}"))
    }

    /// Append `INNER JOIN <clause>`.
    pub fn inner_join(self, clause: impl Into<String>) -> Self {
        let clause = clause.into();
        self.join_clause(format!("INNER JOIN {clause}"))
    }

    /// Add a WHERE condition. Conditions accumulate and are joined with
    /// ` AND `; conditions compiling to empty text are omitted.
    pub fn and_where(mut self, condition: impl Fragment + Send + Sync + 'static) -> Self {
        self.where_parts.push(Arc::new(condition));
        self
    }

    /// Add a GROUP BY expression.
    pub fn group_by(mut self, expr: impl Into<String>) -> Self {
        self.group_bys.push(expr.into());
        self
    }

    /// Add a HAVING condition, joined with ` AND ` like WHERE.
    pub fn and_having(mut self, condition: impl Fragment + Send + Sync + 'static) -> Self {
        self.having_parts.push(Arc::new(condition));
        self
    }

    /// Add an ORDER BY expression, e.g. `"o ASC"`.
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

    /// Append a fragment after every other clause, e.g. `FOR UPDATE`.
    pub fn suffix(mut self, fragment: impl Fragment + Send + Sync + 'static) -> Self {
        self.suffixes.push(Arc::new(fragment));
        self
    }
}

impl Fragment for SelectBuilder {
    fn compile(&self) -> SqlResult<(String, ParamList)> {
        if self.columns.is_empty() {
            return Err(SqlError::MissingClause("select needs result columns"));
        }
        if self.distinct && !self.distinct_ons.is_empty() {
            return Err(SqlError::InvalidStatement(
                "cannot combine DISTINCT and DISTINCT ON",
            ));
        }

        let mut sql = String::new();
        let mut params = ParamList::new();

        if !self.prefixes.is_empty() {
            append_sql(&self.prefixes, &mut sql, " ", &mut params)?;
            sql.push(' ');
        }

        sql.push_str("SELECT ");

        if !self.distinct_ons.is_empty() {
            sql.push_str("DISTINCT ON (");
            sql.push_str(&self.distinct_ons.join(", "));
            sql.push_str(") ");
        } else if self.distinct {
            sql.push_str("DISTINCT ");
        }

        if !self.options.is_empty() {
            sql.push_str(&self.options.join(" "));
            sql.push(' ');
        }

        append_sql(&self.columns, &mut sql, ", ", &mut params)?;

        if !self.from_parts.is_empty() {
            sql.push_str(" FROM ");
            append_sql(&self.from_parts, &mut sql, ", ", &mut params)?;
        }

        if !self.joins.is_empty() {
            sql.push(' ');
            append_sql(&self.joins, &mut sql, " ", &mut params)?;
        }

        if !self.where_parts.is_empty() {
            sql.push_str(" WHERE ");
            append_sql(&self.where_parts, &mut sql, " AND ", &mut params)?;
        }

        if !self.group_bys.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&self.group_bys.join(", "));
        }

        if !self.having_parts.is_empty() {
            sql.push_str(" HAVING ");
            append_sql(&self.having_parts, &mut sql, " AND ", &mut params)?;
        }

        if !self.order_bys.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_bys.join(", "));
        }

        if let Some(limit) = self.limit {
            // Writing to a String cannot fail.
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

impl Statement for SelectBuilder {
    fn to_sql(&self) -> SqlResult<(String, ParamList)> {
        let (sql, params) = self.compile()?;
        Ok(finalize(self.placeholder, sql, params))
    }
}

/// A select used as a predicate value pairs with IN semantics:
/// `col IN (SELECT ...)`. Its text is spliced raw; the outer statement
/// rewrites placeholders once over the combined text.
impl IntoOperand for SelectBuilder {
    fn into_operand(self) -> Operand {
        Operand::Subquery(Arc::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::expr;
    use crate::placeholder::placeholders;
    use crate::predicate::{Eq, EqPairs};
    use crate::statement::{select, StatementBuilder};

    #[test]
    fn full_statement_clause_order() {
        let (sql, args) = select()
            .prefix(expr("WITH prefix AS ?").bind(0i32))
            .distinct()
            .columns(["a", "b"])
            .column(
                expr(format!("IF(d IN ({}), 1, 0) as stat_column", placeholders(3)))
                    .bind(1i32)
                    .bind(2i32)
                    .bind(3i32),
            )
            .column(expr("a > ?").bind(100i32))
            .column(Eq::new().pair("b", vec![101i32, 102, 103]))
            .from("e")
            .join_clause("CROSS JOIN j1")
            .join("j2")
            .left_join("j3")
            .right_join("j4")
            .and_where(expr("f = ?").bind(4i32))
            .and_where(Eq::new().pair("g", 5i32))
            .and_where(Eq::new().pair("h", vec![7i32, 8, 9]))
            .group_by("l")
            .and_having("m = n")
            .order_by("o ASC")
            .order_by("p DESC")
            .limit(12)
            .offset(13)
            .suffix(expr("FETCH FIRST ? ROWS ONLY").bind(14i32))
            .to_sql()
            .unwrap();

        assert_eq!(
            sql,
            "WITH prefix AS ? \
             SELECT DISTINCT a, b, IF(d IN (?,?,?), 1, 0) as stat_column, \
             a > ?, b IN (?,?,?) \
             FROM e \
             CROSS JOIN j1 JOIN j2 LEFT JOIN j3 RIGHT JOIN j4 \
             WHERE f = ? AND g = ? AND h IN (?,?,?) \
             GROUP BY l HAVING m = n ORDER BY o ASC, p DESC \
             LIMIT 12 OFFSET 13 \
             FETCH FIRST ? ROWS ONLY"
        );
        assert_eq!(args.len(), 14);
    }

    #[test]
    fn requires_result_columns() {
        let err = select().from("t").to_sql();
        assert!(matches!(err, Err(SqlError::MissingClause(_))));
    }

    #[test]
    fn distinct_on_lists_expressions() {
        let (sql, _) = select()
            .distinct_on("a")
            .distinct_on("b")
            .columns(["a", "b"])
            .from("t")
            .to_sql()
            .unwrap();
        assert_eq!(sql, "SELECT DISTINCT ON (a, b) a, b FROM t");
    }

    #[test]
    fn distinct_and_distinct_on_clash() {
        let err = select()
            .distinct()
            .distinct_on("a")
            .column("a")
            .from("t")
            .to_sql();
        assert!(matches!(err, Err(SqlError::InvalidStatement(_))));
    }

    #[test]
    fn zero_limit_and_offset_are_emitted() {
        let (sql, _) = select().column("a").from("t").limit(0).offset(0).to_sql().unwrap();
        assert_eq!(sql, "SELECT a FROM t LIMIT 0 OFFSET 0");
    }

    #[test]
    fn dollar_rewrite_happens_once_at_top_level() {
        let (sql, args) = StatementBuilder::new(Placeholder::Dollar)
            .select()
            .column("id")
            .from("users")
            .and_where(EqPairs::new().pair("name", "moe").pair("age", 13i32))
            .to_sql()
            .unwrap();
        assert_eq!(sql, "SELECT id FROM users WHERE name = $1 AND age = $2");
        assert_eq!(args.len(), 2);
    }

    #[test]
    fn subquery_operand_splices_raw_then_renumbers() {
        let sub = select()
            .column("id")
            .from("other")
            .and_where(expr("x = ?").bind(7i32));
        let (sql, args) = StatementBuilder::new(Placeholder::Dollar)
            .select()
            .column("a")
            .from("t")
            .and_where(expr("b = ?").bind(1i32))
            .and_where(EqPairs::new().pair("id", sub))
            .to_sql()
            .unwrap();
        assert_eq!(
            sql,
            "SELECT a FROM t WHERE b = $1 AND id IN (SELECT id FROM other WHERE x = $2)"
        );
        assert_eq!(args.len(), 2);
        assert_eq!(args.values()[1].downcast_ref::<i32>(), Some(&7));
    }

    #[test]
    fn from_select_aliases_the_subquery() {
        let sub = select().column("id").from("users").and_where(expr("age > ?").bind(18i32));
        let (sql, args) = select().column("id").from_select(sub, "adults").to_sql().unwrap();
        assert_eq!(
            sql,
            "SELECT id FROM (SELECT id FROM users WHERE age > ?) AS adults"
        );
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn empty_where_part_is_omitted() {
        let (sql, args) = select()
            .column("a")
            .from("t")
            .and_where(EqPairs::new())
            .and_where(expr("b = ?").bind(2i32))
            .to_sql()
            .unwrap();
        assert_eq!(sql, "SELECT a FROM t WHERE b = ?");
        assert_eq!(args.len(), 1);
    }

    #[test]
    fn cloning_branches_a_partial_statement() {
        let base = select().column("id").from("events");
        let recent = base.clone().and_where(expr("ts > ?").bind(100i64));
        let all = base.limit(10);

        let (sql, _) = recent.to_sql().unwrap();
        assert_eq!(sql, "SELECT id FROM events WHERE ts > ?");
        let (sql, _) = all.to_sql().unwrap();
        assert_eq!(sql, "SELECT id FROM events LIMIT 10");
    }
}
