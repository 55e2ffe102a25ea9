//! UPDATE statement assembly.

use crate::client::{Mutation, Statement};
use crate::error::{SqlError, SqlResult};
use crate::expr::{alias, expr, Item};
use crate::fragment::{append_sql, DynFragment, Fragment};
use crate::param::{Param, ParamList};
use crate::placeholder::Placeholder;
use crate::select::SelectBuilder;
use crate::statement::finalize;
use crate::values::ValuesBuilder;
use std::fmt::Write;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// Builds UPDATE statements, including Postgres `UPDATE .. FROM` forms.
#[derive(Clone, Default)]
pub struct UpdateBuilder {
    placeholder: Placeholder,
    prefixes: Vec<DynFragment>,
    table: String,
    set_parts: Vec<(String, Item)>,
    from_parts: Vec<DynFragment>,
    from_values: Option<(ValuesBuilder, String)>,
    joins: Vec<DynFragment>,
    where_parts: Vec<DynFragment>,
    order_bys: Vec<String>,
    limit: Option<u64>,
    offset: Option<u64>,
    returning: Vec<DynFragment>,
    suffixes: Vec<DynFragment>,
}

impl UpdateBuilder {
    pub(crate) fn new(placeholder: Placeholder) -> Self {
        Self {
            placeholder,
            ..Self::default()
        }
    }

    /// Prepend a fragment before the UPDATE keyword.
    pub fn prefix(mut self, fragment: impl Fragment + Send + Sync + 'static) -> Self {
        self.prefixes.push(Arc::new(fragment));
        self
    }

    /// Set the table to update.
    pub fn table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    /// Assign a bound value to a column: `col = ?`.
    pub fn set(mut self, column: impl Into<String>, value: impl ToSql + Send + Sync + 'static) -> Self {
        self.set_parts
            .push((column.into(), Item::Value(Param::new(value))));
        self
    }

    /// Assign an expression to a column, spliced verbatim:
    /// `col = b.foo` or `col = ? + 1`.
    pub fn set_expr(
        mut self,
        column: impl Into<String>,
        fragment: impl Fragment + Send + Sync + 'static,
    ) -> Self {
        self.set_parts
            .push((column.into(), Item::Fragment(Arc::new(fragment))));
        self
    }

    /// Assign a sub-select to a column: `col = (SELECT ...)`.
    pub fn set_select(self, column: impl Into<String>, select: SelectBuilder) -> Self {
        self.set_expr(column, expr("(?)").embed(select))
    }

    /// Append assignments from ordered pairs.
    pub fn set_map<K, I>(mut self, pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Item)>,
    {
        for (column, item) in pairs {
            self.set_parts.push((column.into(), item));
        }
        self
    }

    /// Add a FROM table. Repeated calls add comma-separated sources.
    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.from_parts.push(Arc::new(table.into()));
        self
    }

    /// Use a sub-select as the FROM source.
    pub fn from_select(mut self, select: SelectBuilder, name: &str) -> Self {
        self.from_parts.push(Arc::new(alias(select, name)));
        self
    }

    /// Join against literal rows: `FROM (VALUES ...) AS name (cols)`.
    ///
    /// A leading all-NULL row cast to this update's table type is prepended,
    /// so each literal column takes the corresponding table column's type.
    pub fn from_values(mut self, values: ValuesBuilder, name: impl Into<String>) -> Self {
        self.from_values = Some((values, name.into()));
        self
    }

    /// Append `JOIN <clause>`.
    pub fn join(mut self, clause: impl Into<String>) -> Self {
        let clause = clause.into();
        self.joins.push(Arc::new(format!("JOIN {clause}")));
        self
    }

    /// Append a raw join fragment.
    pub fn join_clause(mut self, join: impl Fragment + Send + Sync + 'static) -> Self {
        self.joins.push(Arc::new(join));
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

    /// Add a RETURNING column.
    pub fn returning(mut self, column: impl Into<String>) -> Self {
        self.returning.push(Arc::new(column.into()));
        self
    }

    /// Return an aliased sub-select: `RETURNING (SELECT ...) AS name`.
    pub fn returning_select(mut self, select: SelectBuilder, name: &str) -> Self {
        self.returning.push(Arc::new(alias(select, name)));
        self
    }

    /// Append a fragment after every other clause.
    pub fn suffix(mut self, fragment: impl Fragment + Send + Sync + 'static) -> Self {
        self.suffixes.push(Arc::new(fragment));
        self
    }
}

impl Fragment for UpdateBuilder {
    fn compile(&self) -> SqlResult<(String, ParamList)> {
        if self.table.is_empty() {
            return Err(SqlError::MissingClause("update needs a table"));
        }
        if self.set_parts.is_empty() {
            return Err(SqlError::MissingClause(
                "update needs at least one set clause",
            ));
        }

        let mut sql = String::new();
        let mut params = ParamList::new();

        if !self.prefixes.is_empty() {
            append_sql(&self.prefixes, &mut sql, " ", &mut params)?;
            sql.push(' ');
        }

        sql.push_str("UPDATE ");
        sql.push_str(&self.table);
        sql.push_str(" SET ");

        for (i, (column, item)) in self.set_parts.iter().enumerate() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(column);
            sql.push_str(" = ");
            match item {
                Item::Value(param) => {
                    sql.push('?');
                    params.push_param(param.clone());
                }
                Item::Fragment(fragment) => {
                    let (text, args) = fragment.compile()?;
                    sql.push_str(&text);
                    params.extend(&args);
                }
            }
        }

        let mut from_parts = self.from_parts.clone();
        if let Some((values, name)) = &self.from_values {
            let values = values.clone().typed_for(self.table.clone());
            let columns = values.column_names().to_vec();
            from_parts.push(Arc::new(alias(values, name).columns(columns)));
        }
        if !from_parts.is_empty() {
            sql.push_str(" FROM ");
            append_sql(&from_parts, &mut sql, ", ", &mut params)?;
        }

        if !self.joins.is_empty() {
            sql.push(' ');
            append_sql(&self.joins, &mut sql, " ", &mut params)?;
        }

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

        if !self.returning.is_empty() {
            sql.push_str(" RETURNING ");
            append_sql(&self.returning, &mut sql, ", ", &mut params)?;
        }

        if !self.suffixes.is_empty() {
            sql.push(' ');
            append_sql(&self.suffixes, &mut sql, " ", &mut params)?;
        }

        Ok((sql, params))
    }
}

impl Statement for UpdateBuilder {
    fn to_sql(&self) -> SqlResult<(String, ParamList)> {
        let (sql, params) = self.compile()?;
        Ok(finalize(self.placeholder, sql, params))
    }
}

impl Mutation for UpdateBuilder {}
