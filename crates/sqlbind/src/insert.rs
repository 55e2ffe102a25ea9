//! INSERT statement assembly.

use crate::client::{Mutation, Statement};
use crate::error::{SqlError, SqlResult};
use crate::expr::Item;
use crate::fragment::{append_sql, DynFragment, Fragment};
use crate::param::ParamList;
use crate::placeholder::Placeholder;
use crate::statement::finalize;
use crate::values::append_rows;
use std::sync::Arc;

/// Builds INSERT statements.
#[derive(Clone, Default)]
pub struct InsertBuilder {
    placeholder: Placeholder,
    prefixes: Vec<DynFragment>,
    options: Vec<String>,
    into: String,
    columns: Vec<String>,
    rows: Vec<Vec<Item>>,
    returning: Vec<DynFragment>,
    suffixes: Vec<DynFragment>,
}

impl InsertBuilder {
    pub(crate) fn new(placeholder: Placeholder) -> Self {
        Self {
            placeholder,
            ..Self::default()
        }
    }

    /// Prepend a fragment before the INSERT keyword.
    pub fn prefix(mut self, fragment: impl Fragment + Send + Sync + 'static) -> Self {
        self.prefixes.push(Arc::new(fragment));
        self
    }

    /// Add a keyword option before the INTO clause.
    pub fn option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    /// Set the target table.
    pub fn into(mut self, table: impl Into<String>) -> Self {
        self.into = table.into();
        self
    }

    /// Add insert columns.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Append one row of values, built with [`val`](crate::val) and
    /// [`frag`](crate::frag).
    pub fn values(mut self, row: impl IntoIterator<Item = Item>) -> Self {
        self.rows.push(row.into_iter().collect());
        self
    }

    /// Set columns and a single row from ordered pairs, replacing any
    /// previously set columns and rows.
    pub fn set_map<K, I>(mut self, pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Item)>,
    {
        let mut columns = Vec::new();
        let mut row = Vec::new();
        for (column, item) in pairs {
            columns.push(column.into());
            row.push(item);
        }
        self.columns = columns;
        self.rows = vec![row];
        self
    }

    /// Add a RETURNING column.
    pub fn returning(mut self, column: impl Into<String>) -> Self {
        self.returning.push(Arc::new(column.into()));
        self
    }

    /// Append a fragment after every other clause.
    pub fn suffix(mut self, fragment: impl Fragment + Send + Sync + 'static) -> Self {
        self.suffixes.push(Arc::new(fragment));
        self
    }
}

impl Fragment for InsertBuilder {
    fn compile(&self) -> SqlResult<(String, ParamList)> {
        if self.into.is_empty() {
            return Err(SqlError::MissingClause("insert needs a target table"));
        }
        if self.rows.is_empty() {
            return Err(SqlError::MissingClause(
                "insert needs at least one set of values",
            ));
        }

        let mut sql = String::new();
        let mut params = ParamList::new();

        if !self.prefixes.is_empty() {
            append_sql(&self.prefixes, &mut sql, " ", &mut params)?;
            sql.push(' ');
        }

        sql.push_str("INSERT ");

        if !self.options.is_empty() {
            sql.push_str(&self.options.join(" "));
            sql.push(' ');
        }

        sql.push_str("INTO ");
        sql.push_str(&self.into);
        sql.push(' ');

        if !self.columns.is_empty() {
            sql.push('(');
            sql.push_str(&self.columns.join(","));
            sql.push_str(") ");
        }

        sql.push_str("VALUES ");
        append_rows(&self.rows, &mut sql, &mut params)?;

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

impl Statement for InsertBuilder {
    fn to_sql(&self) -> SqlResult<(String, ParamList)> {
        let (sql, params) = self.compile()?;
        Ok(finalize(self.placeholder, sql, params))
    }
}

impl Mutation for InsertBuilder {}
