//! Standalone VALUES fragments, usable as an UPDATE join source.

use crate::error::{SqlError, SqlResult};
use crate::expr::Item;
use crate::fragment::Fragment;
use crate::param::ParamList;

/// Builds a `VALUES (..),(..)` fragment.
///
/// When wired into an update through
/// [`UpdateBuilder::from_values`](crate::UpdateBuilder::from_values),
/// a leading all-NULL row casts every column to the update target's row
/// type, so the literal rows inherit the table's column types.
#[derive(Clone, Default)]
pub struct ValuesBuilder {
    columns: Vec<String>,
    rows: Vec<Vec<Item>>,
    typed_table: Option<String>,
}

impl ValuesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name the columns of the rows. Required when the fragment is used as
    /// an aliased UPDATE source.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Append one row of items, built with [`val`](crate::val) and
    /// [`frag`](crate::frag).
    pub fn row(mut self, items: impl IntoIterator<Item = Item>) -> Self {
        self.rows.push(items.into_iter().collect());
        self
    }

    pub(crate) fn typed_for(mut self, table: impl Into<String>) -> Self {
        self.typed_table = Some(table.into());
        self
    }

    pub(crate) fn column_names(&self) -> &[String] {
        &self.columns
    }
}

/// Render rows as `(..),(..)`, appending to `sql` and `params`.
///
/// `Value` items emit a `?` token and bind an argument; `Fragment` items
/// splice their compiled text in place.
pub(crate) fn append_rows(
    rows: &[Vec<Item>],
    sql: &mut String,
    params: &mut ParamList,
) -> SqlResult<()> {
    for (r, row) in rows.iter().enumerate() {
        if r > 0 {
            sql.push(',');
        }
        sql.push('(');
        for (i, item) in row.iter().enumerate() {
            if i > 0 {
                sql.push(',');
            }
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
        sql.push(')');
    }
    Ok(())
}

impl Fragment for ValuesBuilder {
    fn compile(&self) -> SqlResult<(String, ParamList)> {
        if self.rows.is_empty() {
            return Err(SqlError::MissingClause("values needs at least one row"));
        }

        let mut sql = String::from("VALUES ");
        let mut params = ParamList::new();

        if let Some(table) = &self.typed_table {
            if !self.columns.is_empty() {
                sql.push('(');
                let nulled: Vec<String> = self
                    .columns
                    .iter()
                    .map(|column| format!("(NULL::{table}).{column}"))
                    .collect();
                sql.push_str(&nulled.join(","));
                sql.push_str("), ");
            }
        }

        append_rows(&self.rows, &mut sql, &mut params)?;
        Ok((sql, params))
    }
}
