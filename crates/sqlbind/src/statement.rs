//! Statement entry points carrying the placeholder dialect.

use crate::delete::DeleteBuilder;
use crate::insert::InsertBuilder;
use crate::param::ParamList;
use crate::placeholder::Placeholder;
use crate::select::SelectBuilder;
use crate::update::UpdateBuilder;
use crate::values::ValuesBuilder;

/// Apply the dialect rewrite, exactly once, to a fully compiled statement.
pub(crate) fn finalize(
    placeholder: Placeholder,
    sql: String,
    params: ParamList,
) -> (String, ParamList) {
    let sql = placeholder.rewrite(&sql);
    #[cfg(feature = "tracing")]
    tracing::debug!(sql = %sql, args = params.len(), "built statement");
    (sql, params)
}

/// Statement factory bound to a placeholder dialect.
///
/// Every statement it creates inherits the dialect. There is no process-wide
/// default; callers wanting Postgres numbering construct one with
/// [`Placeholder::Dollar`] and keep it around.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StatementBuilder {
    placeholder: Placeholder,
}

impl StatementBuilder {
    pub fn new(placeholder: Placeholder) -> Self {
        Self { placeholder }
    }

    pub fn select(&self) -> SelectBuilder {
        SelectBuilder::new(self.placeholder)
    }

    pub fn insert(&self) -> InsertBuilder {
        InsertBuilder::new(self.placeholder)
    }

    pub fn update(&self) -> UpdateBuilder {
        UpdateBuilder::new(self.placeholder)
    }

    pub fn delete(&self) -> DeleteBuilder {
        DeleteBuilder::new(self.placeholder)
    }

    pub fn values(&self) -> ValuesBuilder {
        ValuesBuilder::new()
    }
}

/// A SELECT statement with `?` placeholders.
pub fn select() -> SelectBuilder {
    SelectBuilder::new(Placeholder::Question)
}

/// An INSERT statement with `?` placeholders.
pub fn insert() -> InsertBuilder {
    InsertBuilder::new(Placeholder::Question)
}

/// An UPDATE statement with `?` placeholders.
pub fn update() -> UpdateBuilder {
    UpdateBuilder::new(Placeholder::Question)
}

/// A DELETE statement with `?` placeholders.
pub fn delete() -> DeleteBuilder {
    DeleteBuilder::new(Placeholder::Question)
}

/// A standalone VALUES fragment.
pub fn values() -> ValuesBuilder {
    ValuesBuilder::new()
}
