//! Composable SQL generation with positional-placeholder rewriting.
//!
//! Statements are assembled from typed fragments: raw expressions with bound
//! arguments, column-to-value predicates, conjunctions, sub-selects and
//! aliased sources. Every fragment compiles to `?` tokens plus an ordered
//! argument list; the placeholder dialect is applied exactly once, at the
//! top level, so nested fragments splice and renumber correctly.
//!
//! ```
//! use sqlbind::{EqPairs, Placeholder, Statement, StatementBuilder};
//!
//! let psql = StatementBuilder::new(Placeholder::Dollar);
//! let (sql, args) = psql
//!     .select()
//!     .columns(["id", "name"])
//!     .from("users")
//!     .and_where(EqPairs::new().pair("status", "active"))
//!     .to_sql()?;
//! assert_eq!(sql, "SELECT id, name FROM users WHERE status = $1");
//! assert_eq!(args.len(), 1);
//! # Ok::<(), sqlbind::SqlError>(())
//! ```
//!
//! Built statements run against `tokio-postgres` through the
//! [`Statement`] and [`Mutation`] traits, over a plain client or a
//! transaction.

mod client;
mod delete;
mod error;
mod expr;
mod fragment;
mod insert;
mod param;
pub mod pg;
mod placeholder;
mod predicate;
mod select;
mod statement;
mod update;
mod values;

pub use client::{GenericClient, Mutation, Statement};
pub use delete::DeleteBuilder;
pub use error::{SqlError, SqlResult};
pub use expr::{alias, expr, frag, val, Alias, And, Expr, Item, Or};
pub use fragment::{append_sql, DynFragment, Fragment};
pub use insert::InsertBuilder;
pub use param::{BoundValue, Param, ParamList};
pub use placeholder::{placeholders, Placeholder};
pub use predicate::{
    Eq, EqOr, EqOrPairs, EqPairs, Gt, GtOrEq, GtOrEqPairs, GtPairs, ILikeOr, ILikeOrPairs,
    IntoOperand, LikeOr, LikeOrPairs, Lt, LtOrEq, LtOrEqPairs, LtPairs, NotEq, NotEqPairs,
    Operand,
};
pub use select::SelectBuilder;
pub use statement::{delete, insert, select, update, values, StatementBuilder};
pub use update::UpdateBuilder;
pub use values::ValuesBuilder;

#[cfg(test)]
mod tests;
