//! Error types for sqlbind.

use thiserror::Error;

/// Result type alias for sqlbind operations.
pub type SqlResult<T> = Result<T, SqlError>;

/// Errors produced while composing, compiling, or executing statements.
///
/// Composition is fail-fast: the first error encountered during a
/// left-to-right traversal aborts the build and is returned unwrapped, so
/// the deepest failing fragment is what the caller sees.
#[derive(Debug, Error)]
pub enum SqlError {
    /// A statement is missing a clause it cannot be built without.
    #[error("statement is missing a required clause: {0}")]
    MissingClause(&'static str),

    /// Clauses were combined in a way the statement kind does not allow.
    #[error("invalid statement: {0}")]
    InvalidStatement(&'static str),

    /// A predicate value is incompatible with the requested operator family.
    #[error("invalid comparison: {0}")]
    InvalidComparison(&'static str),

    /// A value cannot be rendered as a dialect literal.
    #[error("unsupported value type: {0}")]
    UnsupportedType(String),

    /// A structured value failed to encode.
    #[error("failed to encode value: {0}")]
    Encoding(#[from] serde_json::Error),

    /// Driver error, surfaced verbatim.
    #[error("query error: {0}")]
    Query(#[from] tokio_postgres::Error),
}
