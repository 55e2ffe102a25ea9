//! The fragment protocol: the sole contract between query parts.

use crate::error::SqlResult;
use crate::param::ParamList;
use std::sync::Arc;

/// A composable unit producing SQL text and its bound arguments.
///
/// Compilation always emits the internal positional token `?`. Dialect
/// rewriting is applied exactly once at the top level, after every nested
/// fragment has been compiled and spliced, so that argument positions and
/// rewritten tokens stay in lock-step. Nested fragments are therefore
/// compiled with rewriting suppressed.
pub trait Fragment {
    /// Compile into raw SQL text and bound arguments.
    fn compile(&self) -> SqlResult<(String, ParamList)>;
}

/// A shared, immutable fragment owned by a builder.
///
/// Builders hold fragments behind `Arc` so `Clone` duplicates every owned
/// sequence while the fragments themselves, immutable after construction,
/// are shared between the original and the copy.
pub type DynFragment = Arc<dyn Fragment + Send + Sync>;

/// Literal SQL text with no bound arguments.
impl Fragment for &'static str {
    fn compile(&self) -> SqlResult<(String, ParamList)> {
        Ok(((*self).to_string(), ParamList::new()))
    }
}

impl Fragment for String {
    fn compile(&self) -> SqlResult<(String, ParamList)> {
        Ok((self.clone(), ParamList::new()))
    }
}

/// Compile `parts` and append them to `buf` joined by `sep`, threading the
/// running argument list.
///
/// Fragments compiling to empty text are omitted from the output (no
/// dangling separators), but any arguments they produced are still
/// propagated. The first compile error aborts the traversal and no partial
/// text is appended for the failing part.
pub fn append_sql(
    parts: &[DynFragment],
    buf: &mut String,
    sep: &str,
    params: &mut ParamList,
) -> SqlResult<()> {
    let mut first = true;
    for part in parts {
        let (sql, args) = part.compile()?;
        params.extend(&args);
        if sql.is_empty() {
            continue;
        }
        if !first {
            buf.push_str(sep);
        }
        buf.push_str(&sql);
        first = false;
    }
    Ok(())
}
