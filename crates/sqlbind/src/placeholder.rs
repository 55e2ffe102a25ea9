//! Placeholder dialects and the top-level rewrite pass.

use std::fmt::Write;

/// Target placeholder syntax, chosen once per top-level statement.
///
/// The selector is passed explicitly through every build; there is no
/// ambient default. Nested sub-statements always compile with rewriting
/// suppressed, since their text is spliced into the parent before the
/// parent's single rewrite pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Placeholder {
    /// Sequential `?` tokens, emitted as-is. Rewriting is the identity
    /// transform, so applying it twice is a no-op.
    #[default]
    Question,
    /// Numbered `$1..$N` tokens (Postgres).
    Dollar,
}

impl Placeholder {
    /// Rewrite the internal `?` tokens of a completed SQL string into this
    /// dialect's syntax.
    ///
    /// The scan is a naive left-to-right pass: `?` characters inside quoted
    /// string literals are counted like any other token, so keep literal
    /// question marks out of templates and bind them as arguments instead.
    pub fn rewrite(&self, sql: &str) -> String {
        match self {
            Placeholder::Question => sql.to_string(),
            Placeholder::Dollar => {
                let mut out = String::with_capacity(sql.len() + 8);
                let mut n = 0usize;
                for ch in sql.chars() {
                    if ch == '?' {
                        n += 1;
                        // Writing to a String cannot fail.
                        let _ = write!(out, "${n}");
                    } else {
                        out.push(ch);
                    }
                }
                out
            }
        }
    }
}

/// A comma-joined run of `count` placeholder tokens: `?,?,?`.
pub fn placeholders(count: usize) -> String {
    let mut out = String::with_capacity(count * 2);
    for i in 0..count {
        if i > 0 {
            out.push(',');
        }
        out.push('?');
    }
    out
}
