//! Postgres-specific value encoders: array literals and JSON casts.

use crate::error::{SqlError, SqlResult};
use crate::fragment::Fragment;
use crate::param::ParamList;
use serde::Serialize;
use std::fmt::Write;

/// A value renderable as an element of a Postgres array literal.
///
/// Implemented for the integer and float primitives, strings, and nested
/// vectors of any element type, which render as nested braces.
pub trait ArrayElement {
    fn write_literal(&self, buf: &mut String) -> SqlResult<()>;
}

macro_rules! int_element {
    ($($t:ty),* $(,)?) => {$(
        impl ArrayElement for $t {
            fn write_literal(&self, buf: &mut String) -> SqlResult<()> {
                // Writing to a String cannot fail.
                let _ = write!(buf, "{self}");
                Ok(())
            }
        }
    )*};
}

int_element!(i16, i32, i64, u32);

macro_rules! float_element {
    ($($t:ty),* $(,)?) => {$(
        impl ArrayElement for $t {
            fn write_literal(&self, buf: &mut String) -> SqlResult<()> {
                if !self.is_finite() {
                    return Err(SqlError::UnsupportedType(format!(
                        "non-finite float {self} in array literal"
                    )));
                }
                let _ = write!(buf, "{self}");
                Ok(())
            }
        }
    )*};
}

float_element!(f32, f64);

fn write_quoted(value: &str, buf: &mut String) {
    buf.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            buf.push('\\');
        }
        buf.push(ch);
    }
    buf.push('"');
}

impl ArrayElement for &str {
    fn write_literal(&self, buf: &mut String) -> SqlResult<()> {
        write_quoted(self, buf);
        Ok(())
    }
}

impl ArrayElement for String {
    fn write_literal(&self, buf: &mut String) -> SqlResult<()> {
        write_quoted(self, buf);
        Ok(())
    }
}

impl<T: ArrayElement> ArrayElement for Vec<T> {
    fn write_literal(&self, buf: &mut String) -> SqlResult<()> {
        buf.push('{');
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                buf.push(',');
            }
            item.write_literal(buf)?;
        }
        buf.push('}');
        Ok(())
    }
}

/// A collection bound as a single Postgres array literal argument.
#[derive(Clone, Debug)]
pub struct Array<T>(Vec<T>);

/// Render a collection as one `{..}` array literal, bound as a single text
/// argument behind a `?` token.
pub fn array<T: ArrayElement>(items: impl IntoIterator<Item = T>) -> Array<T> {
    Array(items.into_iter().collect())
}

impl<T: ArrayElement> Fragment for Array<T> {
    fn compile(&self) -> SqlResult<(String, ParamList)> {
        let mut literal = String::new();
        self.0.write_literal(&mut literal)?;
        let mut params = ParamList::new();
        params.push(literal);
        Ok(("?".to_string(), params))
    }
}

/// A serializable value bound as JSON text with an explicit cast.
#[derive(Clone, Debug)]
pub struct Json<T> {
    value: T,
    cast: &'static str,
}

/// Bind a value as `?::json`.
pub fn json<T: Serialize>(value: T) -> Json<T> {
    Json {
        value,
        cast: "json",
    }
}

/// Bind a value as `?::jsonb`.
pub fn jsonb<T: Serialize>(value: T) -> Json<T> {
    Json {
        value,
        cast: "jsonb",
    }
}

impl<T: Serialize> Fragment for Json<T> {
    fn compile(&self) -> SqlResult<(String, ParamList)> {
        let text = serde_json::to_string(&self.value)?;
        let mut params = ParamList::new();
        params.push(text);
        Ok((format!("?::{}", self.cast), params))
    }
}
