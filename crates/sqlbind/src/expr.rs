//! Composite expression fragments: raw templates, aliases, conjunctions.

use crate::error::SqlResult;
use crate::fragment::{DynFragment, Fragment};
use crate::param::{Param, ParamList};
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// An item embedded in a composite template or a VALUES row: either a plain
/// bound value or a nested fragment whose text is spliced in place.
#[derive(Clone)]
pub enum Item {
    Value(Param),
    Fragment(DynFragment),
}

/// Wrap a value as an embeddable item.
pub fn val<T: ToSql + Send + Sync + 'static>(value: T) -> Item {
    Item::Value(Param::new(value))
}

/// Wrap a fragment as an embeddable item.
pub fn frag(fragment: impl Fragment + Send + Sync + 'static) -> Item {
    Item::Fragment(Arc::new(fragment))
}

/// A raw SQL template with `?` tokens and a parallel list of embedded items.
///
/// ```
/// use sqlbind::{expr, Fragment};
///
/// let (sql, args) = expr("a > ? OR b < ?").bind(15i32).bind(20i32).compile()?;
/// assert_eq!(sql, "a > ? OR b < ?");
/// assert_eq!(args.len(), 2);
/// # Ok::<(), sqlbind::SqlError>(())
/// ```
#[derive(Clone, Default)]
pub struct Expr {
    sql: String,
    items: Vec<Item>,
}

/// Build a raw expression fragment from a template.
pub fn expr(sql: impl Into<String>) -> Expr {
    Expr {
        sql: sql.into(),
        items: Vec::new(),
    }
}

impl Expr {
    /// Bind a value to the next `?` token.
    pub fn bind<T: ToSql + Send + Sync + 'static>(mut self, value: T) -> Self {
        self.items.push(Item::Value(Param::new(value)));
        self
    }

    /// Embed a nested fragment at the next `?` token. Its compiled text is
    /// spliced in verbatim and its arguments appended in place.
    pub fn embed(mut self, fragment: impl Fragment + Send + Sync + 'static) -> Self {
        self.items.push(Item::Fragment(Arc::new(fragment)));
        self
    }

    /// Append an already-wrapped item.
    pub fn item(mut self, item: Item) -> Self {
        self.items.push(item);
        self
    }

    fn has_fragments(&self) -> bool {
        self.items
            .iter()
            .any(|i| matches!(i, Item::Fragment(_)))
    }
}

impl Fragment for Expr {
    fn compile(&self) -> SqlResult<(String, ParamList)> {
        // Fast path: no embedded fragments, the template passes through.
        if !self.has_fragments() {
            let mut params = ParamList::new();
            for item in &self.items {
                if let Item::Value(p) = item {
                    params.push_param(p.clone());
                }
            }
            return Ok((self.sql.clone(), params));
        }

        let mut out = String::with_capacity(self.sql.len());
        let mut params = ParamList::new();
        let mut idx = 0usize;
        for ch in self.sql.chars() {
            if ch != '?' {
                out.push(ch);
                continue;
            }
            match self.items.get(idx) {
                // Excess tokens stay literal; the mismatch surfaces at
                // execution time, not here.
                None => out.push('?'),
                Some(Item::Value(p)) => {
                    out.push('?');
                    params.push_param(p.clone());
                }
                Some(Item::Fragment(f)) => {
                    let (sql, args) = f.compile()?;
                    out.push_str(&sql);
                    params.extend(&args);
                }
            }
            idx += 1;
        }
        Ok((out, params))
    }
}

/// Aliases a fragment: `(<sql>) AS <alias>`, optionally with a column list.
#[derive(Clone)]
pub struct Alias {
    fragment: DynFragment,
    alias: String,
    columns: Vec<String>,
}

/// Alias a fragment, typically a sub-select or a predicate used as a column.
pub fn alias(fragment: impl Fragment + Send + Sync + 'static, name: &str) -> Alias {
    Alias {
        fragment: Arc::new(fragment),
        alias: name.to_string(),
        columns: Vec::new(),
    }
}

impl Alias {
    /// Name the columns of the aliased relation: `(...) AS a (c1,c2)`.
    pub fn columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.columns = columns.into_iter().map(Into::into).collect();
        self
    }
}

impl Fragment for Alias {
    fn compile(&self) -> SqlResult<(String, ParamList)> {
        let (sql, params) = self.fragment.compile()?;
        let sql = if self.columns.is_empty() {
            format!("({}) AS {}", sql, self.alias)
        } else {
            format!("({}) AS {} ({})", sql, self.alias, self.columns.join(","))
        };
        Ok((sql, params))
    }
}

fn join_conjunction(parts: &[DynFragment], sep: &str) -> SqlResult<(String, ParamList)> {
    let mut params = ParamList::new();
    let mut sql_parts: Vec<String> = Vec::new();
    for part in parts {
        let (sql, args) = part.compile()?;
        params.extend(&args);
        if !sql.is_empty() {
            sql_parts.push(sql);
        }
    }
    if sql_parts.is_empty() {
        return Ok((String::new(), ParamList::new()));
    }
    Ok((format!("({})", sql_parts.join(sep)), params))
}

/// Glues fragments with ` AND `, wrapping the result in one paren pair.
///
/// Fragments compiling to empty text are omitted; if nothing remains, both
/// text and arguments are empty.
#[derive(Clone, Default)]
pub struct And(Vec<DynFragment>);

impl And {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(mut self, fragment: impl Fragment + Send + Sync + 'static) -> Self {
        self.0.push(Arc::new(fragment));
        self
    }
}

impl Fragment for And {
    fn compile(&self) -> SqlResult<(String, ParamList)> {
        join_conjunction(&self.0, " AND ")
    }
}

/// Glues fragments with ` OR `, wrapping the result in one paren pair.
#[derive(Clone, Default)]
pub struct Or(Vec<DynFragment>);

impl Or {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn push(mut self, fragment: impl Fragment + Send + Sync + 'static) -> Self {
        self.0.push(Arc::new(fragment));
        self
    }
}

impl Fragment for Or {
    fn compile(&self) -> SqlResult<(String, ParamList)> {
        join_conjunction(&self.0, " OR ")
    }
}
