//! Bound-argument storage using Arc for clone-friendly builders.

use std::any::Any;
use std::sync::Arc;
use tokio_postgres::types::ToSql;

/// A driver value that can also be downcast for inspection.
///
/// Blanket-implemented for every `'static` [`ToSql`] type, so callers never
/// implement this directly.
pub trait BoundValue: ToSql + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T: ToSql + Send + Sync + Any> BoundValue for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// A clone-friendly bound argument.
///
/// Builders are ordinary values that get cloned to branch a partially built
/// statement; wrapping each argument in an `Arc` keeps those clones cheap
/// while the underlying value stays immutable.
#[derive(Clone)]
pub struct Param(pub(crate) Arc<dyn BoundValue>);

impl Param {
    /// Wrap any driver-compatible value as a bound argument.
    pub fn new<T: ToSql + Send + Sync + 'static>(value: T) -> Self {
        Param(Arc::new(value))
    }

    /// Borrow the inner value as a driver parameter.
    pub fn as_sql(&self) -> &(dyn ToSql + Sync) {
        let value: &(dyn ToSql + Sync) = &*self.0;
        value
    }

    /// Downcast the inner value to a concrete type.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref()
    }
}

impl std::fmt::Debug for Param {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Param").field(&"<dyn ToSql>").finish()
    }
}

/// The ordered argument list threaded through compilation.
///
/// The position of each argument matches the Nth unresolved `?` token of the
/// compiled SQL text, counted left to right.
#[derive(Clone, Debug, Default)]
pub struct ParamList {
    params: Vec<Param>,
}

impl ParamList {
    /// Create a new empty argument list.
    pub fn new() -> Self {
        Self { params: Vec::new() }
    }

    /// Append a value, returning its 1-based position.
    pub fn push<T: ToSql + Send + Sync + 'static>(&mut self, value: T) -> usize {
        self.params.push(Param::new(value));
        self.params.len()
    }

    /// Append a pre-wrapped argument, returning its 1-based position.
    pub fn push_param(&mut self, param: Param) -> usize {
        self.params.push(param);
        self.params.len()
    }

    /// Current argument count.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Whether the list holds no arguments.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Borrow the arguments in order.
    pub fn values(&self) -> &[Param] {
        &self.params
    }

    /// Collect driver-compatible references for execution.
    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params.iter().map(|p| p.as_sql()).collect()
    }

    /// Append every argument of another list, preserving order.
    pub fn extend(&mut self, other: &ParamList) {
        self.params.extend(other.params.iter().cloned());
    }
}
