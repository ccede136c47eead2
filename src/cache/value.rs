//! Type-erased cache values.

use std::any::{Any, type_name};
use std::fmt;
use std::sync::Arc;

/// An opaque value held by a cache store.
///
/// Stores never look inside; the facade downcasts on the way out and
/// reports a type mismatch when the requested type differs.
#[derive(Clone)]
pub struct CacheValue {
    inner: Arc<dyn Any + Send + Sync>,
    type_name: &'static str,
}

impl CacheValue {
    pub fn new<T>(value: T) -> Self
    where
        T: Any + Send + Sync,
    {
        Self {
            inner: Arc::new(value),
            type_name: type_name::<T>(),
        }
    }

    /// Fully-qualified name of the stored type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Check whether the stored value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        (*self.inner).is::<T>()
    }

    /// Clone the stored value out as a `T`.
    ///
    /// Returns `None` if the value is of another type.
    pub fn downcast<T>(&self) -> Option<T>
    where
        T: Any + Clone,
    {
        (*self.inner).downcast_ref::<T>().cloned()
    }
}

impl fmt::Debug for CacheValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheValue")
            .field("type_name", &self.type_name)
            .finish()
    }
}
