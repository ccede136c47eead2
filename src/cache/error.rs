//! Cache error types.

use thiserror::Error;

/// Errors surfaced by the cache registry and the facade.
///
/// A cache miss is not an error; lookups return `Ok(None)` instead.
#[derive(Debug, Error)]
pub enum CacheError {
    /// An explicit profile name was requested that is neither the default
    /// nor present in the loaded settings.
    #[error("cache profile '{name}' has not been configured, please review your settings")]
    UnknownProfile { name: String },

    /// The stored value is not of the requested type.
    #[error("cached value for key '{key}' is a {found}, not a {expected}")]
    TypeMismatch {
        key: String,
        expected: &'static str,
        found: &'static str,
    },

    /// The instance backing a profile kept disappearing between lookups.
    #[error("cache instance for profile '{name}' was reclaimed {attempts} times in a row")]
    ReclaimRetriesExhausted { name: String, attempts: usize },
}

/// Result alias for cache operations.
pub type Result<T, E = CacheError> = std::result::Result<T, E>;
