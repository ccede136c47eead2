//! Cache store and retention configuration.

use std::time::Duration;

/// Configuration for a single cache store instance.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Maximum number of entries in one store.
    pub max_capacity: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
        }
    }
}

impl StoreConfig {
    /// Create a new store config with the given max capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self { max_capacity }
    }
}

/// How long the registry keeps constructed instances alive on its own.
///
/// The registry only holds weak handles to instances. The retention pool
/// holds the strong references; once an instance falls out of the pool and
/// no caller still holds it, the instance is reclaimed and rebuilt on the
/// next access.
#[derive(Debug, Clone)]
pub struct RetentionPolicy {
    /// Maximum number of instances kept alive by the registry.
    pub max_instances: u64,

    /// Instances not accessed within this duration are released.
    pub idle: Option<Duration>,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            max_instances: 64,
            idle: Some(Duration::from_secs(1800)), // 30 minutes
        }
    }
}

impl RetentionPolicy {
    /// Set max number of retained instances (builder pattern).
    #[must_use]
    pub fn max_instances(mut self, max_instances: u64) -> Self {
        self.max_instances = max_instances;
        self
    }

    /// Set the idle timeout after which an instance is released.
    #[must_use]
    pub fn idle(mut self, duration: Duration) -> Self {
        self.idle = Some(duration);
        self
    }

    /// Keep instances for as long as capacity allows.
    #[must_use]
    pub fn no_idle(mut self) -> Self {
        self.idle = None;
        self
    }
}
