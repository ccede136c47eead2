//! Underlying cache store contract and the default Moka-backed store.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use moka::Expiry;
use moka::sync::Cache;

use super::clock::{self, Clock, SystemClock};
use super::{CacheValue, StoreConfig};

/// How an entry's lifetime is measured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpirationMode {
    /// Expires a fixed duration after it was written.
    Absolute,
}

/// A cache instance backing one profile.
pub trait CacheStore: Send + Sync + fmt::Debug {
    /// Name of the profile this store backs.
    fn name(&self) -> &str;

    fn put(&self, key: String, value: CacheValue, mode: ExpirationMode, ttl: Duration);

    /// Returns `None` on a miss or an expired entry.
    fn get(&self, key: &str) -> Option<CacheValue>;

    /// Returns `true` if a live entry was removed.
    fn remove(&self, key: &str) -> bool;

    fn clear(&self);

    /// Approximate number of entries.
    fn entry_count(&self) -> u64;
}

/// Builds a fresh store for a profile.
pub trait StoreFactory: Send + Sync {
    fn build(&self, profile_name: &str) -> Arc<dyn CacheStore>;
}

#[derive(Clone)]
struct StoredItem {
    value: CacheValue,
    ttl: Duration,
    expires_at: DateTime<Utc>,
}

/// Evicts each entry `ttl` after its last write.
struct AbsoluteExpiry;

impl Expiry<String, StoredItem> for AbsoluteExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        item: &StoredItem,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(item.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        item: &StoredItem,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(item.ttl)
    }
}

/// Default store over a Moka cache.
///
/// Moka evicts expired entries in the background; lookups additionally
/// compare each entry's `expires_at` against the injected clock so an
/// expired entry is never returned.
pub struct MokaStore {
    name: Arc<str>,
    inner: Cache<String, StoredItem>,
    clock: Arc<dyn Clock>,
}

impl MokaStore {
    /// Create a new store with the given name and config.
    pub fn new(name: impl Into<Arc<str>>, config: &StoreConfig, clock: Arc<dyn Clock>) -> Self {
        let inner = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(AbsoluteExpiry)
            .build();

        Self {
            name: name.into(),
            inner,
            clock,
        }
    }

    fn is_expired(&self, item: &StoredItem) -> bool {
        self.clock.now() >= item.expires_at
    }
}

impl CacheStore for MokaStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn put(&self, key: String, value: CacheValue, mode: ExpirationMode, ttl: Duration) {
        let expires_at = match mode {
            ExpirationMode::Absolute => clock::offset(self.clock.now(), ttl),
        };

        self.inner.insert(
            key,
            StoredItem {
                value,
                ttl,
                expires_at,
            },
        );
    }

    fn get(&self, key: &str) -> Option<CacheValue> {
        let item = self.inner.get(key)?;
        if self.is_expired(&item) {
            self.inner.invalidate(key);
            return None;
        }
        Some(item.value)
    }

    fn remove(&self, key: &str) -> bool {
        self.inner
            .remove(key)
            .is_some_and(|item| !self.is_expired(&item))
    }

    fn clear(&self) {
        self.inner.invalidate_all();
    }

    fn entry_count(&self) -> u64 {
        self.inner.run_pending_tasks();
        self.inner.entry_count()
    }
}

impl fmt::Debug for MokaStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MokaStore")
            .field("name", &self.name)
            .field("entry_count", &self.inner.entry_count())
            .finish()
    }
}

/// Builds [`MokaStore`] instances sharing one config and clock.
#[derive(Debug, Clone)]
pub struct MokaStoreFactory {
    config: StoreConfig,
    clock: Arc<dyn Clock>,
}

impl MokaStoreFactory {
    pub fn new(config: StoreConfig, clock: Arc<dyn Clock>) -> Self {
        Self { config, clock }
    }
}

impl Default for MokaStoreFactory {
    fn default() -> Self {
        Self::new(StoreConfig::default(), Arc::new(SystemClock))
    }
}

impl StoreFactory for MokaStoreFactory {
    fn build(&self, profile_name: &str) -> Arc<dyn CacheStore> {
        Arc::new(MokaStore::new(profile_name, &self.config, Arc::clone(&self.clock)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;

    fn store_with_clock() -> (MokaStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::starting_now());
        let store = MokaStore::new("Fast", &StoreConfig::default(), clock.clone());
        (store, clock)
    }

    #[test]
    fn test_put_then_get() {
        let (store, _) = store_with_clock();
        store.put(
            "1".into(),
            CacheValue::new(42_i32),
            ExpirationMode::Absolute,
            Duration::from_secs(5),
        );

        let value = store.get("1").unwrap();
        assert_eq!(value.downcast::<i32>(), Some(42));
        assert_eq!(store.name(), "Fast");
    }

    #[test]
    fn test_entry_expires_after_ttl() {
        let (store, clock) = store_with_clock();
        store.put(
            "1".into(),
            CacheValue::new(42_i32),
            ExpirationMode::Absolute,
            Duration::from_secs(5),
        );

        clock.advance(Duration::from_secs(4));
        assert!(store.get("1").is_some());

        clock.advance(Duration::from_secs(2));
        assert!(store.get("1").is_none());
    }

    #[test]
    fn test_rewrite_restarts_expiration() {
        let (store, clock) = store_with_clock();
        let ttl = Duration::from_secs(5);
        store.put("k".into(), CacheValue::new(1_u8), ExpirationMode::Absolute, ttl);

        clock.advance(Duration::from_secs(4));
        store.put("k".into(), CacheValue::new(2_u8), ExpirationMode::Absolute, ttl);
        clock.advance(Duration::from_secs(4));

        assert_eq!(store.get("k").and_then(|v| v.downcast::<u8>()), Some(2));
    }

    #[test]
    fn test_remove_reports_presence() {
        let (store, _) = store_with_clock();
        store.put(
            "k".into(),
            CacheValue::new("v"),
            ExpirationMode::Absolute,
            Duration::from_secs(60),
        );

        assert!(store.remove("k"));
        assert!(!store.remove("k"));
        assert!(store.get("k").is_none());
    }

    #[test]
    fn test_remove_expired_entry_is_false() {
        let (store, clock) = store_with_clock();
        store.put(
            "k".into(),
            CacheValue::new("v"),
            ExpirationMode::Absolute,
            Duration::from_secs(1),
        );

        clock.advance(Duration::from_secs(2));
        assert!(!store.remove("k"));
    }

    #[test]
    fn test_clear_drops_everything() {
        let (store, _) = store_with_clock();
        for i in 0..10 {
            store.put(
                i.to_string(),
                CacheValue::new(i),
                ExpirationMode::Absolute,
                Duration::from_secs(60),
            );
        }
        assert_eq!(store.entry_count(), 10);

        store.clear();

        assert!(store.get("3").is_none());
        assert!(store.get("7").is_none());
    }
}
