//! Cache registry - one lazily built cache instance per profile.

use std::fmt;
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use parking_lot::Mutex;
use tracing::{debug, info};

use super::{CacheError, CacheStore, Result, RetentionPolicy, StoreFactory};
use crate::config::DEFAULT_PROFILE_NAME;
use crate::profile::ProfileStore;

/// How many times a lookup may find its instance reclaimed before giving up.
const MAX_RECLAIM_RETRIES: usize = 3;

/// The registry's record of the instance currently backing a profile.
struct CacheInstanceHandle {
    profile_name: String,
    reference: Weak<dyn CacheStore>,
}

impl CacheInstanceHandle {
    fn new(profile_name: &str, store: &Arc<dyn CacheStore>) -> Self {
        Self {
            profile_name: profile_name.to_string(),
            reference: Arc::downgrade(store),
        }
    }

    fn upgrade(&self) -> Option<Arc<dyn CacheStore>> {
        self.reference.upgrade()
    }

    fn is_live(&self) -> bool {
        self.reference.strong_count() > 0
    }
}

/// Registry handing out one cache instance per profile name.
///
/// Instances are built on first access and referenced weakly. The
/// retention pool keeps them alive until they go idle or the pool overflows;
/// after that an instance lives only as long as some caller holds it. A
/// reclaimed instance is detected on the next lookup and rebuilt empty.
///
/// ## Example
///
/// ```rust
/// use std::sync::Arc;
///
/// use profile_cache::{CacheRegistry, MokaStoreFactory, ProfileStore, RetentionPolicy};
///
/// let registry = CacheRegistry::new(
///     Arc::new(ProfileStore::default()),
///     Arc::new(MokaStoreFactory::default()),
///     RetentionPolicy::default(),
/// );
///
/// let a = registry.get_or_create("Default").unwrap();
/// let b = registry.get_or_create("Default").unwrap();
/// assert_eq!(a.name(), b.name());
/// assert!(registry.get_or_create("Unknown").is_err());
/// ```
pub struct CacheRegistry {
    profiles: Arc<ProfileStore>,
    factory: Arc<dyn StoreFactory>,
    handles: DashMap<String, Arc<CacheInstanceHandle>>,
    retained: Cache<String, Arc<dyn CacheStore>>,
    sync_lock: Mutex<()>,
}

impl CacheRegistry {
    /// Create a new empty cache registry.
    pub fn new(
        profiles: Arc<ProfileStore>,
        factory: Arc<dyn StoreFactory>,
        retention: RetentionPolicy,
    ) -> Self {
        // A full pool evicts its least recently used instance, never the newcomer.
        let mut builder = Cache::builder()
            .max_capacity(retention.max_instances)
            .eviction_policy(EvictionPolicy::lru());
        if let Some(idle) = retention.idle {
            builder = builder.time_to_idle(idle);
        }

        info!("Cache registry initialized");
        Self {
            profiles,
            factory,
            handles: DashMap::new(),
            retained: builder.build(),
            sync_lock: Mutex::new(()),
        }
    }

    /// Get the instance backing `profile_name`, building it if needed.
    ///
    /// Fails with [`CacheError::UnknownProfile`] if the name is neither the
    /// default nor configured. A reclaimed instance is replaced
    /// transparently; its entries are lost.
    pub fn get_or_create(&self, profile_name: &str) -> Result<Arc<dyn CacheStore>> {
        if profile_name != DEFAULT_PROFILE_NAME && !self.profiles.does_profile_exist(profile_name) {
            return Err(CacheError::UnknownProfile {
                name: profile_name.to_string(),
            });
        }

        for _ in 0..MAX_RECLAIM_RETRIES {
            let existing = self
                .handles
                .get(profile_name)
                .map(|entry| Arc::clone(entry.value()));

            let Some(handle) = existing else {
                return Ok(self.create(profile_name));
            };

            if let Some(store) = handle.upgrade() {
                self.retain(profile_name, &store);
                return Ok(store);
            }

            self.evict_stale(profile_name, &handle);
        }

        Err(CacheError::ReclaimRetriesExhausted {
            name: profile_name.to_string(),
            attempts: MAX_RECLAIM_RETRIES,
        })
    }

    /// Build and publish an instance unless another thread got there first.
    fn create(&self, profile_name: &str) -> Arc<dyn CacheStore> {
        let _guard = self.sync_lock.lock();

        let current = self
            .handles
            .get(profile_name)
            .and_then(|entry| entry.upgrade());
        if let Some(store) = current {
            return store;
        }

        let store = self.factory.build(profile_name);
        let handle = Arc::new(CacheInstanceHandle::new(profile_name, &store));

        self.retained
            .insert(profile_name.to_string(), Arc::clone(&store));
        self.handles.insert(profile_name.to_string(), handle);

        info!("Created cache instance for profile '{}'", profile_name);
        store
    }

    /// Remove `stale` if it is still the registered handle for the profile.
    fn evict_stale(&self, profile_name: &str, stale: &Arc<CacheInstanceHandle>) {
        let _guard = self.sync_lock.lock();

        let removed = self
            .handles
            .remove_if(profile_name, |_, current| Arc::ptr_eq(current, stale))
            .is_some();

        if removed {
            debug!(
                "Evicted reclaimed cache instance for profile '{}'",
                stale.profile_name
            );
        }
    }

    /// Keep a live instance in the retention pool, refreshing its idle time.
    ///
    /// Re-admission happens under the registry lock so it is ordered against
    /// `reclaim`.
    fn retain(&self, profile_name: &str, store: &Arc<dyn CacheStore>) {
        if self.retained.get(profile_name).is_some() {
            return;
        }

        let _guard = self.sync_lock.lock();
        self.retained
            .entry_by_ref(profile_name)
            .or_insert_with(|| Arc::clone(store));
    }

    /// Release the registry's own hold on a profile's instance.
    ///
    /// Once no caller holds the instance either, it is gone and the next
    /// lookup builds a fresh one. Returns `true` if the instance was retained.
    pub fn reclaim(&self, profile_name: &str) -> bool {
        let _guard = self.sync_lock.lock();
        let released = self.retained.remove(profile_name).is_some();
        self.retained.run_pending_tasks();
        if released {
            debug!("Released cache instance for profile '{}'", profile_name);
        }
        released
    }

    /// Apply pending idle and capacity evictions in the retention pool.
    pub fn run_pending_tasks(&self) {
        self.retained.run_pending_tasks();
    }

    /// Drop every handle and retained instance.
    pub fn reset(&self) {
        let _guard = self.sync_lock.lock();
        self.handles.clear();
        self.retained.invalidate_all();
        self.retained.run_pending_tasks();
        info!("Cache registry reset");
    }

    /// Check if the profile currently has a live instance.
    pub fn contains(&self, profile_name: &str) -> bool {
        self.handles
            .get(profile_name)
            .is_some_and(|entry| entry.is_live())
    }

    /// Get the number of registered handles, live or not.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Get the profile names that currently have a handle.
    pub fn profile_names(&self) -> Vec<String> {
        self.handles.iter().map(|entry| entry.key().clone()).collect()
    }
}

impl fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheRegistry")
            .field("instance_count", &self.handles.len())
            .field("profile_names", &self.profile_names())
            .finish()
    }
}
