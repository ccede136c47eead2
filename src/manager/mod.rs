//! Cache manager - the public facade over profiles and cache instances.

use std::any::{Any, type_name};
use std::fmt::{self, Display};
use std::sync::Arc;

use tracing::debug;

use crate::cache::{
    CacheError, CacheRegistry, CacheStore, CacheValue, Clock, ExpirationMode, MokaStoreFactory,
    Result, RetentionPolicy, StoreConfig, StoreFactory, SystemClock, cache_key,
};
use crate::config::Settings;
use crate::profile::ProfileStore;

/// Facade exposing named cache profiles.
///
/// Every operation takes an optional profile name. Blank, missing or unknown
/// names resolve to the default profile, so callers never need to check
/// first. Entries expire a fixed validity period after being written, as
/// configured per profile.
///
/// ## Example
///
/// ```rust
/// use std::time::Duration;
///
/// use profile_cache::{CacheManager, Profile, Settings};
///
/// let manager = CacheManager::new(Settings::new(
///     "Default",
///     vec![
///         Profile::new("Default", Duration::from_secs(3600)),
///         Profile::new("Fast", Duration::from_secs(5)),
///     ],
/// ));
///
/// let profile = manager.add_to_cache(1, 42_i32, Some("Fast")).unwrap();
/// assert_eq!(profile, "Fast");
/// assert_eq!(manager.get_from_cache::<i32>(1, Some("Fast")).unwrap(), Some(42));
/// ```
pub struct CacheManager {
    profiles: Arc<ProfileStore>,
    registry: CacheRegistry,
}

impl CacheManager {
    /// Create a manager with the default Moka store and the wall clock.
    pub fn new(settings: Settings) -> Self {
        Self::builder(settings).build()
    }

    /// Create a manager from settings found in the environment.
    pub fn from_env() -> Self {
        Self::new(Settings::from_env())
    }

    pub fn builder(settings: Settings) -> CacheManagerBuilder {
        CacheManagerBuilder::new(settings)
    }

    /// Check if a profile with this exact name is configured.
    pub fn does_profile_exist(&self, profile_name: &str) -> bool {
        self.profiles.does_profile_exist(profile_name)
    }

    /// Resolve a requested profile name, falling back to the default.
    pub fn profile_or_default<'a>(&'a self, profile_name: Option<&'a str>) -> &'a str {
        self.profiles.profile_or_default(profile_name)
    }

    /// Get the cache instance for an explicit profile name.
    ///
    /// Unlike the other operations the name is not resolved first: anything
    /// other than the default or a configured profile is an error.
    pub fn get_cache(&self, profile_name: &str) -> Result<Arc<dyn CacheStore>> {
        self.registry.get_or_create(profile_name)
    }

    /// Add a value to the cache.
    ///
    /// Returns the name of the profile the value was stored under.
    pub fn add_to_cache<T>(
        &self,
        key: impl Display,
        value: T,
        profile_name: Option<&str>,
    ) -> Result<String>
    where
        T: Any + Send + Sync,
    {
        let resolved = self.profile_or_default(profile_name);
        let cache = self.get_cache(resolved)?;
        let ttl = self.profiles.validity_period(cache.name());

        cache.put(
            key.to_string(),
            CacheValue::new(value),
            ExpirationMode::Absolute,
            ttl,
        );
        Ok(resolved.to_string())
    }

    /// Get a value from the cache.
    ///
    /// Returns `Ok(None)` on a miss or after the entry expired, and
    /// [`CacheError::TypeMismatch`] if the stored value is not a `T`.
    pub fn get_from_cache<T>(
        &self,
        key: impl Display,
        profile_name: Option<&str>,
    ) -> Result<Option<T>>
    where
        T: Any + Clone,
    {
        let key = key.to_string();
        let cache = self.get_cache(self.profile_or_default(profile_name))?;

        let Some(value) = cache.get(&key) else {
            return Ok(None);
        };

        if !value.is::<T>() {
            return Err(CacheError::TypeMismatch {
                key,
                expected: type_name::<T>(),
                found: value.type_name(),
            });
        }
        Ok(value.downcast::<T>())
    }

    /// Remove an entry.
    ///
    /// Returns `true` if the key was found and removed.
    pub fn remove_from_cache(&self, cache_key: &str, profile_name: Option<&str>) -> Result<bool> {
        let cache = self.get_cache(self.profile_or_default(profile_name))?;
        Ok(cache.remove(cache_key))
    }

    /// Remove every entry of one profile. Other profiles are untouched.
    pub fn clear_cache(&self, profile_name: Option<&str>) -> Result<()> {
        let resolved = self.profile_or_default(profile_name);
        self.get_cache(resolved)?.clear();
        debug!("Cleared cache profile '{}'", resolved);
        Ok(())
    }

    /// Build a cache key namespaced by `T`. See [`cache_key`].
    pub fn cache_key<T: ?Sized>(&self, key: impl Display, args: &[&dyn Display]) -> String {
        cache_key::<T>(key, args)
    }

    /// The underlying instance registry.
    pub fn registry(&self) -> &CacheRegistry {
        &self.registry
    }

    /// The loaded profiles.
    pub fn profiles(&self) -> &ProfileStore {
        &self.profiles
    }
}

impl fmt::Debug for CacheManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheManager")
            .field("profiles", &self.profiles.profiles())
            .field("registry", &self.registry)
            .finish()
    }
}

/// Builder for [`CacheManager`].
pub struct CacheManagerBuilder {
    settings: Settings,
    store_config: StoreConfig,
    retention: RetentionPolicy,
    clock: Arc<dyn Clock>,
    factory: Option<Arc<dyn StoreFactory>>,
}

impl CacheManagerBuilder {
    fn new(settings: Settings) -> Self {
        Self {
            settings,
            store_config: StoreConfig::default(),
            retention: RetentionPolicy::default(),
            clock: Arc::new(SystemClock),
            factory: None,
        }
    }

    /// Config for the default Moka stores.
    #[must_use]
    pub fn store_config(mut self, store_config: StoreConfig) -> Self {
        self.store_config = store_config;
        self
    }

    #[must_use]
    pub fn retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    /// Clock used by the default Moka stores to expire entries.
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Use a custom store instead of Moka. Overrides `store_config` and `clock`.
    #[must_use]
    pub fn factory(mut self, factory: Arc<dyn StoreFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub fn build(self) -> CacheManager {
        let profiles = Arc::new(ProfileStore::new(self.settings));
        let factory: Arc<dyn StoreFactory> = match self.factory {
            Some(factory) => factory,
            None => Arc::new(MokaStoreFactory::new(self.store_config, self.clock)),
        };

        CacheManager {
            registry: CacheRegistry::new(Arc::clone(&profiles), factory, self.retention),
            profiles,
        }
    }
}
