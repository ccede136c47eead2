//! Profile Cache - named cache profiles over lazily built cache instances.
//!
//! ## Architecture
//!
//! - `config` - Settings: profiles and their validity periods
//! - `profile` - Profile lookup and default resolution
//! - `cache` - Instance registry, store contract, Moka store, key generation
//! - `manager` - The `CacheManager` facade

pub mod cache;
pub mod config;
pub mod manager;
pub mod profile;

pub use cache::{
    CacheError, CacheRegistry, CacheStore, CacheValue, Clock, ExpirationMode, ManualClock,
    MokaStore, MokaStoreFactory, Result, RetentionPolicy, StoreConfig, StoreFactory, SystemClock,
    cache_key, cache_key_tagged,
};
pub use config::{Profile, Settings, SettingsError};
pub use manager::{CacheManager, CacheManagerBuilder};
pub use profile::ProfileStore;
