//! Cache module - per-profile cache instances backed by Moka.
//!
//! ## Architecture
//!
//! - `CacheRegistry` - one lazily built instance per profile, weakly held
//! - `CacheStore` / `StoreFactory` - the pluggable store contract
//! - `MokaStore` - default store with absolute per-entry expiration
//! - `cache_key` - deterministic composite keys
//!
//! ## Usage
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use profile_cache::{
//!     CacheRegistry, CacheValue, ExpirationMode, MokaStoreFactory, ProfileStore, RetentionPolicy,
//! };
//!
//! let registry = CacheRegistry::new(
//!     Arc::new(ProfileStore::default()),
//!     Arc::new(MokaStoreFactory::default()),
//!     RetentionPolicy::default(),
//! );
//!
//! let cache = registry.get_or_create("Default").unwrap();
//! cache.put(
//!     "answer".into(),
//!     CacheValue::new(42_i32),
//!     ExpirationMode::Absolute,
//!     Duration::from_secs(60),
//! );
//! assert_eq!(cache.get("answer").and_then(|v| v.downcast::<i32>()), Some(42));
//! ```

mod clock;
mod config;
mod error;
mod key;
mod registry;
mod store;
mod value;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{RetentionPolicy, StoreConfig};
pub use error::{CacheError, Result};
pub use key::{KEY_SEPARATOR, cache_key, cache_key_tagged};
pub use registry::CacheRegistry;
pub use store::{CacheStore, ExpirationMode, MokaStore, MokaStoreFactory, StoreFactory};
pub use value::CacheValue;
