//! Profile Cache - demo runner.
//!
//! Loads cache settings from the environment, then writes and reads one
//! entry per configured profile so the resolution and expiration policy can
//! be inspected in the logs.
//!
//! ## Environment
//!
//! - `CACHE_SETTINGS_PATH` - JSON settings file (optional)
//! - `CACHE_DEFAULT_PROFILE` - overrides the default profile name (optional)
//! - `RUST_LOG` - log filter, defaults to `profile_cache=info`

use tracing::info;
use tracing_subscriber::EnvFilter;

use profile_cache::{CacheManager, Settings};

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("profile_cache=info"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting profile cache...");

    let settings = Settings::from_env();
    info!("Loaded {} cache profile(s)", settings.profiles.len());

    let manager = CacheManager::new(settings);
    info!(
        "Default profile: {}",
        manager.profiles().default_profile_name()
    );

    for profile in manager.profiles().profiles() {
        let key = manager.cache_key::<String>("demo", &[&profile.name]);
        let stored_in = manager.add_to_cache(
            &key,
            format!("hello from {}", profile.name),
            Some(&profile.name),
        )?;
        let value = manager.get_from_cache::<String>(&key, Some(&stored_in))?;

        info!(
            "Profile '{}' (valid for {:?}): {} => {:?}",
            stored_in, profile.validity_period, key, value
        );
    }

    let fallback = manager.profile_or_default(Some("does-not-exist"));
    info!("Unknown profile names resolve to '{}'", fallback);

    info!("Registry state: {:?}", manager.registry());

    Ok(())
}
