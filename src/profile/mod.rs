//! Profile lookup and resolution.

use std::time::Duration;

use tracing::warn;

use crate::config::{DEFAULT_PROFILE_NAME, DEFAULT_VALIDITY_PERIOD, Profile, Settings};

/// Read-only view over the loaded profiles.
#[derive(Debug, Clone)]
pub struct ProfileStore {
    settings: Settings,
}

impl ProfileStore {
    /// Wrap the given settings, normalizing them first.
    pub fn new(settings: Settings) -> Self {
        Self {
            settings: settings.normalized(),
        }
    }

    /// Check if a profile with this exact name is configured.
    pub fn does_profile_exist(&self, name: &str) -> bool {
        self.profile(name).is_some()
    }

    /// Look up a profile by exact name.
    ///
    /// Returns `None` for blank or unknown names.
    pub fn profile(&self, name: &str) -> Option<&Profile> {
        if name.trim().is_empty() {
            return None;
        }
        self.settings.profiles.iter().find(|profile| profile.name == name)
    }

    /// Resolve a requested profile name.
    ///
    /// Returns `name` if it is configured, otherwise the configured default,
    /// otherwise the literal `Default`. Never returns an empty name.
    pub fn profile_or_default<'a>(&'a self, name: Option<&'a str>) -> &'a str {
        match name {
            Some(name) if self.does_profile_exist(name) => name,
            _ => self.default_profile_name(),
        }
    }

    /// The configured default profile name, or the literal `Default`.
    pub fn default_profile_name(&self) -> &str {
        self.settings
            .default_profile_name
            .as_deref()
            .unwrap_or(DEFAULT_PROFILE_NAME)
    }

    /// Validity period for entries written under `name`.
    ///
    /// Falls back to one hour when the profile is not configured.
    pub fn validity_period(&self, name: &str) -> Duration {
        match self.profile(name) {
            Some(profile) => profile.validity_period,
            None => {
                warn!(
                    "Cache profile '{}' not found, using a validity period of {:?}",
                    name, DEFAULT_VALIDITY_PERIOD
                );
                DEFAULT_VALIDITY_PERIOD
            }
        }
    }

    /// All configured profiles, in configuration order.
    pub fn profiles(&self) -> &[Profile] {
        &self.settings.profiles
    }
}

impl Default for ProfileStore {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> ProfileStore {
        ProfileStore::new(Settings::new(
            "Default",
            vec![
                Profile::new("Default", Duration::from_secs(3600)),
                Profile::new("Fast", Duration::from_secs(5)),
            ],
        ))
    }

    #[test]
    fn test_does_profile_exist() {
        let store = store();

        assert!(store.does_profile_exist("Fast"));
        assert!(!store.does_profile_exist("fast"));
        assert!(!store.does_profile_exist(""));
        assert!(!store.does_profile_exist("   "));
        assert!(!store.does_profile_exist("Missing"));
    }

    #[test]
    fn test_profile_or_default_resolution() {
        let store = store();

        assert_eq!(store.profile_or_default(Some("Fast")), "Fast");
        assert_eq!(store.profile_or_default(Some("Missing")), "Default");
        assert_eq!(store.profile_or_default(Some("")), "Default");
        assert_eq!(store.profile_or_default(None), "Default");
    }

    #[test]
    fn test_profile_or_default_is_never_empty() {
        let store = ProfileStore::new(Settings {
            default_profile_name: Some(" ".into()),
            profiles: vec![Profile::new("Fast", Duration::from_secs(5))],
        });

        for name in [None, Some(""), Some(" "), Some("Fast"), Some("Nope")] {
            let resolved = store.profile_or_default(name);
            assert!(!resolved.is_empty());
            assert!(resolved == "Fast" || resolved == DEFAULT_PROFILE_NAME);
        }
    }

    #[test]
    fn test_configured_default_is_used() {
        let store = ProfileStore::new(Settings::new(
            "Slow",
            vec![Profile::new("Slow", Duration::from_secs(86400))],
        ));

        assert_eq!(store.profile_or_default(Some("Other")), "Slow");
        assert_eq!(store.default_profile_name(), "Slow");
    }

    #[test]
    fn test_validity_period_falls_back_to_one_hour() {
        let store = store();

        assert_eq!(store.validity_period("Fast"), Duration::from_secs(5));
        assert_eq!(store.validity_period("Missing"), Duration::from_secs(3600));
        assert!(store.profile("Missing").is_none());
    }
}
