//! Cache settings.
//!
//! Profiles are read from a JSON document, located through environment
//! variables. Settings are loaded once and never change afterwards.

mod duration;

use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

pub use duration::parse_duration;

/// Name of the profile used when nothing else resolves.
pub const DEFAULT_PROFILE_NAME: &str = "Default";

/// Validity period of the built-in default profile.
pub const DEFAULT_VALIDITY_PERIOD: Duration = Duration::from_secs(3600);

/// Section holding the cache settings inside a larger settings document.
const SETTINGS_SECTION: &str = "Cache";

const SETTINGS_PATH_VAR: &str = "CACHE_SETTINGS_PATH";
const DEFAULT_PROFILE_VAR: &str = "CACHE_DEFAULT_PROFILE";

/// Errors raised while reading a settings document.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read cache settings from {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid cache settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A named cache configuration.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Profile {
    #[serde(default, alias = "name")]
    pub name: String,

    /// How long an entry written under this profile stays valid.
    #[serde(deserialize_with = "duration::deserialize", alias = "validity_period")]
    pub validity_period: Duration,
}

impl Profile {
    pub fn new(name: impl Into<String>, validity_period: Duration) -> Self {
        Self {
            name: name.into(),
            validity_period,
        }
    }
}

/// Cache settings: the configured profiles and which one is the default.
///
/// ```json
/// {
///   "Cache": {
///     "DefaultProfileName": "Default",
///     "Profiles": [
///       { "Name": "Default", "ValidityPeriod": "01:00:00" },
///       { "Name": "Fast", "ValidityPeriod": "5s" }
///     ]
///   }
/// }
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Settings {
    #[serde(default, alias = "default_profile_name")]
    pub default_profile_name: Option<String>,

    #[serde(default, alias = "profiles")]
    pub profiles: Vec<Profile>,
}

impl Default for Settings {
    /// A single `Default` profile valid for one hour.
    fn default() -> Self {
        Self {
            default_profile_name: Some(DEFAULT_PROFILE_NAME.to_string()),
            profiles: vec![Profile::new(DEFAULT_PROFILE_NAME, DEFAULT_VALIDITY_PERIOD)],
        }
    }
}

impl Settings {
    /// Create settings from a default profile name and a list of profiles.
    pub fn new(default_profile_name: impl Into<String>, profiles: Vec<Profile>) -> Self {
        Self {
            default_profile_name: Some(default_profile_name.into()),
            profiles,
        }
    }

    /// Parse settings from JSON.
    ///
    /// Accepts either a document with a `Cache` section or the bare settings
    /// object. The result is [normalized](Self::normalized).
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let mut document: serde_json::Value = serde_json::from_str(json)?;
        let section = document
            .get_mut(SETTINGS_SECTION)
            .map(serde_json::Value::take);

        let settings: Settings = serde_json::from_value(section.unwrap_or(document))?;
        Ok(settings.normalized())
    }

    /// Read settings from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Load settings from the environment.
    ///
    /// Reads the file named by `CACHE_SETTINGS_PATH`, then applies
    /// `CACHE_DEFAULT_PROFILE` on top. A missing or unreadable file yields
    /// the built-in default profile; this never fails.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut settings = match env::var(SETTINGS_PATH_VAR) {
            Ok(path) => Self::from_file(&path).unwrap_or_else(|err| {
                warn!("{}, using the built-in default profile", err);
                Self::default()
            }),
            Err(_) => {
                info!("{} not set, using the built-in default profile", SETTINGS_PATH_VAR);
                Self::default()
            }
        };

        let default_override = env::var(DEFAULT_PROFILE_VAR)
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        if let Some(name) = default_override {
            settings.default_profile_name = Some(name);
            settings = settings.normalized();
        }

        settings
    }

    /// Drop malformed profiles and make sure at least one profile exists.
    ///
    /// Blank and duplicate names are discarded (first one wins). A default
    /// profile name that matches no profile is cleared so the literal
    /// `Default` is used instead. With no usable profile left, the built-in
    /// default settings are returned.
    pub fn normalized(self) -> Self {
        let mut seen = HashSet::new();
        let profiles: Vec<Profile> = self
            .profiles
            .into_iter()
            .filter(|profile| {
                if profile.name.trim().is_empty() {
                    warn!("Dropping cache profile with a blank name");
                    return false;
                }
                if !seen.insert(profile.name.clone()) {
                    warn!("Dropping duplicate cache profile '{}'", profile.name);
                    return false;
                }
                true
            })
            .collect();

        if profiles.is_empty() {
            warn!("No usable cache profiles configured, using the built-in default profile");
            return Self::default();
        }

        let default_profile_name = self
            .default_profile_name
            .filter(|name| !name.trim().is_empty())
            .filter(|name| {
                let known = profiles.iter().any(|profile| &profile.name == name);
                if !known {
                    warn!(
                        "Default cache profile '{}' is not configured, falling back to '{}'",
                        name, DEFAULT_PROFILE_NAME
                    );
                }
                known
            });

        Self {
            default_profile_name,
            profiles,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wrapped_section() {
        let json = r#"{
            "Logging": { "Level": "info" },
            "Cache": {
                "DefaultProfileName": "Default",
                "Profiles": [
                    { "Name": "Default", "ValidityPeriod": "01:00:00" },
                    { "Name": "Fast", "ValidityPeriod": "00:00:05" }
                ]
            }
        }"#;

        let settings = Settings::from_json_str(json).unwrap();

        assert_eq!(settings.default_profile_name.as_deref(), Some("Default"));
        assert_eq!(
            settings.profiles,
            vec![
                Profile::new("Default", Duration::from_secs(3600)),
                Profile::new("Fast", Duration::from_secs(5)),
            ]
        );
    }

    #[test]
    fn test_parse_bare_snake_case() {
        let json = r#"{
            "default_profile_name": "Slow",
            "profiles": [ { "name": "Slow", "validity_period": 86400 } ]
        }"#;

        let settings = Settings::from_json_str(json).unwrap();

        assert_eq!(settings.default_profile_name.as_deref(), Some("Slow"));
        assert_eq!(settings.profiles[0].validity_period, Duration::from_secs(86400));
    }

    #[test]
    fn test_invalid_period_is_rejected() {
        let json = r#"{ "Profiles": [ { "Name": "Bad", "ValidityPeriod": "soon" } ] }"#;

        let err = Settings::from_json_str(json).unwrap_err();
        assert!(matches!(err, SettingsError::Parse(_)));
        assert!(err.to_string().contains("soon"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = Settings::from_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, SettingsError::Io { .. }));
    }

    #[test]
    fn test_empty_profiles_synthesize_default() {
        let settings = Settings::from_json_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_normalize_drops_blank_and_duplicate_names() {
        let settings = Settings::new(
            "Fast",
            vec![
                Profile::new("Fast", Duration::from_secs(5)),
                Profile::new("  ", Duration::from_secs(10)),
                Profile::new("Fast", Duration::from_secs(99)),
            ],
        )
        .normalized();

        assert_eq!(settings.profiles, vec![Profile::new("Fast", Duration::from_secs(5))]);
    }

    #[test]
    fn test_normalize_clears_unknown_default() {
        let settings = Settings::new("Main", vec![Profile::new("Fast", Duration::from_secs(5))])
            .normalized();

        assert_eq!(settings.default_profile_name, None);
        assert_eq!(settings.profiles.len(), 1);
    }
}
