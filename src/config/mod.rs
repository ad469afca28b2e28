//! Configuration module
//!
//! Handles loading, layering and persisting configuration.

mod env;
mod file;
mod persist;
mod store;

pub use env::{print_env_help, EnvConfig};
pub use file::find_settings_file;
use file::is_yaml_file;
pub use persist::{ConfigRecordStore, StoredConfig};
pub use store::{validate_url, Configuration, FieldStatus};
use store::ConfigKey;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::auth::AuthMode;
use crate::executor::DEFAULT_DELAY_MS;
use crate::http::ApiError;

/// Device id used by sample payloads when none is given
pub const DEFAULT_DEVICE_ID: &str = "scale_001";

/// Settings file contents
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Backend base URL, e.g. `https://api.example.com`
    pub base_url: Option<String>,

    /// HTTP timeout in seconds
    pub timeout_secs: u64,

    /// Pause between suite steps
    pub suite_delay_ms: u64,

    /// Credential used by the weight and active-session endpoints
    pub telemetry_auth: AuthMode,

    /// Device id for generated sample payloads
    pub device_id: String,

    /// Identity provider settings for `login`
    pub identity: IdentitySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_secs: 30,
            suite_delay_ms: DEFAULT_DELAY_MS,
            telemetry_auth: AuthMode::None,
            device_id: DEFAULT_DEVICE_ID.to_string(),
            identity: IdentitySettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;

        let settings: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML settings: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON settings: {}", path.display()))?
        };

        Ok(settings)
    }

    /// Load from `path` when given, otherwise from the first standard location
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => match find_settings_file() {
                Some(found) => {
                    tracing::debug!("Using settings file {}", found.display());
                    Self::load(found)
                }
                None => Ok(Self::default()),
            },
        }
    }

    /// Save settings to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize settings")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize settings")?
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
            }
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings file: {}", path.display()))?;
        Ok(())
    }
}

/// Identity provider settings
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentitySettings {
    /// Web API key appended to the default sign-in endpoint
    pub api_key: Option<String>,

    /// Full sign-in endpoint, replaces the default one
    pub endpoint: Option<String>,
}

/// Values given on the command line
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub token: Option<String>,
    pub telemetry_auth: Option<AuthMode>,
    pub timeout_secs: Option<u64>,
}

/// Effective configuration after layering every source
#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub configuration: Configuration,
    pub telemetry_auth: AuthMode,
    pub timeout_secs: u64,
    pub suite_delay_ms: u64,
    pub device_id: String,
    pub identity: IdentitySettings,
}

/// Layer sources, lowest precedence first:
/// settings file < stored record < environment < command line
pub fn resolve(
    settings: &Settings,
    stored: Option<&StoredConfig>,
    env: &EnvConfig,
    flags: &Overrides,
) -> Result<ResolvedConfig, ApiError> {
    let env_telemetry = match env.telemetry_auth.as_deref() {
        Some(raw) => Some(AuthMode::from_str(raw).ok_or_else(|| {
            ApiError::configuration(format!("Unknown telemetry auth mode: {raw}"))
        })?),
        None => None,
    };

    // Credentials never come from files
    let layers = [
        (
            ConfigKey::BaseUrl,
            [
                settings.base_url.as_deref(),
                stored.map(|s| s.base_url.as_str()),
                env.base_url.as_deref(),
                flags.base_url.as_deref(),
            ],
        ),
        (
            ConfigKey::ApiKey,
            [None, None, env.api_key.as_deref(), flags.api_key.as_deref()],
        ),
        (
            ConfigKey::FirebaseToken,
            [None, None, env.token.as_deref(), flags.token.as_deref()],
        ),
    ];
    let mut configuration = Configuration::default();
    for (key, values) in layers {
        for value in values.into_iter().flatten() {
            configuration.set(key, value);
        }
    }

    let mut identity = settings.identity.clone();
    if env.identity_api_key.is_some() {
        identity.api_key = env.identity_api_key.clone();
    }

    Ok(ResolvedConfig {
        configuration,
        telemetry_auth: flags
            .telemetry_auth
            .or(env_telemetry)
            .unwrap_or(settings.telemetry_auth),
        timeout_secs: flags
            .timeout_secs
            .or(env.timeout)
            .unwrap_or(settings.timeout_secs),
        suite_delay_ms: settings.suite_delay_ms,
        device_id: settings.device_id.clone(),
        identity,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.timeout_secs, 30);
        assert_eq!(settings.suite_delay_ms, 1000);
        assert_eq!(settings.telemetry_auth, AuthMode::None);
        assert!(settings.base_url.is_none());
    }

    #[test]
    fn test_yaml_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("lokatani-tester.yaml");

        let settings = Settings {
            base_url: Some("https://api.lokatani.test".to_string()),
            telemetry_auth: AuthMode::BearerToken,
            ..Default::default()
        };
        settings.save(&path).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded.base_url.as_deref(), Some("https://api.lokatani.test"));
        assert_eq!(loaded.telemetry_auth, AuthMode::BearerToken);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"telemetry_auth": "api-key"}"#).unwrap();

        let loaded = Settings::load(&path).unwrap();
        assert_eq!(loaded.telemetry_auth, AuthMode::ApiKey);
        assert_eq!(loaded.timeout_secs, 30);
        assert_eq!(loaded.device_id, DEFAULT_DEVICE_ID);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.yaml");
        std::fs::write(&path, "timeout_secs: [not, a, number]").unwrap();
        assert!(Settings::load(&path).is_err());
    }

    #[test]
    fn test_resolve_precedence() {
        let settings = Settings {
            base_url: Some("http://from-file".to_string()),
            timeout_secs: 10,
            ..Default::default()
        };
        let stored = StoredConfig {
            base_url: "http://from-record".to_string(),
            timestamp: Utc::now(),
        };
        let env = EnvConfig {
            base_url: Some("http://from-env".to_string()),
            token: Some("env-token".to_string()),
            timeout: Some(20),
            ..Default::default()
        };
        let flags = Overrides {
            token: Some("flag-token".to_string()),
            ..Default::default()
        };

        let resolved = resolve(&settings, Some(&stored), &env, &flags).unwrap();
        assert_eq!(resolved.configuration.base_url(), "http://from-env");
        assert_eq!(resolved.configuration.token(), "flag-token");
        assert_eq!(resolved.timeout_secs, 20);

        let resolved = resolve(&settings, Some(&stored), &EnvConfig::default(), &flags).unwrap();
        assert_eq!(resolved.configuration.base_url(), "http://from-record");
        assert_eq!(resolved.timeout_secs, 10);

        let resolved = resolve(&settings, None, &EnvConfig::default(), &Overrides::default()).unwrap();
        assert_eq!(resolved.configuration.base_url(), "http://from-file");
        assert_eq!(resolved.configuration.token(), "");
    }

    #[test]
    fn test_resolve_telemetry_auth() {
        let settings = Settings::default();
        let env = EnvConfig {
            telemetry_auth: Some("bearer".to_string()),
            ..Default::default()
        };
        let resolved = resolve(&settings, None, &env, &Overrides::default()).unwrap();
        assert_eq!(resolved.telemetry_auth, AuthMode::BearerToken);

        let flags = Overrides {
            telemetry_auth: Some(AuthMode::None),
            ..Default::default()
        };
        let resolved = resolve(&settings, None, &env, &flags).unwrap();
        assert_eq!(resolved.telemetry_auth, AuthMode::None);

        let env = EnvConfig {
            telemetry_auth: Some("kerberos".to_string()),
            ..Default::default()
        };
        assert!(resolve(&settings, None, &env, &Overrides::default()).is_err());
    }
}
