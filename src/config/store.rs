//! In-memory configuration store
//!
//! Holds the base URL and credentials for the current session. Values are read
//! fresh on every request; nothing here is cached.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use tracing::{error, info, warn};
use url::Url;

use crate::http::ApiError;

/// Keys addressable through [`Configuration::get`] and [`Configuration::set`]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    BaseUrl,
    ApiKey,
    FirebaseToken,
}

impl ConfigKey {
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::BaseUrl => "baseUrl",
            ConfigKey::ApiKey => "apiKey",
            ConfigKey::FirebaseToken => "firebaseToken",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Session configuration: base URL plus credentials
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    base_url: String,
    api_key: String,
    firebase_token: String,
}

impl Configuration {
    #[cfg(test)]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    #[cfg(test)]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    #[cfg(test)]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.firebase_token = token.into();
        self
    }

    fn slot(&self, key: ConfigKey) -> &String {
        match key {
            ConfigKey::BaseUrl => &self.base_url,
            ConfigKey::ApiKey => &self.api_key,
            ConfigKey::FirebaseToken => &self.firebase_token,
        }
    }

    /// Trimmed current value, empty when unset
    pub fn get(&self, key: ConfigKey) -> String {
        self.slot(key).trim().to_string()
    }

    pub fn set(&mut self, key: ConfigKey, value: impl Into<String>) {
        let value = value.into();
        match key {
            ConfigKey::BaseUrl => self.base_url = value,
            ConfigKey::ApiKey => self.api_key = value,
            ConfigKey::FirebaseToken => self.firebase_token = value,
        }
    }

    pub fn base_url(&self) -> String {
        self.get(ConfigKey::BaseUrl)
    }

    pub fn api_key(&self) -> String {
        self.get(ConfigKey::ApiKey)
    }

    pub fn token(&self) -> String {
        self.get(ConfigKey::FirebaseToken)
    }

    /// Check the base URL, returning the reason on failure
    pub fn check(&self) -> Result<(), ApiError> {
        let base_url = self.base_url();
        if base_url.is_empty() {
            return Err(ApiError::configuration("Please enter a base URL"));
        }
        if Url::parse(&base_url).is_err() {
            return Err(ApiError::configuration("Please enter a valid URL"));
        }
        Ok(())
    }

    /// True when the base URL is present and parses as an absolute URL
    pub fn validate(&self) -> bool {
        match self.check() {
            Ok(()) => true,
            Err(e) => {
                error!("{}", e);
                false
            }
        }
    }

    /// Status of every field, written to the debug log as well
    pub fn validate_all(&self) -> Vec<FieldValidation> {
        let base_url = self.base_url();
        let base = if base_url.is_empty() {
            FieldValidation::new(ConfigKey::BaseUrl, FieldStatus::Missing, "Base URL is required")
        } else if Url::parse(&base_url).is_ok() {
            FieldValidation::new(ConfigKey::BaseUrl, FieldStatus::Valid, "Base URL is valid")
        } else {
            FieldValidation::new(
                ConfigKey::BaseUrl,
                FieldStatus::Invalid,
                "Base URL format is invalid",
            )
        };

        let api_key = if self.api_key().is_empty() {
            FieldValidation::new(ConfigKey::ApiKey, FieldStatus::Missing, "API Key not configured")
        } else {
            FieldValidation::new(
                ConfigKey::ApiKey,
                FieldStatus::Configured,
                "API Key is configured",
            )
        };

        let token = if self.token().is_empty() {
            FieldValidation::new(
                ConfigKey::FirebaseToken,
                FieldStatus::Missing,
                "Firebase Token not configured",
            )
        } else {
            FieldValidation::new(
                ConfigKey::FirebaseToken,
                FieldStatus::Configured,
                "Firebase Token is configured",
            )
        };

        let validations = vec![base, api_key, token];
        info!("Configuration Validation:");
        for v in &validations {
            match v.status {
                FieldStatus::Valid | FieldStatus::Configured => info!("  {}: {}", v.field, v.message),
                FieldStatus::Missing => warn!("  {}: {}", v.field, v.message),
                FieldStatus::Invalid => error!("  {}: {}", v.field, v.message),
            }
        }
        validations
    }

    /// Snapshot safe to print: credentials are reduced to presence flags
    pub fn export(&self) -> ConfigExport {
        ConfigExport {
            base_url: self.base_url(),
            has_api_key: !self.api_key().is_empty(),
            has_firebase_token: !self.token().is_empty(),
            exported_at: Utc::now(),
        }
    }
}

/// Check a single URL value the way the base URL is checked
pub fn validate_url(value: &str, field_name: &str) -> Result<Url, ApiError> {
    Url::parse(value.trim())
        .map_err(|_| ApiError::validation(format!("{field_name} must be a valid URL")))
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldStatus {
    Valid,
    Invalid,
    Missing,
    Configured,
}

impl FieldStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            FieldStatus::Valid | FieldStatus::Configured => "✓",
            FieldStatus::Missing => "○",
            FieldStatus::Invalid => "✗",
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct FieldValidation {
    pub field: &'static str,
    pub status: FieldStatus,
    pub message: &'static str,
}

impl FieldValidation {
    fn new(key: ConfigKey, status: FieldStatus, message: &'static str) -> Self {
        Self {
            field: key.name(),
            status,
            message,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigExport {
    pub base_url: String,
    pub has_api_key: bool,
    pub has_firebase_token: bool,
    pub exported_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_trims_and_defaults_to_empty() {
        let mut config = Configuration::default();
        assert_eq!(config.get(ConfigKey::ApiKey), "");

        config.set(ConfigKey::ApiKey, "  key-123  ");
        assert_eq!(config.get(ConfigKey::ApiKey), "key-123");
    }

    #[test]
    fn test_validate_accepts_absolute_urls() {
        for url in [
            "http://x",
            "http://localhost:8080",
            "https://api.example.com/v1/",
            "http://10.0.0.1:3000",
        ] {
            assert!(Configuration::new(url).validate(), "{url} should validate");
        }
    }

    #[test]
    fn test_validate_rejects_empty_and_schemeless() {
        assert!(!Configuration::new("").validate());
        assert!(!Configuration::new("   ").validate());
        assert!(!Configuration::new("example.com").validate());
        assert!(!Configuration::new("/api/weighing").validate());
    }

    #[test]
    fn test_check_messages() {
        assert_eq!(
            Configuration::new("").check(),
            Err(ApiError::configuration("Please enter a base URL"))
        );
        assert_eq!(
            Configuration::new("not a url").check(),
            Err(ApiError::configuration("Please enter a valid URL"))
        );
    }

    #[test]
    fn test_validate_all_statuses() {
        let config = Configuration::new("bad url").with_token("abc");
        let results = config.validate_all();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].status, FieldStatus::Invalid);
        assert_eq!(results[1].status, FieldStatus::Missing);
        assert_eq!(results[2].status, FieldStatus::Configured);
    }

    #[test]
    fn test_export_redacts_secrets() {
        let config = Configuration::new("http://x")
            .with_api_key("secret-key")
            .with_token("secret-token");
        let export = config.export();
        let json = serde_json::to_string(&export).unwrap();
        assert!(json.contains("\"hasApiKey\":true"));
        assert!(!json.contains("secret-key"));
        assert!(!json.contains("secret-token"));
    }

    #[test]
    fn test_config_key_names() {
        assert_eq!(ConfigKey::BaseUrl.to_string(), "baseUrl");
        assert_eq!(ConfigKey::FirebaseToken.name(), "firebaseToken");
    }
}
