//! Persisted configuration record
//!
//! The base URL survives between runs as a small JSON record under the user
//! data directory. Credentials are never written.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Prefix shared by every record this tool writes
pub const STORAGE_NAMESPACE: &str = "lokatani_api_tester_";

/// Key of the configuration record
pub const CONFIG_KEY: &str = "config";

/// Stored configuration record
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredConfig {
    pub base_url: String,
    pub timestamp: DateTime<Utc>,
}

impl StoredConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Namespaced key-value record store backed by JSON files
pub struct ConfigRecordStore {
    base_dir: PathBuf,
}

impl ConfigRecordStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Store under the platform data directory
    pub fn default_dir() -> Self {
        let base_dir = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lokatani-tester");
        Self::new(base_dir)
    }

    /// Path of the record stored under `key`
    fn record_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{STORAGE_NAMESPACE}{key}.json"))
    }

    pub fn config_path(&self) -> PathBuf {
        self.record_path(CONFIG_KEY)
    }

    /// Overwrite the configuration record
    pub fn save(&self, record: &StoredConfig) -> Result<PathBuf> {
        fs::create_dir_all(&self.base_dir).with_context(|| {
            format!("Failed to create directory: {}", self.base_dir.display())
        })?;

        let path = self.config_path();
        let file = File::create(&path).context("Failed to create config record")?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, record).context("Failed to write config record")?;

        debug!("Saved config record to {}", path.display());
        Ok(path)
    }

    /// Load the configuration record; a missing file is not an error
    pub fn load(&self) -> Result<Option<StoredConfig>> {
        let path = self.config_path();
        if !path.exists() {
            return Ok(None);
        }

        let file = File::open(&path).context("Failed to open config record")?;
        let reader = BufReader::new(file);
        let record: StoredConfig =
            serde_json::from_reader(reader).context("Failed to parse config record")?;

        debug!("Loaded config record from {}", path.display());
        Ok(Some(record))
    }

    /// Load, treating any failure as an absent record
    pub fn load_or_warn(&self) -> Option<StoredConfig> {
        match self.load() {
            Ok(record) => record,
            Err(e) => {
                warn!("Failed to load saved configuration: {:#}", e);
                None
            }
        }
    }

    /// Save the base URL, logging instead of failing
    pub fn save_base_url(&self, base_url: &str) -> bool {
        match self.save(&StoredConfig::new(base_url.trim())) {
            Ok(path) => {
                info!("Configuration saved to {}", path.display());
                true
            }
            Err(e) => {
                warn!("Failed to save configuration: {:#}", e);
                false
            }
        }
    }

    /// Delete the record; returns whether one existed
    pub fn clear(&self) -> Result<bool> {
        let path = self.config_path();
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)
            .with_context(|| format!("Failed to remove {}", path.display()))?;
        info!("Cleared saved configuration");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_record_path_is_namespaced() {
        let store = ConfigRecordStore::new("/tmp/x");
        assert_eq!(
            store.config_path(),
            PathBuf::from("/tmp/x/lokatani_api_tester_config.json")
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let store = ConfigRecordStore::new(dir.path().join("nested"));

        assert_eq!(store.load().unwrap(), None);
        assert!(store.save_base_url("  https://api.lokatani.test  "));

        let record = store.load().unwrap().unwrap();
        assert_eq!(record.base_url, "https://api.lokatani.test");

        // Overwritten on every edit
        store.save(&StoredConfig::new("http://localhost:3000")).unwrap();
        assert_eq!(store.load().unwrap().unwrap().base_url, "http://localhost:3000");
    }

    #[test]
    fn test_record_json_shape() {
        let dir = tempdir().unwrap();
        let store = ConfigRecordStore::new(dir.path());
        let path = store.save(&StoredConfig::new("http://x")).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(raw["baseUrl"], "http://x");
        assert!(raw["timestamp"].is_string());
        assert!(raw.get("apiKey").is_none());
    }

    #[test]
    fn test_corrupt_record_is_absent() {
        let dir = tempdir().unwrap();
        let store = ConfigRecordStore::new(dir.path());
        fs::write(store.config_path(), "{not json").unwrap();

        assert!(store.load().is_err());
        assert_eq!(store.load_or_warn(), None);
    }

    #[test]
    fn test_clear() {
        let dir = tempdir().unwrap();
        let store = ConfigRecordStore::new(dir.path());
        assert!(!store.clear().unwrap());

        store.save_base_url("http://x");
        assert!(store.clear().unwrap());
        assert_eq!(store.load().unwrap(), None);
    }
}
