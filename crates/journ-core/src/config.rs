//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the server base URL, where the session is persisted, how the gateway
//! reacts to expired credentials, and the last email used to log in.
//!
//! Configuration is stored at `~/.config/journ/config.json`.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::api::{GatewayOptions, UnauthorizedPolicy, DEFAULT_TIMEOUT_SECS};
use crate::auth::{FileStorage, KeyringStorage, MemoryStorage, SessionStorage};

/// Application name used for config/data directory paths
const APP_NAME: &str = "journ";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_BASE_URL: &str = "http://192.168.100.101:5000/";

/// Environment variable overriding `base_url`
pub const BASE_URL_ENV: &str = "JOURN_BASE_URL";

/// Environment variable overriding `last_email`
pub const EMAIL_ENV: &str = "JOURN_EMAIL";

/// Where the session is persisted between runs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// JSON file in the data directory
    #[default]
    File,
    /// OS keychain
    Keyring,
    /// Not persisted
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub storage: StorageBackend,
    pub unauthorized_policy: UnauthorizedPolicy,
    pub reject_stale_responses: bool,
    pub request_timeout_secs: u64,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            storage: StorageBackend::default(),
            unauthorized_policy: UnauthorizedPolicy::default(),
            reject_stale_responses: true,
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            last_email: None,
        }
    }
}

impl Config {
    /// Load from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_overrides(
            std::env::var(BASE_URL_ENV).ok(),
            std::env::var(EMAIL_ENV).ok(),
        );
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Record the email of the last successful login. Only that field is
    /// written back, so overrides applied at startup stay out of the file.
    pub fn remember_email(&mut self, email: &str) -> Result<()> {
        self.last_email = Some(email.to_string());
        let path = Self::config_path()?;
        let mut on_disk = Self::load_from(&path)?;
        on_disk.last_email = self.last_email.clone();
        on_disk.save_to(&path)
    }

    /// Empty values are ignored so a blank line in `.env` does not wipe the setting
    pub fn apply_overrides(&mut self, base_url: Option<String>, email: Option<String>) {
        if let Some(url) = base_url.filter(|u| !u.trim().is_empty()) {
            self.base_url = url;
        }
        if let Some(email) = email.filter(|e| !e.trim().is_empty()) {
            self.last_email = Some(email);
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the session file and logs
    pub fn data_dir(&self) -> Result<PathBuf> {
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }

    pub fn gateway_options(&self) -> GatewayOptions {
        GatewayOptions {
            timeout: Duration::from_secs(self.request_timeout_secs),
            unauthorized_policy: self.unauthorized_policy,
            reject_stale: self.reject_stale_responses,
            ..GatewayOptions::new(self.base_url.clone())
        }
    }

    /// Build the session storage backend this config selects
    pub fn open_storage(&self, data_dir: &Path) -> Arc<dyn SessionStorage> {
        match self.storage {
            StorageBackend::File => Arc::new(FileStorage::new(data_dir)),
            StorageBackend::Keyring => Arc::new(KeyringStorage::new()),
            StorageBackend::Memory => Arc::new(MemoryStorage::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.storage, StorageBackend::File);
        assert_eq!(config.unauthorized_policy, UnauthorizedPolicy::RedirectOnly);
        assert!(config.reject_stale_responses);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"base_url": "http://localhost:5000", "unauthorized_policy": "clear_session", "storage": "memory"}"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.base_url, "http://localhost:5000");
        assert_eq!(config.unauthorized_policy, UnauthorizedPolicy::ClearSession);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            last_email: Some("a@b.co".into()),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.last_email.as_deref(), Some("a@b.co"));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        config.apply_overrides(Some("  ".into()), None);
        assert_eq!(config.base_url, DEFAULT_BASE_URL);

        config.apply_overrides(Some("http://10.0.0.2:5000/".into()), Some("me@x.io".into()));
        assert_eq!(config.base_url, "http://10.0.0.2:5000/");
        assert_eq!(config.last_email.as_deref(), Some("me@x.io"));
    }

    #[test]
    fn test_gateway_options() {
        let config = Config {
            request_timeout_secs: 5,
            unauthorized_policy: UnauthorizedPolicy::ClearSession,
            reject_stale_responses: false,
            ..Config::default()
        };
        let options = config.gateway_options();
        assert_eq!(options.base_url, DEFAULT_BASE_URL);
        assert_eq!(options.timeout, Duration::from_secs(5));
        assert_eq!(options.unauthorized_policy, UnauthorizedPolicy::ClearSession);
        assert!(!options.reject_stale);
    }
}
