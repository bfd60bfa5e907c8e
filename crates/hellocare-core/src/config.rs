//! Application configuration management.
//!
//! Configuration is read from `~/.config/hellocare-admin/config.json` and
//! then overridden by environment variables:
//!
//! - `HELLOCARE_API_URL`: backend base URL
//! - `HELLOCARE_IDENTITY_URL`: identity provider base URL
//! - `HELLOCARE_FIREBASE_API_KEY`: enables the Firebase credential exchange
//! - `HELLOCARE_STORAGE`: `file`, `keyring` or `memory`
//! - `HELLOCARE_DATA_DIR`: directory for the file storage backend

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "hellocare-admin";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_API_URL: &str = "https://hellocare.p1ng.me/v1";

pub const DEFAULT_IDENTITY_URL: &str = "https://identitytoolkit.googleapis.com";

/// HTTP request timeout in seconds.
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

pub const ENV_API_URL: &str = "HELLOCARE_API_URL";
pub const ENV_IDENTITY_URL: &str = "HELLOCARE_IDENTITY_URL";
pub const ENV_FIREBASE_API_KEY: &str = "HELLOCARE_FIREBASE_API_KEY";
pub const ENV_STORAGE: &str = "HELLOCARE_STORAGE";
pub const ENV_DATA_DIR: &str = "HELLOCARE_DATA_DIR";

/// Where the session's token and identity are persisted
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    File,
    Keyring,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(StorageBackend::File),
            "keyring" => Ok(StorageBackend::Keyring),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(anyhow::anyhow!(
                "Unknown storage backend '{}' (expected file, keyring or memory)",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    pub identity_url: String,
    pub firebase_api_key: Option<String>,
    pub storage: StorageBackend,
    pub data_dir: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            identity_url: DEFAULT_IDENTITY_URL.to_string(),
            firebase_api_key: None,
            storage: StorageBackend::default(),
            data_dir: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            last_email: None,
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?, |key| std::env::var(key).ok())
    }

    pub fn load_from<F>(path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::read_file(path)?;
        config.apply_overrides(lookup)?;
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&contents).context("Failed to parse config file")
    }

    /// Apply overrides from a variable lookup. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = get(ENV_API_URL) {
            self.api_url = url;
        }
        if let Some(url) = get(ENV_IDENTITY_URL) {
            self.identity_url = url;
        }
        if let Some(key) = get(ENV_FIREBASE_API_KEY) {
            self.firebase_api_key = Some(key);
        }
        if let Some(storage) = get(ENV_STORAGE) {
            self.storage = storage
                .parse()
                .with_context(|| format!("Invalid {}", ENV_STORAGE))?;
        }
        if let Some(dir) = get(ENV_DATA_DIR) {
            self.data_dir = Some(PathBuf::from(dir));
        }
        Ok(())
    }

    /// Record the last email used to sign in. Only that field changes on
    /// disk; environment and command-line overrides are never written.
    pub fn remember_email(email: &str) -> Result<()> {
        Self::remember_email_at(&Self::config_path()?, email)
    }

    pub fn remember_email_at(path: &Path, email: &str) -> Result<()> {
        let mut on_disk = Self::read_file(path)?;
        on_disk.last_email = Some(email.to_string());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(&on_disk)?;
        std::fs::write(path, contents)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory used by the file storage backend
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Ok(dir.clone());
        }
        let data_dir = dirs::data_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME))
    }
}
