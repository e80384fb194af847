//! Configuration management
//!
//! Stored as TOML under `~/.config/insights-console/config.toml`.
//! URL priority: CLI argument > INSIGHTS_URL environment variable > config.toml

use super::Result;
use crate::core::query::PageSize;
use crate::error::{ConfigError, StorageError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "insights-console";
const CONFIG_FILE: &str = "config.toml";

pub const URL_ENV: &str = "INSIGHTS_URL";

fn default_debounce_ms() -> u64 {
    300
}

fn default_top_workflows_limit() -> u32 {
    10
}

/// Application configuration
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Config {
    /// Insights server URL
    pub url: Option<String>,
    /// Quiet period for free-text filters, in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Initial page size of the accounts explorer
    #[serde(default)]
    pub page_size: PageSize,
    #[serde(default = "default_top_workflows_limit")]
    pub top_workflows_limit: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: None,
            debounce_ms: default_debounce_ms(),
            page_size: PageSize::DEFAULT,
            top_workflows_limit: default_top_workflows_limit(),
        }
    }
}

impl Config {
    /// Load configuration from file, or defaults when it does not exist
    pub fn load(path: Option<PathBuf>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&config_path).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        toml::from_str(&content).map_err(|e| StorageError::ConfigParseError {
            message: format!("Failed to parse config file: {}", e),
        })
    }

    /// Save configuration to file
    pub fn save(&self, path: Option<PathBuf>) -> Result<()> {
        let config_path = match path {
            Some(p) => p,
            None => Self::config_file_path()?,
        };

        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|source| StorageError::FileIo {
                path: parent.to_string_lossy().to_string(),
                source,
            })?;
        }

        let toml_content = toml::to_string(self).map_err(|e| StorageError::ConfigParseError {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(&config_path, toml_content).map_err(|source| StorageError::FileIo {
            path: config_path.to_string_lossy().to_string(),
            source,
        })?;

        Ok(())
    }

    pub fn config_file_path() -> Result<PathBuf> {
        let home_dir = dirs::home_dir().ok_or(StorageError::ConfigDirNotFound)?;
        Ok(Self::file_in(&home_dir.join(".config").join(APP_DIR)))
    }

    /// Config file inside an explicit directory (`--config-dir`)
    pub fn file_in(dir: &Path) -> PathBuf {
        dir.join(CONFIG_FILE)
    }

    /// Get URL; the environment variable overrides the file
    pub fn get_url(&self) -> Option<String> {
        std::env::var(URL_ENV)
            .ok()
            .filter(|s| !s.is_empty())
            .or_else(|| self.url.clone().filter(|s| !s.is_empty()))
    }

    pub fn set_url(&mut self, url: String) {
        self.url = Some(url);
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        if !(1..=100).contains(&self.top_workflows_limit) {
            return Err(ConfigError::InvalidValue {
                field: "top_workflows_limit".to_string(),
                value: self.top_workflows_limit.to_string(),
                reason: "must be between 1 and 100".to_string(),
            });
        }
        if self.debounce_ms > 5_000 {
            return Err(ConfigError::InvalidValue {
                field: "debounce_ms".to_string(),
                value: self.debounce_ms.to_string(),
                reason: "must be at most 5000".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.url.is_none());
        assert_eq!(config.debounce(), Duration::from_millis(300));
        assert_eq!(config.page_size.get(), 25);
        assert_eq!(config.top_workflows_limit, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_load_save() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = Config::file_in(temp_dir.path());

        let mut config = Config::default();
        config.set_url("http://insights.test".to_string());
        config.page_size = PageSize::new(50).unwrap();

        config
            .save(Some(config_path.clone()))
            .expect("Failed to save config");

        let loaded = Config::load(Some(config_path)).expect("Failed to load config");
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "url = \"http://insights.test\"\n").unwrap();

        let config = Config::load(Some(config_path)).expect("Failed to load config");
        assert_eq!(config.url.as_deref(), Some("http://insights.test"));
        assert_eq!(config.debounce_ms, 300);
        assert_eq!(config.page_size, PageSize::DEFAULT);
    }

    #[test]
    fn test_disallowed_page_size_rejected() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config_path = temp_dir.path().join("config.toml");
        fs::write(&config_path, "page_size = 7\n").unwrap();

        let result = Config::load(Some(config_path));
        assert!(matches!(
            result,
            Err(StorageError::ConfigParseError { .. })
        ));
    }

    #[test]
    fn test_load_nonexistent_file() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let config = Config::load(Some(temp_dir.path().join("nonexistent.toml")))
            .expect("Failed to load default config");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_validate_workflow_limit() {
        let config = Config {
            top_workflows_limit: 0,
            ..Config::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "top_workflows_limit"
        ));
    }

    #[test]
    fn test_env_url_overrides_file() {
        let original = std::env::var(URL_ENV).ok();
        let mut config = Config::default();
        config.set_url("http://from-file.test".to_string());

        unsafe {
            std::env::remove_var(URL_ENV);
        }
        assert_eq!(config.get_url().as_deref(), Some("http://from-file.test"));

        unsafe {
            std::env::set_var(URL_ENV, "http://from-env.test");
        }
        assert_eq!(config.get_url().as_deref(), Some("http://from-env.test"));

        unsafe {
            match original {
                Some(value) => std::env::set_var(URL_ENV, value),
                None => std::env::remove_var(URL_ENV),
            }
        }
    }
}
