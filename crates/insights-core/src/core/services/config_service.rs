//! Configuration service backing the `config` subcommand

use crate::AppError;
use crate::error::ConfigError;
use crate::storage::config::Config;
use crate::utils::validation::validate_url;
use std::path::PathBuf;

pub struct ConfigService {
    config: Config,
    path: Option<PathBuf>,
}

impl ConfigService {
    /// `path` overrides the default config file location
    pub fn new(config: Config, path: Option<PathBuf>) -> Self {
        Self { config, path }
    }

    pub fn load(path: Option<PathBuf>) -> Result<Self, AppError> {
        let config = Config::load(path.clone())?;
        Ok(Self::new(config, path))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.config
    }

    pub fn get_url(&self) -> Option<String> {
        self.config.get_url()
    }

    /// Validate and set the server URL
    pub fn set_url(&mut self, url: String) -> Result<(), AppError> {
        validate_url(&url)?;
        self.config.set_url(url);
        Ok(())
    }

    pub fn save_config(&self) -> Result<(), AppError> {
        self.config.save(self.path.clone()).map_err(|e| e.into())
    }

    /// Check the loaded configuration is usable for server commands
    pub fn validate(&self) -> Result<String, AppError> {
        let url = self.get_url().ok_or_else(|| ConfigError::MissingField {
            field: "url".to_string(),
            hint: "Run 'insights config set --url <URL>' or set INSIGHTS_URL".to_string(),
        })?;
        validate_url(&url)?;
        self.config.validate()?;
        Ok(url)
    }
}
