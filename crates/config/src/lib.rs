#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for mscrape
//!
//! This crate handles loading the application-level configuration file
//! (network tuning, download parallelism). Site-specific crawl structure
//! lives in `mscrape-site`; this file only carries knobs that apply to
//! every crawl.

use mscrape_errors::{ConfigError, Error};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tokio::fs;
use tracing::debug;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub network: NetworkConfig,
}

/// General crawl configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_parallel_downloads")]
    pub parallel_downloads: usize,
    #[serde(default = "default_skip_existing")]
    pub skip_existing: bool,
}

/// Network configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    #[serde(default = "default_timeout")]
    pub timeout: u64, // seconds
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64, // seconds
    #[serde(default = "default_retries")]
    pub retries: u32,
    #[serde(default = "default_retry_delay")]
    pub retry_delay: u64, // seconds
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            parallel_downloads: 4,
            skip_existing: true,
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            timeout: 300, // 5 minutes for large media files
            connect_timeout: 30,
            retries: 3,
            retry_delay: 1,
            user_agent: format!("mscrape/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl NetworkConfig {
    #[must_use]
    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    #[must_use]
    pub fn connect_timeout_duration(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    #[must_use]
    pub fn retry_delay_duration(&self) -> Duration {
        Duration::from_secs(self.retry_delay)
    }
}

impl Config {
    /// Load configuration from a file
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist or does not parse as
    /// valid TOML for this schema.
    pub async fn load(path: &Path) -> Result<Self, Error> {
        if !path.exists() {
            return Err(ConfigError::NotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(|e| Error::io_with_path(&e, path))?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;

        config.validate()?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Load configuration from an optional path, falling back to defaults
    ///
    /// # Errors
    ///
    /// Returns an error only when an explicit path was given and fails to
    /// load; a missing optional path yields the defaults.
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(path) => Self::load(path).await,
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> Result<(), Error> {
        if self.general.parallel_downloads == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.parallel_downloads".to_string(),
                value: "0".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

// Default value functions for serde

fn default_parallel_downloads() -> usize {
    4
}

fn default_skip_existing() -> bool {
    true
}

fn default_timeout() -> u64 {
    300
}

fn default_connect_timeout() -> u64 {
    30
}

fn default_retries() -> u32 {
    3
}

fn default_retry_delay() -> u64 {
    1
}

fn default_user_agent() -> String {
    format!("mscrape/{}", env!("CARGO_PKG_VERSION"))
}
