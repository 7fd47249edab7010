//! Application configuration
//!
//! Loaded from a TOML file (`~/.config/marketplace-pricing/config.toml` by
//! default). Every section and every key has a default, so a partial file
//! is valid:
//!
//! ```toml
//! [server]
//! api_port = 8080
//!
//! [logging]
//! level = "debug"
//! format = "json"
//!
//! [pricing]
//! fulfillment_rate = "0.052"
//!
//! [pricing.duty_rates]
//! default = "0.10"
//! clothing = "0.07"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::domain::pricing::PricingConfig;
use crate::shared::errors::ConfigError;

/// Environment variable holding the config file path
pub const CONFIG_PATH_ENV: &str = "PRICING_CONFIG";

/// HTTP server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub api_host: String,
    pub api_port: u16,
    /// Seconds in-flight requests get to finish after a shutdown signal
    pub shutdown_timeout: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
            shutdown_timeout: 30,
        }
    }
}

impl ServerConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive; `RUST_LOG` takes precedence
    pub level: String,
    /// `json` or `pretty`
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Root configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub pricing: PricingConfig,
}

impl AppConfig {
    /// Read and parse the file at `path`. The rate card is not validated
    /// here; see [`AppConfig::validate`].
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pricing.validate()
    }
}

/// `$PRICING_CONFIG`, or `<config dir>/marketplace-pricing/config.toml`
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        return PathBuf::from(path);
    }
    dirs_next::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("marketplace-pricing")
        .join("config.toml")
}
