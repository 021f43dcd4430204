// Configuration Management
//
// This crate handles all configuration loading for the auth gateway.
// It provides:
// - Configuration structs and deserialization
// - File loading logic with environment fallback
// - Default configuration values
//
// This keeps configuration concerns separate from the OAuth flow logic.

use std::path::Path;
use thiserror::Error;

pub mod types;

// Re-export all configuration types
pub use types::*;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found. Tried paths: {paths}")]
    FileNotFound { paths: String },

    #[error("Failed to read configuration file: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Failed to parse configuration: {source}")]
    ParseError {
        #[from]
        source: serde_yaml::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

const CONFIG_PATHS: [&str; 3] = ["config/config.yaml", "config.yaml", "config/default.yaml"];

/// Main configuration loading interface
impl ApiConfig {
    /// Load configuration from YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: ApiConfig = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self, ConfigError> {
        for path in &CONFIG_PATHS {
            if Path::new(path).exists() {
                return Self::load_from_file(path);
            }
        }

        // If no config file found, fail with descriptive error
        Err(ConfigError::FileNotFound {
            paths: CONFIG_PATHS.join(", "),
        })
    }

    /// Load from the first config file found, falling back to environment variables
    pub fn load_or_env() -> Result<Self, ConfigError> {
        match Self::load() {
            Err(ConfigError::FileNotFound { .. }) => {
                let config = Self::from_env().map_err(ConfigError::Invalid)?;
                config.validate()?;
                Ok(config)
            }
            other => other,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.public_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "server.public_base_url must not be empty".to_string(),
            ));
        }
        if self.auth.provider_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "auth.provider_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
