//! Layered application configuration using figment.
//!
//! Sources (highest wins):
//! 1. Environment variables with the `TIMELINE_` prefix
//! 2. `timeline.toml` in the working directory
//! 3. Built-in defaults

use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const CONFIG_FILE: &str = "timeline.toml";
pub const ENV_PREFIX: &str = "TIMELINE_";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] figment::Error),

    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AppConfig {
    pub bind_addr: String,
    /// Directory backing the key-value medium.
    pub data_dir: PathBuf,
    pub static_dir: PathBuf,
    pub log_level: String,
    /// Seed sample tasks/conferences into an empty medium.
    pub seed_sample_data: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            data_dir: PathBuf::from("data"),
            static_dir: PathBuf::from("static"),
            log_level: "info".to_string(),
            seed_sample_data: true,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_addr.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "bind_addr".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}
