//! Typed configuration for the Cascade client.
//!
//! Values come from an optional TOML file (`<config dir>/cascade/config.toml`)
//! overlaid with `CASCADE_*` environment variables
//! (`CASCADE_CONDUCTOR__URL`, `CASCADE_POLL__MAX_ITERATIONS`, ...). The poll
//! constants are configurable, but their defaults match the conductor's
//! observed behavior and should normally stay untouched.

use std::path::PathBuf;
use std::time::Duration;

use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::duration::DEFAULT_TIMEOUT_SECS;
use crate::poller::{PollConfig, MAX_POLL_ITERATIONS, POLL_INTERVAL_MS};

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CascadeConfig {
    #[serde(default)]
    pub conductor: ConductorConfig,

    #[serde(default)]
    pub poll: PollSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConductorConfig {
    #[serde(default = "default_conductor_url")]
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollSettings {
    #[serde(default = "default_poll_interval_ms")]
    pub interval_ms: u64,

    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    #[serde(default = "default_timeout_secs")]
    pub default_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_format: bool,
}

fn default_conductor_url() -> String {
    "http://localhost:8621".to_string()
}

fn default_poll_interval_ms() -> u64 {
    POLL_INTERVAL_MS
}

fn default_max_iterations() -> u32 {
    MAX_POLL_ITERATIONS
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ConductorConfig {
    fn default() -> Self {
        Self {
            url: default_conductor_url(),
        }
    }
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval_ms: default_poll_interval_ms(),
            max_iterations: default_max_iterations(),
            default_timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

impl From<&PollSettings> for PollConfig {
    fn from(settings: &PollSettings) -> Self {
        Self {
            interval: Duration::from_millis(settings.interval_ms),
            max_iterations: settings.max_iterations,
            timeout_secs: settings.default_timeout_secs,
        }
    }
}

impl CascadeConfig {
    /// Load from the default file location plus `CASCADE_*` env overrides.
    pub fn load() -> Result<Self, ConfigLoadError> {
        let mut builder = ConfigBuilder::builder();

        if let Some(path) = Self::default_file_path() {
            builder = builder.add_source(File::from(path).required(false));
        }

        let config = builder
            .add_source(Environment::with_prefix("CASCADE").separator("__"))
            .build()?
            .try_deserialize::<CascadeConfig>()?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("cascade").join("config.toml"))
    }

    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.poll.interval_ms == 0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "poll.interval_ms".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.poll.max_iterations == 0 {
            return Err(ConfigLoadError::InvalidValue {
                key: "poll.max_iterations".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_observed_conductor_behavior() {
        let config = CascadeConfig::default();
        assert_eq!(config.poll.interval_ms, 300);
        assert_eq!(config.poll.max_iterations, 100);
        assert_eq!(config.poll.default_timeout_secs, 30);
        assert_eq!(config.conductor.url, "http://localhost:8621");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_poll_settings_convert_to_poll_config() {
        let settings = PollSettings {
            interval_ms: 500,
            max_iterations: 10,
            default_timeout_secs: 5,
        };
        let poll: PollConfig = (&settings).into();
        assert_eq!(poll.interval, Duration::from_millis(500));
        assert_eq!(poll.max_iterations, 10);
        assert_eq!(poll.timeout_secs, 5);
    }

    #[test]
    fn test_zero_interval_rejected() {
        let config = CascadeConfig {
            poll: PollSettings {
                interval_ms: 0,
                ..PollSettings::default()
            },
            ..CascadeConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigLoadError::InvalidValue { .. })
        ));
    }
}
