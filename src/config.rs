//! Configuration loading via `ortho-config`.

use std::ffi::OsString;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use thiserror::Error;

use crate::client::PollPolicy;
use crate::http::Timeouts;

/// Production API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.netactuate.com";

/// Environment variable consulted when no API key is passed explicitly.
pub const API_KEY_ENV: &str = "HV_API_KEY";

/// Client settings derived from environment variables and configuration
/// files.
#[derive(Clone, Debug, Deserialize, OrthoConfig, PartialEq, Eq)]
#[ortho_config(
    prefix = "HV",
    discovery(
        app_name = "hvcloud",
        env_var = "HV_CONFIG_PATH",
        config_file_name = "hvcloud.toml",
        dotfile_name = ".hvcloud.toml",
        project_file_name = "hvcloud.toml"
    )
)]
pub struct HvConfig {
    /// API key sent as the `key` query parameter. Required.
    #[ortho_config(default = String::new())]
    pub api_key: String,
    /// Base URL of the API. Point this at a test host to avoid production.
    #[ortho_config(default = DEFAULT_ENDPOINT.to_owned())]
    pub endpoint: String,
    /// Connect timeout in milliseconds.
    #[ortho_config(default = 3100)]
    pub connect_timeout_ms: u64,
    /// Read timeout in seconds.
    #[ortho_config(default = 29)]
    pub read_timeout_secs: u64,
    /// Number of polls made by `server_wait_for` before giving up.
    #[ortho_config(default = 60)]
    pub poll_attempts: u32,
    /// Delay between two polls, in seconds.
    #[ortho_config(default = 5)]
    pub poll_interval_secs: u64,
}

impl HvConfig {
    /// Loads configuration from defaults, configuration files, environment
    /// variables, and CLI flags in that order of precedence.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the loader fails to merge sources.
    pub fn load_from_sources() -> Result<Self, ConfigError> {
        Self::load().map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Loads configuration without attempting to parse CLI arguments.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the merge fails.
    pub fn load_without_cli_args() -> Result<Self, ConfigError> {
        Self::load_from_iter([OsString::from("hvcloud")])
            .map_err(|err| ConfigError::Parse(err.to_string()))
    }

    /// Checks that required values are present and usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] for a blank API key or endpoint
    /// and [`ConfigError::Invalid`] for a zero poll budget.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_field(&self.api_key, "API key", "api_key")?;
        require_field(&self.endpoint, "API endpoint", "endpoint")?;
        if self.poll_attempts == 0 {
            return Err(ConfigError::Invalid(String::from(
                "poll_attempts must be at least 1",
            )));
        }
        Ok(())
    }

    /// Timeouts for the HTTP transport.
    #[must_use]
    pub const fn timeouts(&self) -> Timeouts {
        Timeouts {
            connect: Duration::from_millis(self.connect_timeout_ms),
            read: Duration::from_secs(self.read_timeout_secs),
        }
    }

    /// Poll budget for `server_wait_for`.
    #[must_use]
    pub const fn poll_policy(&self) -> PollPolicy {
        PollPolicy {
            attempts: self.poll_attempts,
            interval: Duration::from_secs(self.poll_interval_secs),
        }
    }
}

fn require_field(value: &str, description: &str, key: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::MissingField(format!(
            "missing {description}: set HV_{env} or add {key} to hvcloud.toml",
            env = key.to_uppercase()
        )));
    }
    Ok(())
}

/// Errors raised during configuration loading and validation.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ConfigError {
    /// A required configuration field is empty or missing.
    #[error("missing configuration field: {0}")]
    MissingField(String),
    /// A configuration value is out of range.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// Surfaces errors from the `ortho-config` loader.
    #[error("configuration parsing failed: {0}")]
    Parse(String),
}

impl From<ortho_config::OrthoError> for ConfigError {
    fn from(value: ortho_config::OrthoError) -> Self {
        Self::Parse(value.to_string())
    }
}
