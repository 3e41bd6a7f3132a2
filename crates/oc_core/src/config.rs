//! Registry configuration.
//!
//! [`RegistryConfig`] can be built in code, deserialized from JSON, or read
//! from `OC_*` environment variables:
//!
//! | Variable | Field | Example |
//! |----------|-------|---------|
//! | `OC_PLUGIN_TIMEOUT_MS` | `plugin_timeout_ms` | `5000` |
//! | `OC_VERBOSE` | `verbosity` | `true`, `1`, `off` |
//! | `OC_LOG_FORMAT` | `log_format` | `pretty`, `compact`, `json` |
//! | `OC_LOG` | `log_filter` | `oc_plugins=debug,info` |
//!
//! Unset variables keep their defaults.

use core::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::Level;

use crate::logging::{TracingConfig, TracingFormat};

/// Environment variable holding the plugin registration timeout in milliseconds.
pub const ENV_PLUGIN_TIMEOUT_MS: &str = "OC_PLUGIN_TIMEOUT_MS";
/// Environment variable enabling debug logging.
pub const ENV_VERBOSE: &str = "OC_VERBOSE";
/// Environment variable selecting the log format.
pub const ENV_LOG_FORMAT: &str = "OC_LOG_FORMAT";
/// Environment variable holding log filter directives.
pub const ENV_LOG_FILTER: &str = "OC_LOG";

/// Errors raised while loading a [`RegistryConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document did not describe a valid configuration.
    #[error("invalid registry configuration: {0}")]
    Json(#[from] serde_json::Error),

    /// An environment variable held a value that could not be interpreted.
    #[error("invalid value `{value}` for {key}: {reason}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// The rejected value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Settings for a registry instance.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    /// Upper bound on a whole plugin initialization run, in milliseconds.
    pub plugin_timeout_ms: Option<u64>,
    /// Log at `DEBUG` instead of `INFO`.
    pub verbosity: bool,
    /// Log output format.
    pub log_format: TracingFormat,
    /// Log filter directives; overrides the level implied by `verbosity`.
    pub log_filter: Option<String>,
}

impl RegistryConfig {
    /// Creates the default configuration: no timeout, `INFO`, pretty output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the plugin initialization timeout.
    #[must_use]
    pub fn with_plugin_timeout(mut self, timeout: Duration) -> Self {
        self.plugin_timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Enables or disables debug logging.
    #[must_use]
    pub fn with_verbosity(mut self, verbose: bool) -> Self {
        self.verbosity = verbose;
        self
    }

    /// Sets the log output format.
    #[must_use]
    pub fn with_log_format(mut self, format: TracingFormat) -> Self {
        self.log_format = format;
        self
    }

    /// Sets log filter directives.
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = Some(filter.into());
        self
    }

    /// Parses a configuration from a JSON document. Missing fields take
    /// their defaults; unknown fields are rejected.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] if the document is malformed.
    ///
    /// # Example
    ///
    /// ```
    /// use core::time::Duration;
    /// use oc_core::RegistryConfig;
    ///
    /// let config = RegistryConfig::from_json(r#"{ "plugin_timeout_ms": 250 }"#).unwrap();
    /// assert_eq!(config.plugin_timeout(), Some(Duration::from_millis(250)));
    /// ```
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set but cannot
    /// be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name
    /// to its value.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a variable is set but cannot
    /// be parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup(ENV_PLUGIN_TIMEOUT_MS) {
            let millis = value
                .trim()
                .parse::<u64>()
                .map_err(|e| invalid(ENV_PLUGIN_TIMEOUT_MS, &value, e.to_string()))?;
            config.plugin_timeout_ms = Some(millis);
        }

        if let Some(value) = lookup(ENV_VERBOSE) {
            config.verbosity = parse_flag(&value)
                .ok_or_else(|| invalid(ENV_VERBOSE, &value, "expected a boolean".to_owned()))?;
        }

        if let Some(value) = lookup(ENV_LOG_FORMAT) {
            config.log_format = value
                .parse()
                .map_err(|reason| invalid(ENV_LOG_FORMAT, &value, reason))?;
        }

        if let Some(value) = lookup(ENV_LOG_FILTER)
            && !value.trim().is_empty()
        {
            config.log_filter = Some(value);
        }

        Ok(config)
    }

    /// The plugin initialization timeout, if any.
    #[must_use]
    pub fn plugin_timeout(&self) -> Option<Duration> {
        self.plugin_timeout_ms.map(Duration::from_millis)
    }

    /// Subscriber settings derived from this configuration.
    #[must_use]
    pub fn tracing(&self) -> TracingConfig {
        let level = if self.verbosity {
            Level::DEBUG
        } else {
            Level::INFO
        };
        let config = TracingConfig::new()
            .with_level(level)
            .with_format(self.log_format);
        match &self.log_filter {
            Some(filter) => config.with_env_filter(filter.clone()),
            None => config,
        }
    }
}

fn invalid(key: &'static str, value: &str, reason: String) -> ConfigError {
    ConfigError::InvalidValue {
        key,
        value: value.to_owned(),
        reason,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "" | "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
