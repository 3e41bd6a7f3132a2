//! Installs the process-wide `tracing` subscriber.
//!
//! # Example
//!
//! ```
//! use oc_core::{TracingConfig, TracingFormat, init_tracing};
//! use tracing::Level;
//!
//! let config = TracingConfig::new()
//!     .with_level(Level::DEBUG)
//!     .with_format(TracingFormat::Compact)
//!     .with_env_filter("oc_plugins=debug,oc_registry=info");
//!
//! init_tracing(&config);
//! tracing::info!("registry booting");
//! ```

use core::fmt;
use core::str::FromStr;

use serde::Deserialize;
use tracing::Level;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingFormat {
    /// Human-readable multi-line output (default).
    #[default]
    Pretty,
    /// Single-line output.
    Compact,
    /// JSON lines for log aggregation.
    Json,
}

impl fmt::Display for TracingFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Pretty => "pretty",
            Self::Compact => "compact",
            Self::Json => "json",
        })
    }
}

impl FromStr for TracingFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            "json" => Ok(Self::Json),
            other => Err(format!(
                "unknown log format `{other}` (expected pretty, compact or json)"
            )),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Subscriber settings consumed by [`init_tracing`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Maximum level, used when no filter is given or the filter is invalid.
    pub level: Level,
    /// Output format.
    pub format: TracingFormat,
    /// Target directives such as `oc_plugins=debug,oc_events=warn`.
    pub env_filter: Option<String>,
    /// Emit span enter/exit events.
    pub span_events: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingConfig {
    /// Creates a config at `INFO` with pretty output.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets target directives, `target=level,target=level,...`.
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Builds the filter, falling back to `level` when the directives do not parse.
    fn filter(&self) -> EnvFilter {
        match &self.env_filter {
            Some(directives) => EnvFilter::try_new(directives)
                .unwrap_or_else(|_| EnvFilter::new(self.level.as_str())),
            None => EnvFilter::new(self.level.as_str()),
        }
    }

    fn fmt_span(&self) -> FmtSpan {
        if self.span_events {
            FmtSpan::ENTER | FmtSpan::EXIT
        } else {
            FmtSpan::NONE
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// Returns `false` if a global subscriber was already installed, in which
/// case the existing one is kept.
pub fn init_tracing(config: &TracingConfig) -> bool {
    let filter = config.filter();
    let span_events = config.fmt_span();

    let installed = match config.format {
        TracingFormat::Pretty => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_span_events(span_events),
            )
            .try_init()
            .is_ok(),
        TracingFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_span_events(span_events),
            )
            .try_init()
            .is_ok(),
        TracingFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_span_events(span_events),
            )
            .try_init()
            .is_ok(),
    };

    if installed {
        tracing::debug!(level = %config.level, format = %config.format, "tracing initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_info_pretty() {
        let config = TracingConfig::default();
        assert_eq!(config.level, Level::INFO);
        assert_eq!(config.format, TracingFormat::Pretty);
        assert!(config.env_filter.is_none());
        assert!(!config.span_events);
    }

    #[test]
    fn builders_set_fields() {
        let config = TracingConfig::new()
            .with_level(Level::TRACE)
            .with_format(TracingFormat::Json)
            .with_env_filter("oc_plugins=debug")
            .with_span_events(true);

        assert_eq!(config.level, Level::TRACE);
        assert_eq!(config.format, TracingFormat::Json);
        assert_eq!(config.env_filter.as_deref(), Some("oc_plugins=debug"));
        assert_eq!(config.fmt_span(), FmtSpan::ENTER | FmtSpan::EXIT);
    }

    #[test]
    fn format_parses_case_insensitively() {
        assert_eq!("JSON".parse::<TracingFormat>(), Ok(TracingFormat::Json));
        assert_eq!(" compact ".parse::<TracingFormat>(), Ok(TracingFormat::Compact));
        assert!("xml".parse::<TracingFormat>().is_err());
    }

    #[test]
    fn format_display_round_trips() {
        for format in [TracingFormat::Pretty, TracingFormat::Compact, TracingFormat::Json] {
            assert_eq!(format.to_string().parse::<TracingFormat>(), Ok(format));
        }
    }

    #[test]
    fn invalid_filter_falls_back_to_level() {
        let config = TracingConfig::new()
            .with_level(Level::WARN)
            .with_env_filter("oc_plugins=loud");
        assert_eq!(config.filter().to_string(), "warn");
    }

    #[test]
    fn second_init_keeps_existing_subscriber() {
        let config = TracingConfig::new().with_format(TracingFormat::Compact);
        init_tracing(&config);
        assert!(!init_tracing(&config));
    }
}
