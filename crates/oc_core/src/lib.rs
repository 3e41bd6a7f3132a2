//! Ambient setup shared by the OC registry crates.
//!
//! - [`config`] - [`RegistryConfig`](config::RegistryConfig), loaded from JSON or the environment
//! - [`logging`] - [`init_tracing`](logging::init_tracing) and its [`TracingConfig`](logging::TracingConfig)

/// Registry configuration.
pub mod config;

/// Tracing subscriber setup.
pub mod logging;

pub use config::{ConfigError, RegistryConfig};
pub use logging::{TracingConfig, TracingFormat, init_tracing};
