//! Error types for plugin initialization.

use core::time::Duration;

use thiserror::Error;

use crate::descriptor::DescriptorId;
use crate::registration::PluginError;

/// Errors that abort an initialization run.
///
/// Every variant is terminal: no capability table is produced alongside it.
#[derive(Debug, Error)]
pub enum InitError {
    /// A descriptor has no registration or no usable name.
    #[error("Plugin {0} is not valid")]
    InvalidPlugin(DescriptorId),

    /// Two descriptors share a name.
    #[error("duplicate plugin name: {0}")]
    DuplicateName(String),

    /// A plugin depends on a name no descriptor declares.
    #[error("unknown plugin dependency: {0}")]
    UnknownDependency(String),

    /// The dependency graph has a cycle; the path starts and ends at the same plugin.
    #[error("Dependency Cycle Found: {}", .0.join(" -> "))]
    DependencyCycle(Vec<String>),

    /// A plugin's own `register` reported an error.
    ///
    /// Displays exactly as the plugin's error and reports no further source,
    /// so the plugin's message appears once in an error chain.
    #[error("{error}")]
    Registration {
        /// The plugin whose registration failed.
        plugin: String,
        /// The error as reported by the plugin.
        error: PluginError,
    },

    /// The run-scoped timeout elapsed while a registration was still pending.
    #[error("plugin {plugin} did not complete registration within {timeout:?}")]
    Timeout {
        /// The first plugin, in input order, that had not completed.
        plugin: String,
        /// The configured timeout.
        timeout: Duration,
    },

    /// A pass made no progress while plugins were still pending.
    #[error("plugin resolution stalled; unresolved plugins: {}", .0.join(", "))]
    Stalled(Vec<String>),
}

impl InitError {
    /// Creates a [`Registration`](Self::Registration) error.
    pub fn registration(plugin: impl Into<String>, error: PluginError) -> Self {
        Self::Registration {
            plugin: plugin.into(),
            error,
        }
    }

    /// Returns the plugin-reported error if this is a registration failure.
    ///
    /// Any other kind is turned into a [`PluginError`] carrying this error.
    #[must_use]
    pub fn into_plugin_error(self) -> PluginError {
        match self {
            InitError::Registration { error, .. } => error,
            other => Box::new(other),
        }
    }

    /// Short machine-readable name of the error kind.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            InitError::InvalidPlugin(_) => "invalid_plugin",
            InitError::DuplicateName(_) => "duplicate_name",
            InitError::UnknownDependency(_) => "unknown_dependency",
            InitError::DependencyCycle(_) => "dependency_cycle",
            InitError::Registration { .. } => "registration_failed",
            InitError::Timeout { .. } => "timeout",
            InitError::Stalled(_) => "stalled",
        }
    }
}
