//! # OC Internal Library
//!
//! Re-exports the OC registry crates for convenience.

/// Configuration and logging setup.
pub use oc_core;

/// Lifecycle event bus.
pub use oc_events;

/// Plugin descriptors and dependency-ordered initialization.
pub use oc_plugins;

/// Registry bootstrap.
pub use oc_registry;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use oc_core::{RegistryConfig, TracingConfig, TracingFormat, init_tracing};
    pub use oc_events::EventsHandler;
    pub use oc_plugins::prelude::*;
    pub use oc_registry::{Registry, RegistryError};
}
