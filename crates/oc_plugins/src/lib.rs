//! Plugin initialization for the OC component registry.
//!
//! Operational capabilities of the registry (storage backends, authentication
//! hooks, request decorators) are delivered as plugins. Each plugin is a named
//! provider with an asynchronous setup step and one callable capability, and
//! may depend on other plugins by name.
//!
//! - [`registration`] - the [`Registration`](registration::Registration) trait plugins implement
//! - [`descriptor`] - [`PluginDescriptor`](descriptor::PluginDescriptor), the scheduler input
//! - [`graph`] - dependency graph with unknown-reference and cycle detection
//! - [`initializer`] - multi-pass, dependency-ordered registration
//! - [`capability`] - the resulting name-keyed capability table
//! - [`group`] - bundles of descriptors
//! - [`error`] - the error taxonomy of a run
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::{AtomicBool, Ordering};
//!
//! use oc_plugins::prelude::*;
//! use serde_json::Value;
//!
//! #[derive(Default)]
//! struct IsFlagged {
//!     flag: AtomicBool,
//! }
//!
//! impl Registration for IsFlagged {
//!     fn register<'a>(
//!         &'a self,
//!         _options: &'a Value,
//!         _dependencies: &'a CapabilityTable,
//!     ) -> BoxFuture<'a, Result<(), PluginError>> {
//!         Box::pin(async move {
//!             self.flag.store(true, Ordering::SeqCst);
//!             Ok(())
//!         })
//!     }
//!
//!     fn execute(&self, _args: Value) -> Result<Value, PluginError> {
//!         Ok(Value::Bool(self.flag.load(Ordering::SeqCst)))
//!     }
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let plugins = initialize(vec![PluginDescriptor::new("isFlagged", IsFlagged::default())])
//!     .await
//!     .unwrap();
//!
//! assert_eq!(plugins.call("isFlagged", Value::Null).unwrap(), Value::Bool(true));
//! # });
//! ```

/// Callable capabilities and the capability table.
pub mod capability;

/// Plugin descriptors.
pub mod descriptor;

/// Initialization errors.
pub mod error;

/// Dependency graph and cycle detection.
pub mod graph;

/// Plugin groups.
pub mod group;

/// Dependency-ordered initialization.
pub mod initializer;

/// The capability set plugins implement.
pub mod registration;

pub use initializer::{PluginInitializer, initialize};

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::capability::{Capability, CapabilityTable};
    pub use crate::descriptor::{DescriptorId, PluginDescriptor};
    pub use crate::error::InitError;
    pub use crate::group::{PluginGroup, PluginGroupBuilder};
    pub use crate::initializer::{PluginInitializer, initialize};
    pub use crate::registration::{BoxFuture, PluginError, Registration};
}
