//! Registry bootstrap.
//!
//! [`Registry`] collects plugin descriptors, initializes them in dependency
//! order on [`start`](Registry::start), and announces its lifecycle on an
//! [`EventsHandler`](oc_events::EventsHandler):
//!
//! | Event | Fired | Payload |
//! |-------|-------|---------|
//! | [`START`](events::START) | plugins initialized | `{"plugins": [names]}` |
//! | [`ERROR`](events::ERROR) | initialization failed | `{"code": "plugin_initialisation_failed", "message": ...}` |
//! | [`STOP`](events::STOP) | [`close`](Registry::close) | `{}` |
//!
//! # Example
//!
//! ```
//! use oc_core::RegistryConfig;
//! use oc_plugins::prelude::*;
//! use oc_registry::Registry;
//! use serde_json::{Value, json};
//!
//! struct Greeting;
//!
//! impl Registration for Greeting {
//!     fn register<'a>(
//!         &'a self,
//!         _options: &'a Value,
//!         _dependencies: &'a CapabilityTable,
//!     ) -> BoxFuture<'a, Result<(), PluginError>> {
//!         Box::pin(async { Ok(()) })
//!     }
//!
//!     fn execute(&self, args: Value) -> Result<Value, PluginError> {
//!         Ok(json!(format!("hello {}", args.as_str().unwrap_or("world"))))
//!     }
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build().unwrap().block_on(async {
//! let mut registry = Registry::new(RegistryConfig::default());
//! registry.register(PluginDescriptor::new("greeting", Greeting)).unwrap();
//!
//! let plugins = registry.start().await.unwrap();
//! assert_eq!(plugins.call("greeting", json!("oc")).unwrap(), json!("hello oc"));
//! # });
//! ```

/// Registry errors.
pub mod error;

/// Lifecycle event names and payloads.
pub mod events;

/// The registry lifecycle.
pub mod registry;

pub use error::RegistryError;
pub use registry::Registry;
