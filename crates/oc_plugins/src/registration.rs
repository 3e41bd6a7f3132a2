//! The capability set every plugin implements.
//!
//! A plugin is a named provider of a single callable capability. Before the
//! capability can be called it has to be registered: the scheduler invokes
//! [`Registration::register`] once, handing over the plugin's options and the
//! capabilities of the plugins it depends on. Once the returned future
//! resolves successfully the plugin is ready and its
//! [`execute`](Registration::execute) surface is exposed by name.
//!
//! # Example
//!
//! ```
//! use std::sync::OnceLock;
//!
//! use oc_plugins::capability::CapabilityTable;
//! use oc_plugins::registration::{BoxFuture, PluginError, Registration};
//! use serde_json::Value;
//!
//! #[derive(Default)]
//! struct GetValue {
//!     options: OnceLock<Value>,
//! }
//!
//! impl Registration for GetValue {
//!     fn register<'a>(
//!         &'a self,
//!         options: &'a Value,
//!         _dependencies: &'a CapabilityTable,
//!     ) -> BoxFuture<'a, Result<(), PluginError>> {
//!         Box::pin(async move {
//!             self.options
//!                 .set(options.clone())
//!                 .map_err(|_| PluginError::from("registered twice"))
//!         })
//!     }
//!
//!     fn execute(&self, args: Value) -> Result<Value, PluginError> {
//!         let key = args.as_str().ok_or("expected a key")?;
//!         let options = self.options.get().ok_or("not registered")?;
//!         Ok(options.get(key).cloned().unwrap_or(Value::Null))
//!     }
//! }
//! ```

use core::future::Future;
use core::pin::Pin;

use serde_json::Value;

use crate::capability::CapabilityTable;

/// A boxed, sendable future borrowed for `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Error reported by a plugin, either from registration or execution.
///
/// The scheduler never wraps or rewrites it: a failed registration surfaces
/// the plugin's own error value.
pub type PluginError = Box<dyn core::error::Error + Send + Sync + 'static>;

/// Setup and call surface of a plugin.
///
/// Implementations typically keep the state established by
/// [`register`](Self::register) behind interior mutability (`OnceLock`,
/// `parking_lot::Mutex`, ...) since both methods take `&self`.
pub trait Registration: Send + Sync + 'static {
    /// Performs the plugin's setup.
    ///
    /// `dependencies` holds exactly the capabilities named by
    /// [`dependencies()`](Self::dependencies), all of which are ready and safe
    /// to call. The table may be cloned and kept for later use.
    ///
    /// Completion of the future is the readiness signal. Returning an error
    /// aborts the whole initialization run.
    fn register<'a>(
        &'a self,
        options: &'a Value,
        dependencies: &'a CapabilityTable,
    ) -> BoxFuture<'a, Result<(), PluginError>>;

    /// The capability exposed to consumers once registration has completed.
    fn execute(&self, args: Value) -> Result<Value, PluginError>;

    /// Names of the plugins that must be ready before this one registers.
    fn dependencies(&self) -> Vec<String> {
        Vec::new()
    }
}
