//! Example plugins for a registry boot.
//!
//! ```text
//! ┌──────────────────┐  depends on  ┌──────────────┐
//! │  authentication  │─────────────▶│   storage    │
//! └──────────────────┘              └──────────────┘
//! ```
//!
//! `storage` is an in-memory key/value store. `authentication` seeds its users
//! into `storage` during registration and checks credentials against it.

use core::time::Duration;
use std::collections::BTreeMap;

use oc_plugins::prelude::*;
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{Value, json};

/// Name of the storage plugin.
pub const STORAGE: &str = "storage";

/// Name of the authentication plugin.
pub const AUTHENTICATION: &str = "authentication";

// ─────────────────────────────────────────────────────────────────────────────
// Storage
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StorageOptions {
    /// Simulated connection latency, in milliseconds.
    connect_delay_ms: u64,
}

/// Storage operations accepted by [`MemoryStorage`].
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum StorageCommand {
    Get { key: String },
    Put { key: String, value: Value },
    List,
}

/// In-memory key/value storage.
///
/// `execute` takes `{"op": "get", "key": ...}`, `{"op": "put", "key": ..., "value": ...}`
/// or `{"op": "list"}`.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: RwLock<BTreeMap<String, Value>>,
}

impl Registration for MemoryStorage {
    fn register<'a>(
        &'a self,
        options: &'a Value,
        _dependencies: &'a CapabilityTable,
    ) -> BoxFuture<'a, Result<(), PluginError>> {
        Box::pin(async move {
            let options: StorageOptions = serde_json::from_value(options.clone())?;
            if options.connect_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(options.connect_delay_ms)).await;
            }
            tracing::debug!(delay_ms = options.connect_delay_ms, "storage connected");
            Ok(())
        })
    }

    fn execute(&self, args: Value) -> Result<Value, PluginError> {
        match serde_json::from_value(args)? {
            StorageCommand::Get { key } => {
                Ok(self.entries.read().get(&key).cloned().unwrap_or(Value::Null))
            }
            StorageCommand::Put { key, value } => {
                self.entries.write().insert(key, value);
                Ok(Value::Null)
            }
            StorageCommand::List => Ok(json!(self.entries.read().keys().collect::<Vec<_>>())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Authentication
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AuthenticationOptions {
    users: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

/// Checks `{"username": ..., "password": ...}` against users held in storage.
#[derive(Debug, Default)]
pub struct Authentication {
    storage: RwLock<Option<Capability>>,
}

impl Authentication {
    fn user_key(username: &str) -> String {
        format!("users/{username}")
    }
}

impl Registration for Authentication {
    fn register<'a>(
        &'a self,
        options: &'a Value,
        dependencies: &'a CapabilityTable,
    ) -> BoxFuture<'a, Result<(), PluginError>> {
        Box::pin(async move {
            let options: AuthenticationOptions = serde_json::from_value(options.clone())?;
            let storage = dependencies
                .get(STORAGE)
                .cloned()
                .ok_or("authentication requires the storage plugin")?;

            for (username, password) in &options.users {
                storage.call(json!({
                    "op": "put",
                    "key": Self::user_key(username),
                    "value": password,
                }))?;
            }
            tracing::debug!(users = options.users.len(), "authentication users seeded");

            *self.storage.write() = Some(storage);
            Ok(())
        })
    }

    fn execute(&self, args: Value) -> Result<Value, PluginError> {
        let credentials: Credentials = serde_json::from_value(args)?;
        let storage = self
            .storage
            .read()
            .clone()
            .ok_or("authentication is not registered")?;

        let stored = storage.call(json!({
            "op": "get",
            "key": Self::user_key(&credentials.username),
        }))?;
        Ok(Value::Bool(stored.as_str() == Some(credentials.password.as_str())))
    }

    fn dependencies(&self) -> Vec<String> {
        vec![STORAGE.to_owned()]
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Group
// ─────────────────────────────────────────────────────────────────────────────

/// The demo plugin set, authentication listed before the storage it depends on.
#[derive(Debug, Clone)]
pub struct DemoPlugins {
    /// Options passed to `authentication`.
    pub users: Value,
    /// Options passed to `storage`.
    pub storage: Value,
}

impl Default for DemoPlugins {
    fn default() -> Self {
        Self {
            users: json!({ "users": { "admin": "admin" } }),
            storage: json!({ "connect_delay_ms": 20 }),
        }
    }
}

impl PluginGroup for DemoPlugins {
    fn build(self) -> PluginGroupBuilder {
        PluginGroupBuilder::new()
            .add(
                PluginDescriptor::new(AUTHENTICATION, Authentication::default())
                    .with_options(self.users),
            )
            .add(PluginDescriptor::new(STORAGE, MemoryStorage::default()).with_options(self.storage))
    }
}
