//! Callable capabilities and the name-keyed table that exposes them.
//!
//! A [`Capability`] is the `execute` surface of a registered plugin. The
//! [`CapabilityTable`] maps plugin names to capabilities; it is what the
//! scheduler returns once every plugin is ready, and what each plugin receives
//! as its dependency set during registration.
//!
//! Entries are write-once: the table exposes no public mutation, and the
//! crate-internal insert refuses to replace an existing name.

use core::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;

use crate::registration::{PluginError, Registration};

// ─────────────────────────────────────────────────────────────────────────────
// Capability
// ─────────────────────────────────────────────────────────────────────────────

/// The call surface of a ready plugin.
///
/// Cloning is cheap and every clone calls into the same plugin instance.
#[derive(Clone)]
pub struct Capability {
    name: Arc<str>,
    registration: Arc<dyn Registration>,
}

impl Capability {
    pub(crate) fn new(name: &str, registration: Arc<dyn Registration>) -> Self {
        Self {
            name: Arc::from(name),
            registration,
        }
    }

    /// Name of the plugin this capability belongs to.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the plugin's `execute` surface.
    pub fn call(&self, args: Value) -> Result<Value, PluginError> {
        self.registration.execute(args)
    }

    /// Returns true if both capabilities call into the same plugin instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.registration, &other.registration)
    }
}

impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CapabilityTable
// ─────────────────────────────────────────────────────────────────────────────

/// Name-keyed table of ready capabilities.
///
/// Iteration follows the order in which plugins became ready.
#[derive(Clone, Default)]
pub struct CapabilityTable {
    entries: IndexMap<String, Capability>,
}

impl fmt::Debug for CapabilityTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapabilityTable")
            .field("plugins", &self.names())
            .finish()
    }
}

impl CapabilityTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Adds a capability under `name`.
    ///
    /// Returns `false` and leaves the table untouched if the name is taken.
    pub(crate) fn insert(&mut self, name: &str, capability: Capability) -> bool {
        if self.entries.contains_key(name) {
            return false;
        }
        self.entries.insert(name.to_owned(), capability);
        true
    }

    /// Builds a table holding only the named entries, in the given order.
    ///
    /// Names missing from `self` are skipped.
    #[must_use]
    pub(crate) fn subset(&self, names: &[String]) -> Self {
        let entries = names
            .iter()
            .filter_map(|name| {
                self.entries
                    .get(name)
                    .map(|capability| (name.clone(), capability.clone()))
            })
            .collect();
        Self { entries }
    }

    /// Returns the capability registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Capability> {
        self.entries.get(name)
    }

    /// Calls the capability registered under `name`.
    ///
    /// Fails if no plugin with that name is in the table.
    pub fn call(&self, name: &str, args: Value) -> Result<Value, PluginError> {
        let capability = self
            .get(name)
            .ok_or_else(|| PluginError::from(format!("plugin not found: {name}")))?;
        capability.call(args)
    }

    /// Returns whether a plugin with the given name is in the table.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Returns the plugin names in readiness order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    /// Iterates over `(name, capability)` pairs in readiness order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Capability)> {
        self.entries
            .iter()
            .map(|(name, capability)| (name.as_str(), capability))
    }

    /// Number of capabilities in the table.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table holds no capabilities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
