//! Bundles of plugin descriptors.
//!
//! A registry usually assembles its plugins from several places: built-in
//! plugins shipped with the server, third-party plugin crates and
//! configuration. [`PluginGroup`] lets each source hand over a ready-made
//! bundle, and [`PluginGroupBuilder`] lets the caller reshape it before it is
//! initialized.
//!
//! # Example
//!
//! ```ignore
//! pub struct StoragePlugins;
//!
//! impl PluginGroup for StoragePlugins {
//!     fn build(self) -> PluginGroupBuilder {
//!         PluginGroupBuilder::new()
//!             .add(PluginDescriptor::new("s3", S3Storage::default()))
//!             .add(PluginDescriptor::new("cdn", Cdn::default()))
//!     }
//! }
//!
//! let descriptors = StoragePlugins
//!     .build()
//!     .disable("cdn")
//!     .add_after("s3", PluginDescriptor::new("audit", Audit::default()))
//!     .into_descriptors();
//! ```

use crate::descriptor::PluginDescriptor;

/// A collection of plugins that can be added together.
pub trait PluginGroup {
    /// Returns the plugins in this group.
    fn build(self) -> PluginGroupBuilder;
}

/// Ordered, editable list of plugin descriptors.
///
/// Positional edits target plugins by name; anonymous descriptors can only be
/// removed by dropping the whole group.
#[derive(Debug, Clone, Default)]
pub struct PluginGroupBuilder {
    descriptors: Vec<PluginDescriptor>,
}

impl PluginGroupBuilder {
    /// Creates a new empty plugin group builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    /// Adds a descriptor to the end of the group.
    #[must_use]
    #[expect(
        clippy::should_implement_trait,
        reason = "This is a builder method, not std::ops::Add"
    )]
    pub fn add(mut self, descriptor: PluginDescriptor) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Appends every descriptor of another group.
    #[must_use]
    pub fn add_group(mut self, group: impl PluginGroup) -> Self {
        self.descriptors.extend(group.build().descriptors);
        self
    }

    /// Adds a descriptor before the plugin named `target`.
    ///
    /// If `target` is not found, the descriptor is added at the beginning.
    #[must_use]
    pub fn add_before(mut self, target: &str, descriptor: PluginDescriptor) -> Self {
        let position = self.position(target).unwrap_or(0);
        self.descriptors.insert(position, descriptor);
        self
    }

    /// Adds a descriptor after the plugin named `target`.
    ///
    /// If `target` is not found, the descriptor is added at the end.
    #[must_use]
    pub fn add_after(mut self, target: &str, descriptor: PluginDescriptor) -> Self {
        let position = self
            .position(target)
            .map_or(self.descriptors.len(), |i| i + 1);
        self.descriptors.insert(position, descriptor);
        self
    }

    /// Removes every plugin named `name`. No-op if there is none.
    #[must_use]
    pub fn disable(mut self, name: &str) -> Self {
        self.descriptors.retain(|d| d.name() != Some(name));
        self
    }

    /// Returns whether the group contains a plugin named `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Returns the number of plugins in the group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns true if the group contains no plugins.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Consumes the builder, returning the descriptors in order.
    #[must_use]
    pub fn into_descriptors(self) -> Vec<PluginDescriptor> {
        self.descriptors
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.descriptors.iter().position(|d| d.name() == Some(name))
    }
}

impl PluginGroup for PluginGroupBuilder {
    fn build(self) -> PluginGroupBuilder {
        self
    }
}

impl IntoIterator for PluginGroupBuilder {
    type Item = PluginDescriptor;
    type IntoIter = std::vec::IntoIter<PluginDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityTable;
    use crate::registration::{BoxFuture, PluginError, Registration};
    use serde_json::Value;

    struct Noop;

    impl Registration for Noop {
        fn register<'a>(
            &'a self,
            _options: &'a Value,
            _dependencies: &'a CapabilityTable,
        ) -> BoxFuture<'a, Result<(), PluginError>> {
            Box::pin(async { Ok(()) })
        }

        fn execute(&self, _args: Value) -> Result<Value, PluginError> {
            Ok(Value::Null)
        }
    }

    fn plugin(name: &str) -> PluginDescriptor {
        PluginDescriptor::new(name, Noop)
    }

    fn names(builder: &PluginGroupBuilder) -> Vec<&str> {
        builder
            .descriptors
            .iter()
            .map(|d| d.name().unwrap_or("<anonymous>"))
            .collect()
    }

    #[test]
    fn plugin_group_builder_add() {
        let builder = PluginGroupBuilder::new().add(plugin("a")).add(plugin("b"));
        assert_eq!(builder.len(), 2);
        assert_eq!(names(&builder), vec!["a", "b"]);
    }

    #[test]
    fn plugin_group_builder_disable() {
        let builder = PluginGroupBuilder::new()
            .add(plugin("a"))
            .add(plugin("b"))
            .disable("a");

        assert_eq!(names(&builder), vec!["b"]);
        assert!(!builder.contains("a"));
    }

    #[test]
    fn plugin_group_builder_add_before() {
        let builder = PluginGroupBuilder::new()
            .add(plugin("a"))
            .add(plugin("b"))
            .add_before("b", plugin("c"));

        assert_eq!(names(&builder), vec!["a", "c", "b"]);
    }

    #[test]
    fn plugin_group_builder_add_after() {
        let builder = PluginGroupBuilder::new()
            .add(plugin("a"))
            .add(plugin("b"))
            .add_after("a", plugin("c"));

        assert_eq!(names(&builder), vec!["a", "c", "b"]);
    }

    #[test]
    fn plugin_group_builder_add_before_not_found() {
        let builder = PluginGroupBuilder::new()
            .add(plugin("a"))
            .add_before("b", plugin("c"));

        assert_eq!(names(&builder), vec!["c", "a"]);
    }

    #[test]
    fn plugin_group_builder_add_after_not_found() {
        let builder = PluginGroupBuilder::new()
            .add(plugin("a"))
            .add_after("b", plugin("c"));

        assert_eq!(names(&builder), vec!["a", "c"]);
    }

    struct BuiltIns;

    impl PluginGroup for BuiltIns {
        fn build(self) -> PluginGroupBuilder {
            PluginGroupBuilder::new().add(plugin("a")).add(plugin("b"))
        }
    }

    #[test]
    fn plugin_group_build_and_merge() {
        let builder = PluginGroupBuilder::new()
            .add(plugin("custom"))
            .add_group(BuiltIns);

        assert_eq!(names(&builder), vec!["custom", "a", "b"]);
    }

    #[test]
    fn plugin_group_disable_nonexistent_is_noop() {
        let builder = PluginGroupBuilder::new().add(plugin("a")).disable("zzz");
        assert_eq!(builder.len(), 1);
    }

    #[test]
    fn plugin_group_keeps_anonymous_descriptors() {
        let builder = PluginGroupBuilder::new()
            .add(PluginDescriptor::empty().with_registration(Noop))
            .disable("a");

        assert_eq!(names(&builder), vec!["<anonymous>"]);
    }

    #[test]
    fn plugin_group_into_descriptors() {
        let descriptors = PluginGroupBuilder::new()
            .add(plugin("a"))
            .add(plugin("b"))
            .into_descriptors();

        assert_eq!(descriptors.len(), 2);
        assert_eq!(descriptors[1].name(), Some("b"));

        let empty = PluginGroupBuilder::new();
        assert!(empty.is_empty());
        assert_eq!(empty.into_iter().count(), 0);
    }
}
