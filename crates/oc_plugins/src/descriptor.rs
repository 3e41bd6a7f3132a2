//! Plugin descriptors, the scheduler's unit of input.

use core::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::registration::Registration;

/// How a descriptor is referred to in error messages.
///
/// Named descriptors use their name; anonymous ones their 1-based position in
/// the input sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DescriptorId {
    /// The descriptor's declared name.
    Name(String),
    /// 1-based position of an anonymous descriptor.
    Ordinal(usize),
}

impl fmt::Display for DescriptorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DescriptorId::Name(name) => f.write_str(name),
            DescriptorId::Ordinal(position) => write!(f, "{position}"),
        }
    }
}

/// Configuration of one plugin: its name, its registration and its options.
///
/// # Example
///
/// ```ignore
/// let descriptor = PluginDescriptor::new("getValue", GetValue::default())
///     .with_options(json!({ "a": 123, "b": 456 }));
/// ```
#[derive(Clone, Default)]
pub struct PluginDescriptor {
    name: Option<String>,
    registration: Option<Arc<dyn Registration>>,
    options: Option<Value>,
}

impl fmt::Debug for PluginDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDescriptor")
            .field("name", &self.name)
            .field("registration", &self.registration.is_some())
            .field("options", &self.options)
            .finish()
    }
}

impl PluginDescriptor {
    /// Creates a named descriptor with the given registration.
    #[must_use]
    pub fn new(name: impl Into<String>, registration: impl Registration) -> Self {
        Self {
            name: Some(name.into()),
            registration: Some(Arc::new(registration)),
            options: None,
        }
    }

    /// Creates an empty descriptor with neither name nor registration.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Sets the plugin name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the registration.
    #[must_use]
    pub fn with_registration(mut self, registration: impl Registration) -> Self {
        self.registration = Some(Arc::new(registration));
        self
    }

    /// Sets an already shared registration.
    #[must_use]
    pub fn with_shared_registration(mut self, registration: Arc<dyn Registration>) -> Self {
        self.registration = Some(registration);
        self
    }

    /// Sets the options passed verbatim to `register`.
    #[must_use]
    pub fn with_options(mut self, options: Value) -> Self {
        self.options = Some(options);
        self
    }

    /// The declared name, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The registration, if any.
    #[must_use]
    pub fn registration(&self) -> Option<&Arc<dyn Registration>> {
        self.registration.as_ref()
    }

    /// The options, defaulting to an empty object.
    #[must_use]
    pub fn options(&self) -> Value {
        self.options
            .clone()
            .unwrap_or_else(|| Value::Object(serde_json::Map::new()))
    }

    /// Identity used in error messages, given the 1-based position.
    #[must_use]
    pub fn id(&self, position: usize) -> DescriptorId {
        match self.name() {
            Some(name) if !name.is_empty() => DescriptorId::Name(name.to_owned()),
            _ => DescriptorId::Ordinal(position),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability::CapabilityTable;
    use crate::registration::{BoxFuture, PluginError};
    use serde_json::json;

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

    #[test]
    fn descriptor_id_display() {
        assert_eq!(DescriptorId::Name("getValue".into()).to_string(), "getValue");
        assert_eq!(DescriptorId::Ordinal(3).to_string(), "3");
    }

    #[test]
    fn named_descriptor() {
        let descriptor = PluginDescriptor::new("getValue", Noop);
        assert_eq!(descriptor.name(), Some("getValue"));
        assert!(descriptor.registration().is_some());
        assert_eq!(descriptor.id(1), DescriptorId::Name("getValue".into()));
    }

    #[test]
    fn anonymous_descriptor_uses_ordinal() {
        let descriptor = PluginDescriptor::empty().with_registration(Noop);
        assert_eq!(descriptor.id(4), DescriptorId::Ordinal(4));
    }

    #[test]
    fn empty_name_uses_ordinal() {
        let descriptor = PluginDescriptor::new("", Noop);
        assert_eq!(descriptor.id(2), DescriptorId::Ordinal(2));
    }

    #[test]
    fn options_default_to_empty_object() {
        let descriptor = PluginDescriptor::new("p", Noop);
        assert_eq!(descriptor.options(), json!({}));

        let descriptor = descriptor.with_options(json!({ "a": 123 }));
        assert_eq!(descriptor.options(), json!({ "a": 123 }));
    }

    #[test]
    fn debug_hides_registration() {
        let descriptor = PluginDescriptor::empty().with_name("doSomething");
        let debug = format!("{descriptor:?}");
        assert!(debug.contains("doSomething"));
        assert!(debug.contains("registration: false"));
    }
}
