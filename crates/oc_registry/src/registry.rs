use std::sync::Arc;

use oc_core::RegistryConfig;
use oc_events::EventsHandler;
use oc_plugins::prelude::*;
use serde_json::{Value, json};

use crate::error::RegistryError;
use crate::events;

/// Lifecycle of a [`Registry`].
///
/// Progresses linearly: `Pending` → `Started` | `Failed` → `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    /// Accepting plugin descriptors.
    #[default]
    Pending,
    /// Plugins are initialized and the capability table is available.
    Started,
    /// Initialization was attempted and failed.
    Failed,
    /// [`Registry::close`] was called.
    Closed,
}

/// A component registry instance.
///
/// Owns its configuration, the plugin descriptors queued for start, the
/// capability table once started, and the event bus its lifecycle is
/// announced on.
pub struct Registry {
    config: RegistryConfig,
    events: Arc<EventsHandler>,
    pending: Vec<PluginDescriptor>,
    plugins: Option<CapabilityTable>,
    state: State,
}

impl core::fmt::Debug for Registry {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Registry")
            .field("config", &self.config)
            .field("state", &self.state)
            .field("pending", &self.pending.len())
            .field("plugins", &self.plugins.as_ref().map(CapabilityTable::names))
            .finish_non_exhaustive()
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new(RegistryConfig::default())
    }
}

impl Registry {
    /// Creates a registry with its own event bus.
    #[must_use]
    pub fn new(config: RegistryConfig) -> Self {
        Self::with_events(config, Arc::new(EventsHandler::new()))
    }

    /// Creates a registry that announces its lifecycle on `events`.
    #[must_use]
    pub fn with_events(config: RegistryConfig, events: Arc<EventsHandler>) -> Self {
        Self {
            config,
            events,
            pending: Vec::new(),
            plugins: None,
            state: State::Pending,
        }
    }

    /// The registry configuration.
    #[must_use]
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// The event bus lifecycle events are fired on.
    #[must_use]
    pub fn events(&self) -> &Arc<EventsHandler> {
        &self.events
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Plugin Management
    // ─────────────────────────────────────────────────────────────────────────

    /// Queues a plugin for initialization.
    ///
    /// Descriptors are validated when the registry starts, not here.
    ///
    /// # Errors
    ///
    /// [`RegistryError::AlreadyStarted`] once [`start`](Self::start) was
    /// called, [`RegistryError::Closed`] after [`close`](Self::close).
    pub fn register(&mut self, descriptor: PluginDescriptor) -> Result<&mut Self, RegistryError> {
        self.ensure_pending()?;
        tracing::debug!(plugin = descriptor.name().unwrap_or("<anonymous>"), "plugin queued");
        self.pending.push(descriptor);
        Ok(self)
    }

    /// Queues every descriptor of `group`, in group order.
    ///
    /// # Errors
    ///
    /// Same as [`register`](Self::register).
    pub fn register_group(&mut self, group: impl PluginGroup) -> Result<&mut Self, RegistryError> {
        self.ensure_pending()?;
        let descriptors = group.build().into_descriptors();
        tracing::debug!(count = descriptors.len(), "plugin group queued");
        self.pending.extend(descriptors);
        Ok(self)
    }

    /// Subscribes `handler` to a lifecycle event.
    pub fn on<F>(&self, event: impl Into<String>, handler: F) -> &Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        self.events.on(event, handler);
        self
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lifecycle
    // ─────────────────────────────────────────────────────────────────────────

    /// Initializes every queued plugin and exposes their capabilities.
    ///
    /// Runs under the configured plugin timeout. On success fires
    /// [`events::START`]; on failure fires [`events::ERROR`] and leaves the
    /// registry without plugins.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Plugins`] with the initialization failure, or a
    /// lifecycle error if the registry is not pending.
    pub async fn start(&mut self) -> Result<&CapabilityTable, RegistryError> {
        self.ensure_pending()?;

        let descriptors = core::mem::take(&mut self.pending);
        tracing::info!(plugins = descriptors.len(), "starting registry");

        let initializer =
            PluginInitializer::new().with_optional_timeout(self.config.plugin_timeout());

        match initializer.initialize(descriptors).await {
            Ok(table) => {
                self.state = State::Started;
                self.events.fire(events::START, &events::start_payload(&table));
                tracing::info!(plugins = table.len(), "registry started");
                Ok(&*self.plugins.insert(table))
            }
            Err(err) => {
                self.state = State::Failed;
                tracing::error!(error = %err, kind = err.kind(), "registry failed to start");
                self.events.fire(events::ERROR, &events::error_payload(&err));
                Err(err.into())
            }
        }
    }

    /// The capability table, once started.
    #[must_use]
    pub fn plugins(&self) -> Option<&CapabilityTable> {
        self.plugins.as_ref()
    }

    /// Returns true once plugins are initialized and until the registry is closed.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.state == State::Started
    }

    /// Number of plugins queued and not yet started.
    #[must_use]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Shuts the registry down.
    ///
    /// Fires [`events::STOP`], drops the capability table and every event
    /// subscription. Closing twice is a no-op.
    pub fn close(&mut self) {
        if self.state == State::Closed {
            return;
        }
        self.events.fire(events::STOP, &json!({}));
        self.plugins = None;
        self.pending.clear();
        self.events.reset();
        self.state = State::Closed;
        tracing::info!("registry closed");
    }

    fn ensure_pending(&self) -> Result<(), RegistryError> {
        match self.state {
            State::Pending => Ok(()),
            State::Started | State::Failed => Err(RegistryError::AlreadyStarted),
            State::Closed => Err(RegistryError::Closed),
        }
    }
}
