//! Publish/subscribe event bus for the registry.
//!
//! [`EventsHandler`] maps event names to subscribed handlers. It is an owned
//! value: whoever needs to publish or subscribe receives a reference (usually
//! an `Arc<EventsHandler>`), and [`reset`](EventsHandler::reset) drops every
//! subscription explicitly. There is no process-wide instance.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use oc_events::EventsHandler;
//! use serde_json::json;
//!
//! let events = EventsHandler::new();
//! let requests = Arc::new(AtomicUsize::new(0));
//!
//! let counter = Arc::clone(&requests);
//! events.on("request", move |_data| {
//!     counter.fetch_add(1, Ordering::SeqCst);
//! });
//!
//! events.fire("request", &json!({ "url": "/hello-world" }));
//! events.fire("unrelated", &json!({}));
//!
//! assert_eq!(requests.load(Ordering::SeqCst), 1);
//! ```

use core::fmt;
use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use serde_json::Value;

/// A subscribed event handler.
pub type EventHandler = Arc<dyn Fn(&Value) + Send + Sync>;

/// Registry of event subscriptions.
///
/// # Thread Safety
///
/// Subscriptions live behind a [`RwLock`]. Handlers are invoked after the lock
/// is released, so a handler may itself subscribe, fire or reset.
#[derive(Default)]
pub struct EventsHandler {
    /// Maps event name to handlers in subscription order.
    subscriptions: RwLock<HashMap<String, Vec<EventHandler>>>,
}

impl fmt::Debug for EventsHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let subscriptions = self.subscriptions.read();
        let mut events: Vec<(&str, usize)> = subscriptions
            .iter()
            .map(|(name, handlers)| (name.as_str(), handlers.len()))
            .collect();
        events.sort_unstable();
        f.debug_struct("EventsHandler")
            .field("subscriptions", &events)
            .finish()
    }
}

impl EventsHandler {
    /// Creates an event bus with no subscriptions.
    #[must_use]
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
        }
    }

    /// Subscribes `handler` to `event`.
    ///
    /// Handlers of the same event run in subscription order.
    pub fn on<F>(&self, event: impl Into<String>, handler: F) -> &Self
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let event = event.into();
        tracing::trace!(%event, "subscribing event handler");
        self.subscriptions
            .write()
            .entry(event)
            .or_default()
            .push(Arc::new(handler));
        self
    }

    /// Invokes every handler subscribed to `event` with `data`.
    ///
    /// Returns the number of handlers invoked; firing an event nobody
    /// subscribed to is a no-op.
    pub fn fire(&self, event: &str, data: &Value) -> usize {
        let handlers: Vec<EventHandler> = match self.subscriptions.read().get(event) {
            Some(handlers) => handlers.clone(),
            None => return 0,
        };

        tracing::trace!(%event, handlers = handlers.len(), "firing event");
        for handler in &handlers {
            handler(data);
        }
        handlers.len()
    }

    /// Drops every subscription.
    pub fn reset(&self) {
        self.subscriptions.write().clear();
    }

    /// Number of handlers subscribed to `event`.
    #[must_use]
    pub fn subscriber_count(&self, event: &str) -> usize {
        self.subscriptions.read().get(event).map_or(0, Vec::len)
    }

    /// Returns true if nothing is subscribed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.read().values().all(Vec::is_empty)
    }
}
