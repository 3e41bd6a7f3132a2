//! Shared test utilities for `oc_plugins` integration tests.
//!
//! Import via `mod test_utils;` in test files.

#![allow(
    dead_code,
    missing_docs,
    reason = "shared test utilities, not all items used in every test binary"
)]

use core::time::Duration;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use oc_plugins::prelude::*;
use parking_lot::Mutex;
use serde_json::Value;

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT LOG
// ═══════════════════════════════════════════════════════════════════════════════

/// What happened to a plugin, in the order the scheduler caused it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// `register` was invoked.
    Started(String),
    /// The registration future completed successfully.
    Finished(String),
}

/// Shared, ordered record of registration events.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<Event>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.events.lock().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().clone()
    }

    /// Position of the first matching event.
    pub fn position(&self, event: &Event) -> Option<usize> {
        self.events.lock().iter().position(|e| e == event)
    }

    /// Number of times `register` was invoked for `name`.
    pub fn starts(&self, name: &str) -> usize {
        self.events
            .lock()
            .iter()
            .filter(|e| matches!(e, Event::Started(n) if n == name))
            .count()
    }

    /// Asserts that `dependency` finished before `dependent` started.
    pub fn assert_finished_before_started(&self, dependency: &str, dependent: &str) {
        let finished = self
            .position(&Event::Finished(dependency.to_owned()))
            .unwrap_or_else(|| panic!("{dependency} never finished"));
        let started = self
            .position(&Event::Started(dependent.to_owned()))
            .unwrap_or_else(|| panic!("{dependent} never started"));
        assert!(
            finished < started,
            "{dependency} finished at {finished} but {dependent} started at {started}"
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TRACKED PLUGIN
// ═══════════════════════════════════════════════════════════════════════════════

/// Plugin that records its registration in an [`EventLog`].
///
/// `execute` returns the plugin's name once registered, and fails before.
pub struct Tracked {
    name: String,
    dependencies: Vec<String>,
    log: EventLog,
    delay: Option<Duration>,
    failure: Option<String>,
    registered: AtomicBool,
    seen_dependencies: Mutex<Vec<String>>,
}

impl Tracked {
    pub fn new(name: &str, dependencies: &[&str], log: &EventLog) -> Self {
        Self {
            name: name.to_owned(),
            dependencies: dependencies.iter().map(|d| (*d).to_owned()).collect(),
            log: log.clone(),
            delay: None,
            failure: None,
            registered: AtomicBool::new(false),
            seen_dependencies: Mutex::new(Vec::new()),
        }
    }

    /// Suspends registration for `delay` before completing.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Makes registration fail with `message`.
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_owned());
        self
    }

    pub fn descriptor(self) -> PluginDescriptor {
        let name = self.name.clone();
        PluginDescriptor::new(name, self)
    }
}

impl Registration for Tracked {
    fn register<'a>(
        &'a self,
        _options: &'a Value,
        dependencies: &'a CapabilityTable,
    ) -> BoxFuture<'a, Result<(), PluginError>> {
        self.log.push(Event::Started(self.name.clone()));
        Box::pin(async move {
            // Every injected capability must already be callable.
            for (name, capability) in dependencies.iter() {
                capability.call(Value::Null)?;
                self.seen_dependencies.lock().push(name.to_owned());
            }

            match self.delay {
                Some(delay) => tokio::time::sleep(delay).await,
                None => tokio::task::yield_now().await,
            }

            if let Some(message) = &self.failure {
                return Err(PluginError::from(message.clone()));
            }

            self.registered.store(true, Ordering::SeqCst);
            self.log.push(Event::Finished(self.name.clone()));
            Ok(())
        })
    }

    fn execute(&self, _args: Value) -> Result<Value, PluginError> {
        if !self.registered.load(Ordering::SeqCst) {
            return Err(format!("{} called before registration", self.name).into());
        }
        Ok(Value::String(self.name.clone()))
    }

    fn dependencies(&self) -> Vec<String> {
        self.dependencies.clone()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// MINIMAL PLUGINS
// ═══════════════════════════════════════════════════════════════════════════════

/// Plugin whose registration and execution always succeed.
pub struct Noop {
    dependencies: Vec<String>,
}

impl Noop {
    pub fn new(dependencies: &[&str]) -> Self {
        Self {
            dependencies: dependencies.iter().map(|d| (*d).to_owned()).collect(),
        }
    }
}

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

    fn dependencies(&self) -> Vec<String> {
        self.dependencies.clone()
    }
}

/// Plugin whose registration never completes.
pub struct Hanging;

impl Registration for Hanging {
    fn register<'a>(
        &'a self,
        _options: &'a Value,
        _dependencies: &'a CapabilityTable,
    ) -> BoxFuture<'a, Result<(), PluginError>> {
        Box::pin(futures::future::pending())
    }

    fn execute(&self, _args: Value) -> Result<Value, PluginError> {
        Ok(Value::Null)
    }
}
