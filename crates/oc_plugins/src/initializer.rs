//! Dependency-ordered plugin initialization.
//!
//! [`PluginInitializer`] takes an ordered sequence of [`PluginDescriptor`]s and
//! brings every plugin to the ready state exactly once:
//!
//! 1. **Validation** - every descriptor must carry a name and a registration
//! 2. **Graph** - duplicate names and unknown dependencies are rejected
//! 3. **Cycles** - a depth-first traversal rejects circular dependencies
//! 4. **Resolution** - passes over the pending plugins register those whose
//!    dependencies are all ready, until none is left
//!
//! Nothing is registered unless steps 1 to 3 succeed for the whole input. The
//! input does not need to be dependency-sorted: a plugin listed before its
//! dependency simply registers in a later pass.
//!
//! # Example
//!
//! ```ignore
//! let plugins = PluginInitializer::new()
//!     .with_timeout(Duration::from_secs(30))
//!     .initialize(vec![
//!         PluginDescriptor::new("isFlagged", IsFlagged::default()),
//!         PluginDescriptor::new("getValue", GetValue::default())
//!             .with_options(json!({ "a": 123 })),
//!     ])
//!     .await?;
//!
//! let flagged = plugins.call("isFlagged", Value::Null)?;
//! ```

use core::time::Duration;
use std::sync::Arc;

use futures::StreamExt;
use futures::stream::FuturesUnordered;
use serde_json::Value;
use tokio::time::Instant;

use crate::capability::{Capability, CapabilityTable};
use crate::descriptor::PluginDescriptor;
use crate::error::InitError;
use crate::graph::DependencyGraph;
use crate::registration::Registration;

/// A descriptor that passed validation.
struct ValidPlugin {
    name: String,
    registration: Arc<dyn Registration>,
    options: Value,
}

/// Initializes plugins with the default settings (no timeout).
///
/// Shorthand for `PluginInitializer::new().initialize(descriptors)`.
pub async fn initialize<I>(descriptors: I) -> Result<CapabilityTable, InitError>
where
    I: IntoIterator<Item = PluginDescriptor>,
{
    PluginInitializer::new().initialize(descriptors).await
}

/// Schedules plugin registration in dependency order.
///
/// The initializer holds configuration only; every call to
/// [`initialize`](Self::initialize) is an independent run.
#[derive(Debug, Clone, Copy, Default)]
pub struct PluginInitializer {
    /// Deadline for the whole run, measured from its start.
    timeout: Option<Duration>,
}

impl PluginInitializer {
    /// Creates an initializer that waits indefinitely for registrations.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a run-scoped timeout.
    ///
    /// A registration still pending when the timeout elapses fails the run
    /// with [`InitError::Timeout`]. Requires a tokio runtime with the time
    /// driver enabled.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets or clears the run-scoped timeout.
    #[must_use]
    pub fn with_optional_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// The configured run-scoped timeout.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Validates, orders and registers all plugins.
    ///
    /// On success returns one capability per plugin, keyed by name.
    ///
    /// # Errors
    ///
    /// - [`InitError::InvalidPlugin`] if a descriptor lacks a name or a registration
    /// - [`InitError::DuplicateName`] if two descriptors share a name
    /// - [`InitError::UnknownDependency`] if a dependency names no descriptor
    /// - [`InitError::DependencyCycle`] if the dependencies form a cycle
    /// - [`InitError::Registration`] if a plugin's `register` fails
    /// - [`InitError::Timeout`] if the configured timeout elapses
    /// - [`InitError::Stalled`] if resolution stops making progress
    pub async fn initialize<I>(&self, descriptors: I) -> Result<CapabilityTable, InitError>
    where
        I: IntoIterator<Item = PluginDescriptor>,
    {
        let plugins = validate(descriptors)?;

        let graph = DependencyGraph::new(
            plugins
                .iter()
                .map(|plugin| (plugin.name.clone(), plugin.registration.dependencies())),
        )
        .inspect_err(|err| tracing::error!(error = %err, "invalid plugin dependencies"))?;

        if let Some(cycle) = graph.find_cycle() {
            let err = InitError::DependencyCycle(cycle);
            tracing::error!(error = %err, "plugin dependency cycle");
            return Err(err);
        }

        self.resolve(&plugins, &graph).await
    }

    /// Runs resolution passes until every plugin is ready.
    async fn resolve(
        &self,
        plugins: &[ValidPlugin],
        graph: &DependencyGraph,
    ) -> Result<CapabilityTable, InitError> {
        // A timeout too large to represent as an instant never elapses.
        let deadline = self
            .timeout
            .and_then(|timeout| Some((Instant::now().checked_add(timeout)?, timeout)));
        let mut ready = vec![false; plugins.len()];
        let mut table = CapabilityTable::new();
        let mut pass = 0usize;

        while table.len() < plugins.len() {
            pass += 1;

            // Eligibility is decided against the readiness at the start of the pass.
            let eligible: Vec<usize> = (0..plugins.len())
                .filter(|&i| !ready[i] && graph.dependencies_of(i).iter().all(|&d| ready[d]))
                .collect();

            if eligible.is_empty() {
                let unresolved: Vec<String> = (0..plugins.len())
                    .filter(|&i| !ready[i])
                    .map(|i| plugins[i].name.clone())
                    .collect();
                tracing::error!(pass, ?unresolved, "plugin resolution made no progress");
                return Err(InitError::Stalled(unresolved));
            }

            tracing::debug!(pass, count = eligible.len(), "starting resolution pass");

            let dependencies: Vec<CapabilityTable> = eligible
                .iter()
                .map(|&i| table.subset(graph.dependency_names(i)))
                .collect();

            self.register_pass(plugins, &eligible, &dependencies, deadline)
                .await?;

            for &i in &eligible {
                let plugin = &plugins[i];
                ready[i] = true;
                table.insert(
                    &plugin.name,
                    Capability::new(&plugin.name, Arc::clone(&plugin.registration)),
                );
            }
        }

        tracing::info!(plugins = table.len(), passes = pass, "plugins initialized");
        Ok(table)
    }

    /// Registers the eligible plugins of one pass.
    ///
    /// `register` is invoked for each plugin in input order; the returned
    /// futures are then driven together. Returns on the first failure.
    async fn register_pass(
        &self,
        plugins: &[ValidPlugin],
        eligible: &[usize],
        dependencies: &[CapabilityTable],
        deadline: Option<(Instant, Duration)>,
    ) -> Result<(), InitError> {
        let mut in_flight: FuturesUnordered<_> = eligible
            .iter()
            .zip(dependencies)
            .map(|(&i, deps)| {
                let plugin = &plugins[i];
                tracing::debug!(plugin = %plugin.name, dependencies = deps.len(), "registering plugin");
                let registration = plugin.registration.register(&plugin.options, deps);
                async move { (i, registration.await) }
            })
            .collect();

        let mut pending: Vec<usize> = eligible.to_vec();

        loop {
            let next = match deadline {
                Some((deadline, timeout)) => {
                    match tokio::time::timeout_at(deadline, in_flight.next()).await {
                        Ok(next) => next,
                        Err(_) => {
                            let plugin = pending
                                .first()
                                .map(|&i| plugins[i].name.clone())
                                .unwrap_or_default();
                            tracing::error!(%plugin, ?timeout, "plugin registration timed out");
                            return Err(InitError::Timeout { plugin, timeout });
                        }
                    }
                }
                None => in_flight.next().await,
            };

            let Some((i, result)) = next else {
                return Ok(());
            };
            pending.retain(|&p| p != i);

            let name = &plugins[i].name;
            match result {
                Ok(()) => tracing::debug!(plugin = %name, "plugin ready"),
                Err(source) => {
                    tracing::error!(plugin = %name, error = %source, "plugin registration failed");
                    return Err(InitError::registration(name.clone(), source));
                }
            }
        }
    }
}

/// Checks every descriptor before anything is registered.
fn validate<I>(descriptors: I) -> Result<Vec<ValidPlugin>, InitError>
where
    I: IntoIterator<Item = PluginDescriptor>,
{
    descriptors
        .into_iter()
        .enumerate()
        .map(|(i, descriptor)| {
            let position = i + 1;
            match (
                descriptor.name().filter(|name| !name.is_empty()),
                descriptor.registration(),
            ) {
                (Some(name), Some(registration)) => Ok(ValidPlugin {
                    name: name.to_owned(),
                    registration: Arc::clone(registration),
                    options: descriptor.options(),
                }),
                _ => {
                    let id = descriptor.id(position);
                    tracing::error!(plugin = %id, "plugin descriptor is not valid");
                    Err(InitError::InvalidPlugin(id))
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::{BoxFuture, PluginError};

    struct Noop {
        dependencies: Vec<String>,
    }

    impl Noop {
        fn new(dependencies: &[&str]) -> Self {
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
            Ok(Value::Bool(true))
        }

        fn dependencies(&self) -> Vec<String> {
            self.dependencies.clone()
        }
    }

    #[test]
    fn initializer_defaults_to_no_timeout() {
        assert_eq!(PluginInitializer::new().timeout(), None);
    }

    #[test]
    fn initializer_with_timeout() {
        let initializer = PluginInitializer::new().with_timeout(Duration::from_secs(5));
        assert_eq!(initializer.timeout(), Some(Duration::from_secs(5)));

        let cleared = initializer.with_optional_timeout(None);
        assert_eq!(cleared.timeout(), None);
    }

    #[test]
    fn validate_stops_at_first_invalid_descriptor() {
        let err = validate(vec![
            PluginDescriptor::new("ok", Noop::new(&[])),
            PluginDescriptor::empty().with_name("broken"),
            PluginDescriptor::empty(),
        ])
        .err()
        .unwrap();

        assert_eq!(err.to_string(), "Plugin broken is not valid");
    }

    #[test]
    fn validate_defaults_options() {
        let plugins = validate(vec![PluginDescriptor::new("ok", Noop::new(&[]))])
            .ok()
            .unwrap();
        assert_eq!(plugins[0].options, serde_json::json!({}));
    }

    #[tokio::test]
    async fn empty_input_yields_empty_table() {
        let table = initialize(Vec::new()).await.unwrap();
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn table_order_follows_readiness() {
        let table = initialize(vec![
            PluginDescriptor::new("c", Noop::new(&["b"])),
            PluginDescriptor::new("b", Noop::new(&["a"])),
            PluginDescriptor::new("a", Noop::new(&[])),
        ])
        .await
        .unwrap();

        assert_eq!(table.names(), vec!["a", "b", "c"]);
    }
}
