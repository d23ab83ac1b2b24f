#[cfg(test)]
#[path = "../tests/unit/builder_test.rs"]
mod builder_test;

use crate::events::{ErrorEvent, EventConsumers, ProgressEvent, StatusEvent, WarningEvent};
use crate::runner::{InitialSolution, Optimization};
use rustc_hash::FxHashSet;
use std::sync::Arc;
use touropt_core::prelude::*;

/// Provides a configurable way to assemble an optimization request.
///
/// Elements may be added in several rounds, e.g. when reassigning on top of a prior solution;
/// an element whose id is already taken is rejected and returned to the caller instead of
/// failing the whole round.
pub struct OptimizationBuilder {
    nodes: Vec<Arc<Node>>,
    resources: Vec<Arc<Resource>>,
    known_ids: FxHashSet<String>,
    connector: Option<NodeConnector>,
    scheme: Arc<dyn OptimizationScheme>,
    properties: Properties,
    environment: Arc<Environment>,
    initial: Option<InitialSolution>,
    consumers: EventConsumers,
}

impl Default for OptimizationBuilder {
    fn default() -> Self {
        Self {
            nodes: vec![],
            resources: vec![],
            known_ids: FxHashSet::default(),
            connector: None,
            scheme: Arc::new(DefaultScheme),
            properties: Properties::default(),
            environment: Arc::new(Environment::default()),
            initial: None,
            consumers: EventConsumers::default(),
        }
    }
}

impl OptimizationBuilder {
    /// Creates a builder with the default scheme and a flat earth fallback connector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds nodes, returning those rejected because their id is already taken.
    pub fn add_nodes(&mut self, nodes: Vec<Arc<Node>>) -> Vec<Arc<Node>> {
        let mut rejected = vec![];
        for node in nodes {
            if self.known_ids.insert(node.id.clone()) {
                self.nodes.push(node);
            } else {
                rejected.push(node);
            }
        }

        rejected
    }

    /// Adds resources, returning those rejected because their id is already taken.
    pub fn add_resources(&mut self, resources: Vec<Arc<Resource>>) -> Vec<Arc<Resource>> {
        let mut rejected = vec![];
        for resource in resources {
            if self.known_ids.insert(resource.id.clone()) {
                self.resources.push(resource);
            } else {
                rejected.push(resource);
            }
        }

        rejected
    }

    /// Sets the connector holding explicit edges and the backup estimator.
    pub fn with_connector(&mut self, connector: NodeConnector) -> &mut Self {
        self.connector = Some(connector);
        self
    }

    /// Swaps the optimization scheme wholesale.
    /// Default is the built-in scheme.
    pub fn with_scheme(&mut self, scheme: Arc<dyn OptimizationScheme>) -> &mut Self {
        self.scheme = scheme;
        self
    }

    /// Sets an explicit engine property, overriding scheme and built-in defaults.
    pub fn with_property(&mut self, key: &str, value: &str) -> &mut Self {
        self.properties.set(key, value);
        self
    }

    /// Sets the execution environment (random generator, logger, parallelism).
    pub fn with_environment(&mut self, environment: Arc<Environment>) -> &mut Self {
        self.environment = environment;
        self
    }

    /// Sets a prior solution. Construction is skipped and heuristic stages start from the
    /// supplied assignment; elements it references must be added through the builder as usual.
    pub fn with_initial_solution(&mut self, solution: InitialSolution) -> &mut Self {
        self.initial = Some(solution);
        self
    }

    /// Registers a progress stream consumer. Consumers must be registered before the run
    /// starts; within one stream they observe events in publication order.
    pub fn on_progress<F: Fn(&ProgressEvent) + Send + 'static>(&mut self, consumer: F) -> &mut Self {
        self.consumers.progress.push(Box::new(consumer));
        self
    }

    /// Registers a status stream consumer.
    pub fn on_status<F: Fn(&StatusEvent) + Send + 'static>(&mut self, consumer: F) -> &mut Self {
        self.consumers.status.push(Box::new(consumer));
        self
    }

    /// Registers a warning stream consumer.
    pub fn on_warning<F: Fn(&WarningEvent) + Send + 'static>(&mut self, consumer: F) -> &mut Self {
        self.consumers.warning.push(Box::new(consumer));
        self
    }

    /// Registers an error stream consumer.
    pub fn on_error<F: Fn(&ErrorEvent) + Send + 'static>(&mut self, consumer: F) -> &mut Self {
        self.consumers.error.push(Box::new(consumer));
        self
    }

    /// Builds the request with parameters specified.
    pub fn build(&mut self) -> GenericResult<Optimization> {
        if self.nodes.is_empty() {
            return Err("cannot optimize without nodes".into());
        }

        let connector = self
            .connector
            .take()
            .unwrap_or_else(|| NodeConnector::new(Arc::new(FlatEarthConnector::default())));

        Ok(Optimization {
            nodes: std::mem::take(&mut self.nodes),
            resources: std::mem::take(&mut self.resources),
            connector: Arc::new(connector),
            scheme: self.scheme.clone(),
            properties: std::mem::take(&mut self.properties),
            environment: self.environment.clone(),
            initial: self.initial.take(),
            consumers: std::mem::take(&mut self.consumers),
        })
    }
}
