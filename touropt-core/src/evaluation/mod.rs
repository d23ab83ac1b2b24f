//! The cost and restriction evaluation pipeline: scores an entity and detects violations.

#[cfg(test)]
#[path = "../../tests/unit/evaluation/pipeline_test.rs"]
mod pipeline_test;

mod restrictions;
pub use self::restrictions::*;

mod scheduling;
pub use self::scheduling::{effective_window, schedule_route};

use crate::config::{keys, Config};
use crate::connector::NodeConnector;
use crate::models::common::Cost;
use crate::models::solution::{Entity, Route, RouteCosts, Violation, ViolationCategory, Visit};
use crate::utils::GenericResult;
use std::sync::Arc;

/// Pre-resolved cost weights, looked up once to keep the scoring loop free of string parsing.
#[derive(Clone, Copy, Debug)]
pub struct CostWeights {
    /// Weight per emitted CO2 unit.
    pub co2: f64,
    /// Cost per unqualified zone crossing.
    pub zone_crossing: f64,
    /// Skip penalty weight per unit of node importance.
    pub skip_penalty: f64,
    /// Weight of magnetic constraint violations.
    pub magnetic: f64,
    /// Weight of first/last position preferences.
    pub position: f64,
}

impl CostWeights {
    /// Resolves weights from the given config.
    pub fn from_config(config: &Config) -> GenericResult<Self> {
        Ok(Self {
            co2: config.get_f64(keys::COST_CO2_WEIGHT)?,
            zone_crossing: config.get_f64(keys::COST_ZONE_CROSSING)?,
            skip_penalty: config.get_f64(keys::COST_SKIP_PENALTY)?,
            magnetic: config.get_f64(keys::COST_MAGNETIC_WEIGHT)?,
            position: config.get_f64(keys::COST_POSITION_WEIGHT)?,
        })
    }
}

/// A read-only view over one node visit in its route context, handed to node level restrictions.
pub struct NodeContext<'a> {
    /// The route owning the visit.
    pub route: &'a Route,
    /// Index of the visit within the route.
    pub visit_idx: usize,
    /// The previous visit, if any.
    pub previous: Option<&'a Visit>,
    /// Resolved cost weights.
    pub weights: &'a CostWeights,
    /// The shared configuration property provider.
    pub properties: &'a Config,
}

impl NodeContext<'_> {
    /// Returns the inspected visit.
    pub fn visit(&self) -> &Visit {
        &self.route.visits[self.visit_idx]
    }
}

/// A read-only view over a whole route, handed to route level restrictions.
pub struct RouteContext<'a> {
    /// The inspected route.
    pub route: &'a Route,
    /// Resolved cost weights.
    pub weights: &'a CostWeights,
    /// The shared configuration property provider.
    pub properties: &'a Config,
}

/// Inspects one node visit in context and accumulates an incremental cost or violation.
///
/// Implementations must be side-effect-free except for the accumulator passed to them and must
/// not retain references across calls. A returned error is fatal for the whole run: there is no
/// per-restriction isolation in the hot scoring loop.
pub trait NodeRestriction {
    /// Evaluates one node visit.
    fn evaluate(&self, ctx: &NodeContext<'_>, acc: &mut RouteCosts) -> GenericResult<()>;
}

/// Inspects a whole route and accumulates an incremental cost or violation. Failure semantics
/// as for [NodeRestriction].
pub trait RouteRestriction {
    /// Evaluates a route.
    fn evaluate(&self, ctx: &RouteContext<'_>, acc: &mut RouteCosts) -> GenericResult<()>;
}

/// The outcome of scoring an entity.
#[derive(Clone, Debug, Default)]
pub struct Evaluation {
    /// The scalar solution cost.
    pub cost: Cost,
    /// Violations which are not attached to any route, e.g. unassigned mandatory nodes.
    pub violations: Vec<Violation>,
}

/// Evaluates entities with built-in restrictions plus caller injected custom restrictions.
/// Costs of all firing restrictions are additive; no restriction short-circuits another.
pub struct Pipeline {
    connector: Arc<NodeConnector>,
    config: Config,
    weights: CostWeights,
    node_restrictions: Vec<Arc<dyn NodeRestriction + Send + Sync>>,
    route_restrictions: Vec<Arc<dyn RouteRestriction + Send + Sync>>,
}

impl Pipeline {
    /// Returns the connector used for scheduling.
    pub fn connector(&self) -> &Arc<NodeConnector> {
        &self.connector
    }

    /// Returns the configuration view.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Schedules and scores the given entity, rewriting every route accumulator.
    pub fn evaluate(&self, entity: &mut Entity) -> GenericResult<Evaluation> {
        let mut evaluation = Evaluation::default();

        for route in entity.routes.iter_mut() {
            schedule_route(route, &self.connector);

            // the accumulator is detached so that contexts expose an immutable route view
            let mut acc = std::mem::take(&mut route.costs);

            for visit_idx in 0..route.visits.len() {
                let ctx = NodeContext {
                    route,
                    visit_idx,
                    previous: visit_idx.checked_sub(1).and_then(|idx| route.visits.get(idx)),
                    weights: &self.weights,
                    properties: &self.config,
                };

                for restriction in &self.node_restrictions {
                    restriction.evaluate(&ctx, &mut acc)?;
                }
            }

            let ctx = RouteContext { route, weights: &self.weights, properties: &self.config };
            for restriction in &self.route_restrictions {
                restriction.evaluate(&ctx, &mut acc)?;
            }

            evaluation.cost += acc.cost;
            route.costs = acc;
        }

        self.score_unassigned(entity, &mut evaluation);

        Ok(evaluation)
    }

    fn score_unassigned(&self, entity: &Entity, evaluation: &mut Evaluation) {
        for id in entity.unassigned.iter() {
            let Some(node) = entity.get_element(id).and_then(|element| element.as_node()) else { continue };

            let penalty = self.weights.skip_penalty * node.importance;
            if node.optional {
                evaluation.cost += penalty;
            } else {
                // a mandatory node outside of any route makes the solution infeasible
                evaluation.cost += penalty * 100.;
                evaluation.violations.push(Violation::for_element(
                    id,
                    ViolationCategory::Constraint,
                    codes::UNASSIGNED_MANDATORY,
                    format!("mandatory node '{id}' is not assigned to any route"),
                    node.importance,
                ));
            }
        }
    }
}

/// Assembles a [Pipeline] from built-in restrictions and caller injected custom ones.
pub struct PipelineBuilder {
    connector: Arc<NodeConnector>,
    config: Config,
    node_restrictions: Vec<Arc<dyn NodeRestriction + Send + Sync>>,
    route_restrictions: Vec<Arc<dyn RouteRestriction + Send + Sync>>,
}

impl PipelineBuilder {
    /// Creates a builder with built-in restrictions already registered.
    pub fn new(connector: Arc<NodeConnector>, config: Config) -> Self {
        Self {
            connector,
            config,
            node_restrictions: vec![
                Arc::new(TimeWindowRestriction),
                Arc::new(ElementConstraintRestriction),
                Arc::new(RoutePositionRestriction),
            ],
            route_restrictions: vec![
                Arc::new(OperatingCostRestriction),
                Arc::new(ResourceConstraintRestriction),
                Arc::new(CapacityRestriction),
                Arc::new(TravelBudgetRestriction),
                Arc::new(Co2Restriction),
            ],
        }
    }

    /// Registers a custom node level restriction.
    pub fn add_node_restriction<T: NodeRestriction + Send + Sync + 'static>(&mut self, restriction: T) -> &mut Self {
        self.node_restrictions.push(Arc::new(restriction));
        self
    }

    /// Registers a custom route level restriction.
    pub fn add_route_restriction<T: RouteRestriction + Send + Sync + 'static>(&mut self, restriction: T) -> &mut Self {
        self.route_restrictions.push(Arc::new(restriction));
        self
    }

    /// Builds the pipeline.
    pub fn build(self) -> GenericResult<Pipeline> {
        let weights = CostWeights::from_config(&self.config)?;

        Ok(Pipeline {
            connector: self.connector,
            config: self.config,
            weights,
            node_restrictions: self.node_restrictions,
            route_restrictions: self.route_restrictions,
        })
    }
}
