#[cfg(test)]
#[path = "../tests/unit/result_test.rs"]
mod result_test;

use crate::events::TimeBreakdown;
use touropt_core::prelude::*;

/// Per element details of one route stop.
#[derive(Clone, Debug)]
pub struct ElementReport {
    /// Id of the visited node.
    pub id: String,
    /// Arrival time at the node.
    pub arrival: Timestamp,
    /// Departure time from the node.
    pub departure: Timestamp,
    /// The effective visit duration.
    pub duration: Duration,
    /// Whether the collapsed joint duration was applied.
    pub is_joint: bool,
    /// Violations attributed to this element.
    pub violations: Vec<Violation>,
}

/// Per route details of the final solution.
#[derive(Clone, Debug)]
pub struct RouteReport {
    /// Id of the serving resource.
    pub resource_id: String,
    /// Index of the claimed working hours window.
    pub window_idx: usize,
    /// Schedule of the start anchor.
    pub start: Schedule,
    /// Schedule of the termination anchor.
    pub termination: Schedule,
    /// Aggregated time and distance breakdown of the route.
    pub times: TimeBreakdown,
    /// Scalar cost of the route.
    pub cost: Cost,
    /// Violations not attributed to a single element.
    pub violations: Vec<Violation>,
    /// Visited elements in execution order.
    pub elements: Vec<ElementReport>,
}

/// A read-only view over the final solution: route and element details, violations and the
/// set of unassigned nodes.
pub struct OptimizationResult {
    entity: Entity,
    evaluation: Evaluation,
}

impl OptimizationResult {
    pub(crate) fn new(entity: Entity, evaluation: Evaluation) -> Self {
        Self { entity, evaluation }
    }

    /// Returns the total solution cost, including skip penalties of unassigned nodes.
    pub fn cost(&self) -> Cost {
        self.evaluation.cost
    }

    /// Returns ids of nodes left unassigned, sorted for stable output.
    pub fn unassigned(&self) -> Vec<String> {
        let mut ids = self.entity.unassigned.iter().cloned().collect::<Vec<_>>();
        ids.sort();
        ids
    }

    /// Returns violations not attached to any route, e.g. unassigned mandatory nodes.
    pub fn global_violations(&self) -> &[Violation] {
        &self.evaluation.violations
    }

    /// Returns the underlying entity.
    pub fn entity(&self) -> &Entity {
        &self.entity
    }

    /// Builds per route reports for all routes with at least one visit.
    pub fn routes(&self) -> Vec<RouteReport> {
        self.entity
            .routes
            .iter()
            .filter(|route| !route.visits.is_empty())
            .map(|route| {
                let elements = route
                    .visits
                    .iter()
                    .map(|visit| ElementReport {
                        id: visit.node.id.clone(),
                        arrival: visit.schedule.arrival,
                        departure: visit.schedule.departure,
                        duration: visit.duration,
                        is_joint: visit.is_joint,
                        violations: route
                            .costs
                            .violations
                            .iter()
                            .filter(|violation| violation.element_id.as_deref() == Some(visit.node.id.as_str()))
                            .cloned()
                            .collect(),
                    })
                    .collect();

                RouteReport {
                    resource_id: route.resource.id.clone(),
                    window_idx: route.window_idx,
                    start: route.start.clone(),
                    termination: route.termination.clone(),
                    times: TimeBreakdown {
                        productive: route.costs.productive_time,
                        idle: route.costs.idle_time,
                        flex: route.costs.flex_time,
                        transit: route.costs.transit_time,
                        termination_transit: route.costs.termination_transit_time,
                        distance: route.costs.distance,
                    },
                    cost: route.costs.cost,
                    violations: route
                        .costs
                        .violations
                        .iter()
                        .filter(|violation| violation.element_id.is_none())
                        .cloned()
                        .collect(),
                    elements,
                }
            })
            .collect()
    }
}
