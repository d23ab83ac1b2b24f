#[cfg(test)]
#[path = "../../../tests/unit/models/solution/route_test.rs"]
mod route_test;

use crate::models::common::{Cost, Distance, Duration, Schedule, TimeWindow};
use crate::models::element::{Node, Resource, WorkingHours};
use crate::models::solution::Violation;
use std::sync::Arc;

/// A single scheduled visit of a node within a route.
#[derive(Clone)]
pub struct Visit {
    /// The visited node.
    pub node: Arc<Node>,
    /// Arrival and departure at the node.
    pub schedule: Schedule,
    /// The effective visit duration, joint-collapsed if applicable.
    pub duration: Duration,
    /// Whether the joint duration was applied because the previous visit shares the location.
    pub is_joint: bool,
}

impl Visit {
    /// Creates an unscheduled visit for the given node.
    pub fn new(node: Arc<Node>) -> Self {
        Self { node, schedule: Schedule::new(0., 0.), duration: 0., is_joint: false }
    }
}

/// A running cost and violation accumulator of a route. Transit, idle, productive, flex and
/// termination transit times are tracked separately.
#[derive(Clone, Default)]
pub struct RouteCosts {
    /// Accumulated driving time between visits.
    pub transit_time: Duration,
    /// Accumulated waiting time.
    pub idle_time: Duration,
    /// Accumulated visit (service) time.
    pub productive_time: Duration,
    /// Accumulated slack within the working hours window.
    pub flex_time: Duration,
    /// Driving time of the final leg back to the termination anchor.
    pub termination_transit_time: Duration,
    /// Accumulated travel distance.
    pub distance: Distance,
    /// Accumulated scalar cost.
    pub cost: Cost,
    /// Violations recorded while scoring the route.
    pub violations: Vec<Violation>,
}

impl RouteCosts {
    /// Adds a cost amount to the accumulator.
    pub fn add_cost(&mut self, amount: Cost) {
        self.cost += amount;
    }

    /// Records a violation.
    pub fn add_violation(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    /// Returns total tracked working time of the route.
    pub fn total_time(&self) -> Duration {
        self.transit_time + self.idle_time + self.productive_time + self.termination_transit_time
    }

    /// Resets the accumulator before rescoring.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// An ordered assignment of nodes to one working hours window of one resource.
pub struct Route {
    /// The resource serving this route.
    pub resource: Arc<Resource>,
    /// Index of the claimed working hours window within the resource.
    pub window_idx: usize,
    /// Schedule of the start anchor.
    pub start: Schedule,
    /// Schedule of the termination anchor.
    pub termination: Schedule,
    /// Scheduled visits in execution order.
    pub visits: Vec<Visit>,
    /// Running cost and violation accumulator.
    pub costs: RouteCosts,
}

impl Route {
    /// Creates an empty route bound to the given resource working hours window.
    pub fn new(resource: Arc<Resource>, window_idx: usize) -> Self {
        debug_assert!(window_idx < resource.working_hours.len());

        let start = resource.working_hours[window_idx].window.start;
        Self {
            resource,
            window_idx,
            start: Schedule::new(start, start),
            termination: Schedule::new(start, start),
            visits: vec![],
            costs: RouteCosts::default(),
        }
    }

    /// Returns the working hours the route is bound to.
    pub fn working_hours(&self) -> &WorkingHours {
        &self.resource.working_hours[self.window_idx]
    }

    /// Returns the time window of the bound working hours.
    pub fn time_window(&self) -> &TimeWindow {
        &self.working_hours().window
    }

    /// Checks whether the route has a visit for the node with the given id.
    pub fn contains(&self, node_id: &str) -> bool {
        self.visits.iter().any(|visit| visit.node.id == node_id)
    }

    /// Returns an index of the node with the given id within the route, if present.
    pub fn index_of(&self, node_id: &str) -> Option<usize> {
        self.visits.iter().position(|visit| visit.node.id == node_id)
    }

    /// Removes a visit by node id, returning the node if it was present.
    pub fn remove(&mut self, node_id: &str) -> Option<Arc<Node>> {
        self.index_of(node_id).map(|idx| self.visits.remove(idx).node)
    }

    /// Returns a deep copy of the route.
    pub fn deep_copy(&self) -> Self {
        Self {
            resource: self.resource.clone(),
            window_idx: self.window_idx,
            start: self.start.clone(),
            termination: self.termination.clone(),
            visits: self.visits.clone(),
            costs: self.costs.clone(),
        }
    }
}
