#[cfg(test)]
#[path = "../../../tests/unit/models/element/node_test.rs"]
mod node_test;

use crate::models::common::{Duration, Load, Location, TimeWindow};
use crate::models::element::Constraint;
use crate::utils::{GenericError, GenericResult};
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// Pins a node to a fixed time window and, optionally, to a specific resource. Acts as a hard
/// anchor the solution must route around.
#[derive(Clone, Debug)]
pub struct PillarBinding {
    /// A fixed time window of the pillar.
    pub window: TimeWindow,
    /// An optional id of the resource the pillar is bound to.
    pub resource_id: Option<String>,
}

/// A unit of work to be visited or performed.
#[derive(Debug)]
pub struct Node {
    /// An unique element id.
    pub id: String,
    /// A geographical position. Absent for pure-event nodes.
    pub location: Option<Location>,
    /// Opening hour windows when the node can be visited.
    pub opening_hours: Vec<TimeWindow>,
    /// Visit duration.
    pub duration: Duration,
    /// A shorter duration used when the previous visit shares the same geolocation.
    pub joint_duration: Option<Duration>,
    /// Minimum visit duration.
    pub min_duration: Duration,
    /// Importance weight, used for skip-penalty and ordering preferences.
    pub importance: f64,
    /// A signed load vector: positive components are pickups, negative ones deliveries.
    pub load: Load,
    /// Whether the node may be excluded from the solution at a cost.
    pub optional: bool,
    /// Preference to be scheduled first in its route.
    pub prefer_first_in_route: bool,
    /// Preference to be scheduled last in its route.
    pub prefer_last_in_route: bool,
    /// Whether the visiting resource unloads everything at this node.
    pub unload_all: bool,
    /// Whether the route must return to its start after this node.
    pub return_to_start: bool,
    /// Whether an early arriving resource waits for the window to open instead of failing.
    pub wait_on_early_arrival: bool,
    /// Whether the visit duration may depend on the visiting resource efficiency.
    pub route_dependent_duration: bool,
    /// Extensible opaque metadata.
    pub extra_info: String,
    /// Qualification/zone codes of the node.
    pub qualifications: FxHashSet<String>,
    /// Constraints attached to this node.
    pub constraints: Vec<Constraint>,
    /// A pillar binding, if the node is a pillar.
    pub pillar: Option<PillarBinding>,
}

impl Node {
    /// Checks whether the node is a pure event without a geolocation.
    pub fn is_event(&self) -> bool {
        self.location.is_none()
    }

    /// Checks whether the node is a pillar.
    pub fn is_pillar(&self) -> bool {
        self.pillar.is_some()
    }

    /// Returns the effective visit duration given whether the previous visit shares the location.
    pub fn effective_duration(&self, is_joint: bool) -> Duration {
        let duration = if is_joint { self.joint_duration.unwrap_or(self.duration) } else { self.duration };
        duration.max(self.min_duration)
    }
}

/// Provides a way to build a [Node] using the builder pattern.
pub struct NodeBuilder(Node);

impl NodeBuilder {
    /// Creates a new builder for a node with the given id.
    pub fn new(id: &str) -> Self {
        Self(Node {
            id: id.to_string(),
            location: None,
            opening_hours: vec![],
            duration: 0.,
            joint_duration: None,
            min_duration: 0.,
            importance: 1.,
            load: Load::default(),
            optional: false,
            prefer_first_in_route: false,
            prefer_last_in_route: false,
            unload_all: false,
            return_to_start: false,
            wait_on_early_arrival: true,
            route_dependent_duration: false,
            extra_info: String::default(),
            qualifications: FxHashSet::default(),
            constraints: vec![],
            pillar: None,
        })
    }

    /// Sets node's location.
    pub fn location(mut self, location: Location) -> Self {
        self.0.location = Some(location);
        self
    }

    /// Adds an opening hours time window.
    pub fn add_opening_hours(mut self, window: TimeWindow) -> Self {
        self.0.opening_hours.push(window);
        self
    }

    /// Sets visit duration.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.0.duration = duration;
        self
    }

    /// Sets joint visit duration used when the previous visit shares the geolocation.
    pub fn joint_duration(mut self, duration: Duration) -> Self {
        self.0.joint_duration = Some(duration);
        self
    }

    /// Sets minimum visit duration.
    pub fn min_duration(mut self, duration: Duration) -> Self {
        self.0.min_duration = duration;
        self
    }

    /// Sets importance weight.
    pub fn importance(mut self, importance: f64) -> Self {
        self.0.importance = importance;
        self
    }

    /// Sets the load vector.
    pub fn load(mut self, load: Load) -> Self {
        self.0.load = load;
        self
    }

    /// Marks the node as optional.
    pub fn optional(mut self, optional: bool) -> Self {
        self.0.optional = optional;
        self
    }

    /// Sets first/last in route preferences.
    pub fn route_position(mut self, first: bool, last: bool) -> Self {
        self.0.prefer_first_in_route = first;
        self.0.prefer_last_in_route = last;
        self
    }

    /// Marks the node as an unload-all stop.
    pub fn unload_all(mut self, unload_all: bool) -> Self {
        self.0.unload_all = unload_all;
        self
    }

    /// Requires the route to return to its start after this node.
    pub fn return_to_start(mut self, return_to_start: bool) -> Self {
        self.0.return_to_start = return_to_start;
        self
    }

    /// Sets the wait-on-early-arrival policy.
    pub fn wait_on_early_arrival(mut self, wait: bool) -> Self {
        self.0.wait_on_early_arrival = wait;
        self
    }

    /// Enables route dependent visit duration.
    pub fn route_dependent_duration(mut self, enabled: bool) -> Self {
        self.0.route_dependent_duration = enabled;
        self
    }

    /// Sets extra info metadata.
    pub fn extra_info(mut self, extra_info: &str) -> Self {
        self.0.extra_info = extra_info.to_string();
        self
    }

    /// Adds a qualification/zone code.
    pub fn add_qualification(mut self, code: &str) -> Self {
        self.0.qualifications.insert(code.to_string());
        self
    }

    /// Attaches a constraint.
    pub fn add_constraint(mut self, constraint: Constraint) -> Self {
        self.0.constraints.push(constraint);
        self
    }

    /// Turns the node into a pillar with fixed time window, optionally bound to a resource.
    pub fn pillar(mut self, window: TimeWindow, resource_id: Option<&str>) -> Self {
        self.0.pillar = Some(PillarBinding { window, resource_id: resource_id.map(|id| id.to_string()) });
        self
    }

    /// Builds a [Node].
    pub fn build(self) -> GenericResult<Arc<Node>> {
        let node = self.0;

        if node.id.is_empty() {
            return Err(GenericError::from("a node requires a non-empty id"));
        }

        if node.opening_hours.iter().chain(node.pillar.iter().map(|p| &p.window)).any(|tw| !tw.is_well_formed()) {
            return Err(format!("node '{}' has a malformed time window", node.id).into());
        }

        if node.joint_duration.is_some_and(|joint| joint > node.duration) {
            return Err(format!("node '{}' has a joint duration longer than its visit duration", node.id).into());
        }

        Ok(Arc::new(node))
    }
}
