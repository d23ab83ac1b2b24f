#[cfg(test)]
#[path = "../../../tests/unit/models/element/resource_test.rs"]
mod resource_test;

use crate::models::common::{Distance, Duration, Load, Location, TimeWindow};
use crate::models::element::Constraint;
use crate::utils::{GenericError, GenericResult};
use rustc_hash::FxHashSet;
use std::sync::Arc;

/// Represents operating cost coefficients of a resource.
#[derive(Clone, Debug)]
pub struct CostFactors {
    /// A fixed cost to use the resource at all.
    pub fixed: f64,
    /// Cost per working time unit.
    pub per_time: f64,
    /// Cost per distance unit.
    pub per_distance: f64,
}

impl Default for CostFactors {
    fn default() -> Self {
        Self { fixed: 0., per_time: 1., per_distance: 1. }
    }
}

/// A single working hours window of a resource.
#[derive(Clone, Debug)]
pub struct WorkingHours {
    /// The time window the resource is on duty.
    pub window: TimeWindow,
    /// Whether an overnight stay is allowed at the end of this window.
    pub available_for_stay_out: bool,
    /// Whether the route of this window has no forced return to the start.
    pub open_route: bool,
    /// Whether this window participates in capacity planning.
    pub planning_relevant: bool,
}

impl WorkingHours {
    /// Creates working hours with default flags.
    pub fn new(window: TimeWindow) -> Self {
        Self { window, available_for_stay_out: false, open_route: false, planning_relevant: true }
    }
}

/// Governs when an overnight stay-out is justified.
#[derive(Clone, Debug, Default)]
pub struct StayOutPolicy {
    /// Minimum distance from home that justifies a stay-out.
    pub min_distance: Distance,
    /// Minimum travel time from home that justifies a stay-out.
    pub min_duration: Duration,
    /// Maximum number of consecutive stays-out.
    pub max_consecutive: usize,
    /// Minimum number of recovery days after a stay-out streak.
    pub min_recovery_days: usize,
}

/// A mobile agent with working hours, capacity and cost structure.
#[derive(Debug)]
pub struct Resource {
    /// An unique element id.
    pub id: String,
    /// A home position of the resource.
    pub location: Location,
    /// Working hour windows, one route per window.
    pub working_hours: Vec<WorkingHours>,
    /// Maximum total working time per window.
    pub max_working_time: Duration,
    /// Maximum travel distance per window.
    pub max_distance: Distance,
    /// Capacity vector.
    pub capacity: Load,
    /// Initial load at route start.
    pub initial_load: Load,
    /// Operating cost coefficients.
    pub costs: CostFactors,
    /// Average CO2 emission factor per distance unit.
    pub co2_emission_factor: f64,
    /// Scales visit durations performed by this resource.
    pub visit_duration_efficiency: f64,
    /// Scales connection (driving) times of this resource.
    pub connection_time_efficiency: f64,
    /// Group membership id for mandatory-resource constraints.
    pub constraint_alias_id: Option<String>,
    /// Overnight stay policy.
    pub stay_out_policy: StayOutPolicy,
    /// Extensible opaque metadata.
    pub extra_info: String,
    /// Qualification/zone codes covered by the resource.
    pub qualifications: FxHashSet<String>,
    /// Constraints attached to this resource.
    pub constraints: Vec<Constraint>,
}

impl Resource {
    /// Returns total available working time over planning relevant windows.
    pub fn available_working_time(&self) -> Duration {
        self.working_hours
            .iter()
            .filter(|wh| wh.planning_relevant)
            .map(|wh| wh.window.duration().min(self.max_working_time))
            .sum()
    }
}

/// Provides a way to build a [Resource] using the builder pattern.
pub struct ResourceBuilder(Resource);

impl ResourceBuilder {
    /// Creates a new builder for a resource with the given id and home location.
    pub fn new(id: &str, location: Location) -> Self {
        Self(Resource {
            id: id.to_string(),
            location,
            working_hours: vec![],
            max_working_time: f64::MAX,
            max_distance: f64::MAX,
            capacity: Load::default(),
            initial_load: Load::default(),
            costs: CostFactors::default(),
            co2_emission_factor: 0.,
            visit_duration_efficiency: 1.,
            connection_time_efficiency: 1.,
            constraint_alias_id: None,
            stay_out_policy: StayOutPolicy::default(),
            extra_info: String::default(),
            qualifications: FxHashSet::default(),
            constraints: vec![],
        })
    }

    /// Adds a working hours window.
    pub fn add_working_hours(mut self, working_hours: WorkingHours) -> Self {
        self.0.working_hours.push(working_hours);
        self
    }

    /// Sets maximum total working time.
    pub fn max_working_time(mut self, duration: Duration) -> Self {
        self.0.max_working_time = duration;
        self
    }

    /// Sets maximum travel distance.
    pub fn max_distance(mut self, distance: Distance) -> Self {
        self.0.max_distance = distance;
        self
    }

    /// Sets capacity vector.
    pub fn capacity(mut self, capacity: Load) -> Self {
        self.0.capacity = capacity;
        self
    }

    /// Sets initial load.
    pub fn initial_load(mut self, load: Load) -> Self {
        self.0.initial_load = load;
        self
    }

    /// Sets cost coefficients.
    pub fn costs(mut self, costs: CostFactors) -> Self {
        self.0.costs = costs;
        self
    }

    /// Sets CO2 emission factor.
    pub fn co2_emission_factor(mut self, factor: f64) -> Self {
        self.0.co2_emission_factor = factor;
        self
    }

    /// Sets visit duration and connection time efficiency factors.
    pub fn efficiency(mut self, visit_duration: f64, connection_time: f64) -> Self {
        self.0.visit_duration_efficiency = visit_duration;
        self.0.connection_time_efficiency = connection_time;
        self
    }

    /// Sets constraint alias id.
    pub fn constraint_alias_id(mut self, alias_id: &str) -> Self {
        self.0.constraint_alias_id = Some(alias_id.to_string());
        self
    }

    /// Sets stay-out policy.
    pub fn stay_out_policy(mut self, policy: StayOutPolicy) -> Self {
        self.0.stay_out_policy = policy;
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

    /// Builds a [Resource].
    pub fn build(self) -> GenericResult<Arc<Resource>> {
        let resource = self.0;

        if resource.id.is_empty() {
            return Err(GenericError::from("a resource requires a non-empty id"));
        }

        if resource.working_hours.is_empty() {
            return Err(format!("resource '{}' requires at least one working hours window", resource.id).into());
        }

        if resource.working_hours.iter().any(|wh| !wh.window.is_well_formed()) {
            return Err(format!("resource '{}' has a malformed working hours window", resource.id).into());
        }

        if resource.visit_duration_efficiency <= 0. || resource.connection_time_efficiency <= 0. {
            return Err(format!("resource '{}' has a non-positive efficiency factor", resource.id).into());
        }

        Ok(Arc::new(resource))
    }
}
