#[cfg(test)]
#[path = "../../tests/unit/evaluation/restrictions_test.rs"]
mod restrictions_test;

use crate::evaluation::{effective_window, NodeContext, NodeRestriction, RouteContext, RouteRestriction};
use crate::models::common::Load;
use crate::models::element::{Constraint, PositionPreference};
use crate::models::solution::{RouteCosts, Violation, ViolationCategory};
use crate::utils::GenericResult;

/// Violation codes of built-in restrictions.
pub mod codes {
    /// A node time window was missed.
    pub const TIME_WINDOW: i32 = 1;
    /// Route capacity was exceeded.
    pub const CAPACITY: i32 = 2;
    /// Maximum working time was exceeded.
    pub const WORKING_TIME: i32 = 3;
    /// Maximum travel distance was exceeded.
    pub const DISTANCE: i32 = 4;
    /// A mandatory resource constraint was not satisfied.
    pub const MANDATORY_RESOURCE: i32 = 5;
    /// A magnetic constraint was not satisfied.
    pub const MAGNETIC: i32 = 6;
    /// A zone was crossed without qualification.
    pub const ZONE_CROSSING: i32 = 7;
    /// A mandatory node is not assigned.
    pub const UNASSIGNED_MANDATORY: i32 = 8;
    /// A first/last position preference was not honored.
    pub const POSITION: i32 = 9;
    /// Working hours window was overrun.
    pub const WORKING_HOURS: i32 = 10;
}

/// Cost per exceeded capacity unit.
const CAPACITY_PENALTY_PER_UNIT: f64 = 100.;
/// Factor applied to overtime and excess distance costs.
const BUDGET_OVERRUN_FACTOR: f64 = 2.;

/// Checks node time window feasibility.
pub struct TimeWindowRestriction;

impl NodeRestriction for TimeWindowRestriction {
    fn evaluate(&self, ctx: &NodeContext<'_>, acc: &mut RouteCosts) -> GenericResult<()> {
        let visit = ctx.visit();
        let window = effective_window(visit.node.as_ref(), visit.schedule.arrival);
        let per_time = ctx.route.resource.costs.per_time;

        if visit.schedule.arrival > window.end {
            let lateness = visit.schedule.arrival - window.end;
            acc.add_cost(lateness * per_time * BUDGET_OVERRUN_FACTOR);
            acc.add_violation(Violation::for_element(
                &visit.node.id,
                ViolationCategory::TimeWindow,
                codes::TIME_WINDOW,
                format!("node '{}' is visited {lateness:.0}s after its time window closes", visit.node.id),
                lateness,
            ));
        } else if visit.schedule.arrival < window.start && !visit.node.wait_on_early_arrival {
            let earliness = window.start - visit.schedule.arrival;
            acc.add_cost(earliness * per_time);
            acc.add_violation(Violation::for_element(
                &visit.node.id,
                ViolationCategory::TimeWindow,
                codes::TIME_WINDOW,
                format!("node '{}' is visited {earliness:.0}s before its time window opens", visit.node.id),
                earliness,
            ));
        }

        Ok(())
    }
}

/// Evaluates constraints attached to the visited node.
pub struct ElementConstraintRestriction;

impl NodeRestriction for ElementConstraintRestriction {
    fn evaluate(&self, ctx: &NodeContext<'_>, acc: &mut RouteCosts) -> GenericResult<()> {
        let visit = ctx.visit();
        let resource = ctx.route.resource.as_ref();

        for constraint in visit.node.constraints.iter() {
            match constraint {
                Constraint::MandatoryResource { alias_id, hard } => {
                    let is_member = resource.constraint_alias_id.as_deref() == Some(alias_id.as_str());
                    if !is_member {
                        let factor = if *hard { 10. } else { 1. };
                        acc.add_cost(ctx.weights.skip_penalty * visit.node.importance * factor);
                        acc.add_violation(Violation::for_element(
                            &visit.node.id,
                            ViolationCategory::Constraint,
                            codes::MANDATORY_RESOURCE,
                            format!(
                                "node '{}' requires a resource of alias group '{alias_id}', got '{}'",
                                visit.node.id, resource.id
                            ),
                            1.,
                        ));
                    }
                }
                Constraint::Magnetic { targets, attraction, preference } => {
                    self.evaluate_magnetic(ctx, acc, targets, *attraction, *preference);
                }
                Constraint::ZoneCrossing { zones, hard } => {
                    let crossings = zones.iter().filter(|zone| !resource.qualifications.contains(*zone)).count();
                    if crossings > 0 {
                        acc.add_cost(ctx.weights.zone_crossing * crossings as f64);
                        if *hard {
                            acc.add_violation(Violation::for_element(
                                &visit.node.id,
                                ViolationCategory::Constraint,
                                codes::ZONE_CROSSING,
                                format!("node '{}' crosses {crossings} unqualified zone(s)", visit.node.id),
                                crossings as f64,
                            ));
                        }
                    }
                }
            }
        }

        // node qualification codes not covered by the resource are paid as crossings too
        let missing =
            visit.node.qualifications.iter().filter(|code| !resource.qualifications.contains(*code)).count();
        if missing > 0 {
            acc.add_cost(ctx.weights.zone_crossing * missing as f64);
        }

        Ok(())
    }
}

impl ElementConstraintRestriction {
    fn evaluate_magnetic(
        &self,
        ctx: &NodeContext<'_>,
        acc: &mut RouteCosts,
        targets: &rustc_hash::FxHashSet<String>,
        attraction: bool,
        preference: Option<PositionPreference>,
    ) {
        let visit = ctx.visit();

        for target in targets {
            let target_idx = ctx.route.index_of(target);

            match (attraction, target_idx) {
                (true, None) => {
                    acc.add_cost(ctx.weights.magnetic);
                }
                (false, Some(_)) => {
                    acc.add_cost(ctx.weights.magnetic);
                    acc.add_violation(Violation::for_element(
                        &visit.node.id,
                        ViolationCategory::Constraint,
                        codes::MAGNETIC,
                        format!("node '{}' is repelled by co-located node '{target}'", visit.node.id),
                        ctx.weights.magnetic,
                    ));
                }
                (true, Some(target_idx)) => {
                    let ordered = match preference {
                        Some(PositionPreference::Front) => ctx.visit_idx < target_idx,
                        Some(PositionPreference::Back) => ctx.visit_idx > target_idx,
                        None => true,
                    };
                    if !ordered {
                        acc.add_cost(ctx.weights.position);
                    }
                }
                (false, None) => {}
            }
        }
    }
}

/// Evaluates constraints attached to the route's resource against its visits.
pub struct ResourceConstraintRestriction;

impl RouteRestriction for ResourceConstraintRestriction {
    fn evaluate(&self, ctx: &RouteContext<'_>, acc: &mut RouteCosts) -> GenericResult<()> {
        let resource = ctx.route.resource.as_ref();

        for constraint in resource.constraints.iter() {
            match constraint {
                Constraint::MandatoryResource { alias_id, hard } => {
                    // a dedicated resource: visits outside its alias group pay the skip penalty
                    for visit in ctx.route.visits.iter() {
                        let is_member = visit.node.constraints.iter().any(|candidate| {
                            matches!(candidate, Constraint::MandatoryResource { alias_id: required, .. } if required == alias_id)
                        });
                        if !is_member {
                            let factor = if *hard { 10. } else { 1. };
                            acc.add_cost(ctx.weights.skip_penalty * visit.node.importance * factor);
                            acc.add_violation(Violation::for_element(
                                &visit.node.id,
                                ViolationCategory::Constraint,
                                codes::MANDATORY_RESOURCE,
                                format!(
                                    "resource '{}' serves only alias group '{alias_id}', node '{}' is outside it",
                                    resource.id, visit.node.id
                                ),
                                1.,
                            ));
                        }
                    }
                }
                Constraint::Magnetic { targets, attraction, .. } => {
                    for target in targets {
                        match (attraction, ctx.route.contains(target)) {
                            (true, false) => {
                                acc.add_cost(ctx.weights.magnetic);
                            }
                            (false, true) => {
                                acc.add_cost(ctx.weights.magnetic);
                                acc.add_violation(Violation::for_element(
                                    target,
                                    ViolationCategory::Constraint,
                                    codes::MAGNETIC,
                                    format!("resource '{}' repels node '{target}' from its route", resource.id),
                                    ctx.weights.magnetic,
                                ));
                            }
                            _ => {}
                        }
                    }
                }
                Constraint::ZoneCrossing { zones, hard } => {
                    let crossings = ctx
                        .route
                        .visits
                        .iter()
                        .filter(|visit| zones.iter().any(|zone| visit.node.qualifications.contains(zone)))
                        .count();
                    if crossings > 0 {
                        acc.add_cost(ctx.weights.zone_crossing * crossings as f64);
                        if *hard {
                            acc.add_violation(Violation::new(
                                ViolationCategory::Constraint,
                                codes::ZONE_CROSSING,
                                format!("route of '{}' enters {crossings} avoided zone(s)", resource.id),
                                crossings as f64,
                            ));
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

/// Penalizes routes which do not honor first/last position preferences.
pub struct RoutePositionRestriction;

impl NodeRestriction for RoutePositionRestriction {
    fn evaluate(&self, ctx: &NodeContext<'_>, acc: &mut RouteCosts) -> GenericResult<()> {
        let visit = ctx.visit();

        if visit.node.prefer_first_in_route && ctx.visit_idx != 0 {
            acc.add_cost(ctx.weights.position * visit.node.importance);
            acc.add_violation(Violation::for_element(
                &visit.node.id,
                ViolationCategory::Constraint,
                codes::POSITION,
                format!("node '{}' prefers the first position in its route", visit.node.id),
                ctx.visit_idx as f64,
            ));
        }

        if visit.node.prefer_last_in_route && ctx.visit_idx + 1 != ctx.route.visits.len() {
            acc.add_cost(ctx.weights.position * visit.node.importance);
            acc.add_violation(Violation::for_element(
                &visit.node.id,
                ViolationCategory::Constraint,
                codes::POSITION,
                format!("node '{}' prefers the last position in its route", visit.node.id),
                (ctx.route.visits.len() - 1 - ctx.visit_idx) as f64,
            ));
        }

        Ok(())
    }
}

/// Adds the base operating cost of the route: fixed usage plus time and distance coefficients.
pub struct OperatingCostRestriction;

impl RouteRestriction for OperatingCostRestriction {
    fn evaluate(&self, ctx: &RouteContext<'_>, acc: &mut RouteCosts) -> GenericResult<()> {
        let costs = &ctx.route.resource.costs;

        if !ctx.route.visits.is_empty() {
            acc.add_cost(costs.fixed);
        }
        acc.add_cost(acc.total_time() * costs.per_time + acc.distance * costs.per_distance);

        Ok(())
    }
}

/// Checks capacity feasibility over the running load of the route.
pub struct CapacityRestriction;

impl RouteRestriction for CapacityRestriction {
    fn evaluate(&self, ctx: &RouteContext<'_>, acc: &mut RouteCosts) -> GenericResult<()> {
        let resource = ctx.route.resource.as_ref();
        let mut running = resource.initial_load;

        for visit in ctx.route.visits.iter() {
            if visit.node.unload_all {
                running = Load::default();
            }
            running = running + visit.node.load;

            if !resource.capacity.can_fit(&running.abs()) {
                let magnitude = running
                    .abs()
                    .as_vec()
                    .iter()
                    .zip(resource.capacity.as_vec().iter().chain(std::iter::repeat(&0)))
                    .map(|(have, limit)| (have - limit).max(0))
                    .sum::<i64>() as f64;

                acc.add_cost(magnitude * CAPACITY_PENALTY_PER_UNIT);
                acc.add_violation(Violation::for_element(
                    &visit.node.id,
                    ViolationCategory::Capacity,
                    codes::CAPACITY,
                    format!("capacity of '{}' exceeded at node '{}'", resource.id, visit.node.id),
                    magnitude,
                ));
            }
        }

        Ok(())
    }
}

/// Checks working time, working hours and travel distance budgets.
pub struct TravelBudgetRestriction;

impl RouteRestriction for TravelBudgetRestriction {
    fn evaluate(&self, ctx: &RouteContext<'_>, acc: &mut RouteCosts) -> GenericResult<()> {
        let resource = ctx.route.resource.as_ref();
        let costs = &resource.costs;

        let working_time = acc.total_time();
        if working_time > resource.max_working_time {
            let overtime = working_time - resource.max_working_time;
            acc.add_cost(overtime * costs.per_time * BUDGET_OVERRUN_FACTOR);
            acc.add_violation(Violation::new(
                ViolationCategory::TravelBudget,
                codes::WORKING_TIME,
                format!("route of '{}' exceeds maximum working time by {overtime:.0}s", resource.id),
                overtime,
            ));
        }

        if acc.distance > resource.max_distance {
            let excess = acc.distance - resource.max_distance;
            acc.add_cost(excess * costs.per_distance * BUDGET_OVERRUN_FACTOR);
            acc.add_violation(Violation::new(
                ViolationCategory::TravelBudget,
                codes::DISTANCE,
                format!("route of '{}' exceeds maximum distance by {excess:.0}m", resource.id),
                excess,
            ));
        }

        let window_end = ctx.route.time_window().end;
        if ctx.route.termination.arrival > window_end {
            let overrun = ctx.route.termination.arrival - window_end;
            acc.add_cost(overrun * costs.per_time * BUDGET_OVERRUN_FACTOR);
            acc.add_violation(Violation::new(
                ViolationCategory::TimeWindow,
                codes::WORKING_HOURS,
                format!("route of '{}' overruns its working hours by {overrun:.0}s", resource.id),
                overrun,
            ));
        }

        Ok(())
    }
}

/// Weights the route distance by the resource CO2 emission factor.
pub struct Co2Restriction;

impl RouteRestriction for Co2Restriction {
    fn evaluate(&self, ctx: &RouteContext<'_>, acc: &mut RouteCosts) -> GenericResult<()> {
        acc.add_cost(acc.distance * ctx.route.resource.co2_emission_factor * ctx.weights.co2);

        Ok(())
    }
}
