#[cfg(test)]
#[path = "../../tests/unit/evaluation/scheduling_test.rs"]
mod scheduling_test;

use crate::connector::NodeConnector;
use crate::models::common::{Location, Schedule, TimeWindow, Timestamp};
use crate::models::element::Node;
use crate::models::solution::{Route, RouteCosts};

/// Propagates arrival and departure times through the route and fills the time breakdown of
/// its cost accumulator: transit, idle, productive, flex and termination transit separately,
/// plus distance. Costs and violations are left to the restriction pipeline.
pub fn schedule_route(route: &mut Route, connector: &NodeConnector) {
    let resource = route.resource.clone();
    let working_hours = route.working_hours().clone();

    let mut acc = RouteCosts::default();
    let start = working_hours.window.start;
    route.start = Schedule::new(start, start);

    let mut departure = start;
    let mut prev_id = resource.id.clone();
    let mut prev_location = Some(resource.location);
    let mut prev_visit_location: Option<Location> = None;

    for visit in route.visits.iter_mut() {
        let node = visit.node.clone();

        let connection = connector.connection((&prev_id, prev_location), (&node.id, node.location), &resource);
        acc.transit_time += connection.duration;
        acc.distance += connection.distance;

        let arrival = departure + connection.duration;
        let window = effective_window(visit.node.as_ref(), arrival);

        let service_start = if arrival < window.start && node.wait_on_early_arrival {
            acc.idle_time += window.start - arrival;
            window.start
        } else {
            arrival
        };

        let is_joint = node.joint_duration.is_some()
            && match (prev_visit_location, node.location) {
                (Some(prev), Some(current)) => prev.is_same_place(&current),
                _ => false,
            };

        let mut duration = node.effective_duration(is_joint);
        if node.route_dependent_duration {
            duration /= resource.visit_duration_efficiency;
        }

        acc.productive_time += duration;
        departure = service_start + duration;

        visit.schedule = Schedule::new(arrival, departure);
        visit.duration = duration;
        visit.is_joint = is_joint;

        prev_visit_location = node.location.or(prev_visit_location);
        if node.return_to_start {
            // an implicit leg back to the route start before continuing
            let back = connector.connection((&node.id, node.location), (&resource.id, Some(resource.location)), &resource);
            acc.transit_time += back.duration;
            acc.distance += back.distance;
            departure += back.duration;

            prev_id = resource.id.clone();
            prev_location = Some(resource.location);
            prev_visit_location = None;
        } else {
            prev_id = node.id.clone();
            prev_location = node.location.or(prev_location);
        }
    }

    if working_hours.open_route {
        route.termination = Schedule::new(departure, departure);
    } else {
        let back = connector.connection((&prev_id, prev_location), (&resource.id, Some(resource.location)), &resource);
        acc.termination_transit_time = back.duration;
        acc.distance += back.distance;

        let arrival = departure + back.duration;
        route.termination = Schedule::new(arrival, arrival);
    }

    acc.flex_time = (working_hours.window.end - route.termination.arrival).max(0.);

    route.costs = acc;
}

/// Returns the time window the visit has to respect: the pillar window for pillars, otherwise
/// the best matching opening hours window for the given arrival.
pub fn effective_window(node: &Node, arrival: Timestamp) -> TimeWindow {
    if let Some(pillar) = &node.pillar {
        return pillar.window.clone();
    }

    if node.opening_hours.is_empty() {
        return TimeWindow::max();
    }

    node.opening_hours
        .iter()
        .find(|window| arrival <= window.end)
        .cloned()
        .unwrap_or_else(|| node.opening_hours.last().cloned().unwrap_or_else(TimeWindow::max))
}
