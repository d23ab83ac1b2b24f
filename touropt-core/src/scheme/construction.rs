#[cfg(test)]
#[path = "../../tests/unit/scheme/construction_test.rs"]
mod construction_test;

use crate::connector::NodeConnector;
use crate::evaluation::{schedule_route, Pipeline};
use crate::models::common::{Cost, Location};
use crate::models::element::{Node, Resource};
use crate::models::solution::{Entity, Route, Visit};
use crate::utils::{map_reduce, GenericResult};
use std::cmp::Ordering;
use std::sync::Arc;

/// Selects the construction strategy producing the first feasible-or-best-effort entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConstructionKind {
    /// Considers all nodes against all routes each round and commits the globally best insertion.
    SimultaneousSavings,
    /// Fills one route after another with its locally best insertions.
    SequentialSavings,
}

/// Returns the marginal cost of inserting a node at the given position of the route, or `None`
/// when the insertion is plainly infeasible (capacity, working hours length).
pub fn marginal_insertion_cost(
    route: &Route,
    position: usize,
    node: &Arc<Node>,
    connector: &NodeConnector,
) -> Option<Cost> {
    let resource = route.resource.as_ref();

    // quick capacity feasibility over absolute demand
    let mut total = resource.initial_load;
    for visit in route.visits.iter() {
        total = total + visit.node.load;
    }
    total = total + node.load;
    if !resource.capacity.can_fit(&total.abs()) {
        return None;
    }

    let anchor = (resource.id.as_str(), Some(resource.location));
    let prev: (&str, Option<Location>) = if position == 0 {
        anchor
    } else {
        let prev = &route.visits[position - 1];
        (prev.node.id.as_str(), prev.node.location)
    };
    let next: (&str, Option<Location>) = match route.visits.get(position) {
        Some(next) => (next.node.id.as_str(), next.node.location),
        None if route.working_hours().open_route => (node.id.as_str(), node.location),
        None => anchor,
    };

    let current = (node.id.as_str(), node.location);
    let added = connector.connection(prev, current, resource);
    let onward = if next.0 == current.0 {
        Default::default()
    } else {
        connector.connection(current, next, resource)
    };
    let removed =
        if next.0 == current.0 { Default::default() } else { connector.connection(prev, next, resource) };

    let extra_duration = added.duration + onward.duration - removed.duration + node.duration;
    let extra_distance = added.distance + onward.distance - removed.distance;

    // reject insertions which clearly cannot fit into the working hours anymore
    let route_time = route.costs.total_time();
    let window = route.time_window();
    if route_time + extra_duration > window.duration().min(resource.max_working_time) {
        return None;
    }

    Some(extra_duration * resource.costs.per_time + extra_distance * resource.costs.per_distance)
}

/// Returns the best position and cost for inserting a node into the route.
pub fn best_insertion(route: &Route, node: &Arc<Node>, connector: &NodeConnector) -> Option<(usize, Cost)> {
    (0..=route.visits.len())
        .filter_map(|position| marginal_insertion_cost(route, position, node, connector).map(|cost| (position, cost)))
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))
}

fn best_insertion_over_routes(
    entity: &Entity,
    node: &Arc<Node>,
    connector: &NodeConnector,
) -> Option<(usize, usize, Cost)> {
    map_reduce(
        &(0..entity.routes.len()).collect::<Vec<_>>(),
        |route_idx| {
            best_insertion(&entity.routes[*route_idx], node, connector)
                .map(|(position, cost)| (*route_idx, position, cost))
        },
        || None,
        |a, b| match (a, b) {
            (Some(a), Some(b)) => Some(if a.2 <= b.2 { a } else { b }),
            (a, b) => a.or(b),
        },
    )
}

fn commit_insertion(
    entity: &mut Entity,
    route_idx: usize,
    position: usize,
    node: Arc<Node>,
    connector: &NodeConnector,
) {
    let id = node.id.clone();
    entity.routes[route_idx].visits.insert(position, Visit::new(node));
    entity.mark_assigned(&id);

    // keeps the time breakdown fresh for feasibility checks of the following insertions
    schedule_route(&mut entity.routes[route_idx], connector);
}

fn place_pillars(entity: &mut Entity, pillars: Vec<Arc<Node>>, connector: &NodeConnector) -> GenericResult<()> {
    let mut pillars = pillars;
    pillars.sort_by(|a, b| {
        let a = a.pillar.as_ref().map(|p| p.window.start).unwrap_or(0.);
        let b = b.pillar.as_ref().map(|p| p.window.start).unwrap_or(0.);
        a.partial_cmp(&b).unwrap_or(Ordering::Equal)
    });

    for node in pillars {
        let pillar = node.pillar.as_ref().expect("not a pillar");

        let route_idx = entity
            .routes
            .iter()
            .position(|route| {
                let resource_matches =
                    pillar.resource_id.as_ref().map_or(true, |id| route.resource.id == *id);
                resource_matches && route.time_window().intersects(&pillar.window)
            })
            .ok_or_else(|| format!("no route can serve pillar node '{}'", node.id))?;

        // keep pillars of one route ordered by their fixed windows
        let position = entity.routes[route_idx]
            .visits
            .iter()
            .take_while(|visit| {
                visit.node.pillar.as_ref().is_some_and(|other| other.window.start <= pillar.window.start)
            })
            .count();

        commit_insertion(entity, route_idx, position, node, connector);
    }

    Ok(())
}

/// Produces the first entity: one route per resource working hours window, pillars placed
/// first, then space-savings insertion of mandatory nodes, then optional nodes as long as
/// their marginal cost stays below their skip penalty.
pub fn build_initial_entity(
    nodes: &[Arc<Node>],
    resources: &[Arc<Resource>],
    pipeline: &Pipeline,
    kind: ConstructionKind,
) -> GenericResult<Entity> {
    let connector = pipeline.connector().clone();
    let mut entity = Entity::new(nodes, resources);

    for resource in resources {
        for window_idx in 0..resource.working_hours.len() {
            entity.routes.push(Route::new(resource.clone(), window_idx));
        }
    }

    let pillars = nodes.iter().filter(|node| node.is_pillar()).cloned().collect::<Vec<_>>();
    place_pillars(&mut entity, pillars, &connector)?;

    let mut pending = nodes
        .iter()
        .filter(|node| !node.is_pillar() && !node.optional)
        .cloned()
        .collect::<Vec<_>>();
    pending.sort_by(|a, b| b.importance.partial_cmp(&a.importance).unwrap_or(Ordering::Equal));

    match kind {
        ConstructionKind::SimultaneousSavings => {
            while !pending.is_empty() {
                let best = pending
                    .iter()
                    .enumerate()
                    .filter_map(|(pending_idx, node)| {
                        best_insertion_over_routes(&entity, node, &connector)
                            .map(|(route_idx, position, cost)| (pending_idx, route_idx, position, cost))
                    })
                    .min_by(|a, b| a.3.partial_cmp(&b.3).unwrap_or(Ordering::Equal));

                match best {
                    Some((pending_idx, route_idx, position, _)) => {
                        let node = pending.remove(pending_idx);
                        commit_insertion(&mut entity, route_idx, position, node, &connector);
                    }
                    // remaining nodes cannot be served, they stay unassigned
                    None => break,
                }
            }
        }
        ConstructionKind::SequentialSavings => {
            for route_idx in 0..entity.routes.len() {
                loop {
                    let best = pending
                        .iter()
                        .enumerate()
                        .filter_map(|(pending_idx, node)| {
                            best_insertion(&entity.routes[route_idx], node, &connector)
                                .map(|(position, cost)| (pending_idx, position, cost))
                        })
                        .min_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(Ordering::Equal));

                    match best {
                        Some((pending_idx, position, _)) => {
                            let node = pending.remove(pending_idx);
                            commit_insertion(&mut entity, route_idx, position, node, &connector);
                        }
                        None => break,
                    }
                }
            }
        }
    }

    let skip_penalty = pipeline.config().get_f64(crate::config::keys::COST_SKIP_PENALTY)?;
    let optionals = nodes.iter().filter(|node| !node.is_pillar() && node.optional).cloned().collect::<Vec<_>>();
    for node in optionals {
        if let Some((route_idx, position, cost)) = best_insertion_over_routes(&entity, &node, &connector) {
            if cost < skip_penalty * node.importance {
                commit_insertion(&mut entity, route_idx, position, node, &connector);
            }
        }
    }

    Ok(entity)
}
