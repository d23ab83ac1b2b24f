#[cfg(test)]
#[path = "../../tests/unit/scheme/moves_test.rs"]
mod moves_test;

use crate::connector::NodeConnector;
use crate::evaluation::schedule_route;
use crate::models::solution::{Entity, Visit};
use crate::scheme::construction::{best_insertion, marginal_insertion_cost};
use crate::utils::Random;
use std::sync::Arc;

/// Returns candidate insertion positions of a node within a route. With auto filtering enabled
/// only the single cheapest position survives, otherwise all feasible positions are candidates.
pub fn insertion_positions(
    route: &crate::models::solution::Route,
    node: &Arc<crate::models::element::Node>,
    connector: &NodeConnector,
    auto_filter: bool,
) -> Vec<usize> {
    if auto_filter {
        best_insertion(route, node, connector).map(|(position, _)| position).into_iter().collect()
    } else {
        (0..=route.visits.len())
            .filter(|position| marginal_insertion_cost(route, *position, node, connector).is_some())
            .collect()
    }
}

fn movable_visits(entity: &Entity) -> Vec<(usize, usize)> {
    entity
        .routes
        .iter()
        .enumerate()
        .flat_map(|(route_idx, route)| {
            route
                .visits
                .iter()
                .enumerate()
                .filter(|(_, visit)| !visit.node.is_pillar())
                .map(move |(visit_idx, _)| (route_idx, visit_idx))
        })
        .collect()
}

fn relocate(entity: &mut Entity, random: &dyn Random, connector: &NodeConnector, auto_filter: bool) -> bool {
    let candidates = movable_visits(entity);
    if candidates.is_empty() {
        return false;
    }

    let (route_idx, visit_idx) = candidates[random.uniform_int(0, candidates.len() as i32 - 1) as usize];
    let node = entity.routes[route_idx].visits.remove(visit_idx).node;
    schedule_route(&mut entity.routes[route_idx], connector);

    let target_idx = random.uniform_int(0, entity.routes.len() as i32 - 1) as usize;
    let positions = insertion_positions(&entity.routes[target_idx], &node, connector, auto_filter);

    let insertion = if positions.is_empty() {
        // fall back to the globally best insertion, the original spot included
        (0..entity.routes.len())
            .filter_map(|idx| best_insertion(&entity.routes[idx], &node, connector).map(|(pos, cost)| (idx, pos, cost)))
            .min_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(idx, pos, _)| (idx, pos))
    } else {
        let pos = positions[random.uniform_int(0, positions.len() as i32 - 1) as usize];
        Some((target_idx, pos))
    };

    match insertion {
        Some((idx, pos)) => {
            entity.routes[idx].visits.insert(pos, Visit::new(node));
            schedule_route(&mut entity.routes[idx], connector);
            true
        }
        None => {
            // no feasible spot anywhere, restore the original position
            let id = node.id.clone();
            let len = entity.routes[route_idx].visits.len();
            entity.routes[route_idx].visits.insert(visit_idx.min(len), Visit::new(node));
            schedule_route(&mut entity.routes[route_idx], connector);
            debug_assert!(entity.routes[route_idx].contains(&id));
            false
        }
    }
}

fn swap(entity: &mut Entity, random: &dyn Random, connector: &NodeConnector) -> bool {
    let candidates = movable_visits(entity);
    if candidates.len() < 2 {
        return false;
    }

    let first = candidates[random.uniform_int(0, candidates.len() as i32 - 1) as usize];
    let second = candidates[random.uniform_int(0, candidates.len() as i32 - 1) as usize];
    if first == second {
        return false;
    }

    let first_node = entity.routes[first.0].visits[first.1].node.clone();
    let second_node = entity.routes[second.0].visits[second.1].node.clone();

    entity.routes[first.0].visits[first.1] = Visit::new(second_node);
    entity.routes[second.0].visits[second.1] = Visit::new(first_node);

    schedule_route(&mut entity.routes[first.0], connector);
    if first.0 != second.0 {
        schedule_route(&mut entity.routes[second.0], connector);
    }

    true
}

fn toggle_optional(entity: &mut Entity, random: &dyn Random, connector: &NodeConnector) -> bool {
    let optionals = entity.nodes().filter(|node| node.optional && !node.is_pillar()).cloned().collect::<Vec<_>>();
    if optionals.is_empty() {
        return false;
    }

    let node = optionals[random.uniform_int(0, optionals.len() as i32 - 1) as usize].clone();

    if entity.unassigned.contains(node.id.as_str()) {
        let insertion = (0..entity.routes.len())
            .filter_map(|idx| best_insertion(&entity.routes[idx], &node, connector).map(|(pos, cost)| (idx, pos, cost)))
            .min_by(|a, b| a.2.partial_cmp(&b.2).unwrap_or(std::cmp::Ordering::Equal));

        match insertion {
            Some((idx, pos, _)) => {
                let id = node.id.clone();
                entity.routes[idx].visits.insert(pos, Visit::new(node));
                entity.mark_assigned(&id);
                schedule_route(&mut entity.routes[idx], connector);
                true
            }
            None => false,
        }
    } else {
        let route_idx = entity.routes.iter().position(|route| route.contains(node.id.as_str()));
        match route_idx {
            Some(route_idx) => {
                entity.routes[route_idx].remove(node.id.as_str());
                entity.mark_unassigned(node.id.as_str());
                schedule_route(&mut entity.routes[route_idx], connector);
                true
            }
            None => false,
        }
    }
}

/// Applies one random neighborhood move to the entity, preserving its structural invariants.
/// Returns false when no applicable move was found.
pub fn apply_random_move(
    entity: &mut Entity,
    random: &dyn Random,
    connector: &NodeConnector,
    auto_filter: bool,
) -> bool {
    match random.uniform_int(0, 2) {
        0 => relocate(entity, random, connector, auto_filter),
        1 => swap(entity, random, connector),
        _ => toggle_optional(entity, random, connector),
    }
}
