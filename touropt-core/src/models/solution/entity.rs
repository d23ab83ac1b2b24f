#[cfg(test)]
#[path = "../../../tests/unit/models/solution/entity_test.rs"]
mod entity_test;

use crate::models::element::{Element, Node, Resource};
use crate::models::solution::Route;
use crate::utils::GenericResult;
use rustc_hash::{FxHashMap, FxHashSet};
use std::sync::Arc;

/// A complete candidate solution: all routes plus the set of all elements, assigned or not.
///
/// Entities are produced by construction, mutated in place by heuristic phases and superseded,
/// never mutated, once published as current best.
pub struct Entity {
    /// All routes of the solution.
    pub routes: Vec<Route>,
    /// Ids of nodes not assigned to any route.
    pub unassigned: FxHashSet<String>,
    /// All elements of the request keyed by id.
    registry: FxHashMap<String, Element>,
}

impl Entity {
    /// Creates an entity with no routes where every node is unassigned.
    pub fn new(nodes: &[Arc<Node>], resources: &[Arc<Resource>]) -> Self {
        let registry = nodes
            .iter()
            .map(|node| (node.id.clone(), Element::Node(node.clone())))
            .chain(resources.iter().map(|resource| (resource.id.clone(), Element::Resource(resource.clone()))))
            .collect();

        Self { routes: vec![], unassigned: nodes.iter().map(|node| node.id.clone()).collect(), registry }
    }

    /// Returns an element by its id.
    pub fn get_element(&self, id: &str) -> Option<&Element> {
        self.registry.get(id)
    }

    /// Returns all known nodes.
    pub fn nodes(&self) -> impl Iterator<Item = &Arc<Node>> + '_ {
        self.registry.values().filter_map(|element| element.as_node())
    }

    /// Returns all known resources.
    pub fn resources(&self) -> impl Iterator<Item = &Arc<Resource>> + '_ {
        self.registry.values().filter_map(|element| element.as_resource())
    }

    /// Registers a new element. The caller is responsible for id uniqueness.
    pub fn register(&mut self, element: Element) {
        if let Element::Node(node) = &element {
            self.unassigned.insert(node.id.clone());
        }
        self.registry.insert(element.id().to_string(), element);
    }

    /// Checks whether the registry knows the given id.
    pub fn is_known(&self, id: &str) -> bool {
        self.registry.contains_key(id)
    }

    /// Marks a node as assigned.
    pub fn mark_assigned(&mut self, node_id: &str) {
        self.unassigned.remove(node_id);
    }

    /// Marks a node as unassigned again.
    pub fn mark_unassigned(&mut self, node_id: &str) {
        self.unassigned.insert(node_id.to_string());
    }

    /// Returns total amount of assigned visits over all routes.
    pub fn assigned_count(&self) -> usize {
        self.routes.iter().map(|route| route.visits.len()).sum()
    }

    /// Returns the sum of per route costs.
    pub fn total_cost(&self) -> f64 {
        self.routes.iter().map(|route| route.costs.cost).sum()
    }

    /// Verifies structural invariants: every mandatory node appears in exactly one route exactly
    /// once, optional nodes at most once, and each route claims a window owned by its resource.
    pub fn verify(&self) -> GenericResult<()> {
        let mut seen = FxHashSet::default();
        for route in &self.routes {
            if route.window_idx >= route.resource.working_hours.len() {
                return Err(format!("route claims unknown working hours window of '{}'", route.resource.id).into());
            }

            for visit in &route.visits {
                if !seen.insert(visit.node.id.clone()) {
                    return Err(format!("node '{}' is assigned more than once", visit.node.id).into());
                }
            }
        }

        for node in self.nodes() {
            let assigned = seen.contains(node.id.as_str());
            if !assigned && !node.optional && !self.unassigned.contains(node.id.as_str()) {
                return Err(format!("mandatory node '{}' is lost", node.id).into());
            }
            if assigned && self.unassigned.contains(node.id.as_str()) {
                return Err(format!("node '{}' is both assigned and unassigned", node.id).into());
            }
        }

        Ok(())
    }

    /// Returns a deep copy of the entity used for copy-on-write publication.
    pub fn deep_copy(&self) -> Self {
        Self {
            routes: self.routes.iter().map(|route| route.deep_copy()).collect(),
            unassigned: self.unassigned.clone(),
            registry: self.registry.clone(),
        }
    }
}
