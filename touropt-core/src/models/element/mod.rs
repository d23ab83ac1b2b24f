//! Optimization elements: the domain entities being scheduled.

mod constraint;
pub use self::constraint::{Constraint, PositionPreference};

mod node;
pub use self::node::{Node, NodeBuilder, PillarBinding};

mod resource;
pub use self::resource::{CostFactors, Resource, ResourceBuilder, StayOutPolicy, WorkingHours};

use crate::models::common::{Location, TimeWindow};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// Represents an optimization element variant.
#[derive(Clone)]
pub enum Element {
    /// A visitable work item.
    Node(Arc<Node>),
    /// A mobile agent.
    Resource(Arc<Resource>),
}

impl Element {
    /// Returns the unique element id.
    pub fn id(&self) -> &str {
        match self {
            Element::Node(node) => &node.id,
            Element::Resource(resource) => &resource.id,
        }
    }

    /// Returns the element position, if any.
    pub fn location(&self) -> Option<Location> {
        match self {
            Element::Node(node) => node.location,
            Element::Resource(resource) => Some(resource.location),
        }
    }

    /// Returns duty hour windows of the element.
    pub fn duty_hours(&self) -> Vec<TimeWindow> {
        match self {
            Element::Node(node) => node.opening_hours.clone(),
            Element::Resource(resource) => resource.working_hours.iter().map(|wh| wh.window.clone()).collect(),
        }
    }

    /// Returns extra info metadata of the element.
    pub fn extra_info(&self) -> &str {
        match self {
            Element::Node(node) => &node.extra_info,
            Element::Resource(resource) => &resource.extra_info,
        }
    }

    /// Returns constraints attached to the element.
    pub fn constraints(&self) -> &[Constraint] {
        match self {
            Element::Node(node) => &node.constraints,
            Element::Resource(resource) => &resource.constraints,
        }
    }

    /// Considers the element as a [`Node`].
    pub fn as_node(&self) -> Option<&Arc<Node>> {
        match self {
            Element::Node(node) => Some(node),
            _ => None,
        }
    }

    /// Considers the element as a [`Resource`].
    pub fn as_resource(&self) -> Option<&Arc<Resource>> {
        match self {
            Element::Resource(resource) => Some(resource),
            _ => None,
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Element::Node(lhs), Element::Node(rhs)) => Arc::ptr_eq(lhs, rhs),
            (Element::Resource(lhs), Element::Resource(rhs)) => Arc::ptr_eq(lhs, rhs),
            _ => false,
        }
    }
}

impl Eq for Element {}

impl Hash for Element {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Element::Node(node) => (Arc::as_ptr(node) as usize).hash(state),
            Element::Resource(resource) => (Arc::as_ptr(resource) as usize).hash(state),
        }
    }
}
