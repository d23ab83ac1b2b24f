use super::*;
use crate::helpers::*;
use crate::models::solution::Visit;

#[test]
fn can_start_with_all_nodes_unassigned() {
    let nodes = vec![test_node("first", 1.), test_node("second", 2.)];
    let resources = vec![test_resource("resource")];

    let entity = Entity::new(&nodes, &resources);

    assert_eq!(entity.unassigned.len(), 2);
    assert_eq!(entity.assigned_count(), 0);
    assert!(entity.is_known("first"));
    assert!(entity.is_known("resource"));
    assert!(!entity.is_known("unknown"));
}

#[test]
fn can_track_assignment_state() {
    let nodes = vec![test_node("node", 1.)];
    let resources = vec![test_resource("resource")];
    let mut entity = Entity::new(&nodes, &resources);

    entity.mark_assigned("node");
    assert!(entity.unassigned.is_empty());

    entity.mark_unassigned("node");
    assert!(entity.unassigned.contains("node"));
}

#[test]
fn can_verify_duplicate_assignment() {
    let nodes = vec![test_node("node", 1.)];
    let resources = vec![test_resource("resource")];
    let mut entity = test_entity(&nodes, &resources);

    entity.routes[0].visits.push(Visit::new(nodes[0].clone()));
    entity.routes[0].visits.push(Visit::new(nodes[0].clone()));
    entity.mark_assigned("node");

    assert!(entity.verify().is_err());
}

#[test]
fn can_verify_lost_mandatory_node() {
    let nodes = vec![test_node("node", 1.)];
    let resources = vec![test_resource("resource")];
    let mut entity = test_entity(&nodes, &resources);

    // node is neither in a route nor in the unassigned set
    entity.unassigned.clear();

    assert!(entity.verify().is_err());
}

#[test]
fn can_verify_consistent_entity() {
    let nodes = vec![test_node("node", 1.)];
    let resources = vec![test_resource("resource")];
    let connector = test_connector();

    let entity = test_entity_with_route(&nodes, resources[0].clone(), &connector);

    assert!(entity.verify().is_ok());
}

#[test]
fn can_deep_copy_independently() {
    let nodes = vec![test_node("node", 1.)];
    let resources = vec![test_resource("resource")];
    let connector = test_connector();
    let entity = test_entity_with_route(&nodes, resources[0].clone(), &connector);

    let mut copy = entity.deep_copy();
    copy.routes[0].visits.clear();
    copy.mark_unassigned("node");

    assert_eq!(entity.assigned_count(), 1);
    assert!(entity.unassigned.is_empty());
}
