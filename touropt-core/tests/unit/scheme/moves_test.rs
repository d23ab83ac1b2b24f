use super::*;
use crate::helpers::*;
use crate::models::common::{Load, TimeWindow};
use crate::models::element::NodeBuilder;
use crate::models::solution::Route;

fn edge_connector() -> NodeConnector {
    let mut connector = NodeConnector::default();
    connector.add_edge("resource", "a", 1000., 100.);
    connector.add_edge("a", "resource", 1000., 100.);
    connector.add_edge("resource", "b", 100., 10.);
    connector.add_edge("b", "a", 100., 10.);
    connector.add_edge("a", "b", 2000., 200.);
    connector.add_edge("b", "resource", 2000., 200.);
    connector
}

#[test]
fn can_filter_insertion_positions_to_best() {
    let connector = edge_connector();
    let mut route = Route::new(test_resource("resource"), 0);
    route.visits.push(Visit::new(test_node("a", 1.)));
    let node = test_node("b", 2.);

    let positions = insertion_positions(&route, &node, &connector, true);

    assert_eq!(positions, vec![0]);
}

#[test]
fn can_list_all_feasible_positions() {
    let connector = edge_connector();
    let mut route = Route::new(test_resource("resource"), 0);
    route.visits.push(Visit::new(test_node("a", 1.)));
    let node = test_node("b", 2.);

    let positions = insertion_positions(&route, &node, &connector, false);

    assert_eq!(positions, vec![0, 1]);
}

#[test]
fn can_exclude_pillars_from_moves() {
    let pillar = NodeBuilder::new("anchor")
        .location(location_at(1.))
        .duration(600.)
        .pillar(TimeWindow::new(1000., 2000.), None)
        .build()
        .unwrap();
    let nodes = [pillar, test_node("a", 2.)];
    let connector = test_connector();
    let entity = test_entity_with_route(&nodes, test_resource("resource"), &connector);

    let candidates = movable_visits(&entity);

    assert_eq!(candidates, vec![(0, 1)]);
}

#[test]
fn can_toggle_optional_node_off_and_on() {
    let nodes = [test_optional_node("a", 1.)];
    let connector = test_connector();
    let mut entity = test_entity_with_route(&nodes, test_resource("resource"), &connector);
    let random = test_random();

    assert!(toggle_optional(&mut entity, random.as_ref(), &connector));
    assert!(entity.unassigned.contains("a"));
    assert!(entity.routes[0].visits.is_empty());

    assert!(toggle_optional(&mut entity, random.as_ref(), &connector));
    assert!(entity.unassigned.is_empty());
    assert!(entity.routes[0].contains("a"));
}

#[test]
fn can_restore_visit_when_no_relocation_fits() {
    let oversized = NodeBuilder::new("bulk")
        .location(location_at(1.))
        .duration(600.)
        .load(Load::new(vec![101]))
        .add_opening_hours(TimeWindow::new(0., 86_400.))
        .build()
        .unwrap();
    let connector = test_connector();
    let mut entity = test_entity_with_route(&[oversized], test_resource("resource"), &connector);
    let random = test_random();

    let moved = relocate(&mut entity, random.as_ref(), &connector, true);

    assert!(!moved);
    assert!(entity.routes[0].contains("bulk"));
    assert!(entity.verify().is_ok());
}

#[test]
fn cannot_swap_with_single_movable_visit() {
    let nodes = [test_node("a", 1.)];
    let connector = test_connector();
    let mut entity = test_entity_with_route(&nodes, test_resource("resource"), &connector);
    let random = test_random();

    assert!(!swap(&mut entity, random.as_ref(), &connector));
}

#[test]
fn can_preserve_invariants_over_random_moves() {
    let nodes = [
        test_node("a", 1.),
        test_node("b", 2.),
        test_node("c", 3.),
        test_node("d", 4.),
        test_optional_node("e", 5.),
    ];
    let resources = [test_resource("first"), test_resource("second")];
    let connector = test_connector();
    let mut entity = test_entity(&nodes, &resources);
    for node in nodes.iter() {
        entity.routes[0].visits.push(Visit::new(node.clone()));
        entity.mark_assigned(&node.id);
    }
    let random = test_random();

    for _ in 0..100 {
        apply_random_move(&mut entity, random.as_ref(), &connector, true);
        entity.verify().expect("invariants broken by a move");
    }
}
