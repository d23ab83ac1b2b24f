use super::*;
use crate::evaluation::PipelineBuilder;
use crate::models::common::{Load, TimeWindow};
use crate::models::element::{NodeBuilder, ResourceBuilder, WorkingHours};
use crate::helpers::*;

fn edge_connector() -> Arc<NodeConnector> {
    let mut connector = NodeConnector::default();
    connector.add_edge("resource", "a", 1000., 100.);
    connector.add_edge("a", "resource", 1000., 100.);
    connector.add_edge("resource", "b", 100., 10.);
    connector.add_edge("b", "a", 100., 10.);
    connector.add_edge("a", "b", 2000., 200.);
    connector.add_edge("b", "resource", 2000., 200.);
    Arc::new(connector)
}

fn pipeline_with(connector: Arc<NodeConnector>) -> Pipeline {
    PipelineBuilder::new(connector, test_config()).build().unwrap()
}

#[test]
fn can_find_best_insertion_position() {
    let connector = edge_connector();
    let mut route = Route::new(test_resource("resource"), 0);
    route.visits.push(Visit::new(test_node("a", 1.)));
    let node = test_node("b", 2.);

    let (position, cost) = best_insertion(&route, &node, &connector).unwrap();

    // before 'a' the detour is cheap, after it the way back is expensive
    assert_eq!(position, 0);
    assert!((cost - 4.4).abs() < 1e-9, "unexpected marginal cost: {cost}");
}

#[test]
fn cannot_insert_beyond_capacity() {
    let connector = test_connector();
    let route = Route::new(test_resource("resource"), 0);
    let node = NodeBuilder::new("bulky")
        .location(location_at(1.))
        .duration(600.)
        .load(Load::new(vec![101]))
        .build()
        .unwrap();

    assert!(best_insertion(&route, &node, &connector).is_none());
}

#[test]
fn can_assign_all_mandatory_nodes() {
    let connector = test_connector();
    let nodes = [test_node("a", 1.), test_node("b", 2.), test_node("c", 3.)];
    let resources = [test_resource("resource")];
    let pipeline = pipeline_with(connector);

    let entity = build_initial_entity(&nodes, &resources, &pipeline, ConstructionKind::SimultaneousSavings).unwrap();

    assert!(entity.unassigned.is_empty());
    assert_eq!(entity.routes[0].visits.len(), 3);
    assert!(entity.verify().is_ok());
}

#[test]
fn can_fill_routes_sequentially() {
    let connector = test_connector();
    let nodes = [test_node("a", 1.), test_node("b", 2.)];
    let resources = [test_resource("resource")];
    let pipeline = pipeline_with(connector);

    let entity = build_initial_entity(&nodes, &resources, &pipeline, ConstructionKind::SequentialSavings).unwrap();

    assert!(entity.unassigned.is_empty());
    assert!(entity.verify().is_ok());
}

#[test]
fn can_leave_unservable_nodes_unassigned() {
    let connector = test_connector();
    let nodes = [test_node("far", 10.)];
    let resources = [ResourceBuilder::new("resource", BERLIN)
        .add_working_hours(WorkingHours::new(TimeWindow::new(0., 1000.)))
        .build()
        .unwrap()];
    let pipeline = pipeline_with(connector);

    let entity = build_initial_entity(&nodes, &resources, &pipeline, ConstructionKind::SimultaneousSavings).unwrap();

    assert!(entity.unassigned.contains("far"));
    assert!(entity.routes[0].visits.is_empty());
}

#[test]
fn can_insert_cheap_optional_node() {
    let connector = test_connector();
    let nodes = [test_optional_node("nearby", 1.)];
    let resources = [test_resource("resource")];
    let pipeline = pipeline_with(connector);

    let entity = build_initial_entity(&nodes, &resources, &pipeline, ConstructionKind::SimultaneousSavings).unwrap();

    assert!(entity.unassigned.is_empty());
}

#[test]
fn can_skip_optional_node_cheaper_to_drop() {
    let connector = test_connector();
    let nodes = [NodeBuilder::new("negligible")
        .location(location_at(1.))
        .duration(600.)
        .optional(true)
        .importance(0.001)
        .add_opening_hours(TimeWindow::new(0., 86_400.))
        .build()
        .unwrap()];
    let resources = [test_resource("resource")];
    let pipeline = pipeline_with(connector);

    let entity = build_initial_entity(&nodes, &resources, &pipeline, ConstructionKind::SimultaneousSavings).unwrap();

    assert!(entity.unassigned.contains("negligible"));
}

#[test]
fn can_place_pillars_ordered_by_window() {
    let connector = test_connector();
    let late = NodeBuilder::new("late")
        .location(location_at(1.))
        .duration(600.)
        .pillar(TimeWindow::new(3000., 4000.), Some("resource"))
        .build()
        .unwrap();
    let early = NodeBuilder::new("early")
        .location(location_at(2.))
        .duration(600.)
        .pillar(TimeWindow::new(1000., 2000.), None)
        .build()
        .unwrap();
    let resources = [test_resource("resource")];
    let pipeline = pipeline_with(connector);

    let entity =
        build_initial_entity(&[late, early], &resources, &pipeline, ConstructionKind::SimultaneousSavings).unwrap();

    let order = entity.routes[0].visits.iter().map(|visit| visit.node.id.as_str()).collect::<Vec<_>>();
    assert_eq!(order, vec!["early", "late"]);
}

#[test]
fn cannot_place_pillar_without_serving_route() {
    let connector = test_connector();
    let nodes = [NodeBuilder::new("orphan")
        .location(location_at(1.))
        .duration(600.)
        .pillar(TimeWindow::new(1000., 2000.), Some("ghost"))
        .build()
        .unwrap()];
    let resources = [test_resource("resource")];
    let pipeline = pipeline_with(connector);

    let result = build_initial_entity(&nodes, &resources, &pipeline, ConstructionKind::SimultaneousSavings);

    assert!(result.err().unwrap().to_string().contains("no route can serve pillar node 'orphan'"));
}
