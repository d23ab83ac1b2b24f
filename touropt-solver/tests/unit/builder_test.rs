use super::*;
use crate::helpers::*;

#[test]
fn can_reject_nodes_with_taken_ids() {
    let mut builder = OptimizationBuilder::new();
    builder.add_nodes(vec![test_node("a", 1.), test_node("b", 2.)]);

    let rejected = builder.add_nodes(vec![test_node("a", 3.), test_node("c", 4.)]);

    assert_eq!(rejected.iter().map(|node| node.id.as_str()).collect::<Vec<_>>(), vec!["a"]);
}

#[test]
fn can_reject_resource_shadowing_node_id() {
    let mut builder = OptimizationBuilder::new();
    builder.add_nodes(vec![test_node("shared", 1.)]);

    let rejected = builder.add_resources(vec![test_resource("shared"), test_resource("resource")]);

    assert_eq!(rejected.iter().map(|resource| resource.id.as_str()).collect::<Vec<_>>(), vec!["shared"]);
}

#[test]
fn cannot_build_without_nodes() {
    let mut builder = OptimizationBuilder::new();
    builder.add_resources(vec![test_resource("resource")]);

    let result = builder.build();

    assert!(result.err().unwrap().to_string().contains("without nodes"));
}

#[test]
fn can_use_default_scheme() {
    let optimization = test_builder().build().unwrap();

    assert_eq!(optimization.scheme.name(), "default");
}

#[test]
fn cannot_start_with_unknown_property() {
    let mut builder = test_builder();
    builder.with_property("no.such.knob", "1");

    let result = builder.build().unwrap().start();

    assert!(result.err().unwrap().to_string().contains("unknown engine properties"));
}

#[test]
fn cannot_start_without_resources() {
    let mut builder = OptimizationBuilder::new();
    builder.add_nodes(vec![test_node("a", 1.)]);
    builder.with_environment(quiet_environment());

    let result = builder.build().unwrap().start();

    assert!(result.err().unwrap().to_string().contains("at least one resource"));
}

#[test]
fn can_drain_builder_on_build() {
    let mut builder = test_builder();

    builder.build().unwrap();
    let result = builder.build();

    assert!(result.is_err());
}
