//! Shared factories of unit tests.

use crate::OptimizationBuilder;
use std::sync::Arc;
use touropt_core::prelude::*;

pub const BERLIN: Location = Location { lat: 52.52, lon: 13.405 };

/// A location shifted roughly `km` kilometers north of Berlin.
pub fn location_at(km: f64) -> Location {
    Location::new(BERLIN.lat + km / 111., BERLIN.lon)
}

pub fn test_node(id: &str, km: f64) -> Arc<Node> {
    NodeBuilder::new(id)
        .location(location_at(km))
        .duration(600.)
        .add_opening_hours(TimeWindow::new(0., 86_400.))
        .build()
        .expect("cannot build test node")
}

pub fn test_resource(id: &str) -> Arc<Resource> {
    ResourceBuilder::new(id, BERLIN)
        .add_working_hours(WorkingHours::new(TimeWindow::new(0., 36_000.)))
        .capacity(Load::new(vec![100]))
        .costs(CostFactors { fixed: 0., per_time: 0.01, per_distance: 0.001 })
        .build()
        .expect("cannot build test resource")
}

pub fn quiet_environment() -> Arc<Environment> {
    Arc::new(Environment {
        random: Arc::new(DefaultRandom::new_with_seed(42)),
        logger: Arc::new(|_| ()),
        parallelism: 1,
    })
}

/// A builder preloaded with a small request and short heuristic budgets.
pub fn test_builder() -> OptimizationBuilder {
    let mut builder = OptimizationBuilder::new();
    builder.add_nodes(vec![test_node("a", 1.), test_node("b", 2.), test_node("c", 3.)]);
    builder.add_resources(vec![test_resource("resource")]);
    builder
        .with_environment(quiet_environment())
        .with_property(keys::ANNEALING_ITERATIONS, "50")
        .with_property(keys::EXIT_GENERATIONS, "25");

    builder
}
