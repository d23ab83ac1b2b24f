use super::*;
use crate::helpers::*;
use std::sync::Mutex;
use touropt_core::evaluation::codes as restriction_codes;

struct FailingScheme;

impl OptimizationScheme for FailingScheme {
    fn name(&self) -> &str {
        "failing"
    }

    fn post_create(&self, pipeline: &mut PipelineBuilder) -> GenericResult<()> {
        struct Unavailable;
        impl RouteRestriction for Unavailable {
            fn evaluate(&self, _: &RouteContext<'_>, _: &mut RouteCosts) -> GenericResult<()> {
                Err("restriction backend is unavailable".into())
            }
        }

        pipeline.add_route_restriction(Unavailable);
        Ok(())
    }

    fn stages(&self) -> Vec<HeuristicStage> {
        vec![HeuristicStage::new(HeuristicKind::SimulatedAnnealing)]
    }
}

#[test]
fn can_run_to_completion() {
    let result = test_builder().build().unwrap().start().unwrap().wait().unwrap();

    assert!(result.cost() > 0.);
    assert!(result.unassigned().is_empty());
    assert!(result.entity().verify().is_ok());
}

#[test]
fn can_observe_lifecycle_status_events() {
    let observed = Arc::new(Mutex::new(Vec::new()));
    let mut builder = test_builder();
    let sink = observed.clone();
    builder.on_status(move |event| sink.lock().unwrap().push(event.code));

    builder.build().unwrap().start().unwrap().wait().unwrap();

    let observed = observed.lock().unwrap();
    assert_eq!(observed.first().copied(), Some(codes::STATUS_VALIDATED));
    assert!(observed.contains(&codes::STATUS_CONSTRUCTED));
    assert!(observed.contains(&codes::STATUS_STAGE_STARTED));
    assert_eq!(observed.last().copied(), Some(codes::STATUS_COMPLETED));
}

#[test]
fn can_observe_bounded_progress() {
    let observed = Arc::new(Mutex::new(Vec::new()));
    let mut builder = test_builder();
    let sink = observed.clone();
    builder.on_progress(move |event| sink.lock().unwrap().push(event.percentage));

    builder.build().unwrap().start().unwrap().wait().unwrap();

    let observed = observed.lock().unwrap();
    assert!(!observed.is_empty());
    assert!(observed.iter().all(|percentage| (0. ..=100.).contains(percentage)));
    assert_eq!(observed.last().copied(), Some(100.));
}

#[test]
fn can_snapshot_published_best() {
    let handle = test_builder().build().unwrap().start().unwrap();

    let mut snapshot = None;
    for _ in 0..500 {
        snapshot = handle.snapshot();
        if snapshot.is_some() {
            break;
        }
        std::thread::sleep(StdDuration::from_millis(10));
    }

    let snapshot = snapshot.expect("no best entity was published");
    assert!(snapshot.verify().is_ok());
    handle.wait().unwrap();
}

#[test]
fn can_run_with_explicit_core_budget() {
    let mut builder = test_builder();
    builder.with_property(keys::CPU_CORES, "2");

    let result = builder.build().unwrap().start().unwrap().wait().unwrap();

    assert!(result.unassigned().is_empty());
    assert!(result.entity().verify().is_ok());
}

#[test]
fn can_serve_concurrent_snapshots() {
    let mut builder = test_builder();
    builder
        .with_property(keys::ANNEALING_ITERATIONS, "100000000")
        .with_property(keys::EXIT_GENERATIONS, "100000000");
    let handle = builder.build().unwrap().start().unwrap();

    std::thread::scope(|scope| {
        let handle = &handle;
        let readers = (0..4)
            .map(|_| {
                scope.spawn(move || {
                    (0..25)
                        .filter_map(|_| {
                            let snapshot = handle.snapshot();
                            std::thread::sleep(StdDuration::from_millis(1));
                            snapshot
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect::<Vec<_>>();

        let snapshots = readers.into_iter().flat_map(|reader| reader.join().unwrap()).collect::<Vec<_>>();

        assert!(!snapshots.is_empty());
        snapshots.iter().for_each(|snapshot| snapshot.verify().expect("snapshot is not fully formed"));
    });

    handle.cancel();
    handle.wait().unwrap();
}

#[test]
fn can_keep_search_unbiased_by_zero_cost_restriction() {
    struct ZeroCostScheme;

    impl OptimizationScheme for ZeroCostScheme {
        fn name(&self) -> &str {
            "zero-cost"
        }

        fn post_create(&self, pipeline: &mut PipelineBuilder) -> GenericResult<()> {
            struct Inert;
            impl RouteRestriction for Inert {
                fn evaluate(&self, _: &RouteContext<'_>, _: &mut RouteCosts) -> GenericResult<()> {
                    Ok(())
                }
            }

            pipeline.add_route_restriction(Inert);
            Ok(())
        }

        fn stages(&self) -> Vec<HeuristicStage> {
            vec![HeuristicStage::new(HeuristicKind::SimulatedAnnealing)]
        }
    }

    let order_of = |result: &OptimizationResult| {
        result
            .entity()
            .routes
            .iter()
            .map(|route| route.visits.iter().map(|visit| visit.node.id.clone()).collect::<Vec<_>>())
            .collect::<Vec<_>>()
    };

    // both runs use the same seed, an inert restriction must not perturb the search
    let baseline = test_builder().build().unwrap().start().unwrap().wait().unwrap();
    let mut builder = test_builder();
    builder.with_scheme(Arc::new(ZeroCostScheme));
    let observed = builder.build().unwrap().start().unwrap().wait().unwrap();

    assert_eq!(baseline.cost(), observed.cost());
    assert_eq!(order_of(&baseline), order_of(&observed));
}

#[test]
fn can_publish_single_error_event_on_failure() {
    let observed = Arc::new(Mutex::new(Vec::new()));
    let mut builder = test_builder();
    let sink = observed.clone();
    builder.with_scheme(Arc::new(FailingScheme)).on_error(move |event| sink.lock().unwrap().push(event.code));

    let result = builder.build().unwrap().start().unwrap().wait();

    assert!(result.err().unwrap().to_string().contains("restriction backend is unavailable"));
    assert_eq!(*observed.lock().unwrap(), vec![codes::ERROR_RUN_FAILED]);
}

#[test]
fn can_cancel_cooperatively() {
    let observed = Arc::new(Mutex::new(Vec::new()));
    let mut builder = test_builder();
    let sink = observed.clone();
    builder
        .with_property(keys::ANNEALING_ITERATIONS, "100000000")
        .with_property(keys::EXIT_GENERATIONS, "100000000")
        .on_status(move |event| sink.lock().unwrap().push(event.code));
    let handle = builder.build().unwrap().start().unwrap();

    std::thread::sleep(StdDuration::from_millis(50));
    handle.cancel();
    let result = handle.wait().unwrap();

    assert!(result.entity().verify().is_ok());
    assert_eq!(observed.lock().unwrap().last().copied(), Some(codes::STATUS_CANCELLED));
}

#[test]
fn can_terminate_on_wait_deadline() {
    let mut builder = test_builder();
    builder
        .with_property(keys::ANNEALING_ITERATIONS, "100000000")
        .with_property(keys::EXIT_GENERATIONS, "100000000");
    let handle = builder.build().unwrap().start().unwrap();

    let result = handle.wait_timeout(StdDuration::from_millis(100));

    assert!(result.err().unwrap().to_string().contains("wait deadline"));
}

#[test]
fn can_start_from_prior_solution() {
    let mut builder = test_builder();
    builder.with_initial_solution(InitialSolution {
        routes: vec![InitialRoute {
            resource_id: "resource".to_string(),
            window_idx: 0,
            node_ids: vec!["b".to_string(), "a".to_string()],
        }],
    });

    let result = builder.build().unwrap().start().unwrap().wait().unwrap();

    // node 'c' is not part of the prior solution and moves never pick up mandatory nodes
    assert_eq!(result.unassigned(), vec!["c".to_string()]);
    assert!(result
        .global_violations()
        .iter()
        .any(|violation| violation.code == restriction_codes::UNASSIGNED_MANDATORY));
}

#[test]
fn cannot_materialize_solution_with_unknown_node() {
    let nodes = [test_node("a", 1.)];
    let resources = [test_resource("resource")];
    let solution = InitialSolution {
        routes: vec![InitialRoute {
            resource_id: "resource".to_string(),
            window_idx: 0,
            node_ids: vec!["ghost".to_string()],
        }],
    };

    let result = materialize_initial(&nodes, &resources, solution);

    assert!(result.err().unwrap().to_string().contains("unknown node 'ghost'"));
}

#[test]
fn cannot_materialize_solution_with_unknown_route() {
    let nodes = [test_node("a", 1.)];
    let resources = [test_resource("resource")];
    let solution = InitialSolution {
        routes: vec![InitialRoute { resource_id: "resource".to_string(), window_idx: 7, node_ids: vec![] }],
    };

    let result = materialize_initial(&nodes, &resources, solution);

    assert!(result.err().unwrap().to_string().contains("unknown route"));
}
