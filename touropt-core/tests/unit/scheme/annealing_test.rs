use super::*;
use crate::helpers::*;
use crate::scheme::{run_stage, HeuristicKind, HeuristicStage, SearchContext};
use crate::utils::DefaultRandom;
use std::sync::Arc;

fn disordered_entity(connector: &crate::connector::NodeConnector) -> Entity {
    // visits deliberately out of geographic order
    let nodes = [test_node("c", 3.), test_node("a", 1.), test_node("b", 2.)];
    test_entity_with_route(&nodes, test_resource("resource"), connector)
}

fn annealing() -> SimulatedAnnealing {
    SimulatedAnnealing { iterations: 200, repetitions: 1, max_non_improving: 1000, auto_filter: true }
}

#[test]
fn can_improve_or_keep_seed_cost() {
    let pipeline = test_pipeline();
    let mut seed = disordered_entity(pipeline.connector());
    let seed_cost = pipeline.evaluate(&mut seed).unwrap().cost;
    let mut on_improvement = |_: &Entity, _: f64, _: f64| Ok(());
    let mut ctx = SearchContext {
        pipeline: &pipeline,
        random: test_random(),
        logger: test_logger(),
        is_cancelled: &|| false,
        on_improvement: &mut on_improvement,
    };

    let (best, best_cost) = annealing().solve(seed, &mut ctx).unwrap();

    assert!(best_cost <= seed_cost);
    assert!(best.verify().is_ok());
}

#[test]
fn can_stop_on_cancellation() {
    let pipeline = test_pipeline();
    let mut seed = disordered_entity(pipeline.connector());
    let seed_cost = pipeline.evaluate(&mut seed).unwrap().cost;
    let mut on_improvement = |_: &Entity, _: f64, _: f64| Ok(());
    let mut ctx = SearchContext {
        pipeline: &pipeline,
        random: test_random(),
        logger: test_logger(),
        is_cancelled: &|| true,
        on_improvement: &mut on_improvement,
    };

    let (_, best_cost) = annealing().solve(seed, &mut ctx).unwrap();

    assert_eq!(best_cost, seed_cost);
}

#[test]
fn can_log_stage_completion() {
    let pipeline = test_pipeline();
    let seed = disordered_entity(pipeline.connector());
    let lines = Arc::new(std::sync::Mutex::new(Vec::new()));
    let sink = lines.clone();
    let mut on_improvement = |_: &Entity, _: f64, _: f64| Ok(());
    let mut ctx = SearchContext {
        pipeline: &pipeline,
        random: test_random(),
        logger: Arc::new(move |msg: &str| sink.lock().unwrap().push(msg.to_string())),
        is_cancelled: &|| false,
        on_improvement: &mut on_improvement,
    };
    let stage = HeuristicStage::new(HeuristicKind::SimulatedAnnealing);

    run_stage(&stage, seed, &test_config(), &mut ctx).unwrap();

    let lines = lines.lock().unwrap();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("stage finished with cost"));
}

#[test]
fn can_reproduce_runs_with_same_seed() {
    let solve_once = || {
        let pipeline = test_pipeline();
        let seed = disordered_entity(pipeline.connector());
        let mut on_improvement = |_: &Entity, _: f64, _: f64| Ok(());
        let mut ctx = SearchContext {
            pipeline: &pipeline,
            random: Arc::new(DefaultRandom::new_with_seed(7)),
            logger: test_logger(),
            is_cancelled: &|| false,
            on_improvement: &mut on_improvement,
        };
        annealing().solve(seed, &mut ctx).unwrap().1
    };

    assert_eq!(solve_once(), solve_once());
}

#[test]
fn can_report_decreasing_costs_on_improvement() {
    let pipeline = test_pipeline();
    let seed = disordered_entity(pipeline.connector());
    let mut reported = Vec::new();
    let mut on_improvement = |_: &Entity, cost: f64, progress: f64| {
        reported.push((cost, progress));
        Ok(())
    };
    let mut ctx = SearchContext {
        pipeline: &pipeline,
        random: test_random(),
        logger: test_logger(),
        is_cancelled: &|| false,
        on_improvement: &mut on_improvement,
    };

    annealing().solve(seed, &mut ctx).unwrap();

    assert!(!reported.is_empty());
    assert!(reported.windows(2).all(|pair| pair[1].0 < pair[0].0));
    assert!(reported.iter().all(|(_, progress)| *progress > 0. && *progress <= 1.));
}

#[test]
fn can_propagate_improvement_callback_failure() {
    let pipeline = test_pipeline();
    let seed = disordered_entity(pipeline.connector());
    let mut on_improvement =
        |_: &Entity, _: f64, _: f64| Err(crate::utils::GenericError::from("consumer rejected the update"));
    let mut ctx = SearchContext {
        pipeline: &pipeline,
        random: test_random(),
        logger: test_logger(),
        is_cancelled: &|| false,
        on_improvement: &mut on_improvement,
    };

    let result = annealing().solve(seed, &mut ctx);

    assert!(result.err().unwrap().to_string().contains("consumer rejected the update"));
}

#[test]
fn can_ignore_entity_without_moves() {
    let pipeline = test_pipeline();
    let resources = [test_resource("resource")];
    let mut seed = test_entity(&[], &resources);
    let seed_cost = pipeline.evaluate(&mut seed).unwrap().cost;
    let mut on_improvement = |_: &Entity, _: f64, _: f64| Ok(());
    let mut ctx = SearchContext {
        pipeline: &pipeline,
        random: test_random(),
        logger: test_logger(),
        is_cancelled: &|| false,
        on_improvement: &mut on_improvement,
    };

    let (_, best_cost) =
        SimulatedAnnealing { iterations: 10, repetitions: 2, max_non_improving: 5, auto_filter: true }
            .solve(seed, &mut ctx)
            .unwrap();

    assert_eq!(best_cost, seed_cost);
}
