#[cfg(test)]
#[path = "../tests/unit/runner_test.rs"]
mod runner_test;

use crate::events::{codes, progress_event, EventBus, EventConsumers};
use crate::result::OptimizationResult;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::sync::{Arc, Mutex, RwLock};
use std::thread::{self, JoinHandle};
use std::time::Duration as StdDuration;
use touropt_core::prelude::*;
use touropt_core::scheme::run_stage;
use touropt_core::utils::{ThreadPool, Timer};

/// A route of a caller supplied prior solution, referencing elements by id.
#[derive(Clone, Debug)]
pub struct InitialRoute {
    /// Id of the serving resource.
    pub resource_id: String,
    /// Index of the claimed working hours window.
    pub window_idx: usize,
    /// Node ids in execution order.
    pub node_ids: Vec<String>,
}

/// A caller supplied prior solution. When present, the construction phase is skipped and
/// heuristic stages start from the supplied assignment.
#[derive(Clone, Debug, Default)]
pub struct InitialSolution {
    /// Prefilled routes.
    pub routes: Vec<InitialRoute>,
}

/// A fully configured optimization request, ready to start.
pub struct Optimization {
    pub(crate) nodes: Vec<Arc<Node>>,
    pub(crate) resources: Vec<Arc<Resource>>,
    pub(crate) connector: Arc<NodeConnector>,
    pub(crate) scheme: Arc<dyn OptimizationScheme>,
    pub(crate) properties: Properties,
    pub(crate) environment: Arc<Environment>,
    pub(crate) initial: Option<InitialSolution>,
    pub(crate) consumers: EventConsumers,
}

struct RunOutcome {
    entity: Entity,
    evaluation: Evaluation,
}

impl Optimization {
    /// Validates the request synchronously, then launches the run on a background worker
    /// thread and returns a handle to it. Validation and configuration errors are raised here;
    /// failures past this point are reported through the error stream and the run result.
    pub fn start(self) -> GenericResult<RunHandle> {
        let Self { nodes, resources, connector, scheme, properties, environment, initial, consumers } = self;

        let config = Config::new(properties, scheme.default_properties())?;
        let report = validate_request(&nodes, &resources, &config)?;

        let mut pipeline_builder = PipelineBuilder::new(connector, config.clone());
        scheme.post_create(&mut pipeline_builder)?;
        let pipeline = pipeline_builder.build()?;

        let (bus, dispatchers) = EventBus::start(consumers);
        report.warnings.into_iter().for_each(|warning| bus.warning(codes::WARNING_PLAUSIBILITY, warning));
        bus.status(
            codes::STATUS_VALIDATED,
            format!("request with {} node(s) and {} resource(s) passed validation", nodes.len(), resources.len()),
        );

        let best: Arc<RwLock<Option<Arc<Entity>>>> = Arc::new(RwLock::new(None));
        let cancelled = Arc::new(AtomicBool::new(false));
        let (result_sender, result_receiver) = channel();

        let worker = {
            let best = best.clone();
            let cancelled = cancelled.clone();

            thread::spawn(move || {
                let outcome =
                    run(&nodes, &resources, &pipeline, scheme.as_ref(), &config, &environment, initial, &bus, &best, &cancelled);

                match outcome {
                    Ok(outcome) => {
                        let (code, verb) = if cancelled.load(Ordering::Relaxed) {
                            (codes::STATUS_CANCELLED, "cancelled")
                        } else {
                            (codes::STATUS_COMPLETED, "completed")
                        };
                        bus.status(code, format!("run {verb} with cost {:.2}", outcome.evaluation.cost));
                        let _ = result_sender.send(Ok(outcome));
                    }
                    Err(err) => {
                        // the single error event per failed run
                        bus.error(codes::ERROR_RUN_FAILED, err.to_string());
                        let _ = result_sender.send(Err(err));
                    }
                }
            })
        };

        Ok(RunHandle { result_receiver: Mutex::new(result_receiver), best, cancelled, worker: Some(worker), dispatchers })
    }
}

/// A handle to a running optimization: exposes mid-run snapshots, cooperative cancellation and
/// the run result.
pub struct RunHandle {
    // guarded so the handle stays shareable by reference between snapshotting threads
    result_receiver: Mutex<Receiver<GenericResult<RunOutcome>>>,
    best: Arc<RwLock<Option<Arc<Entity>>>>,
    cancelled: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
    dispatchers: Vec<JoinHandle<()>>,
}

impl RunHandle {
    /// Returns the most recently published best entity, if construction finished already.
    /// Snapshots are immutable and always fully formed: heuristics mutate private copies and
    /// publish them by pointer swap only after scheduling and scoring completed.
    pub fn snapshot(&self) -> Option<Arc<Entity>> {
        self.best.read().ok().and_then(|guard| guard.clone())
    }

    /// Requests cooperative cancellation. Heuristic stages poll the flag between iterations,
    /// so the run still resolves with the best entity found so far.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Blocks until the run finishes and returns its result.
    pub fn wait(mut self) -> GenericResult<OptimizationResult> {
        let received = self.result_receiver.lock().ok().and_then(|receiver| receiver.recv().ok());
        let outcome =
            received.ok_or_else(|| GenericError::from("worker thread terminated without producing a result"))??;
        self.join();

        Ok(OptimizationResult::new(outcome.entity, outcome.evaluation))
    }

    /// Blocks until the run finishes or the given deadline elapses. On a deadline the run is
    /// cancelled and the result completes exceptionally; any best entity found so far is
    /// discarded unless it was retrieved through [RunHandle::snapshot] beforehand.
    pub fn wait_timeout(mut self, timeout: StdDuration) -> GenericResult<OptimizationResult> {
        let received = self
            .result_receiver
            .lock()
            .map_err(|_| GenericError::from("worker thread terminated without producing a result"))?
            .recv_timeout(timeout);
        match received {
            Ok(outcome) => {
                self.join();
                let outcome = outcome?;
                Ok(OptimizationResult::new(outcome.entity, outcome.evaluation))
            }
            Err(RecvTimeoutError::Timeout) => {
                self.cancelled.store(true, Ordering::Relaxed);
                self.join();
                Err(format!("run terminated after exceeding the {:.1}s wait deadline", timeout.as_secs_f64()).into())
            }
            Err(RecvTimeoutError::Disconnected) => Err("worker thread terminated without producing a result".into()),
        }
    }

    fn join(&mut self) {
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
        // the bus is gone once the worker exits, so dispatchers drain and stop
        for dispatcher in self.dispatchers.drain(..) {
            let _ = dispatcher.join();
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn run(
    nodes: &[Arc<Node>],
    resources: &[Arc<Resource>],
    pipeline: &Pipeline,
    scheme: &dyn OptimizationScheme,
    config: &Config,
    environment: &Environment,
    initial: Option<InitialSolution>,
    bus: &EventBus,
    best: &RwLock<Option<Arc<Entity>>>,
    cancelled: &AtomicBool,
) -> GenericResult<RunOutcome> {
    let timer = Timer::start();

    // a zero core budget means all cores the environment reports
    let cores = config.get_usize(keys::CPU_CORES)?;
    let pool = ThreadPool::new(if cores == 0 { environment.parallelism } else { cores });

    let mut entity = match initial {
        Some(solution) => materialize_initial(nodes, resources, solution)?,
        None => match scheme.construction() {
            Some(kind) => {
                pool.execute(|| touropt_core::scheme::build_initial_entity(nodes, resources, pipeline, kind))?
            }
            None => empty_entity(nodes, resources),
        },
    };

    let mut evaluation = pipeline.evaluate(&mut entity)?;
    let mut cost = evaluation.cost;
    publish(best, &entity);
    bus.status(codes::STATUS_CONSTRUCTED, format!("initial entity has cost {cost:.2}"));
    bus.progress(progress_event(0., "construction", cost, &entity));

    let stages = scheme.stages();
    let total = stages.len().max(1) as f64;

    for (stage_idx, stage) in stages.iter().enumerate() {
        if cancelled.load(Ordering::Relaxed) {
            break;
        }

        let stage_id = format!("{}-{}-{:?}", scheme.name(), stage_idx, stage.kind);
        bus.status(codes::STATUS_STAGE_STARTED, format!("stage '{stage_id}' started"));

        let mut on_improvement = |entity: &Entity, cost: f64, stage_progress: f64| -> GenericResult<()> {
            publish(best, entity);
            let percentage = 100. * (stage_idx as f64 + stage_progress) / total;
            bus.progress(progress_event(percentage, &stage_id, cost, entity));
            Ok(())
        };

        let mut ctx = SearchContext {
            pipeline,
            random: environment.random.clone(),
            logger: environment.logger.clone(),
            is_cancelled: &|| cancelled.load(Ordering::Relaxed),
            on_improvement: &mut on_improvement,
        };

        let (improved, improved_cost) = run_stage(stage, entity, config, &mut ctx)?;
        entity = improved;
        cost = improved_cost;
    }

    // final rescore keeps per route breakdowns consistent with the returned cost
    evaluation = pipeline.evaluate(&mut entity)?;
    entity.verify()?;
    publish(best, &entity);
    bus.progress(progress_event(100., "done", evaluation.cost, &entity));
    (environment.logger.as_ref())(&format!("run took {:.3}s, final cost {:.2}", timer.elapsed_secs_as_f64(), cost));

    Ok(RunOutcome { entity, evaluation })
}

fn publish(best: &RwLock<Option<Arc<Entity>>>, entity: &Entity) {
    let snapshot = Arc::new(entity.deep_copy());
    if let Ok(mut guard) = best.write() {
        *guard = Some(snapshot);
    }
}

fn empty_entity(nodes: &[Arc<Node>], resources: &[Arc<Resource>]) -> Entity {
    let mut entity = Entity::new(nodes, resources);
    for resource in resources {
        for window_idx in 0..resource.working_hours.len() {
            entity.routes.push(Route::new(resource.clone(), window_idx));
        }
    }

    entity
}

/// Turns a caller supplied prior solution into an entity. Unknown element references fail the
/// run; nodes not mentioned by any supplied route stay unassigned.
fn materialize_initial(
    nodes: &[Arc<Node>],
    resources: &[Arc<Resource>],
    solution: InitialSolution,
) -> GenericResult<Entity> {
    let mut entity = empty_entity(nodes, resources);

    for supplied in solution.routes {
        let route_idx = entity
            .routes
            .iter()
            .position(|route| route.resource.id == supplied.resource_id && route.window_idx == supplied.window_idx)
            .ok_or_else(|| {
                GenericError::from(format!(
                    "prior solution references unknown route: resource '{}', window {}",
                    supplied.resource_id, supplied.window_idx
                ))
            })?;

        for node_id in supplied.node_ids {
            let node = entity
                .get_element(&node_id)
                .and_then(|element| element.as_node())
                .cloned()
                .ok_or_else(|| GenericError::from(format!("prior solution references unknown node '{node_id}'")))?;

            entity.routes[route_idx].visits.push(Visit::new(node));
            entity.mark_assigned(&node_id);
        }
    }

    entity.verify()?;

    Ok(entity)
}
