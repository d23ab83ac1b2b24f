#[cfg(test)]
#[path = "../tests/unit/events_test.rs"]
mod events_test;

use std::sync::mpsc::{channel, Sender};
use std::thread::{self, JoinHandle};
use touropt_core::prelude::*;

/// Well known event codes published by the engine.
pub mod codes {
    /// The request passed synchronous validation.
    pub const STATUS_VALIDATED: i32 = 1;
    /// The initial entity is built and published.
    pub const STATUS_CONSTRUCTED: i32 = 2;
    /// A heuristic stage started.
    pub const STATUS_STAGE_STARTED: i32 = 3;
    /// The run finished normally.
    pub const STATUS_COMPLETED: i32 = 4;
    /// The run stopped on a cancellation request.
    pub const STATUS_CANCELLED: i32 = 5;

    /// A non-fatal plausibility anomaly was detected during validation.
    pub const WARNING_PLAUSIBILITY: i32 = 100;

    /// The run failed and its result completes exceptionally.
    pub const ERROR_RUN_FAILED: i32 = 500;
}

/// Aggregated per category time breakdown over all routes of an entity.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TimeBreakdown {
    /// Total visit (service) time.
    pub productive: Duration,
    /// Total waiting time.
    pub idle: Duration,
    /// Total slack within working hours windows.
    pub flex: Duration,
    /// Total driving time between visits.
    pub transit: Duration,
    /// Total driving time of final legs back to termination anchors.
    pub termination_transit: Duration,
    /// Total travel distance.
    pub distance: Distance,
}

impl TimeBreakdown {
    /// Aggregates the breakdown over all routes of the given entity.
    pub fn from_entity(entity: &Entity) -> Self {
        entity.routes.iter().fold(Self::default(), |mut acc, route| {
            acc.productive += route.costs.productive_time;
            acc.idle += route.costs.idle_time;
            acc.flex += route.costs.flex_time;
            acc.transit += route.costs.transit_time;
            acc.termination_transit += route.costs.termination_transit_time;
            acc.distance += route.costs.distance;
            acc
        })
    }
}

/// A progress snapshot, published on each improvement and at stage boundaries.
#[derive(Clone, Debug)]
pub struct ProgressEvent {
    /// Overall run progress in the `[0, 100]` range.
    pub percentage: f64,
    /// Id of the currently running stage.
    pub stage: String,
    /// Cost of the best entity found so far.
    pub cost: Cost,
    /// Amount of routes with at least one visit.
    pub routes: usize,
    /// Amount of assigned node visits.
    pub assigned: usize,
    /// Amount of unassigned nodes.
    pub unassigned: usize,
    /// Aggregated time and distance breakdown of the best entity.
    pub times: TimeBreakdown,
}

/// A lifecycle transition of a run.
#[derive(Clone, Debug)]
pub struct StatusEvent {
    /// One of the status codes from [codes].
    pub code: i32,
    /// A human readable description.
    pub description: String,
}

/// A non-fatal anomaly, e.g. a skipped plausibility check.
#[derive(Clone, Debug)]
pub struct WarningEvent {
    /// One of the warning codes from [codes].
    pub code: i32,
    /// A human readable description.
    pub description: String,
}

/// A fatal run failure. Exactly one error event is published per failed run; the same cause
/// also completes the run result exceptionally.
#[derive(Clone, Debug)]
pub struct ErrorEvent {
    /// One of the error codes from [codes].
    pub code: i32,
    /// The failure cause.
    pub cause: String,
}

type Consumer<E> = Box<dyn Fn(&E) + Send>;

/// Consumers of the four event streams, registered before a run starts. Within one stream,
/// events are delivered in publication order; streams are independent of each other.
#[derive(Default)]
pub struct EventConsumers {
    pub(crate) progress: Vec<Consumer<ProgressEvent>>,
    pub(crate) status: Vec<Consumer<StatusEvent>>,
    pub(crate) warning: Vec<Consumer<WarningEvent>>,
    pub(crate) error: Vec<Consumer<ErrorEvent>>,
}

/// Publication side of the event streams, owned by the worker thread. Dropping the bus
/// disconnects the streams and lets dispatcher threads drain and exit.
pub(crate) struct EventBus {
    progress: Sender<ProgressEvent>,
    status: Sender<StatusEvent>,
    warning: Sender<WarningEvent>,
    error: Sender<ErrorEvent>,
}

impl EventBus {
    /// Starts one dispatcher thread per stream so that consumers observe events of a stream
    /// strictly in publication order without blocking the worker.
    pub(crate) fn start(consumers: EventConsumers) -> (Self, Vec<JoinHandle<()>>) {
        fn dispatch<E: Send + 'static>(consumers: Vec<Consumer<E>>) -> (Sender<E>, JoinHandle<()>) {
            let (sender, receiver) = channel::<E>();
            let handle = thread::spawn(move || {
                for event in receiver.iter() {
                    consumers.iter().for_each(|consumer| consumer(&event));
                }
            });

            (sender, handle)
        }

        let (progress, progress_handle) = dispatch(consumers.progress);
        let (status, status_handle) = dispatch(consumers.status);
        let (warning, warning_handle) = dispatch(consumers.warning);
        let (error, error_handle) = dispatch(consumers.error);

        (
            Self { progress, status, warning, error },
            vec![progress_handle, status_handle, warning_handle, error_handle],
        )
    }

    pub(crate) fn progress(&self, event: ProgressEvent) {
        let _ = self.progress.send(event);
    }

    pub(crate) fn status(&self, code: i32, description: String) {
        let _ = self.status.send(StatusEvent { code, description });
    }

    pub(crate) fn warning(&self, code: i32, description: String) {
        let _ = self.warning.send(WarningEvent { code, description });
    }

    pub(crate) fn error(&self, code: i32, cause: String) {
        let _ = self.error.send(ErrorEvent { code, cause });
    }
}

/// Builds a progress event from the given entity state.
pub(crate) fn progress_event(percentage: f64, stage: &str, cost: Cost, entity: &Entity) -> ProgressEvent {
    ProgressEvent {
        percentage: percentage.clamp(0., 100.),
        stage: stage.to_string(),
        cost,
        routes: entity.routes.iter().filter(|route| !route.visits.is_empty()).count(),
        assigned: entity.assigned_count(),
        unassigned: entity.unassigned.len(),
        times: TimeBreakdown::from_entity(entity),
    }
}
