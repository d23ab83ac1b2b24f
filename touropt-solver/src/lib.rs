//! A solver crate which wraps the optimization core with an asynchronous execution engine,
//! ordered event streams, a result view and a versioned json format.
//!
//! A request is assembled through [OptimizationBuilder], started with [Optimization::start]
//! and observed through the returned [RunHandle]: event consumers registered on the builder
//! receive progress, status, warning and error events while the run executes on a background
//! worker thread, and [RunHandle::snapshot] exposes the current best entity at any point.

#[cfg(test)]
#[path = "../tests/helpers/mod.rs"]
pub mod helpers;

pub mod events;
pub use self::events::{ErrorEvent, EventConsumers, ProgressEvent, StatusEvent, TimeBreakdown, WarningEvent};

mod runner;
pub use self::runner::{InitialRoute, InitialSolution, Optimization, RunHandle};

mod builder;
pub use self::builder::OptimizationBuilder;

mod result;
pub use self::result::{ElementReport, OptimizationResult, RouteReport};

pub mod format;
