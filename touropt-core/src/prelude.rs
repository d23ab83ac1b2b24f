//! This module reimports commonly used types.

pub use crate::config::{keys, Config, Properties};
pub use crate::connector::{BackupElementConnector, Connection, FlatEarthConnector, HaversineConnector, NodeConnector};
pub use crate::evaluation::{
    Evaluation, NodeContext, NodeRestriction, Pipeline, PipelineBuilder, RouteContext, RouteRestriction,
};
pub use crate::models::common::{Cost, Distance, Duration, Load, Location, Schedule, TimeWindow, Timestamp};
pub use crate::models::element::{
    Constraint, CostFactors, Element, Node, NodeBuilder, Resource, ResourceBuilder, WorkingHours,
};
pub use crate::models::solution::{Entity, Route, RouteCosts, Violation, ViolationCategory, Visit};
pub use crate::scheme::{
    ConstructionKind, DefaultScheme, HeuristicKind, HeuristicStage, OptimizationScheme, SearchContext,
};
pub use crate::validation::validate_request;

pub use crate::utils::{compare_floats, DefaultRandom, Environment, GenericError, GenericResult, InfoLogger, Random};
