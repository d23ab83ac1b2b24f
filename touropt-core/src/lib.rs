//! Core crate contains the building blocks of a fleet/tour optimization engine: the entity
//! route data model, the extensible cost and restriction evaluation pipeline, the node
//! connector and the multi-phase optimization scheme.

#[cfg(test)]
#[path = "../tests/helpers/mod.rs"]
#[macro_use]
pub mod helpers;

pub mod config;
pub mod connector;
pub mod evaluation;
pub mod models;
pub mod scheme;
pub mod utils;
pub mod validation;

pub mod prelude;
