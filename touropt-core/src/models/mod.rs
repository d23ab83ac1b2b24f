//! Domain models of the optimization engine.

pub mod common;
pub mod element;
pub mod solution;
