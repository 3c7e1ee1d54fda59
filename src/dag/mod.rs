// src/dag/mod.rs

//! Dependency resolution and scheduling.
//!
//! - [`dependency`] parses `"name"` / `"!name"` references.
//! - [`graph`] holds the named units and decides which ones are ready.
//! - [`scheduler`] adds `UnitGraph::run_all`, the concurrent run loop.

pub mod dependency;
pub mod graph;
pub mod scheduler;

pub use dependency::{Dependency, Polarity};
pub use graph::UnitGraph;
