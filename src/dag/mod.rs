// src/dag/mod.rs

//! Dependency graph over events.
//!
//! - [`graph`] holds the forward/reverse adjacency index, cycle checks and
//!   satisfaction checks.
//! - [`integrity`] validates persisted events before they are indexed.

pub mod graph;
pub mod integrity;

pub use graph::DependencyGraph;
pub use integrity::check_integrity;
