// src/repo/mod.rs

//! Event repository: the single owner of event records.
//!
//! Validation, dependency checks and persistence all happen here; the
//! status engine and the CLI only go through this API.

pub mod repository;
mod validate;

pub use repository::{Deletion, EventRepository};
