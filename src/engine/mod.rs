// src/engine/mod.rs

//! Status engine and the service that serializes access to it.
//!
//! The synchronous state machine lives in [`status`]; it borrows the
//! repository and has no channels or tokio types. The async shell in
//! [`service`] owns the repository inside a single task and feeds it one
//! command at a time.

pub mod service;
pub mod status;

pub use service::{edit_preferences, EventService, SortEdit};
pub use status::{CascadeFailure, StatusChange, StatusEngine};
