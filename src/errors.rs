// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Validation and graph-structural errors are raised before anything is
//! written. `Persistence` is the only variant that can follow a partial
//! effect, and only from the cascade step of `set_status`, which reports
//! it through [`crate::engine::StatusChange`] instead of failing.

use std::path::PathBuf;

use thiserror::Error;

use crate::model::EventId;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Event not found: {0}")]
    NotFound(EventId),

    #[error("Cyclic dependency for event {event}: {}", path.join(" -> "))]
    CyclicDependency { event: EventId, path: Vec<EventId> },

    #[error("Persistence error: {0:#}")]
    Persistence(anyhow::Error),

    #[error("Integrity error in stored events: {0}")]
    Integrity(String),

    #[error("Database file does not exist: {}", .0.display())]
    MissingDatabase(PathBuf),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("event service is no longer running")]
    ServiceClosed,
}

impl SchedulerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        SchedulerError::Validation(msg.into())
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SchedulerError>;
