// src/store/mod.rs

//! Durable record store behind the repository.
//!
//! The repository talks to an [`EventStore`] instead of a concrete database.
//! Production uses [`SqliteStore`]; tests use [`MemoryStore`], which can be
//! told to fail specific writes.
//!
//! Stores return `anyhow` errors; the repository wraps them in
//! [`crate::errors::SchedulerError::Persistence`].

use std::fmt::Debug;

use anyhow::Result;

use crate::config::model::StorageSection;
use crate::model::{Event, EventId, SortPreferences};
use crate::types::{EventStatus, StorageBackend};

pub mod database;
pub mod memory;
pub mod sqlite;

pub use database::{check_database, init_database, DatabaseInfo};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// One write in an atomic batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// Insert or replace the whole record.
    Put(Event),
    Delete(EventId),
}

impl StoreOp {
    pub fn event_id(&self) -> &str {
        match self {
            StoreOp::Put(event) => &event.id,
            StoreOp::Delete(id) => id,
        }
    }
}

/// Abstract persistence for events and the sort preference singleton.
pub trait EventStore: Send + Debug {
    /// Every stored event, oldest first.
    fn load_all(&self) -> Result<Vec<Event>>;

    fn get(&self, id: &str) -> Result<Option<Event>>;

    /// Events with the given status, oldest first.
    fn list_by_status(&self, status: EventStatus) -> Result<Vec<Event>>;

    /// Commit every op in `ops`, or none of them.
    fn apply(&mut self, ops: &[StoreOp]) -> Result<()>;

    fn load_preferences(&self) -> Result<Option<SortPreferences>>;

    fn save_preferences(&mut self, prefs: &SortPreferences) -> Result<()>;
}

/// Open the store selected by the `[storage]` section.
pub fn open_store(storage: &StorageSection) -> Result<Box<dyn EventStore>> {
    match storage.backend {
        StorageBackend::Memory => Ok(Box::new(MemoryStore::new())),
        StorageBackend::Sqlite => Ok(Box::new(SqliteStore::open(&storage.path)?)),
    }
}
