// src/store/database.rs

//! Database file management behind `todo-scheduler db`.
//!
//! Creating a file and checking an existing one both end in the same
//! inspection: every stored event is loaded and run through
//! [`check_integrity`], so a file that opens but holds a broken graph is
//! reported here rather than on the next mutation.

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use super::{EventStore, SqliteStore};
use crate::dag::check_integrity;
use crate::errors::{Result, SchedulerError};

/// What a database file holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DatabaseInfo {
    pub path: PathBuf,
    pub events: usize,
    /// Whether sort preferences have been saved yet.
    pub has_preferences: bool,
}

/// Create the database at `path` (parent directories included) if it does
/// not exist yet, then inspect it.
pub fn init_database(path: &Path) -> Result<DatabaseInfo> {
    let store = SqliteStore::open(path).map_err(SchedulerError::Persistence)?;
    let db = inspect(path, &store)?;
    info!(path = ?path, events = db.events, "database initialized");
    Ok(db)
}

/// Open an existing database and verify its contents.
///
/// Unlike [`init_database`], a missing file is an error instead of being
/// created.
pub fn check_database(path: &Path) -> Result<DatabaseInfo> {
    if !path.exists() {
        return Err(SchedulerError::MissingDatabase(path.to_path_buf()));
    }
    let store = SqliteStore::open(path).map_err(SchedulerError::Persistence)?;
    let db = inspect(path, &store)?;
    info!(path = ?path, events = db.events, "database check passed");
    Ok(db)
}

fn inspect(path: &Path, store: &SqliteStore) -> Result<DatabaseInfo> {
    let events = store.load_all().map_err(SchedulerError::Persistence)?;
    check_integrity(&events)?;
    let prefs = store
        .load_preferences()
        .map_err(SchedulerError::Persistence)?;

    Ok(DatabaseInfo {
        path: path.to_path_buf(),
        events: events.len(),
        has_preferences: prefs.is_some(),
    })
}
