// src/types.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Status of an event.
///
/// `Blocked` is written when an event is created with unfinished
/// dependencies, and cleared by the cascade in
/// [`crate::engine::StatusEngine::set_status`]. It is never derived on read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventStatus {
    Pending,
    InProgress,
    Completed,
    Blocked,
}

impl Default for EventStatus {
    fn default() -> Self {
        EventStatus::Pending
    }
}

impl EventStatus {
    /// Column / CLI spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Pending => "pending",
            EventStatus::InProgress => "in_progress",
            EventStatus::Completed => "completed",
            EventStatus::Blocked => "blocked",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "pending" => Ok(EventStatus::Pending),
            "in_progress" | "inprogress" => Ok(EventStatus::InProgress),
            "completed" | "done" => Ok(EventStatus::Completed),
            "blocked" => Ok(EventStatus::Blocked),
            other => Err(format!(
                "invalid status: {other} (expected pending, in_progress, completed or blocked)"
            )),
        }
    }
}

/// Direction applied to a single tag sort rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Asc
    }
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asc" | "ascending" => Ok(SortDirection::Asc),
            "desc" | "descending" => Ok(SortDirection::Desc),
            other => Err(format!(
                "invalid sort direction: {other} (expected \"asc\" or \"desc\")"
            )),
        }
    }
}

/// Where events are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// A SQLite database file (see `[storage].path`).
    Sqlite,
    /// Process memory only (lost on exit).
    Memory,
}

impl Default for StorageBackend {
    fn default() -> Self {
        StorageBackend::Sqlite
    }
}
