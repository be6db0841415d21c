// src/model/event.rs

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::EventStatus;

/// Canonical event identifier (a UUID v4 in string form).
pub type EventId = String;

/// Tag annotations, kept in insertion order for default display.
pub type TagMap = IndexMap<String, String>;

/// A unit of work with a status and zero or more dependencies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub description: String,
    pub tags: TagMap,
    pub status: EventStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Ids of the events this one requires. No duplicates.
    pub dependencies: Vec<EventId>,
}

impl Event {
    /// Build a fresh record with a new id and both timestamps set to now.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        tags: TagMap,
        dependencies: Vec<EventId>,
        status: EventStatus,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            description: description.into(),
            tags,
            status,
            created_at: now,
            updated_at: now,
            dependencies,
        }
    }

    /// Bump `updated_at` without ever moving it backwards.
    pub fn touch(&mut self) {
        let now = Utc::now();
        if now > self.updated_at {
            self.updated_at = now;
        }
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }
}
