// src/store/memory.rs

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{anyhow, bail, Result};
use indexmap::IndexMap;
use tracing::{debug, warn};

use super::{EventStore, StoreOp};
use crate::model::{Event, EventId, SortPreferences};
use crate::types::EventStatus;

#[derive(Debug, Default)]
struct Faults {
    /// Any batch touching one of these ids fails.
    ids: HashSet<EventId>,
    /// Number of upcoming `apply` calls that fail regardless of content.
    next_writes: usize,
    preferences: bool,
}

#[derive(Debug, Default)]
struct MemoryInner {
    events: IndexMap<EventId, Event>,
    preferences: Option<SortPreferences>,
    faults: Faults,
}

/// Process-local store.
///
/// Cloning yields another handle to the same data, so a test can keep one
/// handle for fault injection and inspection while the repository owns the
/// other.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store directly, bypassing validation. Used to simulate data
    /// written by another tool.
    pub fn with_events(events: Vec<Event>) -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.lock() {
            for event in events {
                inner.events.insert(event.id.clone(), event);
            }
        }
        store
    }

    /// Make every batch that touches `id` fail.
    pub fn fail_writes_for(&self, id: &str) {
        if let Ok(mut inner) = self.lock() {
            inner.faults.ids.insert(id.to_string());
        }
    }

    /// Make the next `n` batches fail.
    pub fn fail_next_writes(&self, n: usize) {
        if let Ok(mut inner) = self.lock() {
            inner.faults.next_writes = n;
        }
    }

    pub fn fail_preference_writes(&self, fail: bool) {
        if let Ok(mut inner) = self.lock() {
            inner.faults.preferences = fail;
        }
    }

    pub fn clear_faults(&self) {
        if let Ok(mut inner) = self.lock() {
            inner.faults = Faults::default();
        }
    }

    pub fn len(&self) -> usize {
        self.lock().map(|inner| inner.events.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryInner>> {
        self.inner
            .lock()
            .map_err(|e| anyhow!("memory store lock poisoned: {e}"))
    }
}

impl EventStore for MemoryStore {
    fn load_all(&self) -> Result<Vec<Event>> {
        Ok(self.lock()?.events.values().cloned().collect())
    }

    fn get(&self, id: &str) -> Result<Option<Event>> {
        Ok(self.lock()?.events.get(id).cloned())
    }

    fn list_by_status(&self, status: EventStatus) -> Result<Vec<Event>> {
        Ok(self
            .lock()?
            .events
            .values()
            .filter(|e| e.status == status)
            .cloned()
            .collect())
    }

    fn apply(&mut self, ops: &[StoreOp]) -> Result<()> {
        let mut inner = self.lock()?;

        if inner.faults.next_writes > 0 {
            inner.faults.next_writes -= 1;
            warn!(ops = ops.len(), "injected write failure (memory)");
            bail!("injected write failure");
        }
        if let Some(op) = ops
            .iter()
            .find(|op| inner.faults.ids.contains(op.event_id()))
        {
            warn!(event = %op.event_id(), "injected write failure for event (memory)");
            bail!("injected write failure for event {}", op.event_id());
        }

        for op in ops {
            match op {
                StoreOp::Put(event) => {
                    inner.events.insert(event.id.clone(), event.clone());
                }
                StoreOp::Delete(id) => {
                    inner.events.shift_remove(id);
                }
            }
        }

        debug!(ops = ops.len(), "applied batch (memory)");
        Ok(())
    }

    fn load_preferences(&self) -> Result<Option<SortPreferences>> {
        Ok(self.lock()?.preferences.clone())
    }

    fn save_preferences(&mut self, prefs: &SortPreferences) -> Result<()> {
        let mut inner = self.lock()?;
        if inner.faults.preferences {
            bail!("injected preference write failure");
        }
        inner.preferences = Some(prefs.clone());
        Ok(())
    }
}
