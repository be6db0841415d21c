// src/engine/status.rs

//! Status transitions and the completion cascade.
//!
//! `StatusEngine` borrows the repository mutably for the duration of one
//! `set_status` call, so no other mutation can interleave with a cascade.

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::model::{Event, EventId};
use crate::repo::EventRepository;
use crate::types::EventStatus;

/// A dependent that was eligible for unblocking but whose write failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadeFailure {
    pub id: EventId,
    pub reason: String,
}

/// Everything one `set_status` call wrote.
///
/// `updated[0]` is always the target event; unblocked dependents follow in
/// creation order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusChange {
    pub updated: Vec<Event>,
    pub failed: Vec<CascadeFailure>,
}

impl StatusChange {
    /// True when the target was written but at least one unblock was not.
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn target(&self) -> Option<&Event> {
        self.updated.first()
    }

    /// Dependents moved from `Blocked` to `Pending` by this call.
    pub fn unblocked(&self) -> &[Event] {
        self.updated.get(1..).unwrap_or(&[])
    }
}

/// Status state machine over a borrowed repository.
///
/// Any status may be set on any event. Only transitions into `Completed`
/// have side effects: each direct dependent that is `Blocked` and now
/// satisfied is moved to `Pending`. Dependents further downstream are left
/// alone until their own dependency completes.
#[derive(Debug)]
pub struct StatusEngine<'a> {
    repo: &'a mut EventRepository,
}

impl<'a> StatusEngine<'a> {
    pub fn new(repo: &'a mut EventRepository) -> Self {
        Self { repo }
    }

    /// Set `id` to `status` and run the completion cascade.
    ///
    /// Returns `Err` without side effects if the event is unknown or the
    /// write of the target fails. Once the target is written the call
    /// succeeds; failed dependent writes are listed in
    /// [`StatusChange::failed`] and those dependents stay `Blocked`.
    pub fn set_status(&mut self, id: &str, status: EventStatus) -> Result<StatusChange> {
        let previous = self.repo.get(id)?.status;
        let target = self.repo.commit_status(id, status)?;

        info!(event = %id, from = ?previous, to = ?status, "status set");

        let mut change = StatusChange {
            updated: vec![target],
            failed: Vec::new(),
        };

        if status != EventStatus::Completed {
            return Ok(change);
        }

        let dependents: Vec<EventId> = self.repo.graph().dependents_of(id).to_vec();
        for dependent in dependents {
            if self.repo.status_of(&dependent) != Some(EventStatus::Blocked) {
                continue;
            }
            if !self.repo.is_satisfied(&dependent)? {
                debug!(event = %dependent, "dependent still waiting on other dependencies");
                continue;
            }

            match self.repo.commit_status(&dependent, EventStatus::Pending) {
                Ok(event) => {
                    debug!(event = %dependent, cause = %id, "dependent unblocked");
                    change.updated.push(event);
                }
                Err(err) => {
                    warn!(event = %dependent, cause = %id, error = %err, "failed to unblock dependent");
                    change.failed.push(CascadeFailure {
                        id: dependent,
                        reason: err.to_string(),
                    });
                }
            }
        }

        if change.is_partial() {
            warn!(
                event = %id,
                unblocked = change.unblocked().len(),
                failed = change.failed.len(),
                "cascade partially applied"
            );
        }

        Ok(change)
    }
}
