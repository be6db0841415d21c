// src/engine/service.rs

//! Single-writer actor around the repository.
//!
//! The repository is moved into one tokio task. Callers hold a cloneable
//! [`EventService`] handle and send commands over an `mpsc` channel,
//! each carrying a `oneshot` sender for the reply. The loop handles one
//! command at a time, so reads never observe a half-finished cascade and
//! writes never interleave.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::engine::status::{StatusChange, StatusEngine};
use crate::errors::{Result, SchedulerError};
use crate::model::{
    CreateEventRequest, Event, EventFilter, EventId, SortPreferences, UpdateEventRequest,
};
use crate::repo::{Deletion, EventRepository};
use crate::types::{EventStatus, SortDirection};

const COMMAND_BUFFER: usize = 64;

type Reply<T> = oneshot::Sender<Result<T>>;

/// In-place edit of the sort preference set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortEdit {
    SetEnabled(bool),
    /// Add a rule at the lowest priority, or change an existing rule's
    /// direction in place.
    Upsert {
        tag_key: String,
        direction: SortDirection,
    },
    Remove(String),
    Move { tag_key: String, index: usize },
}

impl SortEdit {
    /// Apply to `prefs`. Returns false if the edit named an unknown rule.
    pub fn apply(&self, prefs: &mut SortPreferences) -> bool {
        match self {
            SortEdit::SetEnabled(enabled) => {
                prefs.set_enabled(*enabled);
                true
            }
            SortEdit::Upsert { tag_key, direction } => {
                prefs.upsert_rule(tag_key, *direction);
                true
            }
            SortEdit::Remove(tag_key) => prefs.remove_rule(tag_key),
            SortEdit::Move { tag_key, index } => prefs.move_rule(tag_key, *index),
        }
    }

    fn tag_key(&self) -> Option<&str> {
        match self {
            SortEdit::SetEnabled(_) => None,
            SortEdit::Upsert { tag_key, .. }
            | SortEdit::Remove(tag_key)
            | SortEdit::Move { tag_key, .. } => Some(tag_key),
        }
    }
}

/// Messages handled by the service loop.
#[derive(Debug)]
enum Command {
    Create {
        request: CreateEventRequest,
        reply: Reply<Event>,
    },
    Get {
        id: EventId,
        reply: Reply<Event>,
    },
    List {
        filter: EventFilter,
        reply: Reply<Vec<Event>>,
    },
    Snapshot {
        reply: Reply<Vec<Event>>,
    },
    Update {
        request: UpdateEventRequest,
        reply: Reply<Event>,
    },
    Delete {
        id: EventId,
        reply: Reply<Deletion>,
    },
    SetStatus {
        id: EventId,
        status: EventStatus,
        reply: Reply<StatusChange>,
    },
    DependenciesOf {
        id: EventId,
        reply: Reply<Vec<Event>>,
    },
    DependentsOf {
        id: EventId,
        reply: Reply<Vec<Event>>,
    },
    DownstreamOf {
        id: EventId,
        reply: Reply<Vec<Event>>,
    },
    SortPreferences {
        reply: Reply<SortPreferences>,
    },
    EditSortPreferences {
        edit: SortEdit,
        reply: Reply<SortPreferences>,
    },
    Shutdown,
}

/// Cloneable handle to the running service.
#[derive(Debug, Clone)]
pub struct EventService {
    tx: mpsc::Sender<Command>,
}

impl EventService {
    /// Move `repo` into a new tokio task and return a handle to it.
    ///
    /// The join handle resolves to the repository once the loop stops,
    /// either after [`EventService::shutdown`] or when every handle has
    /// been dropped.
    pub fn spawn(repo: EventRepository) -> (Self, JoinHandle<EventRepository>) {
        let (tx, rx) = mpsc::channel(COMMAND_BUFFER);
        let handle = tokio::spawn(ServiceLoop { repo, rx }.run());
        (Self { tx }, handle)
    }

    pub async fn create(&self, request: CreateEventRequest) -> Result<Event> {
        self.call(|reply| Command::Create { request, reply }).await
    }

    pub async fn get(&self, id: impl Into<EventId>) -> Result<Event> {
        let id = id.into();
        self.call(|reply| Command::Get { id, reply }).await
    }

    pub async fn list(&self, filter: EventFilter) -> Result<Vec<Event>> {
        self.call(|reply| Command::List { filter, reply }).await
    }

    pub async fn snapshot(&self) -> Result<Vec<Event>> {
        self.call(|reply| Command::Snapshot { reply }).await
    }

    pub async fn update(&self, request: UpdateEventRequest) -> Result<Event> {
        self.call(|reply| Command::Update { request, reply }).await
    }

    pub async fn delete(&self, id: impl Into<EventId>) -> Result<Deletion> {
        let id = id.into();
        self.call(|reply| Command::Delete { id, reply }).await
    }

    pub async fn set_status(
        &self,
        id: impl Into<EventId>,
        status: EventStatus,
    ) -> Result<StatusChange> {
        let id = id.into();
        self.call(|reply| Command::SetStatus { id, status, reply })
            .await
    }

    pub async fn dependencies_of(&self, id: impl Into<EventId>) -> Result<Vec<Event>> {
        let id = id.into();
        self.call(|reply| Command::DependenciesOf { id, reply })
            .await
    }

    pub async fn dependents_of(&self, id: impl Into<EventId>) -> Result<Vec<Event>> {
        let id = id.into();
        self.call(|reply| Command::DependentsOf { id, reply }).await
    }

    pub async fn downstream_of(&self, id: impl Into<EventId>) -> Result<Vec<Event>> {
        let id = id.into();
        self.call(|reply| Command::DownstreamOf { id, reply }).await
    }

    pub async fn sort_preferences(&self) -> Result<SortPreferences> {
        self.call(|reply| Command::SortPreferences { reply }).await
    }

    pub async fn edit_sort_preferences(&self, edit: SortEdit) -> Result<SortPreferences> {
        self.call(|reply| Command::EditSortPreferences { edit, reply })
            .await
    }

    /// Ask the loop to stop after the commands already queued.
    pub async fn shutdown(&self) -> Result<()> {
        self.tx
            .send(Command::Shutdown)
            .await
            .map_err(|_| SchedulerError::ServiceClosed)
    }

    async fn call<T, F>(&self, make: F) -> Result<T>
    where
        F: FnOnce(Reply<T>) -> Command,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(make(reply_tx))
            .await
            .map_err(|_| SchedulerError::ServiceClosed)?;
        reply_rx.await.map_err(|_| SchedulerError::ServiceClosed)?
    }
}

struct ServiceLoop {
    repo: EventRepository,
    rx: mpsc::Receiver<Command>,
}

impl ServiceLoop {
    async fn run(mut self) -> EventRepository {
        info!(events = self.repo.len(), "event service started");

        while let Some(command) = self.rx.recv().await {
            if matches!(command, Command::Shutdown) {
                info!("shutdown requested; stopping event service");
                break;
            }
            self.handle(command);
        }

        info!("event service exiting");
        self.repo
    }

    fn handle(&mut self, command: Command) {
        debug!(?command, "event service received command");

        // A dropped receiver means the caller gave up waiting; the write
        // (if any) has already been applied.
        match command {
            Command::Create { request, reply } => {
                let _ = reply.send(self.repo.create(request));
            }
            Command::Get { id, reply } => {
                let _ = reply.send(self.repo.get(&id).cloned());
            }
            Command::List { filter, reply } => {
                let _ = reply.send(self.repo.list(&filter).map(owned));
            }
            Command::Snapshot { reply } => {
                let _ = reply.send(Ok(self.repo.snapshot()));
            }
            Command::Update { request, reply } => {
                let _ = reply.send(self.repo.update(request));
            }
            Command::Delete { id, reply } => {
                let _ = reply.send(self.repo.delete(&id));
            }
            Command::SetStatus { id, status, reply } => {
                let result = StatusEngine::new(&mut self.repo).set_status(&id, status);
                let _ = reply.send(result);
            }
            Command::DependenciesOf { id, reply } => {
                let _ = reply.send(self.repo.dependencies_of(&id).map(owned));
            }
            Command::DependentsOf { id, reply } => {
                let _ = reply.send(self.repo.dependents_of(&id).map(owned));
            }
            Command::DownstreamOf { id, reply } => {
                let _ = reply.send(self.repo.downstream_of(&id).map(owned));
            }
            Command::SortPreferences { reply } => {
                let _ = reply.send(self.repo.sort_preferences().cloned());
            }
            Command::EditSortPreferences { edit, reply } => {
                let _ = reply.send(edit_preferences(&mut self.repo, &edit));
            }
            Command::Shutdown => {}
        }
    }
}

/// Apply `edit` through the repository, rejecting edits that name a rule
/// which does not exist.
pub fn edit_preferences(repo: &mut EventRepository, edit: &SortEdit) -> Result<SortPreferences> {
    let mut next = repo.sort_preferences()?.clone();
    if !edit.apply(&mut next) {
        return Err(SchedulerError::NotFound(format!(
            "sort rule '{}'",
            edit.tag_key().unwrap_or_default()
        )));
    }
    repo.update_sort_preferences(|prefs| *prefs = next)
}

fn owned(events: Vec<&Event>) -> Vec<Event> {
    events.into_iter().cloned().collect()
}
