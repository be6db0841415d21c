// src/repo/repository.rs

use indexmap::IndexMap;
use regex::{Regex, RegexBuilder};
use tracing::{debug, info, warn};

use crate::config::{ConfigFile, Limits};
use crate::dag::{check_integrity, DependencyGraph};
use crate::errors::{Result, SchedulerError};
use crate::model::{
    CreateEventRequest, Event, EventFilter, EventId, SortPreferences, UpdateEventRequest,
};
use crate::repo::validate::{dedup_dependencies, validate_name, validate_tags};
use crate::store::{open_store, EventStore, MemoryStore, StoreOp};
use crate::types::EventStatus;

/// Result of [`EventRepository::delete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deletion {
    /// The record as it was before deletion.
    pub removed: Event,
    /// Dependents whose `dependencies` lost the removed id, as written.
    pub touched: Vec<Event>,
}

/// Canonical owner of all events.
///
/// Holds the committed records in creation order, the dependency index
/// derived from them, and the store they are persisted to. Every mutation
/// validates first, writes one atomic batch to the store, and only then
/// updates the in-memory state, so a failed write leaves nothing changed.
///
/// There is exactly one repository per process; callers share it by
/// reference or through [`crate::engine::EventService`].
#[derive(Debug)]
pub struct EventRepository {
    store: Box<dyn EventStore>,
    events: IndexMap<EventId, Event>,
    graph: DependencyGraph,
    limits: Limits,
    default_prefs: SortPreferences,
    prefs: Option<SortPreferences>,
}

impl EventRepository {
    /// Load and index everything in `store`.
    ///
    /// Fails with [`SchedulerError::Integrity`] if the stored events contain
    /// duplicate ids, dangling dependencies or a cycle.
    pub fn open(
        store: Box<dyn EventStore>,
        limits: Limits,
        default_prefs: SortPreferences,
    ) -> Result<Self> {
        let loaded = store.load_all().map_err(SchedulerError::Persistence)?;
        check_integrity(&loaded)?;

        let graph = DependencyGraph::from_events(&loaded);
        let events: IndexMap<EventId, Event> =
            loaded.into_iter().map(|e| (e.id.clone(), e)).collect();

        info!(events = events.len(), "event repository opened");

        Ok(Self {
            store,
            events,
            graph,
            limits,
            default_prefs,
            prefs: None,
        })
    }

    /// Open the store described by `cfg`.
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        let store = open_store(&cfg.storage).map_err(SchedulerError::Persistence)?;
        Self::open(store, cfg.limits, cfg.sort.clone())
    }

    /// Fresh repository over an empty [`MemoryStore`] with default limits.
    pub fn in_memory() -> Self {
        Self {
            store: Box::new(MemoryStore::new()),
            events: IndexMap::new(),
            graph: DependencyGraph::new(),
            limits: Limits::default(),
            default_prefs: SortPreferences::default(),
            prefs: None,
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// All events, oldest first.
    pub fn events(&self) -> impl Iterator<Item = &Event> {
        self.events.values()
    }

    /// Owned copy of the current state, oldest first.
    pub fn snapshot(&self) -> Vec<Event> {
        self.events.values().cloned().collect()
    }

    pub fn get(&self, id: &str) -> Result<&Event> {
        self.events
            .get(id)
            .ok_or_else(|| SchedulerError::NotFound(id.to_string()))
    }

    pub fn status_of(&self, id: &str) -> Option<EventStatus> {
        self.events.get(id).map(|e| e.status)
    }

    /// Events matching `filter`, newest first.
    pub fn list(&self, filter: &EventFilter) -> Result<Vec<&Event>> {
        let search = compile_search(filter.search.as_deref())?;

        Ok(self
            .events
            .values()
            .rev()
            .filter(|e| filter.matches_fields(e))
            .filter(|e| {
                search
                    .as_ref()
                    .is_none_or(|re| re.is_match(&e.name) || re.is_match(&e.description))
            })
            .collect())
    }

    /// Validate and persist a new event.
    ///
    /// The initial status is `Blocked` if any dependency is not yet
    /// `Completed`, otherwise `Pending`.
    pub fn create(&mut self, request: CreateEventRequest) -> Result<Event> {
        let name = validate_name(&request.name, &self.limits)?;
        let tags = validate_tags(&request.tags, &self.limits)?;
        let dependencies = dedup_dependencies(&request.dependencies);
        self.ensure_known(&dependencies)?;

        let status = self.initial_status(&dependencies);
        let event = Event::new(name, request.description, tags, dependencies, status);

        self.write(&[StoreOp::Put(event.clone())])?;

        self.graph.insert_node(&event.id, event.dependencies.clone());
        self.events.insert(event.id.clone(), event.clone());

        info!(
            event = %event.id,
            name = %event.name,
            status = ?event.status,
            deps = event.dependencies.len(),
            "event created"
        );
        Ok(event)
    }

    /// Merge the provided fields into an existing event.
    ///
    /// New dependencies are checked for existence, self-reference and
    /// cycles before anything is written. When the dependency list changes
    /// on a `Pending` or `Blocked` event, its status is recomputed the same
    /// way `create` computes it.
    pub fn update(&mut self, request: UpdateEventRequest) -> Result<Event> {
        let current = self.get(&request.id)?;
        if request.is_empty() {
            return Ok(current.clone());
        }
        let mut event = current.clone();

        if let Some(name) = &request.name {
            event.name = validate_name(name, &self.limits)?;
        }
        if let Some(description) = request.description {
            event.description = description;
        }
        if let Some(tags) = &request.tags {
            event.tags = validate_tags(tags, &self.limits)?;
        }

        let mut deps_changed = false;
        if let Some(deps) = &request.dependencies {
            let deps = dedup_dependencies(deps);
            if deps.iter().any(|d| d == &event.id) {
                return Err(SchedulerError::validation(format!(
                    "event {} cannot depend on itself",
                    event.id
                )));
            }
            self.ensure_known(&deps)?;
            if let Some(path) = self.graph.find_cycle(&event.id, &deps) {
                warn!(event = %event.id, ?path, "rejected dependency update: cycle");
                return Err(SchedulerError::CyclicDependency {
                    event: event.id.clone(),
                    path,
                });
            }

            deps_changed = deps != event.dependencies;
            event.dependencies = deps;
        }

        if deps_changed && matches!(event.status, EventStatus::Pending | EventStatus::Blocked) {
            let recomputed = self.initial_status(&event.dependencies);
            if recomputed != event.status {
                debug!(
                    event = %event.id,
                    from = ?event.status,
                    to = ?recomputed,
                    "dependencies changed; status recomputed"
                );
                event.status = recomputed;
            }
        }

        event.touch();
        self.write(&[StoreOp::Put(event.clone())])?;

        if deps_changed {
            self.graph
                .set_dependencies(&event.id, event.dependencies.clone());
        }
        self.events.insert(event.id.clone(), event.clone());

        info!(event = %event.id, deps_changed, "event updated");
        Ok(event)
    }

    /// Remove an event and strip its id from every dependent.
    ///
    /// Dependents keep their status; deletion never triggers a cascade.
    pub fn delete(&mut self, id: &str) -> Result<Deletion> {
        let removed = self.get(id)?.clone();

        let touched: Vec<Event> = self
            .graph
            .dependents_of(id)
            .iter()
            .filter_map(|dep_id| self.events.get(dep_id))
            .map(|dependent| {
                let mut dependent = dependent.clone();
                dependent.dependencies.retain(|d| d != id);
                dependent.touch();
                dependent
            })
            .collect();

        let mut ops = Vec::with_capacity(touched.len() + 1);
        ops.push(StoreOp::Delete(removed.id.clone()));
        ops.extend(touched.iter().cloned().map(StoreOp::Put));
        self.write(&ops)?;

        self.graph.remove_node(id);
        self.events.shift_remove(id);
        for dependent in &touched {
            self.events.insert(dependent.id.clone(), dependent.clone());
        }

        info!(event = %id, stripped_from = touched.len(), "event deleted");
        Ok(Deletion { removed, touched })
    }

    /// Direct dependencies of `id`, in the order they are listed.
    pub fn dependencies_of(&self, id: &str) -> Result<Vec<&Event>> {
        self.get(id)?;
        Ok(self
            .graph
            .dependencies_of(id)
            .iter()
            .filter_map(|d| self.events.get(d))
            .collect())
    }

    /// Direct dependents of `id`, oldest first.
    pub fn dependents_of(&self, id: &str) -> Result<Vec<&Event>> {
        self.get(id)?;
        Ok(self
            .graph
            .dependents_of(id)
            .iter()
            .filter_map(|d| self.events.get(d))
            .collect())
    }

    /// Every event that depends on `id` directly or indirectly, nearest
    /// first.
    pub fn downstream_of(&self, id: &str) -> Result<Vec<&Event>> {
        self.get(id)?;
        Ok(self
            .graph
            .transitive_dependents(id)
            .iter()
            .filter_map(|d| self.events.get(d))
            .collect())
    }

    /// Whether every dependency of `id` is `Completed`.
    pub fn is_satisfied(&self, id: &str) -> Result<bool> {
        self.get(id)?;
        Ok(self.graph.is_satisfied(id, |dep| self.status_of(dep)))
    }

    /// Persist a status-only change. Used by the status engine.
    pub(crate) fn commit_status(&mut self, id: &str, status: EventStatus) -> Result<Event> {
        let mut event = self.get(id)?.clone();
        event.status = status;
        event.touch();

        self.write(&[StoreOp::Put(event.clone())])?;
        self.events.insert(event.id.clone(), event.clone());

        debug!(event = %id, status = ?status, "status committed");
        Ok(event)
    }

    /// Current sort preferences, created from the configured defaults and
    /// saved on first use.
    pub fn sort_preferences(&mut self) -> Result<&SortPreferences> {
        let prefs = match self.prefs.take() {
            Some(prefs) => prefs,
            None => self.load_or_create_preferences()?,
        };
        let prefs: &SortPreferences = self.prefs.insert(prefs);
        Ok(prefs)
    }

    /// Mutate the preferences in place, validate, and save.
    pub fn update_sort_preferences<F>(&mut self, f: F) -> Result<SortPreferences>
    where
        F: FnOnce(&mut SortPreferences),
    {
        let mut next = self.sort_preferences()?.clone();
        f(&mut next);
        next.validate().map_err(SchedulerError::Validation)?;

        self.store
            .save_preferences(&next)
            .map_err(SchedulerError::Persistence)?;
        self.prefs = Some(next.clone());

        info!(
            enabled = next.enabled,
            rules = next.tag_sort_rules.len(),
            "sort preferences saved"
        );
        Ok(next)
    }

    fn load_or_create_preferences(&mut self) -> Result<SortPreferences> {
        if let Some(prefs) = self
            .store
            .load_preferences()
            .map_err(SchedulerError::Persistence)?
        {
            prefs.validate().map_err(|e| {
                SchedulerError::Integrity(format!("stored sort preferences: {e}"))
            })?;
            return Ok(prefs);
        }

        let prefs = self.default_prefs.clone();
        self.store
            .save_preferences(&prefs)
            .map_err(SchedulerError::Persistence)?;
        info!(rules = prefs.tag_sort_rules.len(), "sort preferences created");
        Ok(prefs)
    }

    fn initial_status(&self, dependencies: &[EventId]) -> EventStatus {
        let all_done = dependencies
            .iter()
            .all(|d| self.status_of(d) == Some(EventStatus::Completed));
        if all_done {
            EventStatus::Pending
        } else {
            EventStatus::Blocked
        }
    }

    fn ensure_known(&self, dependencies: &[EventId]) -> Result<()> {
        match dependencies.iter().find(|d| !self.events.contains_key(d.as_str())) {
            Some(unknown) => Err(SchedulerError::validation(format!(
                "unknown dependency '{unknown}'"
            ))),
            None => Ok(()),
        }
    }

    fn write(&mut self, ops: &[StoreOp]) -> Result<()> {
        self.store.apply(ops).map_err(|e| {
            warn!(ops = ops.len(), error = %e, "store write failed");
            SchedulerError::Persistence(e)
        })
    }
}

fn compile_search(search: Option<&str>) -> Result<Option<Regex>> {
    match search.map(str::trim) {
        None | Some("") => Ok(None),
        Some(q) => RegexBuilder::new(&regex::escape(q))
            .case_insensitive(true)
            .build()
            .map(Some)
            .map_err(|e| SchedulerError::validation(format!("invalid search text: {e}"))),
    }
}
