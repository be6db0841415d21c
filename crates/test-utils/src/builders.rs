#![allow(dead_code)]

use todo_scheduler::config::{ConfigFile, RawConfigFile, SortRuleConfig};
use todo_scheduler::model::{
    CreateEventRequest, Event, EventId, SortPreferences, TagMap, TagSortRule,
    UpdateEventRequest,
};
use todo_scheduler::types::{SortDirection, StorageBackend};

/// Builder for `CreateEventRequest`.
pub struct EventRequestBuilder {
    request: CreateEventRequest,
}

impl EventRequestBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            request: CreateEventRequest::new(name),
        }
    }

    pub fn description(mut self, text: &str) -> Self {
        self.request.description = text.to_string();
        self
    }

    pub fn tag(mut self, key: &str, value: &str) -> Self {
        self.request.tags.insert(key.to_string(), value.to_string());
        self
    }

    /// Depend on an already created event.
    pub fn after(mut self, dep: &Event) -> Self {
        self.request.dependencies.push(dep.id.clone());
        self
    }

    pub fn after_id(mut self, id: &str) -> Self {
        self.request.dependencies.push(id.to_string());
        self
    }

    pub fn build(self) -> CreateEventRequest {
        self.request
    }
}

/// Builder for `UpdateEventRequest`.
pub struct UpdateBuilder {
    request: UpdateEventRequest,
}

impl UpdateBuilder {
    pub fn new(id: &str) -> Self {
        Self {
            request: UpdateEventRequest::for_event(id),
        }
    }

    pub fn name(mut self, name: &str) -> Self {
        self.request.name = Some(name.to_string());
        self
    }

    pub fn description(mut self, text: &str) -> Self {
        self.request.description = Some(text.to_string());
        self
    }

    pub fn tag(mut self, key: &str, value: &str) -> Self {
        self.request
            .tags
            .get_or_insert_with(TagMap::new)
            .insert(key.to_string(), value.to_string());
        self
    }

    /// Replace the dependency list.
    pub fn deps(mut self, deps: &[&Event]) -> Self {
        self.request.dependencies = Some(deps.iter().map(|e| e.id.clone()).collect());
        self
    }

    pub fn dep_ids(mut self, ids: &[EventId]) -> Self {
        self.request.dependencies = Some(ids.to_vec());
        self
    }

    pub fn build(self) -> UpdateEventRequest {
        self.request
    }
}

/// Builder for `SortPreferences`; rules get `order` by insertion position.
pub struct PrefsBuilder {
    prefs: SortPreferences,
}

impl PrefsBuilder {
    pub fn new() -> Self {
        Self {
            prefs: SortPreferences::default(),
        }
    }

    pub fn asc(self, key: &str) -> Self {
        self.rule(key, SortDirection::Asc)
    }

    pub fn desc(self, key: &str) -> Self {
        self.rule(key, SortDirection::Desc)
    }

    pub fn disabled(mut self) -> Self {
        self.prefs.enabled = false;
        self
    }

    fn rule(mut self, key: &str, direction: SortDirection) -> Self {
        let order = self.prefs.tag_sort_rules.len() as i32;
        self.prefs
            .tag_sort_rules
            .push(TagSortRule::new(key, direction, order));
        self
    }

    pub fn build(self) -> SortPreferences {
        self.prefs
    }
}

impl Default for PrefsBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ConfigFile` to simplify test setup. Defaults to the memory
/// backend.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        let mut config = RawConfigFile::default();
        config.storage.backend = StorageBackend::Memory;
        Self { config }
    }

    pub fn sqlite(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.config.storage.backend = StorageBackend::Sqlite;
        self.config.storage.path = path.into();
        self
    }

    pub fn max_name_length(mut self, len: usize) -> Self {
        self.config.limits.max_name_length = len;
        self
    }

    pub fn sort_rule(mut self, key: &str, direction: SortDirection) -> Self {
        self.config.sort.rules.push(SortRuleConfig {
            tag_key: key.to_string(),
            direction,
            order: None,
        });
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
