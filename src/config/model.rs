// src/config/model.rs

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::model::SortPreferences;
use crate::types::{SortDirection, StorageBackend};

/// Configuration as read from `TodoScheduler.toml`, before validation.
///
/// ```toml
/// [storage]
/// backend = "sqlite"
/// path = "todo_scheduler.db"
///
/// [limits]
/// max_name_length = 200
///
/// [sort]
/// enabled = true
///
/// [[sort.rules]]
/// tag_key = "priority"
/// direction = "desc"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub storage: StorageSection,

    #[serde(default)]
    pub limits: Limits,

    #[serde(default)]
    pub sort: SortSection,
}

/// Validated configuration. Build it with `ConfigFile::try_from(raw)`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub storage: StorageSection,
    pub limits: Limits,
    /// Preferences used the first time a store without saved preferences
    /// is asked for them.
    pub sort: SortPreferences,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        storage: StorageSection,
        limits: Limits,
        sort: SortPreferences,
    ) -> Self {
        Self {
            storage,
            limits,
            sort,
        }
    }

    /// Database file the sqlite backend will open; `None` for the memory
    /// backend.
    pub fn db_path(&self) -> Option<&Path> {
        match self.storage.backend {
            StorageBackend::Sqlite => Some(self.storage.path.as_path()),
            StorageBackend::Memory => None,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(
            StorageSection::default(),
            Limits::default(),
            SortPreferences::default(),
        )
    }
}

/// `[storage]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageSection {
    #[serde(default)]
    pub backend: StorageBackend,

    /// SQLite database file; ignored by the memory backend.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("todo_scheduler.db")
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            backend: StorageBackend::default(),
            path: default_db_path(),
        }
    }
}

/// `[limits]` section: field validation bounds for event records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Limits {
    /// Maximum event name length, in characters.
    #[serde(default = "default_max_name_length")]
    pub max_name_length: usize,

    /// Maximum tag key length, in characters.
    #[serde(default = "default_max_tag_key_length")]
    pub max_tag_key_length: usize,
}

fn default_max_name_length() -> usize {
    200
}

fn default_max_tag_key_length() -> usize {
    64
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_name_length: default_max_name_length(),
            max_tag_key_length: default_max_tag_key_length(),
        }
    }
}

/// `[sort]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct SortSection {
    #[serde(default = "default_sort_enabled")]
    pub enabled: bool,

    #[serde(default)]
    pub rules: Vec<SortRuleConfig>,
}

fn default_sort_enabled() -> bool {
    true
}

impl Default for SortSection {
    fn default() -> Self {
        Self {
            enabled: default_sort_enabled(),
            rules: Vec::new(),
        }
    }
}

/// `[[sort.rules]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SortRuleConfig {
    pub tag_key: String,

    #[serde(default)]
    pub direction: SortDirection,

    /// Priority; defaults to the entry's position in the file.
    #[serde(default)]
    pub order: Option<i32>,
}
