// src/config/validate.rs

use std::path::Path;

use tracing::debug;

use crate::config::model::{ConfigFile, Limits, RawConfigFile, SortSection, StorageSection};
use crate::errors::{Result, SchedulerError};
use crate::model::{SortPreferences, TagSortRule};
use crate::types::StorageBackend;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SchedulerError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_storage(&raw.storage)?;
        validate_limits(&raw.limits)?;
        let sort = sort_preferences_from_section(&raw.sort)?;
        Ok(ConfigFile::new_unchecked(raw.storage, raw.limits, sort))
    }
}

/// Point `[storage]` at `db` when given (which selects the sqlite
/// backend), then re-run validation on the result.
pub fn apply_db_override(mut cfg: ConfigFile, db: Option<&Path>) -> Result<ConfigFile> {
    if let Some(path) = db {
        debug!(path = ?path, "database path overridden on the command line");
        cfg.storage.backend = StorageBackend::Sqlite;
        cfg.storage.path = path.to_path_buf();
    }
    validate_config(&cfg)?;
    Ok(cfg)
}

/// Re-run validation on an already-built config.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    validate_storage(&cfg.storage)?;
    validate_limits(&cfg.limits)?;
    cfg.sort
        .validate()
        .map_err(|e| SchedulerError::ConfigError(format!("[sort]: {e}")))?;
    Ok(())
}

fn validate_storage(storage: &StorageSection) -> Result<()> {
    if storage.backend == StorageBackend::Sqlite && storage.path.as_os_str().is_empty() {
        return Err(SchedulerError::ConfigError(
            "[storage].path must not be empty for the sqlite backend".to_string(),
        ));
    }
    Ok(())
}

fn validate_limits(limits: &Limits) -> Result<()> {
    if limits.max_name_length == 0 {
        return Err(SchedulerError::ConfigError(
            "[limits].max_name_length must be >= 1 (got 0)".to_string(),
        ));
    }
    if limits.max_tag_key_length == 0 {
        return Err(SchedulerError::ConfigError(
            "[limits].max_tag_key_length must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}

fn sort_preferences_from_section(section: &SortSection) -> Result<SortPreferences> {
    let tag_sort_rules = section
        .rules
        .iter()
        .enumerate()
        .map(|(i, rule)| {
            TagSortRule::new(
                rule.tag_key.trim(),
                rule.direction,
                rule.order.unwrap_or(i as i32),
            )
        })
        .collect();

    let prefs = SortPreferences {
        enabled: section.enabled,
        tag_sort_rules,
    };
    prefs
        .validate()
        .map_err(|e| SchedulerError::ConfigError(format!("[sort]: {e}")))?;
    Ok(prefs)
}
