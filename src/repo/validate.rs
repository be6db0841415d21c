// src/repo/validate.rs

//! Field checks applied before any write.

use std::collections::HashSet;

use crate::config::Limits;
use crate::errors::{Result, SchedulerError};
use crate::model::{EventId, TagMap};

/// Trimmed, non-empty, bounded event name.
pub(crate) fn validate_name(name: &str, limits: &Limits) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(SchedulerError::validation("event name must not be empty"));
    }
    let len = trimmed.chars().count();
    if len > limits.max_name_length {
        return Err(SchedulerError::validation(format!(
            "event name is {len} characters long (max {})",
            limits.max_name_length
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim tag keys and reject empty, oversized, control-character or
/// colliding keys. Values are kept verbatim.
pub(crate) fn validate_tags(tags: &TagMap, limits: &Limits) -> Result<TagMap> {
    let mut out = TagMap::with_capacity(tags.len());

    for (key, value) in tags {
        let trimmed = key.trim();
        if trimmed.is_empty() {
            return Err(SchedulerError::validation("tag key must not be empty"));
        }
        if trimmed.chars().count() > limits.max_tag_key_length {
            return Err(SchedulerError::validation(format!(
                "tag key '{trimmed}' is longer than {} characters",
                limits.max_tag_key_length
            )));
        }
        if trimmed.chars().any(char::is_control) {
            return Err(SchedulerError::validation(format!(
                "tag key {trimmed:?} contains control characters"
            )));
        }
        if out.insert(trimmed.to_string(), value.clone()).is_some() {
            return Err(SchedulerError::validation(format!(
                "duplicate tag key '{trimmed}'"
            )));
        }
    }

    Ok(out)
}

/// Collapse duplicate ids, keeping the first occurrence.
pub(crate) fn dedup_dependencies(deps: &[EventId]) -> Vec<EventId> {
    let mut seen = HashSet::new();
    deps.iter()
        .map(|d| d.trim().to_string())
        .filter(|d| seen.insert(d.clone()))
        .collect()
}
