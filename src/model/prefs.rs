// src/model/prefs.rs

//! Tag sort rules and the per-session preference set that owns them.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::types::SortDirection;

/// One key of the multi-key tag comparator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSortRule {
    pub tag_key: String,
    pub direction: SortDirection,
    /// Priority; lower values are applied first.
    pub order: i32,
}

impl TagSortRule {
    pub fn new(tag_key: impl Into<String>, direction: SortDirection, order: i32) -> Self {
        Self {
            tag_key: tag_key.into(),
            direction,
            order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortPreferences {
    pub enabled: bool,
    #[serde(default)]
    pub tag_sort_rules: Vec<TagSortRule>,
}

impl Default for SortPreferences {
    fn default() -> Self {
        Self {
            enabled: true,
            tag_sort_rules: Vec::new(),
        }
    }
}

impl SortPreferences {
    /// Rules sorted by `order`. Rules sharing an `order` keep their
    /// position in `tag_sort_rules`.
    pub fn rules_in_order(&self) -> Vec<&TagSortRule> {
        let mut rules: Vec<&TagSortRule> = self.tag_sort_rules.iter().collect();
        rules.sort_by_key(|r| r.order);
        rules
    }

    /// Whether `order_events` would reorder anything at all.
    pub fn is_active(&self) -> bool {
        self.enabled && !self.tag_sort_rules.is_empty()
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Add a rule for `tag_key` at the lowest priority, or change the
    /// direction of the existing rule for that key.
    pub fn upsert_rule(&mut self, tag_key: &str, direction: SortDirection) -> &TagSortRule {
        if let Some(idx) = self.tag_sort_rules.iter().position(|r| r.tag_key == tag_key) {
            self.tag_sort_rules[idx].direction = direction;
            return &self.tag_sort_rules[idx];
        }

        let next_order = self
            .tag_sort_rules
            .iter()
            .map(|r| r.order)
            .max()
            .map_or(0, |max| max + 1);
        self.tag_sort_rules
            .push(TagSortRule::new(tag_key, direction, next_order));
        &self.tag_sort_rules[self.tag_sort_rules.len() - 1]
    }

    /// Remove the rule for `tag_key`. Remaining orders are renumbered densely.
    pub fn remove_rule(&mut self, tag_key: &str) -> bool {
        let before = self.tag_sort_rules.len();
        self.tag_sort_rules.retain(|r| r.tag_key != tag_key);
        let removed = self.tag_sort_rules.len() < before;
        if removed {
            self.renumber();
        }
        removed
    }

    /// Move the rule for `tag_key` to priority position `index` (0 = first).
    pub fn move_rule(&mut self, tag_key: &str, index: usize) -> bool {
        self.renumber();
        let Some(pos) = self.tag_sort_rules.iter().position(|r| r.tag_key == tag_key) else {
            return false;
        };

        let rule = self.tag_sort_rules.remove(pos);
        let index = index.min(self.tag_sort_rules.len());
        self.tag_sort_rules.insert(index, rule);
        self.assign_positions();
        true
    }

    /// Check that every rule has a non-empty key and keys are unique.
    pub fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for rule in &self.tag_sort_rules {
            if rule.tag_key.trim().is_empty() {
                return Err("sort rule tag key must not be empty".to_string());
            }
            if !seen.insert(rule.tag_key.as_str()) {
                return Err(format!("duplicate sort rule for tag key '{}'", rule.tag_key));
            }
        }
        Ok(())
    }

    /// Store rules in priority order with orders `0..n`.
    fn renumber(&mut self) {
        self.tag_sort_rules.sort_by_key(|r| r.order);
        self.assign_positions();
    }

    fn assign_positions(&mut self) {
        for (i, rule) in self.tag_sort_rules.iter_mut().enumerate() {
            rule.order = i as i32;
        }
    }
}
