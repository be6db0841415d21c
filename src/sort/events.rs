// src/sort/events.rs

use std::cmp::Ordering;

use tracing::trace;

use crate::model::{Event, SortPreferences, TagSortRule};
use crate::sort::compare::compare_by_rule;

/// Order events by the preference rules.
///
/// Disabled preferences or an empty rule set return the input untouched.
/// Otherwise rules are walked by ascending `order` until one decides; ties
/// on every rule keep their input order (`sort_by` is stable).
pub fn order_events(mut events: Vec<Event>, preferences: &SortPreferences) -> Vec<Event> {
    if !preferences.is_active() {
        return events;
    }

    let rules = preferences.rules_in_order();
    trace!(rules = rules.len(), events = events.len(), "ordering events by tag rules");
    events.sort_by(|a, b| compare_events(a, b, &rules));
    events
}

fn compare_events(a: &Event, b: &Event, rules: &[&TagSortRule]) -> Ordering {
    rules
        .iter()
        .map(|rule| compare_by_rule(a, b, rule))
        .find(|ord| ord.is_ne())
        .unwrap_or(Ordering::Equal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TagMap;
    use crate::types::{EventStatus, SortDirection};

    fn event(name: &str, pairs: &[(&str, &str)]) -> Event {
        let tags: TagMap = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Event::new(name, "", tags, Vec::new(), EventStatus::Pending)
    }

    fn names(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.name.as_str()).collect()
    }

    fn prefs(rules: Vec<TagSortRule>) -> SortPreferences {
        SortPreferences {
            enabled: true,
            tag_sort_rules: rules,
        }
    }

    #[test]
    fn priority_desc_orders_three_two_one() {
        let events = vec![
            event("p1", &[("priority", "1")]),
            event("p2", &[("priority", "2")]),
            event("p3", &[("priority", "3")]),
        ];
        let p = prefs(vec![TagSortRule::new("priority", SortDirection::Desc, 0)]);

        assert_eq!(names(&order_events(events, &p)), vec!["p3", "p2", "p1"]);
    }

    #[test]
    fn disabled_preferences_return_input_order() {
        let events = vec![event("b", &[("k", "2")]), event("a", &[("k", "1")])];
        let mut p = prefs(vec![TagSortRule::new("k", SortDirection::Asc, 0)]);
        p.enabled = false;

        assert_eq!(names(&order_events(events, &p)), vec!["b", "a"]);
    }

    #[test]
    fn tagged_events_precede_untagged_in_both_directions() {
        for direction in [SortDirection::Asc, SortDirection::Desc] {
            let events = vec![
                event("none", &[]),
                event("has", &[("team", "core")]),
            ];
            let p = prefs(vec![TagSortRule::new("team", direction, 0)]);
            assert_eq!(names(&order_events(events, &p)), vec!["has", "none"]);
        }
    }

    #[test]
    fn falls_through_to_next_rule_on_tie_or_missing() {
        let events = vec![
            event("a", &[("area", "ui"), ("priority", "1")]),
            event("b", &[("priority", "2")]),
            event("c", &[("area", "ui"), ("priority", "3")]),
            event("d", &[]),
        ];
        let p = prefs(vec![
            TagSortRule::new("priority", SortDirection::Desc, 1),
            TagSortRule::new("area", SortDirection::Asc, 0),
        ]);

        // area first (a, c tied on "ui" -> priority desc), then b by priority,
        // then d which has neither tag.
        assert_eq!(names(&order_events(events, &p)), vec!["c", "a", "b", "d"]);
    }

    #[test]
    fn full_ties_keep_input_order() {
        let events = vec![
            event("first", &[("k", "same")]),
            event("second", &[("k", "same")]),
            event("third", &[]),
            event("fourth", &[]),
        ];
        let p = prefs(vec![TagSortRule::new("k", SortDirection::Desc, 0)]);

        assert_eq!(
            names(&order_events(events, &p)),
            vec!["first", "second", "third", "fourth"]
        );
    }
}
