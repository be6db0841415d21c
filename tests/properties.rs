// tests/properties.rs

mod common;
use crate::common::builders::{EventRequestBuilder, UpdateBuilder};
use crate::common::memory_repo;

use std::cmp::Ordering;
use std::collections::HashSet;

use proptest::prelude::*;

use todo_scheduler::errors::SchedulerError;
use todo_scheduler::model::{Event, EventId, SortPreferences, TagMap, TagSortRule};
use todo_scheduler::repo::EventRepository;
use todo_scheduler::sort::{compare_by_rule, order_events};
use todo_scheduler::types::{EventStatus, SortDirection};

// Event N may only depend on events 0..N-1, so every generated graph is
// acyclic.
fn dag_strategy(max_events: usize) -> impl Strategy<Value = Vec<Vec<usize>>> {
    (1..=max_events).prop_flat_map(|n| {
        proptest::collection::vec(proptest::collection::vec(any::<usize>(), 0..4), n).prop_map(
            |raw| {
                raw.into_iter()
                    .enumerate()
                    .map(|(i, picks)| {
                        let mut deps: Vec<usize> = if i == 0 {
                            Vec::new()
                        } else {
                            picks.into_iter().map(|p| p % i).collect()
                        };
                        deps.sort_unstable();
                        deps.dedup();
                        deps
                    })
                    .collect()
            },
        )
    })
}

fn build_repo(deps: &[Vec<usize>]) -> (EventRepository, Vec<EventId>) {
    let (mut repo, _store) = memory_repo();
    let mut ids: Vec<EventId> = Vec::new();
    for (i, dep_idx) in deps.iter().enumerate() {
        let mut builder = EventRequestBuilder::new(&format!("e{i}"));
        for d in dep_idx {
            builder = builder.after_id(&ids[*d]);
        }
        ids.push(repo.create(builder.build()).unwrap().id);
    }
    (repo, ids)
}

const KEYS: [&str; 3] = ["p", "q", "r"];
const VALUES: [&str; 4] = ["1", "2", "A", "b"];

fn event_strategy() -> impl Strategy<Value = Event> {
    proptest::collection::vec((0..KEYS.len(), 0..VALUES.len()), 0..3).prop_map(|pairs| {
        let tags: TagMap = pairs
            .into_iter()
            .map(|(k, v)| (KEYS[k].to_string(), VALUES[v].to_string()))
            .collect();
        Event::new("e", "", tags, Vec::new(), EventStatus::Pending)
    })
}

fn prefs_strategy() -> impl Strategy<Value = SortPreferences> {
    (
        any::<bool>(),
        proptest::sample::subsequence(KEYS.to_vec(), 0..=KEYS.len()),
        proptest::collection::vec(any::<bool>(), KEYS.len()),
    )
        .prop_map(|(enabled, keys, desc)| SortPreferences {
            enabled,
            tag_sort_rules: keys
                .into_iter()
                .enumerate()
                .map(|(i, key)| {
                    let direction = if desc[i] {
                        SortDirection::Desc
                    } else {
                        SortDirection::Asc
                    };
                    TagSortRule::new(key, direction, (KEYS.len() - i) as i32)
                })
                .collect(),
        })
}

fn tied(a: &Event, b: &Event, rules: &[&TagSortRule]) -> bool {
    rules
        .iter()
        .all(|rule| compare_by_rule(a, b, rule) == Ordering::Equal)
}

proptest! {
    #[test]
    fn cycle_check_matches_reachability(
        deps in dag_strategy(12),
        pick in any::<(usize, usize)>(),
    ) {
        let (mut repo, ids) = build_repo(&deps);
        let a = &ids[pick.0 % ids.len()];
        let b = &ids[pick.1 % ids.len()];

        let reaches = a == b || repo.graph().transitive_dependents(a).contains(b);
        prop_assert_eq!(repo.graph().would_create_cycle(a, &[b.clone()]), reaches);

        let before = repo.snapshot();
        let result = repo.update(UpdateBuilder::new(a).dep_ids(&[b.clone()]).build());

        if reaches {
            let rejected = matches!(
                result,
                Err(SchedulerError::CyclicDependency { .. }) | Err(SchedulerError::Validation(_))
            );
            prop_assert!(rejected);
            prop_assert_eq!(repo.snapshot(), before);
        } else {
            prop_assert!(result.is_ok());
        }
    }

    #[test]
    fn deletion_leaves_no_dangling_dependencies(
        deps in dag_strategy(12),
        pick in any::<usize>(),
    ) {
        let (mut repo, ids) = build_repo(&deps);
        let victim = ids[pick % ids.len()].clone();
        let statuses_before: Vec<(EventId, EventStatus)> = repo
            .events()
            .map(|e| (e.id.clone(), e.status))
            .collect();

        repo.delete(&victim).unwrap();

        for event in repo.events() {
            prop_assert!(!event.dependencies.contains(&victim));
            prop_assert!(!repo.graph().dependencies_of(&event.id).contains(&victim));
        }
        prop_assert!(!repo.graph().contains(&victim));

        // Statuses of survivors are untouched by deletion.
        for (id, status) in statuses_before.into_iter().filter(|(id, _)| *id != victim) {
            prop_assert_eq!(repo.get(&id).unwrap().status, status);
        }
    }

    #[test]
    fn order_events_is_idempotent(
        events in proptest::collection::vec(event_strategy(), 0..20),
        prefs in prefs_strategy(),
    ) {
        let once = order_events(events, &prefs);
        let twice = order_events(once.clone(), &prefs);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn order_events_is_stable(
        events in proptest::collection::vec(event_strategy(), 0..20),
        prefs in prefs_strategy(),
    ) {
        let input_ids: Vec<EventId> = events.iter().map(|e| e.id.clone()).collect();
        let ordered = order_events(events.clone(), &prefs);

        let position = |id: &EventId| ordered.iter().position(|e| &e.id == id).unwrap();
        let rules = if prefs.is_active() { prefs.rules_in_order() } else { Vec::new() };

        for i in 0..events.len() {
            for j in (i + 1)..events.len() {
                if tied(&events[i], &events[j], &rules) {
                    prop_assert!(position(&input_ids[i]) < position(&input_ids[j]));
                }
            }
        }

        let unique: HashSet<_> = ordered.iter().map(|e| e.id.clone()).collect();
        prop_assert_eq!(unique.len(), input_ids.len());
    }
}
