// tests/sqlite_store.rs

mod common;
use crate::common::builders::{ConfigFileBuilder, EventRequestBuilder, PrefsBuilder};
use crate::common::init_tracing;

use tempfile::tempdir;

use todo_scheduler::config::apply_db_override;
use todo_scheduler::engine::StatusEngine;
use todo_scheduler::model::Event;
use todo_scheduler::repo::EventRepository;
use todo_scheduler::store::{EventStore, SqliteStore, StoreOp};
use todo_scheduler::types::{EventStatus, SortDirection};

fn sample(name: &str) -> Event {
    let mut tags = todo_scheduler::model::TagMap::new();
    tags.insert("zeta".into(), "1".into());
    tags.insert("alpha".into(), "2".into());
    Event::new(name, "about", tags, Vec::new(), EventStatus::Pending)
}

#[test]
fn records_survive_a_reopen() {
    init_tracing();
    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("events.db");

    let original = sample("write docs");
    {
        let mut store = SqliteStore::open(&path).unwrap();
        store.apply(&[StoreOp::Put(original.clone())]).unwrap();
    }

    let store = SqliteStore::open(&path).unwrap();
    let loaded = store.get(&original.id).unwrap().unwrap();
    assert_eq!(loaded, original);

    // Tag insertion order is kept.
    let keys: Vec<_> = loaded.tags.keys().cloned().collect();
    assert_eq!(keys, vec!["zeta", "alpha"]);
}

#[test]
fn put_replaces_and_delete_removes() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let mut event = sample("a");
    store.apply(&[StoreOp::Put(event.clone())]).unwrap();

    event.status = EventStatus::Completed;
    event.touch();
    store.apply(&[StoreOp::Put(event.clone())]).unwrap();
    assert_eq!(store.load_all().unwrap(), vec![event.clone()]);
    assert_eq!(
        store.list_by_status(EventStatus::Completed).unwrap().len(),
        1
    );
    assert!(store.list_by_status(EventStatus::Pending).unwrap().is_empty());

    store.apply(&[StoreOp::Delete(event.id.clone())]).unwrap();
    assert!(store.get(&event.id).unwrap().is_none());
}

#[test]
fn load_all_is_in_creation_order() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let first = sample("first");
    let second = sample("second");
    let third = sample("third");
    store
        .apply(&[
            StoreOp::Put(first.clone()),
            StoreOp::Put(second.clone()),
            StoreOp::Put(third.clone()),
        ])
        .unwrap();

    let names: Vec<_> = store
        .load_all()
        .unwrap()
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["first", "second", "third"]);
}

#[test]
fn preferences_round_trip() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    assert!(store.load_preferences().unwrap().is_none());

    let prefs = PrefsBuilder::new().desc("priority").asc("due").build();
    store.save_preferences(&prefs).unwrap();
    store.save_preferences(&prefs).unwrap();
    assert_eq!(store.load_preferences().unwrap(), Some(prefs));
}

#[test]
fn repository_over_sqlite_keeps_cascade_results() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("todo.db");
    let cfg = ConfigFileBuilder::new()
        .sqlite(&db)
        .sort_rule("priority", SortDirection::Desc)
        .build();

    let (a_id, b_id) = {
        let mut repo = EventRepository::from_config(&cfg).unwrap();
        let a = repo.create(EventRequestBuilder::new("A").build()).unwrap();
        let b = repo
            .create(EventRequestBuilder::new("B").after(&a).build())
            .unwrap();
        StatusEngine::new(&mut repo)
            .set_status(&a.id, EventStatus::Completed)
            .unwrap();
        assert_eq!(repo.sort_preferences().unwrap().tag_sort_rules.len(), 1);
        (a.id, b.id)
    };

    let mut repo = EventRepository::from_config(&cfg).unwrap();
    assert_eq!(repo.get(&a_id).unwrap().status, EventStatus::Completed);
    assert_eq!(repo.get(&b_id).unwrap().status, EventStatus::Pending);
    assert_eq!(repo.dependents_of(&a_id).unwrap()[0].id, b_id);
    assert_eq!(
        repo.sort_preferences().unwrap().tag_sort_rules[0].tag_key,
        "priority"
    );
}

#[test]
fn db_override_wins_over_config_path() {
    let dir = tempdir().unwrap();
    let configured = dir.path().join("configured.db");
    let override_path = dir.path().join("override.db");
    let cfg = ConfigFileBuilder::new().sqlite(&configured).build();
    let cfg = apply_db_override(cfg, Some(override_path.as_path())).unwrap();

    let mut repo = EventRepository::from_config(&cfg).unwrap();
    repo.create(EventRequestBuilder::new("A").build()).unwrap();

    assert!(override_path.exists());
    assert!(!configured.exists());
}
