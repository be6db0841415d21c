// tests/database.rs

mod common;
use crate::common::builders::ConfigFileBuilder;
use crate::common::init_tracing;

use std::fs;

use tempfile::tempdir;

use todo_scheduler::cli::DbCommand;
use todo_scheduler::commands::{execute_db, OutputFormat};
use todo_scheduler::config::apply_db_override;
use todo_scheduler::errors::SchedulerError;
use todo_scheduler::model::{Event, TagMap};
use todo_scheduler::store::{
    check_database, init_database, EventStore, SqliteStore, StoreOp,
};
use todo_scheduler::types::EventStatus;

#[test]
fn init_creates_nested_file_that_then_checks_clean() {
    init_tracing();
    let dir = tempdir().unwrap();
    let path = dir.path().join("a").join("b").join("todo.db");

    let created = init_database(&path).unwrap();
    assert!(path.exists());
    assert_eq!(created.events, 0);
    assert!(!created.has_preferences);

    let checked = check_database(&path).unwrap();
    assert_eq!(checked, created);
}

#[test]
fn check_refuses_a_missing_file_without_creating_it() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.db");

    let err = check_database(&path).unwrap_err();
    assert!(matches!(err, SchedulerError::MissingDatabase(p) if p == path));
    assert!(!path.exists());
}

#[test]
fn check_rejects_a_file_that_is_not_a_database() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("notes.db");
    fs::write(&path, "plain text, not sqlite\n".repeat(64)).unwrap();

    let err = check_database(&path).unwrap_err();
    assert!(matches!(err, SchedulerError::Persistence(_)));
}

#[test]
fn check_reports_dangling_dependencies() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.db");
    {
        let mut store = SqliteStore::open(&path).unwrap();
        let orphan = Event::new(
            "orphan",
            "",
            TagMap::new(),
            vec!["ghost".to_string()],
            EventStatus::Blocked,
        );
        store.apply(&[StoreOp::Put(orphan)]).unwrap();
    }

    let err = check_database(&path).unwrap_err();
    assert!(matches!(err, SchedulerError::Integrity(_)));
}

#[test]
fn init_on_existing_file_keeps_its_records() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("todo.db");
    {
        let mut store = SqliteStore::open(&path).unwrap();
        let event = Event::new("keep me", "", TagMap::new(), Vec::new(), EventStatus::Pending);
        store.apply(&[StoreOp::Put(event)]).unwrap();
    }

    let db = init_database(&path).unwrap();
    assert_eq!(db.events, 1);
}

#[test]
fn db_commands_render_text_and_json() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("todo.db");
    let cfg = ConfigFileBuilder::new().build();

    let out = execute_db(
        DbCommand::Init { path: path.clone() },
        &cfg,
        OutputFormat::Text,
    )
    .unwrap();
    assert!(out.starts_with("initialized: "));
    assert!(out.contains("0 events"));

    let json = execute_db(DbCommand::Check { path: path.clone() }, &cfg, OutputFormat::Json)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["events"], 0);
    assert_eq!(value["has_preferences"], false);

    let err = execute_db(
        DbCommand::Check {
            path: dir.path().join("missing.db"),
        },
        &cfg,
        OutputFormat::Text,
    )
    .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<SchedulerError>(),
        Some(SchedulerError::MissingDatabase(_))
    ));
}

#[test]
fn db_path_follows_backend_and_override() {
    let dir = tempdir().unwrap();
    let configured = dir.path().join("configured.db");
    let override_path = dir.path().join("override.db");

    let memory = ConfigFileBuilder::new().build();
    let out = execute_db(DbCommand::Path, &memory, OutputFormat::Text).unwrap();
    assert_eq!(out, "(memory backend, no database file)");

    let cfg = ConfigFileBuilder::new().sqlite(&configured).build();
    let out = execute_db(DbCommand::Path, &cfg, OutputFormat::Text).unwrap();
    assert_eq!(out, configured.display().to_string());

    let cfg = apply_db_override(cfg, Some(override_path.as_path())).unwrap();
    let json = execute_db(DbCommand::Path, &cfg, OutputFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["backend"], "sqlite");
    assert_eq!(value["path"], override_path.to_str().unwrap());

    // Neither file is created just by asking.
    assert!(!configured.exists());
    assert!(!override_path.exists());
}
