// tests/config_loading.rs

use std::io::Write;

use tempfile::{tempdir, NamedTempFile};

use todo_scheduler::config::{load_and_validate, load_or_default};
use todo_scheduler::errors::SchedulerError;
use todo_scheduler::types::{SortDirection, StorageBackend};

fn write_config(body: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{body}").unwrap();
    file
}

#[test]
fn full_config_is_parsed() {
    let file = write_config(
        r#"
[storage]
backend = "memory"

[limits]
max_name_length = 50

[sort]
enabled = false

[[sort.rules]]
tag_key = "priority"
direction = "desc"

[[sort.rules]]
tag_key = "due"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.storage.backend, StorageBackend::Memory);
    assert_eq!(cfg.limits.max_name_length, 50);
    assert_eq!(cfg.limits.max_tag_key_length, 64);
    assert!(!cfg.sort.enabled);

    let rules = cfg.sort.rules_in_order();
    assert_eq!(rules[0].tag_key, "priority");
    assert_eq!(rules[0].direction, SortDirection::Desc);
    assert_eq!(rules[1].tag_key, "due");
    assert_eq!(rules[1].direction, SortDirection::Asc);
    assert_eq!(rules[1].order, 1);
}

#[test]
fn empty_file_yields_defaults() {
    let file = write_config("");
    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.storage.backend, StorageBackend::Sqlite);
    assert_eq!(cfg.limits.max_name_length, 200);
    assert!(cfg.sort.enabled);
    assert!(cfg.sort.tag_sort_rules.is_empty());
}

#[test]
fn duplicate_sort_keys_are_a_config_error() {
    let file = write_config(
        r#"
[[sort.rules]]
tag_key = "priority"

[[sort.rules]]
tag_key = "priority"
direction = "desc"
"#,
    );

    match load_and_validate(file.path()) {
        Err(SchedulerError::ConfigError(msg)) => assert!(msg.contains("priority")),
        other => panic!("expected ConfigError, got {other:?}"),
    }
}

#[test]
fn zero_limits_are_rejected() {
    let file = write_config("[limits]\nmax_tag_key_length = 0\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(SchedulerError::ConfigError(_))
    ));
}

#[test]
fn malformed_toml_is_a_toml_error() {
    let file = write_config("[storage\nbackend = ");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(SchedulerError::TomlError(_))
    ));
}

#[test]
fn unknown_backend_is_rejected() {
    let file = write_config("[storage]\nbackend = \"postgres\"\n");
    assert!(load_and_validate(file.path()).is_err());
}

#[test]
fn explicit_missing_file_is_an_error_but_default_is_not() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("TodoScheduler.toml");

    assert!(matches!(
        load_and_validate(&missing),
        Err(SchedulerError::IoError(_))
    ));

    let cfg = load_or_default(&missing).unwrap();
    assert_eq!(cfg.limits.max_name_length, 200);
}
