// src/store/sqlite.rs

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::{debug, info};

use super::{EventStore, StoreOp};
use crate::model::{Event, EventId, SortPreferences, TagMap};
use crate::types::EventStatus;

const EVENT_COLUMNS: &str =
    "id, name, description, tags, status, created_at, updated_at, dependencies";

/// Events and preferences in a SQLite database.
///
/// Tags and dependencies are stored as JSON text; timestamps as RFC 3339
/// with nanoseconds so they sort lexicographically.
#[derive(Debug)]
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database at `path`, creating parent dirs.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating database dir {:?}", parent))?;
            }
        }

        let conn = Connection::open(path)
            .with_context(|| format!("opening database {:?}", path))?;
        let store = Self { conn };
        store.init_tables()?;
        info!(path = ?path, "opened sqlite event store");
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("opening in-memory database")?;
        let store = Self { conn };
        store.init_tables()?;
        Ok(store)
    }

    fn init_tables(&self) -> Result<()> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS events (
                    id TEXT PRIMARY KEY,
                    name TEXT NOT NULL,
                    description TEXT NOT NULL,
                    tags TEXT NOT NULL,
                    status TEXT NOT NULL,
                    created_at TEXT NOT NULL,
                    updated_at TEXT NOT NULL,
                    dependencies TEXT NOT NULL
                );
                CREATE INDEX IF NOT EXISTS events_status ON events(status);
                CREATE TABLE IF NOT EXISTS preferences (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    body TEXT NOT NULL
                );",
            )
            .context("creating tables")?;
        Ok(())
    }

    fn query_events(&self, sql: &str, args: &[&dyn rusqlite::ToSql]) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(sql).context("preparing event query")?;
        let rows = stmt
            .query_map(args, EventRow::from_row)
            .context("querying events")?;

        let mut events = Vec::new();
        for row in rows {
            let row = row.context("reading event row")?;
            events.push(Event::try_from(row)?);
        }
        Ok(events)
    }
}

impl EventStore for SqliteStore {
    fn load_all(&self) -> Result<Vec<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY created_at, rowid");
        self.query_events(&sql, &[])
    }

    fn get(&self, id: &str) -> Result<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = ?1");
        let row = self
            .conn
            .query_row(&sql, [id], EventRow::from_row)
            .optional()
            .with_context(|| format!("loading event {id}"))?;
        row.map(Event::try_from).transpose()
    }

    fn list_by_status(&self, status: EventStatus) -> Result<Vec<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events WHERE status = ?1 ORDER BY created_at, rowid"
        );
        self.query_events(&sql, params![status.as_str()])
    }

    fn apply(&mut self, ops: &[StoreOp]) -> Result<()> {
        let tx = self.conn.transaction().context("starting transaction")?;

        for op in ops {
            match op {
                StoreOp::Put(event) => {
                    let tags = serde_json::to_string(&event.tags)?;
                    let deps = serde_json::to_string(&event.dependencies)?;
                    tx.execute(
                        "INSERT INTO events (id, name, description, tags, status, created_at, updated_at, dependencies)
                         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                         ON CONFLICT(id) DO UPDATE SET
                            name = excluded.name,
                            description = excluded.description,
                            tags = excluded.tags,
                            status = excluded.status,
                            updated_at = excluded.updated_at,
                            dependencies = excluded.dependencies",
                        params![
                            event.id,
                            event.name,
                            event.description,
                            tags,
                            event.status.as_str(),
                            format_ts(&event.created_at),
                            format_ts(&event.updated_at),
                            deps,
                        ],
                    )
                    .with_context(|| format!("writing event {}", event.id))?;
                }
                StoreOp::Delete(id) => {
                    tx.execute("DELETE FROM events WHERE id = ?1", [id])
                        .with_context(|| format!("deleting event {id}"))?;
                }
            }
        }

        tx.commit().context("committing transaction")?;
        debug!(ops = ops.len(), "applied batch (sqlite)");
        Ok(())
    }

    fn load_preferences(&self) -> Result<Option<SortPreferences>> {
        let body: Option<String> = self
            .conn
            .query_row("SELECT body FROM preferences WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()
            .context("loading sort preferences")?;

        body.map(|b| serde_json::from_str(&b).context("decoding sort preferences"))
            .transpose()
    }

    fn save_preferences(&mut self, prefs: &SortPreferences) -> Result<()> {
        let body = serde_json::to_string(prefs)?;
        self.conn
            .execute(
                "INSERT INTO preferences (id, body) VALUES (1, ?1)
                 ON CONFLICT(id) DO UPDATE SET body = excluded.body",
                [body],
            )
            .context("saving sort preferences")?;
        Ok(())
    }
}

/// Raw column values, decoded into an [`Event`] outside the row callback so
/// JSON and timestamp errors keep their context.
struct EventRow {
    id: EventId,
    name: String,
    description: String,
    tags: String,
    status: String,
    created_at: String,
    updated_at: String,
    dependencies: String,
}

impl EventRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            tags: row.get(3)?,
            status: row.get(4)?,
            created_at: row.get(5)?,
            updated_at: row.get(6)?,
            dependencies: row.get(7)?,
        })
    }
}

impl TryFrom<EventRow> for Event {
    type Error = anyhow::Error;

    fn try_from(row: EventRow) -> Result<Self> {
        let tags: TagMap = serde_json::from_str(&row.tags)
            .with_context(|| format!("decoding tags of event {}", row.id))?;
        let dependencies: Vec<EventId> = serde_json::from_str(&row.dependencies)
            .with_context(|| format!("decoding dependencies of event {}", row.id))?;
        let status: EventStatus = row
            .status
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .with_context(|| format!("decoding status of event {}", row.id))?;

        Ok(Event {
            created_at: parse_ts(&row.created_at)?,
            updated_at: parse_ts(&row.updated_at)?,
            id: row.id,
            name: row.name,
            description: row.description,
            tags,
            status,
            dependencies,
        })
    }
}

fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_ts(s: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("parsing timestamp {s:?}"))?
        .with_timezone(&Utc))
}
