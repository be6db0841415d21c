// src/commands.rs

//! Command dispatch and output rendering.
//!
//! Event and sort commands go through the [`EventService`] handle; `db`
//! commands work on database files directly ([`execute_db`]). This module
//! only turns CLI arguments into requests and results into text or JSON.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{bail, Result};
use serde::Serialize;

use crate::cli::{AddArgs, Command, DbCommand, EditArgs, ListArgs, SortCommand};
use crate::config::ConfigFile;
use crate::engine::{EventService, SortEdit, StatusChange};
use crate::model::{
    tag_map_from_pairs, CreateEventRequest, Event, EventFilter, SortPreferences, TagMap,
    TagSortRule, UpdateEventRequest,
};
use crate::repo::Deletion;
use crate::sort::{order_events, order_tag_keys_for_display};
use crate::store::{check_database, init_database, DatabaseInfo};
use crate::types::{SortDirection, StorageBackend};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Run one command and return what should be printed to stdout.
pub async fn execute(
    service: &EventService,
    command: Command,
    format: OutputFormat,
) -> Result<String> {
    let prefs = service.sort_preferences().await?;
    let rules = prefs.tag_sort_rules.as_slice();

    match command {
        Command::Add(args) => {
            let event = service.create(create_request(args)?).await?;
            render_one(&event, rules, format)
        }
        Command::List(args) => {
            let sorted = args.sorted;
            let mut events = service.list(list_filter(args)?).await?;
            if sorted {
                events = order_events(events, &prefs);
            }
            render_many(&events, rules, format)
        }
        Command::Show { id } => {
            let event = service.get(id.clone()).await?;
            let dependencies = service.dependencies_of(id.clone()).await?;
            let dependents = service.dependents_of(id.clone()).await?;
            let downstream = service.downstream_of(id).await?;
            let detail = Detail {
                event: &event,
                dependencies: &dependencies,
                dependents: &dependents,
                downstream: downstream.len(),
            };
            render_detail(&detail, rules, format)
        }
        Command::Edit(args) => {
            let event = service.update(update_request(args)?).await?;
            render_one(&event, rules, format)
        }
        Command::Status { id, status } => {
            let change = service.set_status(id, status).await?;
            render_status_change(&change, rules, format)
        }
        Command::Rm { id } => {
            let deletion = service.delete(id).await?;
            render_deletion(&deletion, format)
        }
        Command::Deps { id } => {
            let events = service.dependencies_of(id).await?;
            render_many(&events, rules, format)
        }
        Command::Dependents { id } => {
            let events = service.dependents_of(id).await?;
            render_many(&events, rules, format)
        }
        Command::Sort(cmd) => {
            let prefs = match sort_edit(cmd) {
                Some(edit) => service.edit_sort_preferences(edit).await?,
                None => service.sort_preferences().await?,
            };
            render_preferences(&prefs, format)
        }
        Command::Db(_) => bail!("db commands run without the event service; use execute_db"),
    }
}

/// Run one `db` command against the files named by `cfg` or the command.
///
/// These never open the configured repository, so `db init` and
/// `db check` work on files other than the one in use.
pub fn execute_db(command: DbCommand, cfg: &ConfigFile, format: OutputFormat) -> Result<String> {
    match command {
        DbCommand::Init { path } => {
            let db = init_database(&path)?;
            render_database("initialized", &db, format)
        }
        DbCommand::Check { path } => {
            let db = check_database(&path)?;
            render_database("ok", &db, format)
        }
        DbCommand::Path => render_storage(cfg, format),
    }
}

fn create_request(args: AddArgs) -> Result<CreateEventRequest> {
    Ok(CreateEventRequest {
        name: args.name,
        description: args.description,
        tags: tag_map_from_pairs(args.tags)?,
        dependencies: args.deps,
    })
}

fn list_filter(args: ListArgs) -> Result<EventFilter> {
    Ok(EventFilter {
        status: args.status,
        tags: tag_map_from_pairs(args.tags)?,
        search: args.search,
    })
}

fn update_request(args: EditArgs) -> Result<UpdateEventRequest> {
    let tags = if args.clear_tags {
        Some(TagMap::new())
    } else if args.tags.is_empty() {
        None
    } else {
        Some(tag_map_from_pairs(args.tags)?)
    };

    let dependencies = if args.clear_deps {
        Some(Vec::new())
    } else if args.deps.is_empty() {
        None
    } else {
        Some(args.deps)
    };

    Ok(UpdateEventRequest {
        id: args.id,
        name: args.name,
        description: args.description,
        tags,
        dependencies,
    })
}

fn sort_edit(cmd: SortCommand) -> Option<SortEdit> {
    match cmd {
        SortCommand::Show => None,
        SortCommand::Add { tag_key, desc } => Some(SortEdit::Upsert {
            tag_key,
            direction: if desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            },
        }),
        SortCommand::Remove { tag_key } => Some(SortEdit::Remove(tag_key)),
        SortCommand::Move { tag_key, index } => Some(SortEdit::Move { tag_key, index }),
        SortCommand::Enable => Some(SortEdit::SetEnabled(true)),
        SortCommand::Disable => Some(SortEdit::SetEnabled(false)),
    }
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// One-line summary: id, status, name and tag badges.
pub fn event_line(event: &Event, rules: &[TagSortRule]) -> String {
    let mut line = format!("{}  [{}]  {}", event.id, event.status, event.name);
    for (key, value) in order_tag_keys_for_display(&event.tags, rules) {
        let _ = write!(line, "  #{key}={value}");
    }
    line
}

fn render_one(event: &Event, rules: &[TagSortRule], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(event),
        OutputFormat::Text => Ok(event_line(event, rules)),
    }
}

fn render_many(events: &[Event], rules: &[TagSortRule], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(events),
        OutputFormat::Text if events.is_empty() => Ok("(no events)".to_string()),
        OutputFormat::Text => Ok(events
            .iter()
            .map(|e| event_line(e, rules))
            .collect::<Vec<_>>()
            .join("\n")),
    }
}

#[derive(Serialize)]
struct Detail<'a> {
    event: &'a Event,
    dependencies: &'a [Event],
    dependents: &'a [Event],
    /// Number of events waiting on this one, directly or not.
    downstream: usize,
}

fn render_detail(detail: &Detail<'_>, rules: &[TagSortRule], format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(detail);
    }

    let Detail {
        event,
        dependencies,
        dependents,
        downstream,
    } = detail;

    let mut out = String::new();
    writeln!(out, "{}", event.name)?;
    writeln!(out, "  id:       {}", event.id)?;
    writeln!(out, "  status:   {}", event.status)?;
    if !event.description.is_empty() {
        writeln!(out, "  about:    {}", event.description)?;
    }
    let badges = order_tag_keys_for_display(&event.tags, rules);
    if !badges.is_empty() {
        let joined: Vec<String> = badges.iter().map(|(k, v)| format!("{k}={v}")).collect();
        writeln!(out, "  tags:     {}", joined.join(", "))?;
    }
    writeln!(out, "  created:  {}", event.created_at.to_rfc3339())?;
    writeln!(out, "  updated:  {}", event.updated_at.to_rfc3339())?;

    writeln!(out, "depends on ({}):", dependencies.len())?;
    for dep in dependencies.iter() {
        writeln!(out, "  {}", event_line(dep, rules))?;
    }
    write!(
        out,
        "required by ({}, {downstream} downstream in total):",
        dependents.len()
    )?;
    for dep in dependents.iter() {
        write!(out, "\n  {}", event_line(dep, rules))?;
    }
    Ok(out)
}

fn render_status_change(
    change: &StatusChange,
    rules: &[TagSortRule],
    format: OutputFormat,
) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(change);
    }

    let mut out = String::new();
    if let Some(target) = change.target() {
        write!(out, "{}", event_line(target, rules))?;
    }
    for event in change.unblocked() {
        write!(out, "\nunblocked: {}", event_line(event, rules))?;
    }
    for failure in &change.failed {
        write!(out, "\nnot unblocked: {} ({})", failure.id, failure.reason)?;
    }
    Ok(out)
}

#[derive(Serialize)]
struct DeletionView<'a> {
    removed: &'a Event,
    touched: &'a [Event],
}

fn render_deletion(deletion: &Deletion, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(&DeletionView {
            removed: &deletion.removed,
            touched: &deletion.touched,
        });
    }

    let mut out = format!("deleted {} ({})", deletion.removed.id, deletion.removed.name);
    for event in &deletion.touched {
        write!(out, "\n  removed from dependencies of {}", event.id)?;
    }
    Ok(out)
}

fn render_preferences(prefs: &SortPreferences, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(prefs);
    }

    let state = if prefs.enabled { "enabled" } else { "disabled" };
    let mut out = format!("tag sorting {state}");
    if prefs.tag_sort_rules.is_empty() {
        out.push_str("\n  (no rules)");
    }
    for (i, rule) in prefs.rules_in_order().into_iter().enumerate() {
        write!(out, "\n  {i}. {} {}", rule.tag_key, rule.direction.as_str())?;
    }
    Ok(out)
}

fn render_database(verb: &str, db: &DatabaseInfo, format: OutputFormat) -> Result<String> {
    if format == OutputFormat::Json {
        return to_json(db);
    }
    let prefs = if db.has_preferences {
        "sort preferences saved"
    } else {
        "no sort preferences yet"
    };
    Ok(format!(
        "{verb}: {} ({} events, {prefs})",
        db.path.display(),
        db.events
    ))
}

#[derive(Serialize)]
struct StorageView<'a> {
    backend: StorageBackend,
    path: Option<&'a Path>,
}

fn render_storage(cfg: &ConfigFile, format: OutputFormat) -> Result<String> {
    let view = StorageView {
        backend: cfg.storage.backend,
        path: cfg.db_path(),
    };
    if format == OutputFormat::Json {
        return to_json(&view);
    }
    Ok(match view.path {
        Some(path) => path.display().to_string(),
        None => "(memory backend, no database file)".to_string(),
    })
}
