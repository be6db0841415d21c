// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::types::EventStatus;

/// Command-line arguments for `todo-scheduler`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "todo-scheduler",
    version,
    about = "Track tasks whose status follows their dependencies.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// If omitted, `TodoScheduler.toml` in the current directory is used
    /// when present and built-in defaults otherwise.
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Database file, overriding `[storage].path`.
    #[arg(long, value_name = "PATH", global = true)]
    pub db: Option<PathBuf>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `TODO_SCHEDULER_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL", global = true)]
    pub log_level: Option<LogLevel>,

    /// Print records as JSON instead of text.
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Create an event.
    Add(AddArgs),
    /// List events, newest first.
    List(ListArgs),
    /// Show one event with its direct dependencies and dependents.
    Show { id: String },
    /// Change an event's fields.
    Edit(EditArgs),
    /// Set an event's status; completing it unblocks ready dependents.
    Status {
        id: String,
        #[arg(value_parser = parse_status)]
        status: EventStatus,
    },
    /// Delete an event and remove it from every dependency list.
    Rm { id: String },
    /// Direct dependencies of an event.
    Deps { id: String },
    /// Direct dependents of an event.
    Dependents { id: String },
    /// Inspect or change tag sort preferences.
    #[command(subcommand)]
    Sort(SortCommand),
    /// Create, check or locate database files.
    #[command(subcommand)]
    Db(DbCommand),
}

#[derive(Debug, Clone, Args)]
pub struct AddArgs {
    pub name: String,

    #[arg(long, short, default_value = "")]
    pub description: String,

    /// Tag as `key=value`; repeatable.
    #[arg(long = "tag", short, value_name = "KEY=VALUE", value_parser = parse_tag)]
    pub tags: Vec<(String, String)>,

    /// Id of an event this one depends on; repeatable.
    #[arg(long = "dep", value_name = "ID")]
    pub deps: Vec<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    #[arg(long, value_parser = parse_status)]
    pub status: Option<EventStatus>,

    /// Only events carrying this exact tag; repeatable.
    #[arg(long = "tag", short, value_name = "KEY=VALUE", value_parser = parse_tag)]
    pub tags: Vec<(String, String)>,

    /// Case-insensitive text searched in name and description.
    #[arg(long, short)]
    pub search: Option<String>,

    /// Order by the saved tag sort rules.
    #[arg(long)]
    pub sorted: bool,
}

#[derive(Debug, Clone, Args)]
pub struct EditArgs {
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long, short)]
    pub description: Option<String>,

    /// Replace the tag map; repeatable.
    #[arg(long = "tag", short, value_name = "KEY=VALUE", value_parser = parse_tag)]
    pub tags: Vec<(String, String)>,

    #[arg(long, conflicts_with = "tags")]
    pub clear_tags: bool,

    /// Replace the dependency list; repeatable.
    #[arg(long = "dep", value_name = "ID")]
    pub deps: Vec<String>,

    #[arg(long, conflicts_with = "deps")]
    pub clear_deps: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum SortCommand {
    /// Print the current rules.
    Show,
    /// Add a rule at the lowest priority, or change its direction.
    Add {
        tag_key: String,
        #[arg(long)]
        desc: bool,
    },
    /// Remove a rule.
    Remove { tag_key: String },
    /// Move a rule to a new position (0 = highest priority).
    Move { tag_key: String, index: usize },
    Enable,
    Disable,
}

#[derive(Debug, Clone, Subcommand)]
pub enum DbCommand {
    /// Create a database file, and its parent directories, if missing.
    Init { path: PathBuf },
    /// Check that an existing database file opens and holds a consistent
    /// dependency graph.
    Check { path: PathBuf },
    /// Print the database file in use after `--config` and `--db`.
    Path,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_status(s: &str) -> Result<EventStatus, String> {
    s.parse()
}

fn parse_tag(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) => Ok((key.to_string(), value.to_string())),
        None => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_split_on_first_equals() {
        assert_eq!(
            parse_tag("url=a=b").unwrap(),
            ("url".to_string(), "a=b".to_string())
        );
        assert!(parse_tag("novalue").is_err());
    }

    #[test]
    fn status_subcommand_parses() {
        let args = CliArgs::try_parse_from(["todo-scheduler", "status", "abc", "done"]).unwrap();
        match args.command {
            Command::Status { id, status } => {
                assert_eq!(id, "abc");
                assert_eq!(status, EventStatus::Completed);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn db_subcommands_parse() {
        let args =
            CliArgs::try_parse_from(["todo-scheduler", "db", "check", "data/todo.db"]).unwrap();
        match args.command {
            Command::Db(DbCommand::Check { path }) => {
                assert_eq!(path, PathBuf::from("data/todo.db"));
            }
            other => panic!("unexpected command {other:?}"),
        }

        let args =
            CliArgs::try_parse_from(["todo-scheduler", "--db", "x.db", "db", "path"]).unwrap();
        assert_eq!(args.db, Some(PathBuf::from("x.db")));
        assert!(matches!(args.command, Command::Db(DbCommand::Path)));
    }

    #[test]
    fn global_flags_after_subcommand() {
        let args =
            CliArgs::try_parse_from(["todo-scheduler", "list", "--json", "--sorted"]).unwrap();
        assert!(args.json);
        assert!(matches!(args.command, Command::List(ListArgs { sorted: true, .. })));
    }
}
