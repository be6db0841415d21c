// src/lib.rs

pub mod cli;
pub mod commands;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod logging;
pub mod model;
pub mod repo;
pub mod sort;
pub mod store;
pub mod types;

use anyhow::Result;
use tracing::{debug, info};

use crate::cli::{CliArgs, Command};
use crate::commands::{execute, execute_db, OutputFormat};
use crate::config::model::ConfigFile;
use crate::config::{apply_db_override, default_config_path, load_and_validate, load_or_default};
use crate::engine::EventService;
use crate::repo::EventRepository;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (explicit `--config` must exist; the default may not)
///   and the `--db` override
/// - the store and repository
/// - the single-writer event service
/// - command dispatch and output
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = apply_db_override(load_config(&args)?, args.db.as_deref())?;

    let format = if args.json {
        OutputFormat::Json
    } else {
        OutputFormat::Text
    };
    let output = match args.command {
        Command::Db(cmd) => execute_db(cmd, &cfg, format)?,
        command => run_with_service(&cfg, command, format).await?,
    };

    if !output.is_empty() {
        println!("{output}");
    }
    Ok(())
}

async fn run_with_service(
    cfg: &ConfigFile,
    command: Command,
    format: OutputFormat,
) -> Result<String> {
    let repo = EventRepository::from_config(cfg)?;
    let (service, handle) = EventService::spawn(repo);

    let outcome = execute(&service, command, format).await;

    service.shutdown().await?;
    handle.await?;
    debug!("event service joined");

    outcome
}

fn load_config(args: &CliArgs) -> Result<ConfigFile> {
    let cfg = match &args.config {
        Some(path) => {
            info!(path = ?path, "loading config");
            load_and_validate(path)?
        }
        None => load_or_default(default_config_path())?,
    };
    Ok(cfg)
}
