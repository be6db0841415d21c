// src/logging.rs

//! Logging setup for `todo-scheduler` using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the filter:
//! 1. `--log-level` CLI flag (if provided)
//! 2. `TODO_SCHEDULER_LOG` environment variable, in `EnvFilter` syntax
//!    (e.g. "info" or "todo_scheduler::engine=debug")
//! 3. default to `warn`
//!
//! Logs are sent to STDERR so that stdout carries only command output
//! (including `--json` records).

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "TODO_SCHEDULER_LOG";

const DEFAULT_DIRECTIVE: &str = "warn";

/// Initialise global logging subscriber.
///
/// Safe to call once at startup.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env_value = std::env::var(LOG_ENV_VAR).ok();

    fmt()
        .with_env_filter(build_filter(cli_level, env_value.as_deref()))
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install log subscriber: {e}"))?;

    Ok(())
}

/// An unparsable environment value falls back to the default.
fn build_filter(cli_level: Option<LogLevel>, env_value: Option<&str>) -> EnvFilter {
    if let Some(lvl) = cli_level {
        return EnvFilter::new(directive(lvl));
    }
    env_value
        .and_then(|value| EnvFilter::try_new(value.trim()).ok())
        .unwrap_or_else(|| EnvFilter::new(DEFAULT_DIRECTIVE))
}

fn directive(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_level_wins_over_environment() {
        let filter = build_filter(Some(LogLevel::Debug), Some("error"));
        assert_eq!(filter.to_string(), "debug");
    }

    #[test]
    fn environment_accepts_per_target_directives() {
        let filter = build_filter(None, Some("todo_scheduler::engine=debug"));
        assert!(filter.to_string().contains("todo_scheduler::engine=debug"));
    }

    #[test]
    fn missing_or_bad_environment_uses_default() {
        assert_eq!(build_filter(None, None).to_string(), "warn");
        assert_eq!(build_filter(None, Some("todo_scheduler=loud")).to_string(), "warn");
    }
}
