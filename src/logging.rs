//! Tracing setup.
//!
//! Two sinks share one filter: human-readable lines on stderr for the operator,
//! and a plain-text daily file (`walkin.log.YYYY-MM-DD`) under the platform data
//! directory for after-the-fact inspection of registrations and SMS deliveries.
//! `RUST_LOG` overrides [`DEFAULT_FILTER`].

use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const LOG_FILE_PREFIX: &str = "walkin.log";
pub const DEFAULT_FILTER: &str = "info,walkin=debug";

/// Directory the daily log files are written to.
pub fn log_dir() -> Result<PathBuf> {
    directories::ProjectDirs::from("com", "walkin", "walkin")
        .map(|dirs| dirs.data_dir().join("logs"))
        .context("no home directory to place logs under")
}

fn filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber. Keep the guard for the life of the process;
/// dropping it flushes and closes the file writer.
pub fn init() -> Result<(WorkerGuard, PathBuf)> {
    let dir = log_dir()?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(&dir, LOG_FILE_PREFIX));

    tracing_subscriber::registry()
        .with(filter(DEFAULT_FILTER))
        .with(
            fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_line_number(true),
        )
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init()
        .context("a global tracing subscriber is already set")?;

    tracing::debug!(dir = %dir.display(), "Logging to file");
    Ok((guard, dir))
}

/// Console-only subscriber routed through the test harness. Later calls are no-ops.
#[cfg(test)]
pub fn init_test() {
    let _ = tracing_subscriber::registry()
        .with(filter("debug"))
        .with(fmt::layer().with_test_writer())
        .try_init();
}
