use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::settings;

/// Sends tracing output to `<config_dir>/dispatches.log`; stdout belongs to
/// the terminal UI. Keep the returned guard alive until exit so buffered
/// lines are flushed.
pub fn init(config_dir: &Path, verbose: bool) -> Result<WorkerGuard> {
    fs::create_dir_all(config_dir)
        .with_context(|| format!("Failed to create directory {}", config_dir.display()))?;

    let log_path = settings::log_path(config_dir);
    let file_name = log_path
        .file_name()
        .context("log path has no file name")?;
    let appender = tracing_appender::rolling::never(config_dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("dispatches={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install log subscriber: {e}"))?;

    if verbose {
        eprintln!("Logging to {}", log_path.display());
    }
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "logging initialized");

    Ok(guard)
}
