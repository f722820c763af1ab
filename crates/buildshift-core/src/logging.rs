//! Logging for the BuildShift dashboard, on the `tracing` ecosystem.
//!
//! The TUI owns the terminal, so logs go to a JSON-lines file under
//! `~/.buildshift/logs/` (daily rotation) where backend issues observed in
//! the dashboard can be diagnosed after the fact. A compact stderr layer
//! carries anything emitted before the alternate screen is entered and
//! after it is left. The `-v` flag raises the level from INFO to DEBUG.

use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::error::{BuildShiftError, Result};

/// Guard that must be held to ensure log flushing on shutdown.
///
/// When this guard is dropped, it flushes any pending log entries.
/// Keep this guard alive for the lifetime of the application.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the dashboard logging system.
///
/// Installs the JSON file layer (in `log_dir`, or `~/.buildshift/logs/`
/// when `None`) and the stderr layer. `verbose` raises the level to DEBUG.
/// The returned [`LogGuard`] must be held for the application lifetime so
/// pending entries are flushed on shutdown.
pub fn init_logging(log_dir: Option<PathBuf>, verbose: bool) -> Result<LogGuard> {
    // Determine log directory
    let log_dir = match log_dir {
        Some(dir) => dir,
        None => default_log_dir()?,
    };

    // Ensure log directory exists
    std::fs::create_dir_all(&log_dir).map_err(|e| BuildShiftError::DirectoryCreation {
        path: log_dir.clone(),
        source: e,
    })?;

    // Set up file appender for JSON logs
    let file_appender = tracing_appender::rolling::daily(&log_dir, "buildshift.log");
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file_appender);

    // Determine log level based on verbose flag
    let level = if verbose { "debug" } else { "info" };
    let env_filter = EnvFilter::new(format!("buildshift={level}"));

    // JSON layer for file output
    let file_layer = fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .json();

    // Human-readable layer for console output
    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(true)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(verbose)
        .with_line_number(verbose)
        .compact();

    // Combine layers with filter
    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(console_layer)
        .init();

    tracing::debug!(log_dir = %log_dir.display(), verbose, "logging initialized");

    Ok(LogGuard {
        _file_guard: Some(file_guard),
    })
}

/// Initialize minimal console-only logging for testing.
///
/// This is a simpler alternative to [`init_logging`] that only logs to stderr.
/// Useful for tests and development.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new("debug"))
        .with_test_writer()
        .try_init();
}

/// Get the default log directory path.
///
/// Returns `~/.buildshift/logs/`
pub fn default_log_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().ok_or_else(|| BuildShiftError::Internal {
        message: "home directory not found".into(),
    })?;

    Ok(home.join(".buildshift").join("logs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_log_dir() {
        let dir = default_log_dir().unwrap();
        assert!(dir.ends_with(".buildshift/logs"));
    }

    #[test]
    fn test_init_test_logging() {
        // Should not panic
        init_test_logging();
    }
}
