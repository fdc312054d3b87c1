//! Logging setup for the fileledger binary.
//!
//! Two layers: a daily log file under `~/.fileledger/logs` that always
//! records at the configured filter, and a stderr layer that stays at `warn`
//! unless verbose so it does not fight the progress bar.
//!
//! The file layer writes through a non-blocking worker. Keep the returned
//! [`WorkerGuard`] alive until exit or buffered lines are lost.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

pub use tracing_appender::non_blocking::WorkerGuard;

const DEFAULT_LOG_FILTER: &str = "fileledger=info,fileledger_db=info";
const MAX_LOG_FILES: usize = 5;

/// Logging configuration for fileledger binaries.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
    /// Override for the log directory; defaults to [`logs_dir`].
    pub log_dir: Option<PathBuf>,
}

/// Initialize tracing with a rolling file writer and stderr output.
pub fn init_logging(config: LogConfig<'_>) -> Result<WorkerGuard> {
    let log_dir = match config.log_dir {
        Some(dir) => {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            dir
        }
        None => ensure_logs_dir().context("Failed to ensure log directory")?,
    };
    let appender = file_appender(&log_dir, config.app_name)?;
    let (file_writer, guard) = tracing_appender::non_blocking(appender);

    let file_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let console_filter = if config.verbose {
        file_filter.clone()
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(console_filter),
        )
        .try_init()
        .context("A global tracing subscriber is already installed")?;

    Ok(guard)
}

/// Daily `<app>.<date>.log` files in `dir`, keeping the newest few.
pub fn file_appender(dir: &Path, app_name: &str) -> Result<RollingFileAppender> {
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(sanitize_name(app_name))
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(dir)
        .with_context(|| format!("Failed to open log file in {}", dir.display()))
}

/// The fileledger home directory: `$FILELEDGER_HOME`, else `~/.fileledger`.
///
/// Falls back to `./.fileledger` when no home directory can be determined.
pub fn fileledger_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("FILELEDGER_HOME") {
        return PathBuf::from(override_path);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fileledger")
}

/// The logs directory: `~/.fileledger/logs`
pub fn logs_dir() -> PathBuf {
    fileledger_home().join("logs")
}

/// Ensure the logs directory exists.
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir();
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}
