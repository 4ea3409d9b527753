//! Tracing setup for a single run.
//!
//! Installs a global subscriber writing to stderr and to the log file that
//! sits beside the result file. The file layer is non-blocking; the returned
//! guard flushes it when dropped, so callers hold it until the run is over.

use crate::output::Verbosity;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, prelude::*};

/// Environment variable holding a filter directive, e.g. `fpfiles=debug`.
pub const LOG_ENV: &str = "FPFILES_LOG";

static INSTALLED: OnceLock<PathBuf> = OnceLock::new();

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// The log file could not be created or opened for appending.
    #[error("Failed to create log file at {}: {source}", path.display())]
    CreateLogFile {
        /// Log file path.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },
    /// A global subscriber was already installed by someone else.
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(#[from] tracing_subscriber::util::TryInitError),
}

/// Route tracing output to stderr and to `log_path`.
///
/// The log file is created even when logging was already initialized by an
/// earlier call in this process; that call's subscriber stays in effect and
/// `Ok(None)` is returned.
///
/// # Errors
///
/// Returns [`LoggingError`] if the log file cannot be opened or another
/// subscriber is already installed.
pub fn init(log_path: &Path, verbosity: Verbosity) -> Result<Option<WorkerGuard>, LoggingError> {
    ensure_file_exists(log_path)?;
    if INSTALLED.get().is_some() {
        return Ok(None);
    }

    let directory = log_path
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let file_name = log_path
        .file_name()
        .map_or_else(|| "fpfiles.log".into(), ToOwned::to_owned);

    let file_appender = rolling::never(directory, file_name);
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(console_level(verbosity));
    let file_layer = fmt::layer().with_ansi(false).with_writer(file_writer);

    Registry::default()
        .with(build_env_filter(verbosity))
        .with(console_layer)
        .with(file_layer)
        .try_init()?;
    let _ = INSTALLED.set(log_path.to_path_buf());

    tracing::debug!(log_file = %log_path.display(), "Logging initialized");
    Ok(Some(guard))
}

fn build_env_filter(verbosity: Verbosity) -> EnvFilter {
    let default = if verbosity == Verbosity::Verbose {
        "debug"
    } else {
        "info"
    };
    std::env::var(LOG_ENV)
        .or_else(|_| std::env::var(EnvFilter::DEFAULT_ENV))
        .ok()
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new(default))
}

const fn console_level(verbosity: Verbosity) -> LevelFilter {
    match verbosity {
        Verbosity::Quiet => LevelFilter::WARN,
        Verbosity::Normal => LevelFilter::INFO,
        Verbosity::Verbose => LevelFilter::DEBUG,
    }
}

fn ensure_file_exists(path: &Path) -> Result<(), LoggingError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| LoggingError::CreateLogFile {
            path: path.to_path_buf(),
            source,
        })?;
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(|_| ())
        .map_err(|source| LoggingError::CreateLogFile {
            path: path.to_path_buf(),
            source,
        })
}
