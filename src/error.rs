//! Error kinds surfaced by the fingerprint and diff engines.
//!
//! Fatal kinds abort the current operation before any output is produced.
//! [`FpError::FileRead`] is the only per-file kind: the fingerprint engine
//! absorbs it into the snapshot as an annotated record instead of returning it.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// The filesystem operation that failed for a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileOperation {
    /// Reading file metadata (size, timestamps).
    Stat,
    /// Opening the file for reading.
    Open,
    /// Reading file content while hashing.
    Read,
}

impl fmt::Display for FileOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Stat => "stat",
            Self::Open => "open",
            Self::Read => "read",
        };
        f.write_str(name)
    }
}

/// Errors produced while fingerprinting, loading, diffing or writing snapshots.
#[derive(Debug, thiserror::Error)]
pub enum FpError {
    /// The root directory is missing, not a directory, or not readable.
    #[error("Cannot read directory {}: {source}", path.display())]
    DirectoryAccess {
        /// Root directory that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },

    /// The destination file cannot be created or replaced.
    #[error("Cannot write to {}: {source}", path.display())]
    OutputWrite {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },

    /// A single file could not be stat'd, opened or fully read.
    #[error("Failed to {operation} {}: {source}", path.display())]
    FileRead {
        /// File that failed.
        path: PathBuf,
        /// Operation that was being attempted.
        operation: FileOperation,
        /// Underlying I/O failure.
        source: io::Error,
    },

    /// A stored snapshot file cannot be opened or read.
    #[error("Cannot read snapshot {}: {source}", path.display())]
    SnapshotRead {
        /// Snapshot file being loaded.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },

    /// A stored snapshot does not match the expected CSV schema.
    #[error("Malformed snapshot {} (line {line}): {reason}", path.display())]
    MalformedSnapshot {
        /// Snapshot file being loaded.
        path: PathBuf,
        /// 1-based line number, 1 being the header.
        line: u64,
        /// What was wrong with the record.
        reason: String,
    },

    /// Low-level CSV encoding failure.
    #[error(transparent)]
    Csv(#[from] csv::Error),

    /// The hashing worker pool could not be started.
    #[error("Failed to start worker pool: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    /// Configuration could not be parsed or failed validation.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl FpError {
    /// Builds a [`FpError::FileRead`] for `path`.
    pub fn file_read(
        path: impl Into<PathBuf>,
        operation: FileOperation,
        source: io::Error,
    ) -> Self {
        Self::FileRead {
            path: path.into(),
            operation,
            source,
        }
    }

    /// Builds a [`FpError::MalformedSnapshot`] for `path`.
    pub fn malformed(path: impl Into<PathBuf>, line: u64, reason: impl Into<String>) -> Self {
        Self::MalformedSnapshot {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}

/// Result alias for engine-level operations.
pub type FpResult<T> = Result<T, FpError>;
