#![warn(missing_docs)]
#![allow(clippy::arithmetic_side_effects)] // Counters cannot overflow
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # fpfiles - file tree fingerprinting and diffing
//!
//! `fpfiles` records a fingerprint of every regular file below a directory
//! (path, size, creation and modification time, content hash) and compares
//! two fingerprints taken at different times.
//!
//! ## Features
//!
//! - **Parallel Hashing**: files are streamed through xxHash3-128 on a Rayon pool
//! - **Deterministic Mode**: sequential runs emit files in sorted walk order
//! - **Silent Change Detection**: content or size changes that left the
//!   timestamps untouched are reported as `CHANGED_SILENT`
//! - **Plain CSV Snapshots**: one row per file, readable by any spreadsheet
//!
//! ## Architecture
//!
//! - [`scanner`]: lazy, cycle-safe directory traversal
//! - [`fingerprint`]: drives the walker and hashes files into a snapshot
//! - [`diff`]: snapshot comparison and change classification
//! - [`storage`]: the `FileInfo` record, snapshots and the CSV codec
//! - [`config`]: TOML configuration
//! - [`commands`]: the `fpf` subcommands
//!
//! ## Example Usage
//!
//! ```no_run
//! use fpfiles::diff::diff_snapshots;
//! use fpfiles::fingerprint::{FingerprintEngine, FingerprintOptions};
//!
//! # fn main() -> anyhow::Result<()> {
//! let before = FingerprintEngine::new(FingerprintOptions::new("/srv/data")).fingerprint()?;
//! // ... time passes ...
//! let after = FingerprintEngine::new(FingerprintOptions::new("/srv/data")).fingerprint()?;
//!
//! for change in diff_snapshots(&before, &after) {
//!     println!("{} {:?} {}", change.path, change.change, change.remark);
//! }
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Implementations of the `fpf` subcommands.
pub mod commands;

/// Configuration parsing, validation, and management.
pub mod config;

/// Snapshot comparison and change classification.
pub mod diff;

/// Error kinds shared by the engines.
pub mod error;

/// Fingerprint engine.
pub mod fingerprint;

/// Tracing subscriber setup.
pub mod logging;

/// Output formatting and styling.
pub mod output;

/// Filesystem scanning and directory traversal.
pub mod scanner;

/// File records, snapshots and the CSV snapshot format.
pub mod storage;

/// Utility functions and helpers.
pub mod utils;

pub use error::{FpError, FpResult};

use anyhow::Result;
use std::path::PathBuf;

/// Current version of the fpf binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Settings shared by every command of one `fpf` invocation.
///
/// # Examples
///
/// ```no_run
/// use fpfiles::FpContext;
///
/// # fn main() -> anyhow::Result<()> {
/// // Configuration from the default location, prompting allowed
/// let ctx = FpContext::new(true)?;
///
/// // Explicit configuration file, no prompts (for tests and scripts)
/// let ctx = FpContext::new_explicit("/tmp/fpfiles.toml".into(), false)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FpContext {
    /// Path of the configuration file (which may not exist).
    pub config_path: Option<PathBuf>,

    /// Loaded configuration settings.
    pub config: config::Config,

    /// Whether invalid input may be corrected at a prompt. When false
    /// (`--batchmode`) the command fails instead.
    pub interactive: bool,
}

impl FpContext {
    /// Creates a context from the configuration at the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if an existing configuration file is invalid.
    pub fn new(interactive: bool) -> Result<Self> {
        match config::Config::default_path() {
            Some(path) => Self::new_explicit(path, interactive),
            None => Ok(Self {
                config_path: None,
                config: config::Config::default(),
                interactive,
            }),
        }
    }

    /// Creates a context from the configuration at `config_path`; a missing
    /// file yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is invalid.
    pub fn new_explicit(config_path: PathBuf, interactive: bool) -> Result<Self> {
        let config = config::Config::load(&config_path)?;
        Ok(Self {
            config_path: Some(config_path),
            config,
            interactive,
        })
    }
}
