//! Command-line interface definitions for `fpf`.
//!
//! Shared between the binary and xtask, which renders the man pages from
//! these definitions.
//!
//! Flags keep their underscore spelling (`--fp_dir`, `--no_mp`) so existing
//! batch scripts keep working; the kebab-case spelling is accepted as an alias.

#![allow(missing_docs)]

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// Main CLI structure for fpf.
#[derive(Parser)]
#[command(
    name = "fpf",
    version = crate::VERSION,
    about = "Fingerprint a directory tree and diff fingerprints",
    long_about = "Records path, size, timestamps and an xxHash3 content hash for every file \
                  under a directory, and compares two such fingerprints to report added, \
                  deleted, changed and silently changed files"
)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// All available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Fingerprint every file under a directory into a CSV file
    Fingerprint {
        /// Directory to fingerprint, e.g. /srv/data
        #[arg(long = "fp_dir", visible_alias = "fp-dir", value_name = "DIR")]
        fp_dir: Option<PathBuf>,

        /// Result file; the extension is always replaced by .csv
        #[arg(long, value_name = "FILE")]
        resultfile: Option<PathBuf>,

        /// No user interaction; invalid paths exit with status 1
        #[arg(long)]
        batchmode: bool,

        /// Run without administrator rights (not recommended)
        #[arg(long = "no_admin", visible_alias = "no-admin")]
        no_admin: bool,

        /// Do not calculate file hashes (not recommended)
        #[arg(long = "no_hashing", visible_alias = "no-hashing")]
        no_hashing: bool,

        /// Hash on a single thread; preserves file order in the result
        #[arg(long = "no_mp", visible_alias = "no-mp")]
        no_mp: bool,
    },

    /// Compare two fingerprints and write the differences as CSV
    Diff {
        /// Earlier (baseline) fingerprint
        #[arg(long, value_name = "CSV")]
        fp1: Option<PathBuf>,

        /// Later fingerprint
        #[arg(long, value_name = "CSV")]
        fp2: Option<PathBuf>,

        /// Result file; the extension is always replaced by .csv
        #[arg(long, value_name = "FILE")]
        resultfile: Option<PathBuf>,

        /// No user interaction; invalid paths exit with status 1
        #[arg(long)]
        batchmode: bool,
    },

    /// Generate shell completion scripts
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}
