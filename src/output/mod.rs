//! Console styling for the `fpf` binary.
//!
//! Messages go to stderr so stdout stays free for completion scripts.
//! Routine messages are dimmed and suppressed in quiet mode.

use crate::diff::DiffSummary;
use colored::Colorize;
use std::sync::atomic::{AtomicU8, Ordering};

/// Verbosity level for output messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Suppress informational messages, show only warnings and errors.
    Quiet = 0,
    /// Default verbosity level, show all standard messages.
    #[default]
    Normal = 1,
    /// Show verbose debug messages in addition to standard output.
    Verbose = 2,
}

impl Verbosity {
    /// Level selected by the global `--verbose`/`--quiet` flags; quiet wins.
    #[must_use]
    pub const fn from_flags(verbose: bool, quiet: bool) -> Self {
        if quiet {
            Self::Quiet
        } else if verbose {
            Self::Verbose
        } else {
            Self::Normal
        }
    }
}

/// Global verbosity setting (default: Normal).
static VERBOSITY: AtomicU8 = AtomicU8::new(1);

/// Sets the global verbosity level for all output functions.
pub fn set_verbosity(level: Verbosity) {
    VERBOSITY.store(level as u8, Ordering::Relaxed);
}

/// Gets the current global verbosity level.
pub fn get_verbosity() -> Verbosity {
    match VERBOSITY.load(Ordering::Relaxed) {
        0 => Verbosity::Quiet,
        2 => Verbosity::Verbose,
        _ => Verbosity::Normal,
    }
}

/// Prints an action line with a dimmed bold verb, e.g. `Hashing /srv/data`.
pub fn action(verb: &str, message: &str) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    eprintln!("{} {}", verb.dimmed().bold(), message);
}

/// Prints the per-kind counts of a diff, colored like `git status`.
pub fn diff_summary(summary: &DiffSummary) {
    if get_verbosity() == Verbosity::Quiet {
        return;
    }
    if summary.is_empty() {
        eprintln!("{}", "No changes".dimmed());
        return;
    }
    eprintln!(
        "{} added, {} deleted, {} changed, {} changed silently",
        summary.added.to_string().green(),
        summary.deleted.to_string().red(),
        summary.changed.to_string().yellow(),
        summary.changed_silent.to_string().magenta().bold(),
    );
}
