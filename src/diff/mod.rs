//! Snapshot comparison and change classification.
//!
//! The engine makes one pass over the newer snapshot, matching each record
//! by path against an index of the baseline:
//!
//! | Situation                                   | Result           |
//! |---------------------------------------------|------------------|
//! | path only in the newer snapshot             | `ADDED`          |
//! | path only in the baseline                   | `DELETED`        |
//! | `created` or `modified` differs             | `CHANGED`        |
//! | only size and/or hash differ                | `CHANGED_SILENT` |
//! | only size differs and neither side hashed   | `CHANGED`        |
//! | nothing differs                             | omitted          |
//!
//! Output lists added and changed records in the newer snapshot's order,
//! followed by deleted records in the baseline's order. When the newer
//! record of a changed file is an error record, its `ERROR: ...` remark is
//! kept as the last remark segment.

/// Per-kind counts of a diff result
pub mod summary;

pub use summary::DiffSummary;

use crate::storage::{ChangeKind, FileInfo, Snapshot, Timestamp, format_timestamp};
use std::collections::HashMap;
use tracing::{Level, debug, span};

/// Stateless snapshot comparator.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiffEngine;

impl DiffEngine {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Compare `baseline` (earlier) with `current` (later).
    ///
    /// Both snapshots must key each record by a unique path. The inputs are
    /// left untouched; every returned record is a new value with `change`
    /// set.
    #[must_use]
    pub fn diff(&self, baseline: &Snapshot, current: &Snapshot) -> Vec<FileInfo> {
        let span = span!(
            Level::DEBUG,
            "diff",
            baseline = baseline.len(),
            current = current.len()
        );
        let _guard = span.enter();

        let mut remaining: HashMap<&str, usize> = baseline
            .iter()
            .enumerate()
            .map(|(position, info)| (info.path.as_str(), position))
            .collect();

        let mut changes = Vec::new();
        for new in current {
            match remaining.remove(new.path.as_str()) {
                None => changes.push(new.with_change(ChangeKind::Added, String::new())),
                Some(position) => {
                    let old = &baseline.entries()[position];
                    if let Some((kind, remark)) = classify(old, new) {
                        changes.push(new.with_change(kind, carry_error(new, remark)));
                    }
                }
            }
        }

        let mut deleted: Vec<usize> = remaining.into_values().collect();
        deleted.sort_unstable();
        changes.extend(
            deleted
                .into_iter()
                .map(|position| baseline.entries()[position].with_change(ChangeKind::Deleted, String::new())),
        );

        debug!(changes = changes.len(), "Diff complete");
        changes
    }
}

/// Compare `baseline` with `current` using a fresh [`DiffEngine`].
#[must_use]
pub fn diff_snapshots(baseline: &Snapshot, current: &Snapshot) -> Vec<FileInfo> {
    DiffEngine::new().diff(baseline, current)
}

/// Classify two records for the same path.
///
/// Returns `None` when nothing differs, otherwise the change kind and a
/// comma-separated remark listing each difference.
#[must_use]
pub fn classify(old: &FileInfo, new: &FileInfo) -> Option<(ChangeKind, String)> {
    let mut remarks = Vec::new();
    let mut timestamps_changed = false;

    if old.size != new.size {
        remarks.push(format!(
            "Size changed from {} to {}",
            display_size(old.size),
            display_size(new.size)
        ));
    }
    if old.created != new.created {
        remarks.push(format!(
            "created changed from {} to {}",
            display_time(old.created.as_ref()),
            display_time(new.created.as_ref())
        ));
        timestamps_changed = true;
    }
    if old.modified != new.modified {
        remarks.push(format!(
            "modified changed from {} to {}",
            display_time(old.modified.as_ref()),
            display_time(new.modified.as_ref())
        ));
        timestamps_changed = true;
    }
    let hash_changed = old.hash != new.hash;
    if hash_changed {
        remarks.push("hash (data) changed".to_string());
    }

    if remarks.is_empty() {
        return None;
    }

    // Without a digest on either side a size-only difference carries no
    // integrity signal and is reported as an ordinary change.
    let hashed = !old.hash.is_empty() || !new.hash.is_empty();
    let kind = if timestamps_changed {
        ChangeKind::Changed
    } else if hash_changed || hashed {
        ChangeKind::ChangedSilent
    } else {
        ChangeKind::Changed
    };

    Some((kind, remarks.join(", ")))
}

fn carry_error(new: &FileInfo, remark: String) -> String {
    if new.is_error() {
        format!("{remark}, {}", new.remark)
    } else {
        remark
    }
}

fn display_size(size: Option<u64>) -> String {
    size.map_or_else(|| "unknown".to_string(), |size| size.to_string())
}

fn display_time(timestamp: Option<&Timestamp>) -> String {
    timestamp.map_or_else(|| "unknown".to_string(), |ts| format_timestamp(Some(ts)))
}
