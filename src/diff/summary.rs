use crate::storage::{ChangeKind, FileInfo};
use std::fmt;

/// Number of records per change kind in a diff result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffSummary {
    /// `ADDED` records.
    pub added: usize,
    /// `DELETED` records.
    pub deleted: usize,
    /// `CHANGED` records.
    pub changed: usize,
    /// `CHANGED_SILENT` records.
    pub changed_silent: usize,
}

impl DiffSummary {
    /// Count the classified records in `changes`; unclassified ones are ignored.
    #[must_use]
    pub fn from_changes(changes: &[FileInfo]) -> Self {
        changes
            .iter()
            .filter_map(|info| info.change)
            .fold(Self::default(), |mut summary, kind| {
                match kind {
                    ChangeKind::Added => summary.added += 1,
                    ChangeKind::Deleted => summary.deleted += 1,
                    ChangeKind::Changed => summary.changed += 1,
                    ChangeKind::ChangedSilent => summary.changed_silent += 1,
                }
                summary
            })
    }

    /// All classified records
    #[must_use]
    pub const fn total(&self) -> usize {
        self.added + self.deleted + self.changed + self.changed_silent
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

impl fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} added, {} deleted, {} changed, {} changed silently",
            self.added, self.deleted, self.changed, self.changed_silent
        )
    }
}
