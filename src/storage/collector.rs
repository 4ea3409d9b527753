use super::{FileInfo, Snapshot};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Thread-safe snapshot accumulator keyed by path.
///
/// Workers insert completed records concurrently; keying by path makes a
/// second record for the same path impossible to store.
#[derive(Debug, Default)]
pub struct SnapshotCollector {
    entries: DashMap<String, FileInfo>,
}

impl SnapshotCollector {
    /// Create an empty collector
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// Store a completed record.
    ///
    /// Returns `false` and keeps the existing record if the path was already
    /// collected.
    pub fn insert(&self, info: FileInfo) -> bool {
        match self.entries.entry(info.path.clone()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(info);
                true
            }
        }
    }

    /// Number of records collected so far
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Finish collecting. Record order is unspecified.
    #[must_use]
    pub fn into_snapshot(self) -> Snapshot {
        self.entries.into_iter().map(|(_, info)| info).collect()
    }
}
