/// Concurrent accumulator used by the parallel fingerprint engine
pub(crate) mod collector;
/// CSV snapshot codec (load and atomic save)
pub mod snapshots;

use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt;
use std::fs::Metadata;
use std::str::FromStr;

/// Timestamp representation used for `created` and `modified`.
pub type Timestamp = DateTime<Utc>;

/// Prefix of the remark attached to records whose stat or hash failed.
pub const ERROR_REMARK_PREFIX: &str = "ERROR: ";

/// Classification assigned by the diff engine.
///
/// A raw fingerprint carries no classification, which is modelled as
/// `Option<ChangeKind>::None` on [`FileInfo::change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    /// Path exists only in the newer snapshot.
    Added,
    /// Path exists only in the baseline snapshot.
    Deleted,
    /// A timestamp changed, possibly together with size or content.
    Changed,
    /// Size or content changed while both timestamps stayed the same.
    ChangedSilent,
}

impl ChangeKind {
    /// All kinds in their canonical reporting order.
    pub const ALL: [Self; 4] = [
        Self::Added,
        Self::Deleted,
        Self::Changed,
        Self::ChangedSilent,
    ];

    /// The value written to the `change` column.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Added => "ADDED",
            Self::Deleted => "DELETED",
            Self::Changed => "CHANGED",
            Self::ChangedSilent => "CHANGED_SILENT",
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| format!("unknown change kind '{s}'"))
    }
}

/// Metadata (and optional content hash) of one file.
///
/// `path` is the identity key within a snapshot. Records are never mutated
/// once they are part of a [`Snapshot`]; the diff engine derives new records
/// through [`FileInfo::with_change`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FileInfo {
    /// Location of the file, rooted at the scanned directory.
    pub path: String,
    /// Size in bytes, `None` when the file could not be stat'd.
    pub size: Option<u64>,
    /// Creation (birth) time, `None` when the platform does not record it.
    pub created: Option<Timestamp>,
    /// Last modification time.
    pub modified: Option<Timestamp>,
    /// Hex content digest, empty when hashing is disabled or failed.
    pub hash: String,
    /// Diff classification, `None` in a raw fingerprint.
    pub change: Option<ChangeKind>,
    /// Human-readable description of the change or failure.
    pub remark: String,
}

impl FileInfo {
    /// Creates an empty record for `path`.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            size: None,
            created: None,
            modified: None,
            hash: String::new(),
            change: None,
            remark: String::new(),
        }
    }

    /// Creates a record carrying size and timestamps from `metadata`.
    #[must_use]
    pub fn from_metadata(path: impl Into<String>, metadata: &Metadata) -> Self {
        Self {
            size: Some(metadata.len()),
            created: metadata.created().ok().map(Timestamp::from),
            modified: metadata.modified().ok().map(Timestamp::from),
            ..Self::new(path)
        }
    }

    /// Returns a copy annotated with an error remark and no hash.
    #[must_use]
    pub fn with_error(mut self, error: &impl fmt::Display) -> Self {
        self.hash.clear();
        self.remark = format!("{ERROR_REMARK_PREFIX}{error}");
        self
    }

    /// Returns a new record with the given classification and remark.
    #[must_use]
    pub fn with_change(&self, change: ChangeKind, remark: String) -> Self {
        Self {
            change: Some(change),
            remark,
            ..self.clone()
        }
    }

    /// Whether fingerprinting this file failed.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.change.is_none() && self.remark.starts_with(ERROR_REMARK_PREFIX)
    }
}

/// Formats a timestamp for storage; `None` becomes the empty string.
#[must_use]
pub fn format_timestamp(timestamp: Option<&Timestamp>) -> String {
    timestamp.map_or_else(String::new, |ts| {
        ts.to_rfc3339_opts(SecondsFormat::Nanos, true)
    })
}

/// Parses a stored timestamp; the empty string yields `None`.
///
/// # Errors
///
/// Returns a description of the problem when the value is not RFC 3339.
pub fn parse_timestamp(value: &str) -> Result<Option<Timestamp>, String> {
    if value.is_empty() {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|ts| Some(ts.with_timezone(&Utc)))
        .map_err(|e| format!("invalid timestamp '{value}': {e}"))
}

/// Ordered collection of [`FileInfo`] records captured at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Records in insertion order.
    entries: Vec<FileInfo>,
}

impl Snapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Wraps already-ordered records.
    #[must_use]
    pub const fn from_entries(entries: Vec<FileInfo>) -> Self {
        Self { entries }
    }

    /// Appends a record.
    pub fn push(&mut self, info: FileInfo) {
        self.entries.push(info);
    }

    /// Records in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[FileInfo] {
        &self.entries
    }

    /// Iterates records in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, FileInfo> {
        self.entries.iter()
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot has no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of records whose fingerprinting failed.
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.entries.iter().filter(|info| info.is_error()).count()
    }

    /// Consumes the snapshot, returning its records.
    #[must_use]
    pub fn into_entries(self) -> Vec<FileInfo> {
        self.entries
    }
}

impl<'a> IntoIterator for &'a Snapshot {
    type Item = &'a FileInfo;
    type IntoIter = std::slice::Iter<'a, FileInfo>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl FromIterator<FileInfo> for Snapshot {
    fn from_iter<I: IntoIterator<Item = FileInfo>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_change_kind_round_trip() {
        for kind in ChangeKind::ALL {
            assert_eq!(kind.as_str().parse::<ChangeKind>(), Ok(kind));
        }
        assert!("MOVED".parse::<ChangeKind>().is_err());
        assert!("".parse::<ChangeKind>().is_err());
    }

    #[test]
    fn test_timestamp_keeps_nanoseconds() {
        let ts = Utc
            .timestamp_opt(1_700_000_000, 123_456_789)
            .single()
            .expect("valid timestamp");
        let text = format_timestamp(Some(&ts));
        assert_eq!(text, "2023-11-14T22:13:20.123456789Z");
        assert_eq!(parse_timestamp(&text), Ok(Some(ts)));
    }

    #[test]
    fn test_empty_timestamp_is_none() {
        assert_eq!(format_timestamp(None), "");
        assert_eq!(parse_timestamp(""), Ok(None));
        assert!(parse_timestamp("yesterday").is_err());
    }

    #[test]
    fn test_with_change_leaves_original_untouched() {
        let mut original = FileInfo::new("root/a.txt");
        original.size = Some(10);
        original.hash = "abc".to_string();

        let changed = original.with_change(ChangeKind::Changed, "Size changed".to_string());

        assert_eq!(changed.change, Some(ChangeKind::Changed));
        assert_eq!(changed.remark, "Size changed");
        assert_eq!(changed.size, Some(10));
        assert_eq!(original.change, None);
        assert!(original.remark.is_empty());
    }

    #[test]
    fn test_error_record() {
        let mut info = FileInfo::new("root/locked.bin");
        info.hash = "partial".to_string();
        let info = info.with_error(&"Failed to open root/locked.bin: denied");

        assert!(info.is_error());
        assert!(info.hash.is_empty());
        assert!(info.remark.starts_with(ERROR_REMARK_PREFIX));

        let mut snapshot = Snapshot::new();
        snapshot.push(info);
        snapshot.push(FileInfo::new("root/ok.txt"));
        assert_eq!(snapshot.error_count(), 1);
    }
}
