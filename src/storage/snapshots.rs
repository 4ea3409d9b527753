//! CSV codec for fingerprint and diff snapshots.
//!
//! The column order is fixed so two fingerprint files taken in sequential
//! mode can be compared with an ordinary text diff. Loading is strict: every
//! column must be known, required columns must be present and every field
//! must parse, otherwise the whole file is rejected as malformed.

use super::{
    ChangeKind, ERROR_REMARK_PREFIX, FileInfo, Snapshot, format_timestamp, parse_timestamp,
};
use crate::error::{FpError, FpResult};
use std::collections::HashSet;
use std::io::{self, Read, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::{Level, debug, span};

/// Header written for every snapshot, raw fingerprint or diff.
pub const SNAPSHOT_COLUMNS: [&str; 7] = [
    "path", "size", "created", "modified", "hash", "change", "remark",
];

/// UTF-8 byte order mark some spreadsheet tools prepend.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Column positions resolved from a header row.
#[derive(Debug)]
struct ColumnMap {
    path: usize,
    size: usize,
    created: usize,
    modified: usize,
    hash: usize,
    change: Option<usize>,
    remark: Option<usize>,
}

impl ColumnMap {
    fn from_header(header: &csv::StringRecord, source: &Path) -> FpResult<Self> {
        let mut seen = HashSet::new();
        for name in header {
            if !SNAPSHOT_COLUMNS.contains(&name) {
                return Err(FpError::malformed(
                    source,
                    1,
                    format!("unknown column '{name}'"),
                ));
            }
            if !seen.insert(name) {
                return Err(FpError::malformed(
                    source,
                    1,
                    format!("duplicate column '{name}'"),
                ));
            }
        }

        let position = |name: &str| header.iter().position(|column| column == name);
        let required = |name: &str| {
            position(name).ok_or_else(|| {
                FpError::malformed(source, 1, format!("missing required column '{name}'"))
            })
        };

        Ok(Self {
            path: required("path")?,
            size: required("size")?,
            created: required("created")?,
            modified: required("modified")?,
            hash: required("hash")?,
            change: position("change"),
            remark: position("remark"),
        })
    }

    fn parse(&self, record: &csv::StringRecord, line: u64, source: &Path) -> FpResult<FileInfo> {
        let field = move |index: usize| record.get(index).unwrap_or_default();
        let malformed = |reason: String| FpError::malformed(source, line, reason);

        let path = field(self.path);
        if path.is_empty() {
            return Err(malformed("empty path".to_string()));
        }

        let size = match field(self.size) {
            "" => None,
            value => Some(
                value
                    .parse::<u64>()
                    .map_err(|e| malformed(format!("invalid size '{value}': {e}")))?,
            ),
        };
        let created = parse_timestamp(field(self.created)).map_err(malformed)?;
        let modified = parse_timestamp(field(self.modified)).map_err(malformed)?;

        let change = match self.change.map(field).unwrap_or_default() {
            "" => None,
            value => Some(value.parse::<ChangeKind>().map_err(malformed)?),
        };
        let remark = self.remark.map(field).unwrap_or_default();
        if change.is_none() && !remark.is_empty() && !remark.starts_with(ERROR_REMARK_PREFIX) {
            return Err(malformed("remark present without a change kind".to_string()));
        }

        Ok(FileInfo {
            path: path.to_string(),
            size,
            created,
            modified,
            hash: field(self.hash).to_string(),
            change,
            remark: remark.to_string(),
        })
    }
}

/// Load a snapshot from a CSV file.
///
/// # Errors
///
/// - [`FpError::SnapshotRead`] if the file cannot be read
/// - [`FpError::MalformedSnapshot`] if it does not match the schema or repeats a path
pub fn load_snapshot(path: &Path) -> FpResult<Snapshot> {
    let span = span!(Level::DEBUG, "load_snapshot", path = %path.display());
    let _guard = span.enter();

    let content = std::fs::read(path).map_err(|source| FpError::SnapshotRead {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot = read_snapshot(content.as_slice(), path)?;

    debug!(records = snapshot.len(), "Snapshot loaded");
    Ok(snapshot)
}

/// Parse a snapshot from any reader; `source` is only used in error messages.
///
/// # Errors
///
/// Returns [`FpError::MalformedSnapshot`] for any schema violation.
pub fn read_snapshot<R: Read>(mut reader: R, source: &Path) -> FpResult<Snapshot> {
    let mut content = Vec::new();
    reader
        .read_to_end(&mut content)
        .map_err(|e| FpError::SnapshotRead {
            path: source.to_path_buf(),
            source: e,
        })?;
    let body = content.strip_prefix(UTF8_BOM).unwrap_or(&content);

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(body);

    let header = csv_reader
        .headers()
        .map_err(|e| csv_malformed(source, &e))?
        .clone();
    if header.is_empty() || (header.len() == 1 && header.get(0) == Some("")) {
        return Err(FpError::malformed(source, 1, "missing header row"));
    }
    let columns = ColumnMap::from_header(&header, source)?;

    let mut seen_paths = HashSet::new();
    let mut snapshot = Snapshot::new();
    for record in csv_reader.records() {
        let record = record.map_err(|e| csv_malformed(source, &e))?;
        let line = record.position().map_or(0, csv::Position::line);
        let info = columns.parse(&record, line, source)?;
        if !seen_paths.insert(info.path.clone()) {
            return Err(FpError::malformed(
                source,
                line,
                format!("duplicate path '{}'", info.path),
            ));
        }
        snapshot.push(info);
    }

    Ok(snapshot)
}

/// Write records as CSV, header first, in the given order.
///
/// # Errors
///
/// Returns an error if the underlying writer fails.
pub fn write_snapshot<W: Write>(writer: W, records: &[FileInfo]) -> Result<(), csv::Error> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(SNAPSHOT_COLUMNS)?;

    for info in records {
        let size = info.size.map(|size| size.to_string()).unwrap_or_default();
        let created = format_timestamp(info.created.as_ref());
        let modified = format_timestamp(info.modified.as_ref());
        let change = info.change.map(|kind| kind.as_str()).unwrap_or_default();
        csv_writer.write_record([
            info.path.as_str(),
            size.as_str(),
            created.as_str(),
            modified.as_str(),
            info.hash.as_str(),
            change,
            info.remark.as_str(),
        ])?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Atomically write records to `path`.
///
/// The CSV is written to a temporary file next to `path` and moved into
/// place only once complete, so a failure never leaves a partial file.
///
/// # Errors
///
/// Returns [`FpError::OutputWrite`] if the destination cannot be written.
pub fn save_snapshot(path: &Path, records: &[FileInfo]) -> FpResult<()> {
    let span = span!(
        Level::DEBUG,
        "save_snapshot",
        path = %path.display(),
        records = records.len()
    );
    let _guard = span.enter();

    let output_error = |source: io::Error| FpError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(parent).map_err(output_error)?;

    write_snapshot(temp.as_file_mut(), records).map_err(|e| {
        if let csv::ErrorKind::Io(io_err) = e.kind() {
            return output_error(io::Error::new(io_err.kind(), e.to_string()));
        }
        FpError::Csv(e)
    })?;
    temp.as_file().sync_all().map_err(output_error)?;
    temp.persist(path).map_err(|e| output_error(e.error))?;

    debug!("Snapshot written");
    Ok(())
}

fn csv_malformed(source: &Path, error: &csv::Error) -> FpError {
    let line = error.position().map_or(0, csv::Position::line);
    FpError::malformed(source, line, error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Timestamp;
    use chrono::TimeZone;
    use tempfile::tempdir;

    fn sample(path: &str) -> FileInfo {
        let ts: Timestamp = chrono::Utc
            .timestamp_opt(1_600_000_000, 42)
            .single()
            .expect("valid timestamp");
        FileInfo {
            path: path.to_string(),
            size: Some(12),
            created: Some(ts),
            modified: Some(ts),
            hash: "0123456789abcdef0123456789abcdef".to_string(),
            change: None,
            remark: String::new(),
        }
    }

    fn parse(text: &str) -> FpResult<Snapshot> {
        read_snapshot(text.as_bytes(), Path::new("test.csv"))
    }

    #[test]
    fn test_save_and_load_preserves_records_and_order() -> anyhow::Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("fp.csv");
        let records = vec![
            sample("root/z.txt"),
            sample("root/a, with comma.txt"),
            sample("root/\"quoted\".txt")
                .with_change(ChangeKind::Changed, "Size changed from 1 to 2".to_string()),
        ];

        save_snapshot(&path, &records)?;
        let loaded = load_snapshot(&path)?;

        assert_eq!(loaded.entries(), records.as_slice());
        Ok(())
    }

    #[test]
    fn test_header_is_stable() -> anyhow::Result<()> {
        let mut buffer = Vec::new();
        write_snapshot(&mut buffer, &[FileInfo::new("a")])?;
        let text = String::from_utf8(buffer)?;
        assert_eq!(
            text,
            "path,size,created,modified,hash,change,remark\na,,,,,,\n"
        );
        Ok(())
    }

    #[test]
    fn test_bom_and_bare_header_accepted() -> anyhow::Result<()> {
        let text = "\u{feff}path,size,created,modified,hash\nroot/a,3,,,abc\n";
        let snapshot = parse(text)?;
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.entries()[0].size, Some(3));
        assert_eq!(snapshot.entries()[0].change, None);
        Ok(())
    }

    #[test]
    fn test_missing_path_column_rejected() {
        let err = parse("size,created,modified,hash\n1,,,\n").unwrap_err();
        assert!(matches!(err, FpError::MalformedSnapshot { line: 1, .. }));
        assert!(err.to_string().contains("'path'"));
    }

    #[test]
    fn test_unknown_column_rejected() {
        let err = parse("path,size,created,modified,hash,owner\na,1,,,,root\n").unwrap_err();
        assert!(err.to_string().contains("unknown column 'owner'"));
    }

    #[test]
    fn test_empty_path_rejected() {
        let err = parse("path,size,created,modified,hash\n,1,,,\n").unwrap_err();
        assert!(matches!(err, FpError::MalformedSnapshot { line: 2, .. }));
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let err = parse("path,size,created,modified,hash\na,1,,,\nb,1,,,\na,2,,,\n").unwrap_err();
        assert!(matches!(err, FpError::MalformedSnapshot { line: 4, .. }));
    }

    #[test]
    fn test_bad_fields_rejected() {
        assert!(parse("path,size,created,modified,hash\na,-1,,,\n").is_err());
        assert!(parse("path,size,created,modified,hash\na,1,noon,,\n").is_err());
        assert!(parse("path,size,created,modified,hash,change,remark\na,1,,,,MOVED,\n").is_err());
        assert!(parse("path,size,created,modified,hash\na,1,,\n").is_err());
    }

    #[test]
    fn test_remark_requires_change_unless_error() -> anyhow::Result<()> {
        assert!(parse("path,size,created,modified,hash,change,remark\na,1,,,,,note\n").is_err());

        let snapshot = parse(
            "path,size,created,modified,hash,change,remark\na,,,,,,ERROR: Failed to stat a\n",
        )?;
        assert!(snapshot.entries()[0].is_error());
        Ok(())
    }

    #[test]
    fn test_empty_file_rejected() {
        assert!(parse("").is_err());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let err = load_snapshot(Path::new("/nonexistent/fp.csv")).unwrap_err();
        assert!(matches!(err, FpError::SnapshotRead { .. }));
    }

    #[test]
    fn test_save_into_missing_directory_fails_without_output() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("missing").join("fp.csv");
        let err = save_snapshot(&path, &[sample("a")]).unwrap_err();
        assert!(matches!(err, FpError::OutputWrite { .. }));
        assert!(!path.exists());
    }
}
