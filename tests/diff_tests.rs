mod common;

use anyhow::Result;
use chrono::{TimeZone, Utc};
use common::TestTree;
use fpfiles::diff::{DiffEngine, DiffSummary, classify, diff_snapshots};
use fpfiles::storage::{ChangeKind, FileInfo, Snapshot, Timestamp, format_timestamp};
use rstest::rstest;

const T0: i64 = 1_600_000_000;
const T1: i64 = 1_600_000_100;

fn ts(secs: i64) -> Timestamp {
    Utc.timestamp_opt(secs, 0).single().expect("valid timestamp")
}

fn info(path: &str, size: u64, created: i64, modified: i64, hash: &str) -> FileInfo {
    FileInfo {
        path: path.to_string(),
        size: Some(size),
        created: Some(ts(created)),
        modified: Some(ts(modified)),
        hash: hash.to_string(),
        change: None,
        remark: String::new(),
    }
}

fn snapshot(records: Vec<FileInfo>) -> Snapshot {
    Snapshot::from_entries(records)
}

#[test]
fn test_self_diff_is_empty() {
    let a = snapshot(vec![
        info("/r/a", 1, T0, T0, "h1"),
        info("/r/b", 2, T0, T1, "h2"),
    ]);
    assert!(DiffEngine::new().diff(&a, &a).is_empty());
}

#[test]
fn test_hash_change_is_silent() {
    let a = snapshot(vec![info("f", 10, T0, T0, "H0")]);
    let b = snapshot(vec![info("f", 10, T0, T0, "H1")]);

    let changes = diff_snapshots(&a, &b);

    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].change, Some(ChangeKind::ChangedSilent));
    assert!(changes[0].remark.contains("hash (data) changed"));
}

#[test]
fn test_modified_change_is_loud() {
    let a = snapshot(vec![info("f", 10, T0, T0, "H0")]);
    let b = snapshot(vec![info("f", 10, T0, T1, "H0")]);

    let changes = diff_snapshots(&a, &b);

    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].change, Some(ChangeKind::Changed));
    let expected = format!(
        "modified changed from {} to {}",
        format_timestamp(Some(&ts(T0))),
        format_timestamp(Some(&ts(T1)))
    );
    assert!(changes[0].remark.contains(&expected));
}

#[test]
fn test_add_and_delete_detection() {
    let a = snapshot(vec![info("a", 1, T0, T0, "h"), info("b", 1, T0, T0, "h")]);
    let b = snapshot(vec![info("b", 1, T0, T0, "h"), info("c", 1, T0, T0, "h")]);

    let changes = diff_snapshots(&a, &b);
    let classified: Vec<(&str, Option<ChangeKind>)> = changes
        .iter()
        .map(|c| (c.path.as_str(), c.change))
        .collect();

    assert_eq!(
        classified,
        vec![("c", Some(ChangeKind::Added)), ("a", Some(ChangeKind::Deleted))]
    );
}

#[rstest]
#[case::size_only_hashed(info("f", 1, T0, T0, "h"), info("f", 2, T0, T0, "h"), ChangeKind::ChangedSilent)]
#[case::size_only_unhashed(info("f", 1, T0, T0, ""), info("f", 2, T0, T0, ""), ChangeKind::Changed)]
#[case::hash_only(info("f", 1, T0, T0, "h0"), info("f", 1, T0, T0, "h1"), ChangeKind::ChangedSilent)]
#[case::size_and_hash(info("f", 1, T0, T0, "h0"), info("f", 2, T0, T0, "h1"), ChangeKind::ChangedSilent)]
#[case::created_only(info("f", 1, T0, T0, "h"), info("f", 1, T1, T0, "h"), ChangeKind::Changed)]
#[case::modified_only(info("f", 1, T0, T0, "h"), info("f", 1, T0, T1, "h"), ChangeKind::Changed)]
#[case::modified_and_hash(info("f", 1, T0, T0, "h0"), info("f", 1, T0, T1, "h1"), ChangeKind::Changed)]
#[case::modified_unhashed(info("f", 1, T0, T0, ""), info("f", 1, T0, T1, ""), ChangeKind::Changed)]
#[case::hash_lost_to_error(info("f", 1, T0, T0, "h"), info("f", 1, T0, T0, ""), ChangeKind::ChangedSilent)]
fn test_classification_table(
    #[case] old: FileInfo,
    #[case] new: FileInfo,
    #[case] expected: ChangeKind,
) {
    let (kind, remark) = classify(&old, &new).expect("records differ");
    assert_eq!(kind, expected);
    assert!(!remark.is_empty());
}

#[rstest]
#[case::size(info("f", 1, T0, T0, "h"), info("f", 2, T0, T0, "h"), "Size changed from 1 to 2")]
#[case::hash(info("f", 1, T0, T0, "h0"), info("f", 1, T0, T0, "h1"), "hash (data) changed")]
#[case::size_and_hash(
    info("f", 1, T0, T0, "h0"),
    info("f", 2, T0, T0, "h1"),
    "Size changed from 1 to 2, hash (data) changed"
)]
fn test_remark_text(#[case] old: FileInfo, #[case] new: FileInfo, #[case] expected: &str) {
    let (_, remark) = classify(&old, &new).expect("records differ");
    assert_eq!(remark, expected);
}

#[test]
fn test_order_contract() {
    let a = snapshot(vec![
        info("gone1", 1, T0, T0, "h"),
        info("same", 1, T0, T0, "h"),
        info("touched", 1, T0, T0, "h"),
        info("gone2", 1, T0, T0, "h"),
    ]);
    let b = snapshot(vec![
        info("new1", 1, T0, T0, "h"),
        info("touched", 1, T0, T1, "h"),
        info("same", 1, T0, T0, "h"),
        info("new2", 1, T0, T0, "h"),
    ]);

    let order: Vec<String> = diff_snapshots(&a, &b).into_iter().map(|c| c.path).collect();

    assert_eq!(order, vec!["new1", "touched", "new2", "gone1", "gone2"]);
}

#[test]
fn test_output_records_take_fields_from_the_right_side() {
    let a = snapshot(vec![info("kept", 1, T0, T0, "old"), info("gone", 7, T0, T0, "g")]);
    let b = snapshot(vec![info("kept", 2, T0, T0, "new")]);

    let changes = diff_snapshots(&a, &b);

    assert_eq!(changes[0].hash, "new");
    assert_eq!(changes[0].size, Some(2));
    assert_eq!(changes[1].path, "gone");
    assert_eq!(changes[1].size, Some(7));
    assert!(changes[1].remark.is_empty());
}

#[test]
fn test_summary_counts() {
    let a = snapshot(vec![info("a", 1, T0, T0, "h"), info("b", 1, T0, T0, "h")]);
    let b = snapshot(vec![info("b", 1, T0, T1, "h"), info("c", 1, T0, T0, "h")]);

    let summary = DiffSummary::from_changes(&diff_snapshots(&a, &b));

    assert_eq!(
        summary,
        DiffSummary {
            added: 1,
            deleted: 1,
            changed: 1,
            changed_silent: 0,
        }
    );
}

#[test]
fn test_silent_content_change_on_disk() -> Result<()> {
    let tree = TestTree::with_sample_files()?;
    let before = tree.fingerprint_sequential()?;

    tree.rewrite_silently("a.txt", "ALPHA")?;
    let after = tree.fingerprint_sequential()?;

    let changes = diff_snapshots(&before, &after);
    assert_eq!(changes.len(), 1);
    assert!(changes[0].path.ends_with("a.txt"));
    assert_eq!(changes[0].change, Some(ChangeKind::ChangedSilent));
    assert_eq!(changes[0].remark, "hash (data) changed");
    Ok(())
}

#[test]
fn test_tree_changes_on_disk() -> Result<()> {
    let tree = TestTree::with_sample_files()?;
    let before = tree.fingerprint_sequential()?;

    std::fs::remove_file(tree.file("b.txt"))?;
    tree.write_pinned("c.txt", "charlie")?;
    tree.write("docs/readme.md", "# readme, longer")?;
    tree.set_mtime("docs/readme.md", common::PINNED_MTIME + 60)?;
    let after = tree.fingerprint_sequential()?;

    let summary = DiffSummary::from_changes(&diff_snapshots(&before, &after));
    assert_eq!(summary.added, 1);
    assert_eq!(summary.deleted, 1);
    assert_eq!(summary.changed, 1);
    assert_eq!(summary.changed_silent, 0);
    Ok(())
}

#[test]
fn test_hashing_disabled_still_detects_size_and_time() -> Result<()> {
    use fpfiles::fingerprint::{FingerprintEngine, FingerprintOptions};

    let tree = TestTree::with_sample_files()?;
    let engine = FingerprintEngine::new(
        FingerprintOptions::new(tree.path())
            .with_hashing(false)
            .with_parallel(false),
    );
    let before = engine.fingerprint()?;

    tree.rewrite_silently("a.txt", "alpha!")?;
    tree.set_mtime("b.txt", common::PINNED_MTIME + 1)?;
    let after = engine.fingerprint()?;

    let changes = diff_snapshots(&before, &after);
    assert_eq!(changes.len(), 2);
    assert!(changes.iter().all(|c| c.change == Some(ChangeKind::Changed)));
    Ok(())
}
