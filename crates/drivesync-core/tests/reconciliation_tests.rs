//! Integration test: descriptors → classify → sort_by_precedence
//!
//! Exercises the public reconciliation API end to end, using real files in a
//! temporary directory where content hashing matters.

use std::path::Path;
use std::sync::Arc;

use chrono::{TimeZone, Utc};
use drivesync_core::domain::{
    checksum, classify, sort_by_precedence, Change, ChangePolicy, FileDescriptor, Operation,
    RemoteEntry, RemotePath,
};
use tempfile::TempDir;

const T: i64 = 1_420_070_400;

fn path(p: &str) -> RemotePath {
    RemotePath::new(p.to_string()).unwrap()
}

fn file(size: u64, checksum: &str) -> Arc<FileDescriptor> {
    Arc::new(
        FileDescriptor::new("f", false, size, Utc.timestamp_opt(T, 0).unwrap())
            .with_checksum(checksum),
    )
}

fn dir(size: u64) -> Arc<FileDescriptor> {
    Arc::new(FileDescriptor::new("d", true, size, Utc.timestamp_opt(T, 0).unwrap()))
}

fn local(dir: &Path, name: &str, content: &[u8]) -> Arc<FileDescriptor> {
    let p = dir.join(name);
    std::fs::write(&p, content).unwrap();
    Arc::new(FileDescriptor::from_local(&p, &std::fs::metadata(&p).unwrap()))
}

fn op(src: Option<Arc<FileDescriptor>>, dest: Option<Arc<FileDescriptor>>, policy: ChangePolicy) -> Operation {
    classify(path("/x"), src, dest, policy).unwrap().op()
}

const DEFAULT: ChangePolicy = ChangePolicy {
    force: false,
    no_clobber: false,
};
const NO_CLOBBER: ChangePolicy = ChangePolicy {
    force: false,
    no_clobber: true,
};

// ============================================================================
// Concrete scenarios
// ============================================================================

#[test]
fn test_new_source_file_is_added() {
    assert_eq!(op(Some(file(100, "abc")), None, DEFAULT), Operation::Add);
}

#[test]
fn test_destination_only_file_is_deleted() {
    assert_eq!(op(None, Some(file(50, "")), DEFAULT), Operation::Delete);
}

#[test]
fn test_identical_files_need_nothing() {
    assert_eq!(op(Some(file(10, "x")), Some(file(10, "x")), DEFAULT), Operation::None);
}

#[test]
fn test_checksum_mismatch_is_modified() {
    assert_eq!(op(Some(file(10, "x")), Some(file(10, "y")), DEFAULT), Operation::Modify);
}

#[test]
fn test_no_clobber_suppresses_overwrite() {
    assert_eq!(
        op(Some(file(10, "x")), Some(file(10, "y")), NO_CLOBBER),
        Operation::None
    );
}

#[test]
fn test_directory_replacing_file_is_modified() {
    assert_eq!(op(Some(dir(10)), Some(file(10, "x")), DEFAULT), Operation::Modify);
    assert_eq!(op(Some(file(10, "x")), Some(dir(10)), DEFAULT), Operation::Modify);
}

// ============================================================================
// Policy properties
// ============================================================================

#[test]
fn test_force_always_adds() {
    let force = ChangePolicy::new(true, false);
    let force_no_clobber = ChangePolicy::new(true, true);
    let pairs = [
        (Some(file(1, "a")), None),
        (None, Some(file(1, "a"))),
        (Some(file(1, "a")), Some(file(1, "a"))),
        (Some(file(1, "a")), Some(file(2, "b"))),
        (Some(dir(0)), Some(dir(0))),
    ];

    for (src, dest) in pairs {
        assert_eq!(op(src.clone(), dest.clone(), force), Operation::Add);
        assert_eq!(op(src, dest, force_no_clobber), Operation::Add);
    }
}

#[test]
fn test_no_clobber_keeps_additions_and_drops_deletions() {
    assert_eq!(op(Some(file(1, "a")), None, NO_CLOBBER), Operation::Add);
    assert_eq!(op(None, Some(file(1, "a")), NO_CLOBBER), Operation::None);
    assert_eq!(op(Some(dir(0)), Some(file(0, "a")), NO_CLOBBER), Operation::None);
}

#[test]
fn test_descriptor_compared_with_itself_is_none() {
    let shared = file(42, "abc");
    assert_eq!(op(Some(shared.clone()), Some(shared), DEFAULT), Operation::None);
}

// ============================================================================
// Content hashing
// ============================================================================

#[test]
fn test_local_files_with_same_content_are_none() {
    let tmp = TempDir::new().unwrap();
    let a = local(tmp.path(), "a.txt", b"same bytes");
    let b = local(tmp.path(), "b.txt", b"same bytes");
    // Same size and second-rounded mtime only when written back to back; pin them.
    let b = Arc::new(
        FileDescriptor::new("b.txt", false, b.size(), a.mod_time())
            .with_content(b.content().clone()),
    );

    assert_eq!(op(Some(a.clone()), Some(b.clone()), DEFAULT), Operation::None);
    assert_eq!(a.known_checksum(), b.known_checksum());
    assert!(a.known_checksum().is_some());
}

#[test]
fn test_local_file_against_remote_checksum() {
    let tmp = TempDir::new().unwrap();
    let local = local(tmp.path(), "hello.txt", b"hello");

    let entry = RemoteEntry {
        id: "r1".to_string(),
        title: "hello.txt".to_string(),
        mime_type: "text/plain".to_string(),
        file_size: Some(5),
        modified_date: local.mod_time().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
        md5_checksum: Some("5D41402ABC4B2A76B9719D911017C592".to_string()),
        ..Default::default()
    };
    let remote = Arc::new(FileDescriptor::from_remote(&entry));

    assert_eq!(op(Some(local.clone()), Some(remote.clone()), DEFAULT), Operation::None);

    // A remote entry with no published checksum cannot be proven equal
    let mut entry = entry;
    entry.md5_checksum = None;
    let remote = Arc::new(FileDescriptor::from_remote(&entry));
    assert_eq!(op(Some(local), Some(remote), DEFAULT), Operation::Modify);
}

#[test]
fn test_unreadable_source_is_treated_as_different() {
    let tmp = TempDir::new().unwrap();
    let dest = local(tmp.path(), "kept.txt", b"abc");
    let src = local(tmp.path(), "vanishing.txt", b"abc");
    let src = Arc::new(
        FileDescriptor::new("vanishing.txt", false, src.size(), dest.mod_time())
            .with_content(src.content().clone()),
    );
    std::fs::remove_file(tmp.path().join("vanishing.txt")).unwrap();

    assert_eq!(op(Some(src), Some(dest), DEFAULT), Operation::Modify);
}

#[test]
fn test_classification_is_idempotent() {
    let tmp = TempDir::new().unwrap();
    let a = local(tmp.path(), "a.txt", b"first");
    let b = local(tmp.path(), "b.txt", b"other");
    let b = Arc::new(
        FileDescriptor::new("b.txt", false, b.size(), a.mod_time())
            .with_content(b.content().clone()),
    );

    let first = op(Some(a.clone()), Some(b.clone()), DEFAULT);
    let cached_a = a.known_checksum();
    let cached_b = b.known_checksum();
    let second = op(Some(a.clone()), Some(b.clone()), DEFAULT);

    assert_eq!(first, Operation::Modify);
    assert_eq!(first, second);
    assert_eq!(a.known_checksum(), cached_a);
    assert_eq!(b.known_checksum(), cached_b);
    assert_eq!(checksum(&a), cached_a.unwrap());
}

// ============================================================================
// Ordering
// ============================================================================

#[test]
fn test_plan_is_ordered_deletions_first() {
    let mut plan: Vec<Change> = vec![
        classify(path("/report.pdf"), Some(file(2, "new")), Some(file(1, "old")), DEFAULT).unwrap(),
        classify(path("/photos"), Some(dir(0)), None, DEFAULT).unwrap(),
        classify(path("/stale.txt"), None, Some(file(3, "s")), DEFAULT).unwrap(),
        classify(path("/same.txt"), Some(file(3, "s")), Some(file(3, "s")), DEFAULT).unwrap(),
    ];

    sort_by_precedence(&mut plan);

    let ordered: Vec<(&str, Operation)> = plan.iter().map(|c| (c.path().as_str(), c.op())).collect();
    assert_eq!(
        ordered,
        vec![
            ("/same.txt", Operation::None),
            ("/stale.txt", Operation::Delete),
            ("/photos", Operation::Add),
            ("/report.pdf", Operation::Modify),
        ]
    );
}
