use super::*;
use crate::state::SyncStateUpdate;
use std::io::Write as _;
use tempfile::tempdir;
use vs_core::{CanonicalId, ProjectCode};

fn test_op(status: &str) -> SyncOp {
    SyncOp::UpsertRow {
        canonical_id: CanonicalId::parse("ACME-1").unwrap(),
        project: ProjectCode::new("ACME").unwrap(),
        title: "Fix bug".to_string(),
        update: SyncStateUpdate { status: Some(status.to_string()), ..Default::default() },
    }
}

#[test]
fn open_creates_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.wal");

    let wal = Wal::open(&path, 0).unwrap();

    assert!(path.exists());
    assert_eq!(wal.write_seq(), 0);
    assert_eq!(wal.processed_seq(), 0);
}

#[test]
fn append_and_flush() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.wal");

    let mut wal = Wal::open(&path, 0).unwrap();

    let seq1 = wal.append(&test_op("Todo")).unwrap();
    let seq2 = wal.append(&test_op("In Progress")).unwrap();

    assert_eq!(seq1, 1);
    assert_eq!(seq2, 2);

    wal.flush().unwrap();

    let metadata = std::fs::metadata(&path).unwrap();
    assert!(metadata.len() > 0);
}

#[test]
fn next_unprocessed_advances_in_order() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.wal");

    let mut wal = Wal::open(&path, 0).unwrap();
    wal.append(&test_op("Todo")).unwrap();
    wal.append(&test_op("In Progress")).unwrap();
    wal.flush().unwrap();

    let entry1 = wal.next_unprocessed().unwrap().unwrap();
    assert_eq!(entry1.seq, 1);
    wal.mark_processed(entry1.seq);

    let entry2 = wal.next_unprocessed().unwrap().unwrap();
    assert_eq!(entry2.seq, 2);
    wal.mark_processed(entry2.seq);

    assert!(wal.next_unprocessed().unwrap().is_none());
}

#[test]
fn mark_processed_updates_cursor() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.wal");

    let mut wal = Wal::open(&path, 0).unwrap();
    wal.append(&test_op("Todo")).unwrap();
    wal.flush().unwrap();

    let entry = wal.next_unprocessed().unwrap().unwrap();
    wal.mark_processed(entry.seq);

    assert_eq!(wal.processed_seq(), 1);
}

#[test]
fn reopen_with_processed_seq_skips_consumed_entries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.wal");

    {
        let mut wal = Wal::open(&path, 0).unwrap();
        wal.append(&test_op("Todo")).unwrap();
        wal.append(&test_op("In Progress")).unwrap();
        wal.append(&test_op("Done")).unwrap();
        wal.flush().unwrap();
    }

    let mut wal = Wal::open(&path, 2).unwrap();
    let entry = wal.next_unprocessed().unwrap().unwrap();
    assert_eq!(entry.seq, 3);
    assert!(wal.next_unprocessed().unwrap().is_none());
}

#[test]
fn entries_after_returns_suffix() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.wal");

    let mut wal = Wal::open(&path, 0).unwrap();
    wal.append(&test_op("Todo")).unwrap();
    wal.append(&test_op("In Progress")).unwrap();
    wal.append(&test_op("Done")).unwrap();
    wal.flush().unwrap();

    let entries = wal.entries_after(1).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].seq, 2);
    assert_eq!(entries[1].seq, 3);
}

#[test]
fn truncate_before_drops_earlier_entries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.wal");

    let mut wal = Wal::open(&path, 0).unwrap();
    wal.append(&test_op("Todo")).unwrap();
    wal.append(&test_op("In Progress")).unwrap();
    wal.append(&test_op("Done")).unwrap();
    wal.flush().unwrap();

    wal.truncate_before(2).unwrap();

    let entries = wal.entries_after(0).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].seq, 2);
    assert_eq!(entries[1].seq, 3);
}

#[test]
fn needs_flush_triggers_at_item_threshold() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.wal");

    let mut wal = Wal::open(&path, 0).unwrap();
    assert!(!wal.needs_flush());

    for _ in 0..99 {
        wal.append(&test_op("Todo")).unwrap();
    }
    assert!(!wal.needs_flush());

    wal.append(&test_op("Todo")).unwrap();
    assert!(wal.needs_flush());
}

#[test]
fn open_corrupt_wal_rotates_bak_and_preserves_valid_entries() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("test.wal");

    {
        let mut wal = Wal::open(&path, 0).unwrap();
        wal.append(&test_op("Todo")).unwrap();
        wal.append(&test_op("In Progress")).unwrap();
        wal.flush().unwrap();
    }
    {
        let mut f = std::fs::OpenOptions::new().append(true).open(&path).unwrap();
        f.write_all(b"not-valid-json\n").unwrap();
    }

    let wal = Wal::open(&path, 0).unwrap();

    assert_eq!(wal.write_seq(), 2);
    let bak = path.with_extension("bak");
    assert!(bak.exists());

    let entries = wal.entries_after(0).unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].seq, 1);
    assert_eq!(entries[1].seq, 2);
}
