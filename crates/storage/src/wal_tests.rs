// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn drop_op(collection: &str) -> Operation {
    Operation::Drop {
        collection: collection.to_string(),
    }
}

#[test]
fn wal_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");

    {
        let mut wal = Wal::open(&path, 0).unwrap();
        wal.append(&drop_op("a")).unwrap();
        wal.append(&drop_op("b")).unwrap();
    }

    let read = Wal::read(&path).unwrap();
    assert_eq!(read.entries.len(), 2);
    assert_eq!(read.entries[0].operation, drop_op("a"));
    assert_eq!(read.entries[1].sequence, 2);
    assert!(read.corrupted_at.is_none());
    assert_eq!(read.valid_len, std::fs::metadata(&path).unwrap().len());
}

#[test]
fn wal_sequence_continues() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");

    {
        let mut wal = Wal::open(&path, 0).unwrap();
        assert_eq!(wal.sequence(), 0);
        wal.append(&drop_op("x")).unwrap();
        assert_eq!(wal.sequence(), 1);
    }

    let read = Wal::read(&path).unwrap();
    let mut wal = Wal::open(&path, read.last_sequence()).unwrap();
    assert_eq!(wal.append(&drop_op("y")).unwrap(), 2);
}

#[test]
fn wal_read_nonexistent() {
    let read = Wal::read(Path::new("/nonexistent/path/wal")).unwrap();
    assert!(read.entries.is_empty());
    assert_eq!(read.last_sequence(), 0);
}

#[test]
fn torn_tail_stops_the_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");
    {
        let mut wal = Wal::open(&path, 0).unwrap();
        wal.append(&drop_op("a")).unwrap();
    }
    let valid = std::fs::metadata(&path).unwrap().len();
    {
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(br#"{"sequence":2,"timest"#).unwrap();
    }

    let read = Wal::read(&path).unwrap();
    assert_eq!(read.entries.len(), 1);
    assert_eq!(read.corrupted_at, Some(2));
    assert_eq!(read.valid_len, valid);

    let removed = Wal::truncate(&path, read.valid_len).unwrap();
    assert!(removed > 0);
    assert!(Wal::read(&path).unwrap().corrupted_at.is_none());
}

#[test]
fn checksum_mismatch_stops_the_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");
    {
        let mut wal = Wal::open(&path, 0).unwrap();
        wal.append(&drop_op("a")).unwrap();
        wal.append(&drop_op("b")).unwrap();
    }
    let content = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, content.replace(r#""collection":"b""#, r#""collection":"c""#)).unwrap();

    let read = Wal::read(&path).unwrap();
    assert_eq!(read.entries.len(), 1);
    assert_eq!(read.corrupted_at, Some(2));
}

#[test]
fn rewrite_replaces_the_log_and_continues_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");
    let mut wal = Wal::open(&path, 0).unwrap();
    for name in ["a", "b", "c", "d"] {
        wal.append(&drop_op(name)).unwrap();
    }

    let reclaimed = wal.rewrite(vec![drop_op("z")]).unwrap();
    assert!(reclaimed > 0);
    wal.append(&drop_op("after")).unwrap();

    let read = Wal::read(&path).unwrap();
    let sequences: Vec<u64> = read.entries.iter().map(|e| e.sequence).collect();
    assert_eq!(sequences, vec![5, 6]);
    assert_eq!(read.entries[0].operation, drop_op("z"));
}

#[test]
fn fragment_hides_every_line_after_it() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");
    {
        let mut wal = Wal::open(&path, 0).unwrap();
        wal.append(&drop_op("a")).unwrap();
    }
    {
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(br#"{"sequence":2,"timest"#).unwrap();
    }
    {
        let mut wal = Wal::open(&path, 1).unwrap();
        wal.append(&drop_op("b")).unwrap();
        wal.append(&drop_op("c")).unwrap();
    }

    // The fragment swallows the next line, so nothing after it is readable
    let read = Wal::read(&path).unwrap();
    assert_eq!(read.entries.len(), 1);
    assert_eq!(read.corrupted_at, Some(2));
}

#[test]
fn failed_write_is_rolled_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");
    let mut wal = Wal::open(&path, 0).unwrap();
    wal.append(&drop_op("a")).unwrap();
    let len = std::fs::metadata(&path).unwrap().len();

    wal.fail_next(FailPoint::Write);
    assert!(matches!(wal.append(&drop_op("lost")), Err(WalError::Io(_))));
    assert_eq!(wal.sequence(), 1);
    assert_eq!(std::fs::metadata(&path).unwrap().len(), len);

    assert_eq!(wal.append(&drop_op("b")).unwrap(), 2);
    assert_eq!(wal.append(&drop_op("c")).unwrap(), 3);
    drop(wal);

    let read = Wal::read(&path).unwrap();
    assert!(read.corrupted_at.is_none());
    let ops: Vec<Operation> = read.entries.into_iter().map(|e| e.operation).collect();
    assert_eq!(ops, vec![drop_op("a"), drop_op("b"), drop_op("c")]);
}

#[test]
fn failed_sync_does_not_leave_an_uncounted_entry() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");
    let mut wal = Wal::open(&path, 0).unwrap();
    wal.append(&drop_op("a")).unwrap();

    wal.fail_next(FailPoint::Sync);
    assert!(wal.append(&drop_op("lost")).is_err());
    assert_eq!(wal.append(&drop_op("b")).unwrap(), 2);
    drop(wal);

    let read = Wal::read(&path).unwrap();
    assert!(read.corrupted_at.is_none());
    let sequences: Vec<u64> = read.entries.iter().map(|e| e.sequence).collect();
    assert_eq!(sequences, vec![1, 2]);
    assert_eq!(read.entries[1].operation, drop_op("b"));
}
