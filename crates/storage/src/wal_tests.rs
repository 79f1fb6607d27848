// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use chrono::{TimeZone, Utc};
use esched_core::{ScheduleId, ScheduleStatus};

fn transition(id: u64) -> Operation {
    Operation::ScheduleTransition {
        id: ScheduleId(id),
        status: ScheduleStatus::Activated,
        external_ref: Some(format!("ext-{}", id)),
        at: Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap(),
    }
}

fn write_two(path: &Path) {
    let (mut wal, _) = Wal::open(path).unwrap();
    wal.append(&transition(1)).unwrap();
    wal.append(&transition(2)).unwrap();
}

#[test]
fn reopen_returns_committed_operations() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");

    {
        let (mut wal, ops) = Wal::open(&path).unwrap();
        assert!(ops.is_empty());
        wal.append(&transition(1)).unwrap();
        wal.append(&Operation::ScheduleDelete { id: ScheduleId(1) })
            .unwrap();
    }

    let (_, ops) = Wal::open(&path).unwrap();
    assert_eq!(ops.len(), 2);
    assert_eq!(ops[0], transition(1));
    assert!(matches!(ops[1], Operation::ScheduleDelete { .. }));
}

#[test]
fn sequence_continues_after_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");

    {
        let (mut wal, _) = Wal::open(&path).unwrap();
        assert_eq!(wal.sequence(), 0);
        assert_eq!(wal.append(&transition(1)).unwrap(), 1);
    }

    let (mut wal, _) = Wal::open(&path).unwrap();
    assert_eq!(wal.sequence(), 1);
    assert_eq!(wal.append(&transition(2)).unwrap(), 2);
}

#[test]
fn creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("wal").join("schedules.wal");

    let (mut wal, _) = Wal::open(&path).unwrap();
    wal.append(&transition(2)).unwrap();

    assert!(path.exists());
}

#[test]
fn partial_last_entry_is_dropped_and_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");
    write_two(&path);
    let committed = std::fs::metadata(&path).unwrap().len();
    let mut file = OpenOptions::new().append(true).open(&path).unwrap();
    file.write_all(br#"{"seq":3,"op":{"ScheduleDel"#).unwrap();
    drop(file);

    let (mut wal, ops) = Wal::open(&path).unwrap();
    assert_eq!(ops.len(), 2);
    assert_eq!(wal.sequence(), 2);
    assert_eq!(std::fs::metadata(&path).unwrap().len(), committed);

    wal.append(&transition(3)).unwrap();
    drop(wal);
    let (_, ops) = Wal::open(&path).unwrap();
    assert_eq!(ops, vec![transition(1), transition(2), transition(3)]);
}

#[test]
fn complete_entry_missing_newline_is_kept() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");
    write_two(&path);
    let contents = std::fs::read(&path).unwrap();
    std::fs::write(&path, &contents[..contents.len() - 1]).unwrap();

    let (mut wal, ops) = Wal::open(&path).unwrap();
    assert_eq!(ops.len(), 2);
    wal.append(&transition(3)).unwrap();
    drop(wal);

    let (_, ops) = Wal::open(&path).unwrap();
    assert_eq!(ops.len(), 3);
}

#[test]
fn damaged_middle_entry_reports_its_line() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");
    write_two(&path);
    let contents = std::fs::read_to_string(&path).unwrap();
    let damaged = contents.replacen(r#""seq":1"#, r#""seq":"#, 1);
    std::fs::write(&path, damaged).unwrap();

    match Wal::open(&path) {
        Err(WalError::Corrupt { line, .. }) => assert_eq!(line, 1),
        Err(other) => panic!("expected Corrupt, got {other:?}"),
        Ok(_) => panic!("expected Corrupt, got a log"),
    }
}

#[test]
fn sequence_gap_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");
    write_two(&path);
    let contents = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, contents.replacen(r#""seq":2"#, r#""seq":5"#, 1)).unwrap();

    match Wal::open(&path) {
        Err(WalError::OutOfOrder {
            line,
            expected,
            found,
        }) => assert_eq!((line, expected, found), (2, 2, 5)),
        Err(other) => panic!("expected OutOfOrder, got {other:?}"),
        Ok(_) => panic!("expected OutOfOrder, got a log"),
    }
}

#[test]
fn blank_lines_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("test.wal");
    write_two(&path);
    let contents = std::fs::read_to_string(&path).unwrap();
    std::fs::write(&path, contents.replacen('\n', "\n\n", 1)).unwrap();

    let (wal, ops) = Wal::open(&path).unwrap();
    assert_eq!(ops.len(), 2);
    assert_eq!(wal.sequence(), 2);
}
