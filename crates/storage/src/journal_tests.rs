// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use crate::{ActionJournal, StorageLayout};
use tempfile::tempdir;
use tw_core::test_support::action_event;
use tw_core::{ActionStatus, FileIoOp, FileType, JobKind};

#[test]
fn journal_appends_in_order() {
    let dir = tempdir().unwrap();
    let layout = StorageLayout::new(dir.path().join("state"));
    let mut journal = ActionJournal::open(layout.actions_path());

    let first = journal.append(&action_event("a1", JobKind::Walk, ActionStatus::Queued, 1)).unwrap();
    let second = journal.append(&action_event("a1", JobKind::Walk, ActionStatus::Started, 2)).unwrap();

    assert_eq!(first.operation, FileIoOp::Written);
    assert_eq!(second.operation, FileIoOp::Appended);
    assert_eq!(second.file_type, FileType::Actions);

    let statuses: Vec<_> = journal.read_all().unwrap().into_iter().map(|e| e.status).collect();
    assert_eq!(statuses, vec![ActionStatus::Queued, ActionStatus::Started]);
}

#[test]
fn reopened_journal_continues_appending() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("actions.jsonl");
    ActionJournal::open(&path)
        .append(&action_event("a1", JobKind::Mine, ActionStatus::Queued, 1))
        .unwrap();

    let mut journal = ActionJournal::open(&path);
    let receipt = journal.append(&action_event("a1", JobKind::Mine, ActionStatus::Completed, 9)).unwrap();

    assert_eq!(receipt.operation, FileIoOp::Appended);
    assert_eq!(journal.read_all().unwrap().len(), 2);
}

#[test]
fn unreadable_lines_are_skipped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("actions.jsonl");
    std::fs::write(&path, "garbage\n").unwrap();

    let mut journal = ActionJournal::open(&path);
    journal.append(&action_event("a1", JobKind::Craft, ActionStatus::Queued, 1)).unwrap();

    assert_eq!(journal.read_all().unwrap().len(), 1);
}
