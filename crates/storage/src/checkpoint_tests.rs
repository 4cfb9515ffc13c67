// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;
use tw_core::chunk::ChunkRecordBuilder;
use tw_core::{ChunkPhase, ChunkPos};

fn sample() -> Checkpoint {
    Checkpoint::new(
        Tick(120),
        42,
        vec![
            ChunkRecordBuilder::default().pos(ChunkPos::new(0, 0)).phase(ChunkPhase::Complete).build(),
            ChunkRecordBuilder::default().pos(ChunkPos::new(1, 0)).phase(ChunkPhase::Serialize).build(),
        ],
    )
}

#[test]
fn load_missing_returns_none() {
    let dir = tempdir().unwrap();
    assert!(Checkpoint::load(&dir.path().join("checkpoint.json")).unwrap().is_none());
}

#[test]
fn save_then_load_preserves_table_and_sequence() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("state/checkpoint.json");

    sample().save(&path).unwrap();
    let loaded = Checkpoint::load(&path).unwrap().unwrap();

    assert_eq!(loaded.version, CURRENT_CHECKPOINT_VERSION);
    assert_eq!(loaded.tick, Tick(120));
    assert_eq!(loaded.next_sequence, 42);
    assert_eq!(loaded.chunks, sample().chunks);
    assert!(!path.with_extension("tmp").exists());
}

#[test]
fn second_save_rotates_previous_to_bak() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("checkpoint.json");

    sample().save(&path).unwrap();
    let mut next = sample();
    next.next_sequence = 99;
    next.save(&path).unwrap();

    let bak = Checkpoint::load(&path.with_extension("bak")).unwrap().unwrap();
    assert_eq!(bak.next_sequence, 42);
    assert_eq!(Checkpoint::load(&path).unwrap().unwrap().next_sequence, 99);
}

#[test]
fn rotation_keeps_at_most_three_backups() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("checkpoint.json");

    for seq in 0..6 {
        let mut cp = sample();
        cp.next_sequence = seq;
        cp.save(&path).unwrap();
    }

    assert!(path.with_extension("bak").exists());
    assert!(path.with_extension("bak.2").exists());
    assert!(path.with_extension("bak.3").exists());
    assert!(!path.with_extension("bak.4").exists());
    assert_eq!(Checkpoint::load(&path.with_extension("bak")).unwrap().unwrap().next_sequence, 4);
    assert_eq!(Checkpoint::load(&path.with_extension("bak.3")).unwrap().unwrap().next_sequence, 2);
}

#[test]
fn newer_version_is_rejected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("checkpoint.json");
    let mut cp = sample();
    cp.version = CURRENT_CHECKPOINT_VERSION + 1;
    cp.save(&path).unwrap();

    let err = Checkpoint::load(&path).unwrap_err();
    assert!(matches!(err, CheckpointError::UnsupportedVersion(v) if v == CURRENT_CHECKPOINT_VERSION + 1));
}

#[test]
fn garbage_checkpoint_is_a_json_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("checkpoint.json");
    std::fs::write(&path, b"not json").unwrap();

    assert!(matches!(Checkpoint::load(&path), Err(CheckpointError::Json(_))));
}
