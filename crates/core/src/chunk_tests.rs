// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn phases_cycle_in_order() {
    let mut phase = ChunkPhase::Idle;
    let mut seen = vec![phase];
    for _ in 0..4 {
        phase = phase.next();
        seen.push(phase);
    }
    assert_eq!(
        seen,
        vec![
            ChunkPhase::Idle,
            ChunkPhase::FindEntities,
            ChunkPhase::Serialize,
            ChunkPhase::Write,
            ChunkPhase::Complete,
        ]
    );
    assert_eq!(phase.next(), ChunkPhase::Idle);
}

#[test]
fn revealed_chunk_is_pending() {
    let record = ChunkRecord::revealed(ChunkPos::new(2, 3));
    assert!(record.is_pending());
    assert!(!record.ever_written);
}

#[yare::parameterized(
    idle_clean       = { ChunkPhase::Idle, false, false, false },
    idle_dirty       = { ChunkPhase::Idle, true, false, true },
    serialize_clean  = { ChunkPhase::Serialize, false, false, true },
    complete_clean   = { ChunkPhase::Complete, false, false, false },
    complete_dirty   = { ChunkPhase::Complete, true, false, true },
    failed_in_flight = { ChunkPhase::Write, true, true, false },
)]
fn pending_rules(phase: ChunkPhase, dirty: bool, failed: bool, expected: bool) {
    let record = ChunkRecord::builder().phase(phase).needs_resync(dirty).failed(failed).build();
    assert_eq!(record.is_pending(), expected);
}

#[test]
fn snapshot_state_names() {
    assert_eq!(SnapshotState::from(ChunkPhase::FindEntities).to_string(), "find_entities");
    assert_eq!(serde_json::to_string(&SnapshotState::Failed).unwrap(), "\"failed\"");
}
