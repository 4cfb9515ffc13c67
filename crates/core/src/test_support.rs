// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]`.

use crate::{
    ActionEvent, ActionId, ActionStatus, AgentId, ChunkPos, Direction, EntityRecord, JobKind,
    LogOp, OpLogEntry, Position, Tick,
};

// ── Proptest strategies ─────────────────────────────────────────────────

/// Proptest strategies for core types.
pub mod strategies {
    use crate::chunk::ChunkPhase;
    use crate::geometry::ChunkPos;
    use crate::job::JobKind;
    use crate::oplog::LogOp;
    use proptest::prelude::*;

    pub fn arb_job_kind() -> impl Strategy<Value = JobKind> {
        prop_oneof![
            Just(JobKind::Walk),
            Just(JobKind::Mine),
            Just(JobKind::Craft),
            Just(JobKind::Place),
        ]
    }

    pub fn arb_chunk_phase() -> impl Strategy<Value = ChunkPhase> {
        prop_oneof![
            Just(ChunkPhase::Idle),
            Just(ChunkPhase::FindEntities),
            Just(ChunkPhase::Serialize),
            Just(ChunkPhase::Write),
            Just(ChunkPhase::Complete),
        ]
    }

    pub fn arb_log_op() -> impl Strategy<Value = LogOp> {
        prop_oneof![
            Just(LogOp::Upsert),
            Just(LogOp::Remove),
            Just(LogOp::Rotate),
            Just(LogOp::ConfigurationChanged),
        ]
    }

    pub fn arb_chunk_pos() -> impl Strategy<Value = ChunkPos> {
        (-64i32..64, -64i32..64).prop_map(|(x, y)| ChunkPos::new(x, y))
    }
}

// ── Factory functions ───────────────────────────────────────────────────

pub fn entity_record(key: &str, name: &str, x: f64, y: f64) -> EntityRecord {
    EntityRecord {
        key: key.to_string(),
        name: name.to_string(),
        position: Position::new(x, y),
        direction: Direction::North,
        config: serde_json::Value::Null,
    }
}

pub fn upsert_entry(key: &str, tick: u64) -> OpLogEntry {
    OpLogEntry {
        op: LogOp::Upsert,
        tick: Tick(tick),
        key: key.to_string(),
        payload: serde_json::to_value(entity_record(key, "wooden-chest", 0.5, 0.5))
            .unwrap_or_default(),
    }
}

pub fn remove_entry(key: &str, tick: u64) -> OpLogEntry {
    OpLogEntry { op: LogOp::Remove, tick: Tick(tick), key: key.to_string(), payload: serde_json::Value::Null }
}

pub fn action_event(agent: &str, kind: JobKind, status: ActionStatus, tick: u64) -> ActionEvent {
    let agent_id = AgentId::new(agent);
    ActionEvent {
        action_id: ActionId::generate(&agent_id, kind, Tick(tick)),
        agent_id,
        kind,
        status,
        tick: Tick(tick),
        outcome: None,
        payload: serde_json::Value::Null,
    }
}

pub fn chunk(x: i32, y: i32) -> ChunkPos {
    ChunkPos::new(x, y)
}
