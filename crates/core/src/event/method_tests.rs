// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for notification wire format and `Notification` methods.

use super::*;
use crate::id::{ActionId, AgentId};
use crate::job::{ActionStatus, JobKind};
use serde_json::json;

fn action() -> Notification {
    Notification::Action(ActionEvent {
        action_id: ActionId::new("walk:a1:3"),
        agent_id: AgentId::new("a1"),
        kind: JobKind::Walk,
        status: ActionStatus::Started,
        tick: Tick(4),
        outcome: None,
        payload: serde_json::Value::Null,
    })
}

#[test]
fn envelope_serializes_flat() {
    let env = Envelope {
        sequence: 7,
        notification: Notification::SnapshotState {
            state: SnapshotState::Complete,
            chunk: ChunkPos::new(1, -2),
            tick: Tick(99),
        },
    };
    assert_eq!(
        serde_json::to_value(&env).unwrap(),
        json!({
            "sequence": 7,
            "event_type": "snapshot_state",
            "state": "complete",
            "chunk": { "x": 1, "y": -2 },
            "tick": 99,
        })
    );
}

#[test]
fn action_envelope_round_trips() {
    let env = Envelope { sequence: 1, notification: action() };
    let text = env.to_json().unwrap();
    assert!(text.contains("\"event_type\":\"action\""));
    let back: Envelope = serde_json::from_str(&text).unwrap();
    assert_eq!(back, env);
}

#[test]
fn file_io_without_chunk_omits_field() {
    let n = Notification::FileIo {
        operation: FileIoOp::Appended,
        file_type: FileType::Actions,
        chunk: None,
        tick: Tick(5),
    };
    let value = serde_json::to_value(&n).unwrap();
    assert!(value.get("chunk").is_none());
    assert_eq!(value["operation"], json!("appended"));
    assert_eq!(n.log_summary(), "file_io appended actions");
}

#[yare::parameterized(
    action_name   = { action(), "action", None },
    charted_name  = {
        Notification::ChunkCharted { chunk: ChunkPos::new(0, 0), tick: Tick(1), charted_by: "a1".into() },
        "chunk_charted",
        Some(ChunkPos::new(0, 0))
    },
    entity_op     = {
        Notification::EntityOperation {
            op: LogOp::Remove,
            chunk: ChunkPos::new(3, 3),
            key: "k".into(),
            tick: Tick(1),
            position: Position::new(100.0, 100.0),
        },
        "entity_operation",
        Some(ChunkPos::new(3, 3))
    },
)]
fn name_and_chunk(n: Notification, name: &str, chunk: Option<ChunkPos>) {
    assert_eq!(n.name(), name);
    assert_eq!(n.chunk(), chunk);
}
