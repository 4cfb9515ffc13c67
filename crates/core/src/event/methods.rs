// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Notification accessors and log summaries.

use super::{Envelope, Notification};
use crate::clock::Tick;
use crate::geometry::ChunkPos;

impl Notification {
    /// Wire name of the event type.
    pub fn name(&self) -> &'static str {
        match self {
            Notification::Action(_) => "action",
            Notification::SnapshotState { .. } => "snapshot_state",
            Notification::EntityOperation { .. } => "entity_operation",
            Notification::FileIo { .. } => "file_io",
            Notification::ChunkCharted { .. } => "chunk_charted",
        }
    }

    pub fn tick(&self) -> Tick {
        match self {
            Notification::Action(ev) => ev.tick,
            Notification::SnapshotState { tick, .. }
            | Notification::EntityOperation { tick, .. }
            | Notification::FileIo { tick, .. }
            | Notification::ChunkCharted { tick, .. } => *tick,
        }
    }

    /// Chunk the event concerns, if any.
    pub fn chunk(&self) -> Option<ChunkPos> {
        match self {
            Notification::Action(_) => None,
            Notification::SnapshotState { chunk, .. }
            | Notification::EntityOperation { chunk, .. }
            | Notification::ChunkCharted { chunk, .. } => Some(*chunk),
            Notification::FileIo { chunk, .. } => *chunk,
        }
    }

    /// One-line summary for logs.
    pub fn log_summary(&self) -> String {
        let t = self.name();
        match self {
            Notification::Action(ev) => format!("{t} {}", ev.log_summary()),
            Notification::SnapshotState { state, chunk, .. } => format!("{t} chunk={chunk} state={state}"),
            Notification::EntityOperation { op, chunk, key, .. } => {
                format!("{t} chunk={chunk} op={op} key={key}")
            }
            Notification::FileIo { operation, file_type, chunk, .. } => match chunk {
                Some(c) => format!("{t} {operation} {file_type} chunk={c}"),
                None => format!("{t} {operation} {file_type}"),
            },
            Notification::ChunkCharted { chunk, charted_by, .. } => {
                format!("{t} chunk={chunk} by={charted_by}")
            }
        }
    }
}

impl Envelope {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
