// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound notification taxonomy.
//!
//! Every notification is wrapped in an [`Envelope`] carrying the process-wide
//! sequence number, and serializes flat:
//! `{"sequence": 7, "event_type": "snapshot_state", "state": "complete", ...}`.

mod methods;

use crate::action::ActionEvent;
use crate::chunk::SnapshotState;
use crate::clock::Tick;
use crate::geometry::{ChunkPos, Position};
use crate::oplog::LogOp;
use serde::{Deserialize, Serialize};

/// Durability signal kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileIoOp {
    /// A file was created or wholly replaced
    Written,
    /// Lines were appended to an existing file
    Appended,
}

crate::simple_display! {
    FileIoOp {
        Written => "written",
        Appended => "appended",
    }
}

/// Persisted file category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    /// Per-chunk append-only entity operation log
    Entities,
    /// Per-chunk bulk resource grid (rewritten wholesale)
    Resources,
    /// Process-wide action lifecycle journal
    Actions,
    /// Chunk table and sequence counter
    Checkpoint,
}

crate::simple_display! {
    FileType {
        Entities => "entities",
        Resources => "resources",
        Actions => "actions",
        Checkpoint => "checkpoint",
    }
}

/// Events pushed to external observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum Notification {
    /// Job lifecycle transition
    Action(ActionEvent),

    /// Snapshot orchestrator phase transition
    SnapshotState { state: SnapshotState, chunk: ChunkPos, tick: Tick },

    /// One appended world-state delta
    EntityOperation { op: LogOp, chunk: ChunkPos, key: String, tick: Tick, position: Position },

    /// A persisted file changed
    FileIo {
        operation: FileIoOp,
        file_type: FileType,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        chunk: Option<ChunkPos>,
        tick: Tick,
    },

    /// A partition became relevant for the first time
    ChunkCharted { chunk: ChunkPos, tick: Tick, charted_by: String },
}

/// A sequenced notification as it goes over the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub sequence: u64,
    #[serde(flatten)]
    pub notification: Notification,
}

#[cfg(test)]
#[path = "method_tests.rs"]
mod tests;
