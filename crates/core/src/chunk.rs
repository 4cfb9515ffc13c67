// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chunk records and snapshot phases.

use crate::clock::Tick;
use crate::geometry::ChunkPos;
use serde::{Deserialize, Serialize};

/// Synchronization phase of one chunk.
///
/// Phases advance strictly in declaration order; `Complete` returns to
/// `Idle` only when the chunk has been marked dirty again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkPhase {
    #[default]
    Idle,
    FindEntities,
    Serialize,
    Write,
    Complete,
}

crate::simple_display! {
    ChunkPhase {
        Idle => "idle",
        FindEntities => "find_entities",
        Serialize => "serialize",
        Write => "write",
        Complete => "complete",
    }
}

impl ChunkPhase {
    /// The only phase reachable from `self`.
    pub fn next(self) -> ChunkPhase {
        match self {
            ChunkPhase::Idle => ChunkPhase::FindEntities,
            ChunkPhase::FindEntities => ChunkPhase::Serialize,
            ChunkPhase::Serialize => ChunkPhase::Write,
            ChunkPhase::Write => ChunkPhase::Complete,
            ChunkPhase::Complete => ChunkPhase::Idle,
        }
    }

    /// Phases that hold per-chunk work in progress.
    pub fn is_in_flight(self) -> bool {
        matches!(self, ChunkPhase::FindEntities | ChunkPhase::Serialize | ChunkPhase::Write)
    }
}

/// State reported by `snapshot_state` notifications: every phase, plus
/// `Failed` for chunks that exhausted their retries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SnapshotState {
    Idle,
    FindEntities,
    Serialize,
    Write,
    Complete,
    Failed,
}

impl From<ChunkPhase> for SnapshotState {
    fn from(phase: ChunkPhase) -> Self {
        match phase {
            ChunkPhase::Idle => SnapshotState::Idle,
            ChunkPhase::FindEntities => SnapshotState::FindEntities,
            ChunkPhase::Serialize => SnapshotState::Serialize,
            ChunkPhase::Write => SnapshotState::Write,
            ChunkPhase::Complete => SnapshotState::Complete,
        }
    }
}

crate::simple_display! {
    SnapshotState {
        Idle => "idle",
        FindEntities => "find_entities",
        Serialize => "serialize",
        Write => "write",
        Complete => "complete",
        Failed => "failed",
    }
}

/// Registry entry for one spatial partition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkRecord {
    pub pos: ChunkPos,
    pub phase: ChunkPhase,
    /// Set once the chunk has completed at least one full pass
    #[serde(default)]
    pub ever_written: bool,
    /// A change arrived after the current pass began (or before the first)
    #[serde(default)]
    pub needs_resync: bool,
    /// Consecutive failed phase steps
    #[serde(default)]
    pub failures: u32,
    /// Retries exhausted; excluded until explicitly marked dirty
    #[serde(default)]
    pub failed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_completed: Option<Tick>,
}

impl ChunkRecord {
    /// A freshly revealed chunk, pending its first pass.
    pub fn revealed(pos: ChunkPos) -> Self {
        Self {
            pos,
            phase: ChunkPhase::Idle,
            ever_written: false,
            needs_resync: true,
            failures: 0,
            failed: false,
            last_completed: None,
        }
    }

    /// Whether the orchestrator has work to do for this chunk.
    pub fn is_pending(&self) -> bool {
        if self.failed {
            return false;
        }
        match self.phase {
            ChunkPhase::Idle | ChunkPhase::Complete => self.needs_resync,
            _ => true,
        }
    }
}

/// Builds chunk records in arbitrary states for tests.
#[cfg(any(test, feature = "test-support"))]
#[derive(Debug, Clone)]
pub struct ChunkRecordBuilder {
    record: ChunkRecord,
}

#[cfg(any(test, feature = "test-support"))]
impl Default for ChunkRecordBuilder {
    fn default() -> Self {
        Self { record: ChunkRecord::revealed(ChunkPos::new(0, 0)) }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl ChunkRecordBuilder {
    pub fn pos(mut self, pos: ChunkPos) -> Self {
        self.record.pos = pos;
        self
    }

    pub fn phase(mut self, phase: ChunkPhase) -> Self {
        self.record.phase = phase;
        self
    }

    pub fn ever_written(mut self, written: bool) -> Self {
        self.record.ever_written = written;
        self
    }

    pub fn needs_resync(mut self, dirty: bool) -> Self {
        self.record.needs_resync = dirty;
        self
    }

    pub fn failures(mut self, n: u32) -> Self {
        self.record.failures = n;
        self
    }

    pub fn failed(mut self, failed: bool) -> Self {
        self.record.failed = failed;
        self
    }

    pub fn last_completed(mut self, tick: Tick) -> Self {
        self.record.last_completed = Some(tick);
        self
    }

    pub fn build(self) -> ChunkRecord {
        self.record
    }
}

#[cfg(any(test, feature = "test-support"))]
impl ChunkRecord {
    pub fn builder() -> ChunkRecordBuilder {
        ChunkRecordBuilder::default()
    }
}

#[cfg(test)]
#[path = "chunk_tests.rs"]
mod tests;
