// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Registry of known chunks and their synchronization phase.

use std::collections::BTreeMap;
use tw_core::{ChunkPhase, ChunkPos, ChunkRecord, Tick};

/// How a dirty mark landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirtyMark {
    /// The chunk was unknown and is now registered
    Revealed,
    /// A known chunk is now pending
    Marked,
    /// A failed chunk re-entered the pipeline from `Idle`
    Revived,
}

/// Chunk records keyed in raster order.
#[derive(Debug, Default)]
pub struct ChunkTracker {
    chunks: BTreeMap<ChunkPos, ChunkRecord>,
}

impl ChunkTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from persisted records.
    ///
    /// Chunks caught mid-pipeline restart from `Idle` with their dirty flag
    /// set; the per-chunk work they held was not persisted.
    pub fn from_records(records: impl IntoIterator<Item = ChunkRecord>) -> Self {
        let mut chunks = BTreeMap::new();
        for mut record in records {
            if record.phase.is_in_flight() {
                record.phase = ChunkPhase::Idle;
                record.needs_resync = true;
            }
            chunks.insert(record.pos, record);
        }
        Self { chunks }
    }

    /// Register a chunk pending its first pass. Returns false if already known.
    pub fn reveal(&mut self, pos: ChunkPos) -> bool {
        if self.chunks.contains_key(&pos) {
            return false;
        }
        self.chunks.insert(pos, ChunkRecord::revealed(pos));
        true
    }

    /// Flag a chunk for resynchronization.
    ///
    /// Marks made while a pass is under way coalesce: the flag is cleared
    /// when a pass begins, so any number of marks during one pass cause
    /// exactly one more pass.
    pub fn mark_dirty(&mut self, pos: ChunkPos) -> DirtyMark {
        let Some(record) = self.chunks.get_mut(&pos) else {
            self.chunks.insert(pos, ChunkRecord::revealed(pos));
            return DirtyMark::Revealed;
        };
        record.needs_resync = true;
        if record.failed {
            record.failed = false;
            record.failures = 0;
            record.phase = ChunkPhase::Idle;
            return DirtyMark::Revived;
        }
        DirtyMark::Marked
    }

    /// Flag every known chunk, including failed ones.
    pub fn resync_all(&mut self) {
        let positions: Vec<_> = self.chunks.keys().copied().collect();
        for pos in positions {
            self.mark_dirty(pos);
        }
    }

    pub fn get(&self, pos: ChunkPos) -> Option<&ChunkRecord> {
        self.chunks.get(&pos)
    }

    /// Pending chunks in raster order.
    pub fn pending(&self) -> Vec<ChunkPos> {
        self.chunks.values().filter(|r| r.is_pending()).map(|r| r.pos).collect()
    }

    pub fn records(&self) -> impl Iterator<Item = &ChunkRecord> {
        self.chunks.values()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Forget every chunk.
    pub fn reset(&mut self) {
        self.chunks.clear();
    }

    /// Move a chunk to the next phase and return it.
    ///
    /// Entering `FindEntities` starts a pass and clears the dirty flag;
    /// entering `Complete` records the pass.
    pub(crate) fn advance(&mut self, pos: ChunkPos, tick: Tick) -> Option<ChunkPhase> {
        let record = self.chunks.get_mut(&pos)?;
        let next = record.phase.next();
        match next {
            ChunkPhase::FindEntities => record.needs_resync = false,
            ChunkPhase::Complete => {
                record.ever_written = true;
                record.last_completed = Some(tick);
            }
            _ => {}
        }
        record.phase = next;
        record.failures = 0;
        Some(next)
    }

    /// Count a failed step. Returns true when the chunk has now exhausted
    /// its retries and is marked failed.
    pub(crate) fn record_failure(&mut self, pos: ChunkPos, max_retries: u32) -> bool {
        let Some(record) = self.chunks.get_mut(&pos) else {
            return false;
        };
        record.failures += 1;
        if record.failures >= max_retries {
            record.failed = true;
            return true;
        }
        false
    }

    /// Send an in-flight chunk back to `Idle`, pending, with a clean
    /// failure count.
    pub(crate) fn restart(&mut self, pos: ChunkPos) {
        if let Some(record) = self.chunks.get_mut(&pos) {
            record.phase = ChunkPhase::Idle;
            record.needs_resync = true;
            record.failures = 0;
        }
    }
}

#[cfg(test)]
#[path = "tracker_tests.rs"]
mod tests;
