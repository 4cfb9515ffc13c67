// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Budgeted, resumable chunk snapshot pipeline.
//!
//! Each call to [`SnapshotOrchestrator::advance`] spends at most `budget`
//! chunk-phase-steps. Pending chunks are taken in raster order and each is
//! driven as far as the budget allows before moving to the next. A step
//! that fails leaves the phase unchanged and skips the chunk for the rest
//! of the call; after `max_retries` consecutive failures the chunk is
//! marked failed and surfaced.
//!
//! Phase work:
//! - `FindEntities`: one bulk query, cached for the rest of the pass
//! - `Serialize`: convert up to `rows_per_step` entities per step
//! - `Write`: diff against the last written state, append up to
//!   `rows_per_step` log entries per step, then rewrite the resource file

use super::serializer::{EntitySerializer, SerializeError};
use super::tracker::{ChunkTracker, DirtyMark};
use crate::config::SnapshotConfig;
use crate::world::{World, WorldEntity, WorldFault};
use std::collections::{BTreeMap, HashMap, VecDeque};
use thiserror::Error;
use tw_core::{
    ChunkPhase, ChunkPos, ChunkRecord, EntityRecord, FileType, LogOp, Notification, OpLogEntry,
    Position, ResourceTile, SnapshotState, Tick,
};
use tw_storage::{ChangeLog, StorageError, WriteReceipt};

/// Why a chunk step failed
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("world fault: {0}")]
    World(#[from] WorldFault),
    #[error(transparent)]
    Serialize(#[from] SerializeError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("no cached work for chunk in {0}")]
    MissingWork(ChunkPhase),
}

/// What one call to `advance` did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub steps: usize,
    pub completed: Vec<ChunkPos>,
    pub failed: Vec<ChunkPos>,
}

/// Per-chunk work carried between phases of one pass.
#[derive(Debug, Default)]
struct ChunkWork {
    found: Vec<WorldEntity>,
    resources: Vec<ResourceTile>,
    serialized: Vec<EntityRecord>,
    /// Log entries still to append, with the position they concern
    pending: Option<VecDeque<(OpLogEntry, Position)>>,
    next_state: BTreeMap<String, EntityRecord>,
}

pub struct SnapshotOrchestrator<S> {
    config: SnapshotConfig,
    tracker: ChunkTracker,
    change_log: ChangeLog,
    serializer: S,
    work: HashMap<ChunkPos, ChunkWork>,
    /// Last state written per chunk; rebuilt from the log when missing
    written: HashMap<ChunkPos, BTreeMap<String, EntityRecord>>,
}

impl<S: EntitySerializer> SnapshotOrchestrator<S> {
    pub fn new(config: SnapshotConfig, change_log: ChangeLog, serializer: S) -> Self {
        Self {
            config,
            tracker: ChunkTracker::new(),
            change_log,
            serializer,
            work: HashMap::new(),
            written: HashMap::new(),
        }
    }

    pub fn tracker(&self) -> &ChunkTracker {
        &self.tracker
    }

    pub fn change_log(&self) -> &ChangeLog {
        &self.change_log
    }

    pub(crate) fn change_log_mut(&mut self) -> &mut ChangeLog {
        &mut self.change_log
    }

    pub fn config(&self) -> &SnapshotConfig {
        &self.config
    }

    /// Register a chunk. Returns false if it was already known.
    pub fn reveal(&mut self, pos: ChunkPos) -> bool {
        self.tracker.reveal(pos)
    }

    pub fn mark_dirty(&mut self, pos: ChunkPos) -> DirtyMark {
        let mark = self.tracker.mark_dirty(pos);
        if mark == DirtyMark::Revived {
            self.work.remove(&pos);
        }
        mark
    }

    /// Force every chunk through a full pass against its on-disk log.
    ///
    /// Chunks caught mid-pass lose their cached work and restart from `Idle`.
    pub fn resync_all(&mut self, tick: Tick, out: &mut Vec<Notification>) {
        let in_flight: Vec<ChunkPos> =
            self.tracker.records().filter(|r| r.phase.is_in_flight()).map(|r| r.pos).collect();
        for pos in in_flight {
            self.restart(pos, tick, out);
        }
        self.tracker.resync_all();
        self.work.clear();
        self.written.clear();
    }

    /// Replace the chunk table with persisted records.
    pub fn restore(&mut self, records: Vec<ChunkRecord>) {
        self.tracker = ChunkTracker::from_records(records);
        self.work.clear();
        self.written.clear();
    }

    /// Forget all chunks and cached state.
    pub fn reset(&mut self) {
        self.tracker.reset();
        self.work.clear();
        self.written.clear();
    }

    pub fn records(&self) -> Vec<ChunkRecord> {
        self.tracker.records().cloned().collect()
    }

    /// Spend up to `budget` chunk-phase-steps.
    pub fn advance<W: World + ?Sized>(
        &mut self,
        world: &W,
        tick: Tick,
        budget: usize,
        out: &mut Vec<Notification>,
    ) -> PassReport {
        let mut report = PassReport::default();

        for pos in self.tracker.pending() {
            while report.steps < budget {
                let Some(phase) = self.tracker.get(pos).filter(|r| r.is_pending()).map(|r| r.phase) else {
                    break;
                };

                // Re-arming a re-dirtied chunk is free
                if phase == ChunkPhase::Complete {
                    if let Some(next) = self.tracker.advance(pos, tick) {
                        self.emit_state(next.into(), pos, tick, out);
                    }
                    continue;
                }

                report.steps += 1;
                match self.step(pos, phase, world, tick, out) {
                    Ok(false) => {}
                    Ok(true) => {
                        let Some(next) = self.tracker.advance(pos, tick) else {
                            break;
                        };
                        self.emit_state(next.into(), pos, tick, out);
                        if next == ChunkPhase::Complete {
                            tracing::info!(chunk = %pos, tick = %tick, "chunk snapshot complete");
                            report.completed.push(pos);
                        }
                    }
                    Err(SnapshotError::MissingWork(phase)) => {
                        tracing::info!(chunk = %pos, phase = %phase, "no cached work, restarting pass");
                        self.restart(pos, tick, out);
                    }
                    Err(e) => {
                        tracing::warn!(chunk = %pos, phase = %phase, error = %e, "chunk step failed");
                        if self.tracker.record_failure(pos, self.config.max_retries) {
                            tracing::error!(chunk = %pos, phase = %phase, retries = self.config.max_retries, "chunk marked failed");
                            self.work.remove(&pos);
                            self.emit_state(SnapshotState::Failed, pos, tick, out);
                            report.failed.push(pos);
                        }
                        break;
                    }
                }
            }
            if report.steps >= budget {
                break;
            }
        }

        if report.steps > 0 {
            tracing::debug!(tick = %tick, steps = report.steps, completed = report.completed.len(), "snapshot pass");
        }
        report
    }

    /// Do one unit of work for the chunk's current phase. Returns whether
    /// the phase's work is finished and the chunk may move on.
    fn step<W: World + ?Sized>(
        &mut self,
        pos: ChunkPos,
        phase: ChunkPhase,
        world: &W,
        tick: Tick,
        out: &mut Vec<Notification>,
    ) -> Result<bool, SnapshotError> {
        match phase {
            ChunkPhase::Idle => Ok(true),
            ChunkPhase::FindEntities => {
                let contents = world.scan_chunk(pos, self.config.chunk_size)?;
                self.work.insert(
                    pos,
                    ChunkWork { found: contents.entities, resources: contents.resources, ..Default::default() },
                );
                Ok(true)
            }
            ChunkPhase::Serialize => {
                let work = self.work.get_mut(&pos).ok_or(SnapshotError::MissingWork(phase))?;
                let start = work.serialized.len();
                let end = (start + self.config.rows_per_step).min(work.found.len());
                let batch = work.found[start..end]
                    .iter()
                    .map(|e| self.serializer.serialize(e))
                    .collect::<Result<Vec<_>, _>>()?;
                work.serialized.extend(batch);
                Ok(work.serialized.len() == work.found.len())
            }
            ChunkPhase::Write => self.write_step(pos, tick, out),
            ChunkPhase::Complete => Ok(false),
        }
    }

    fn write_step(&mut self, pos: ChunkPos, tick: Tick, out: &mut Vec<Notification>) -> Result<bool, SnapshotError> {
        if !self.work.contains_key(&pos) {
            return Err(SnapshotError::MissingWork(ChunkPhase::Write));
        }
        if self.work.get(&pos).is_some_and(|w| w.pending.is_none()) {
            let previous = match self.written.get(&pos) {
                Some(state) => state.clone(),
                None => self.change_log.materialize(pos)?,
            };
            // Entries never predate the log, even if the host clock was rewound
            let stamp = self.change_log.last_tick(pos)?.map_or(tick, |last| last.max(tick));
            if let Some(work) = self.work.get_mut(&pos) {
                let (entries, next_state) = diff(&previous, &work.serialized, stamp)?;
                work.pending = Some(entries);
                work.next_state = next_state;
            }
        }
        let Some(work) = self.work.get_mut(&pos) else {
            return Err(SnapshotError::MissingWork(ChunkPhase::Write));
        };
        let pending = work.pending.get_or_insert_with(VecDeque::new);

        let n = self.config.rows_per_step.min(pending.len());
        if n > 0 {
            let batch: Vec<OpLogEntry> = pending.iter().take(n).map(|(e, _)| e.clone()).collect();
            let receipt = self.change_log.append_batch(pos, &batch)?;
            for (entry, position) in pending.drain(..n) {
                out.push(Notification::EntityOperation {
                    op: entry.op,
                    chunk: pos,
                    key: entry.key,
                    tick: entry.tick,
                    position,
                });
            }
            out.push(file_io(&receipt, pos, tick));
            if !pending.is_empty() {
                return Ok(false);
            }
        }

        let receipt = self.change_log.rewrite_whole(pos, FileType::Resources, &work.resources)?;
        out.push(file_io(&receipt, pos, tick));

        if let Some(work) = self.work.remove(&pos) {
            self.written.insert(pos, work.next_state);
        }
        Ok(true)
    }

    fn restart(&mut self, pos: ChunkPos, tick: Tick, out: &mut Vec<Notification>) {
        self.work.remove(&pos);
        self.tracker.restart(pos);
        self.emit_state(SnapshotState::Idle, pos, tick, out);
    }

    fn emit_state(&self, state: SnapshotState, chunk: ChunkPos, tick: Tick, out: &mut Vec<Notification>) {
        let always = matches!(state, SnapshotState::Complete | SnapshotState::Failed);
        if always || self.config.notify_intermediate_phases {
            out.push(Notification::SnapshotState { state, chunk, tick });
        }
    }
}

fn file_io(receipt: &WriteReceipt, chunk: ChunkPos, tick: Tick) -> Notification {
    Notification::FileIo { operation: receipt.operation, file_type: receipt.file_type, chunk: Some(chunk), tick }
}

/// Log entries turning `previous` into `records`, plus the resulting state.
///
/// Changed or new entities come first in key order, then removals.
fn diff(
    previous: &BTreeMap<String, EntityRecord>,
    records: &[EntityRecord],
    tick: Tick,
) -> Result<(VecDeque<(OpLogEntry, Position)>, BTreeMap<String, EntityRecord>), serde_json::Error> {
    let next: BTreeMap<String, EntityRecord> = records.iter().map(|r| (r.key.clone(), r.clone())).collect();

    let mut entries = VecDeque::new();
    for (key, record) in &next {
        let op = match previous.get(key) {
            None => Some(LogOp::Upsert),
            Some(before) => record.diff_op(before),
        };
        if let Some(op) = op {
            let entry = OpLogEntry { op, tick, key: key.clone(), payload: serde_json::to_value(record)? };
            entries.push_back((entry, record.position));
        }
    }
    for (key, before) in previous {
        if !next.contains_key(key) {
            let entry = OpLogEntry { op: LogOp::Remove, tick, key: key.clone(), payload: serde_json::Value::Null };
            entries.push_back((entry, before.position));
        }
    }
    Ok((entries, next))
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
