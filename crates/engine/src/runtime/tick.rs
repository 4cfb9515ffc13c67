// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One tick: jobs first, then the snapshot budget, then dispatch.

use super::Engine;
use crate::jobs::JobCtx;
use crate::lifecycle::Advance;
use crate::notify::Transport;
use crate::snapshot::{DirtyMark, EntitySerializer};
use crate::world::World;
use tw_core::{AgentId, ChunkPos, Clock, FailureReason, Notification, Outcome, Position, Tick};

/// Charting source for chunks registered by the host rather than an agent.
const WORLD_SOURCE: &str = "world";

/// What one call to `run_tick` did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub tick: Tick,
    pub jobs_advanced: usize,
    pub jobs_finished: usize,
    pub chunk_steps: usize,
    pub chunks_completed: Vec<ChunkPos>,
    pub chunks_failed: Vec<ChunkPos>,
    /// Notifications handed to the dispatcher this tick
    pub notifications: usize,
}

impl<C, T, S> Engine<C, T, S>
where
    C: Clock,
    T: Transport,
    S: EntitySerializer,
{
    /// Run one tick at the clock's current value.
    ///
    /// Every active job advances once, agents in order. A world fault ends
    /// only the job that raised it. Chunks touched by jobs are marked dirty
    /// before the snapshot pass spends its budget.
    pub fn run_tick<W: World + ?Sized>(&mut self, world: &mut W) -> TickReport {
        let tick = self.clock.now();
        let mut report = TickReport { tick, ..TickReport::default() };
        let mut out = Vec::new();
        let mut touched: Vec<(AgentId, Position)> = Vec::new();

        for (agent, kind) in self.jobs.keys() {
            let Some(job) = self.jobs.get_mut(&agent, kind) else {
                continue;
            };
            let mut events = Vec::new();
            if !job.meta().started {
                job.meta_mut().started = true;
                events.push(job.meta().started(tick));
            }

            let result = {
                let mut ctx = JobCtx::new(&mut *world, &self.config, tick);
                let result = job.advance(&mut ctx);
                touched.extend(ctx.touched.into_iter().map(|pos| (agent.clone(), pos)));
                result
            };
            report.jobs_advanced += 1;

            let finished = match result {
                Ok(Advance::Idle) => false,
                Ok(Advance::Progress(payload)) => {
                    events.push(job.meta().progress(tick, payload));
                    false
                }
                Ok(Advance::Finished(outcome, payload)) => {
                    tracing::info!(
                        agent_id = %agent,
                        action_id = %job.meta().action_id,
                        %kind,
                        success = outcome.success,
                        "job finished"
                    );
                    events.push(job.meta().completed(tick, outcome, payload));
                    true
                }
                Err(fault) => {
                    tracing::warn!(agent_id = %agent, %kind, error = %fault, "world fault, failing job");
                    if let Err(e) = job.release(&mut *world) {
                        tracing::warn!(agent_id = %agent, %kind, error = %e, "release after fault failed");
                    }
                    let outcome = Outcome::failure(FailureReason::WorldFault, fault.to_string());
                    events.push(job.meta().completed(tick, outcome, job.progress_summary()));
                    true
                }
            };

            if finished {
                self.jobs.remove(&agent, kind);
                report.jobs_finished += 1;
            }
            for event in events {
                self.record_action(event, &mut out);
            }
        }

        let chunk_size = self.config.snapshot.chunk_size;
        for (agent, pos) in touched {
            self.mark_chunk(pos.chunk(chunk_size), agent.as_str(), tick, &mut out);
        }

        let budget = self.config.snapshot.budget_per_tick;
        let pass = self.snapshot.advance(&*world, tick, budget, &mut out);
        report.chunk_steps = pass.steps;
        report.chunks_completed = pass.completed;
        report.chunks_failed = pass.failed;

        report.notifications = self.flush(out);
        tracing::debug!(
            %tick,
            jobs = report.jobs_advanced,
            finished = report.jobs_finished,
            chunk_steps = report.chunk_steps,
            "tick done"
        );
        report
    }

    /// Register a chunk for its initial sync. Sends `chunk_charted` the
    /// first time a chunk is seen; returns false afterwards.
    pub fn chart_chunk(&mut self, chunk: ChunkPos, charted_by: &str) -> bool {
        if !self.snapshot.reveal(chunk) {
            return false;
        }
        let tick = self.clock.now();
        tracing::debug!(%chunk, charted_by, "chunk charted");
        self.flush(vec![Notification::ChunkCharted { chunk, tick, charted_by: charted_by.to_string() }]);
        true
    }

    /// Queue a chunk for resync after an external world change.
    pub fn mark_dirty(&mut self, chunk: ChunkPos) -> DirtyMark {
        let mut out = Vec::new();
        let mark = self.mark_chunk(chunk, WORLD_SOURCE, self.clock.now(), &mut out);
        self.flush(out);
        mark
    }

    /// Mark the chunk containing `position` dirty.
    pub fn mark_dirty_at(&mut self, position: Position) -> DirtyMark {
        self.mark_dirty(position.chunk(self.config.snapshot.chunk_size))
    }

    /// Send every known chunk through a full pass against its log.
    pub fn resync_all(&mut self) {
        tracing::info!(chunks = self.snapshot.tracker().len(), "resync all chunks");
        let mut out = Vec::new();
        self.snapshot.resync_all(self.clock.now(), &mut out);
        self.flush(out);
    }

    fn mark_chunk(&mut self, chunk: ChunkPos, source: &str, tick: Tick, out: &mut Vec<Notification>) -> DirtyMark {
        let mark = self.snapshot.mark_dirty(chunk);
        match mark {
            DirtyMark::Revealed => out.push(Notification::ChunkCharted {
                chunk,
                tick,
                charted_by: source.to_string(),
            }),
            DirtyMark::Revived => tracing::info!(%chunk, "failed chunk revived"),
            DirtyMark::Marked => {}
        }
        mark
    }
}
