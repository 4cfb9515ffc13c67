// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Engine runtime.
//!
//! Owns the job store, the snapshot pipeline and the dispatcher. The world
//! is never owned: every call that touches it borrows it for the duration
//! of the call.

mod persist;
mod tick;

pub use tick::TickReport;

use crate::config::{ConfigError, EngineConfig};
use crate::jobs::{
    dry_run, CraftJob, Job, JobError, MineJob, PlaceJob, PlacementReport, WalkJob,
};
use crate::lifecycle::{CancelResult, JobMeta};
use crate::notify::{Dispatcher, Transport};
use crate::snapshot::{DefaultSerializer, EntitySerializer, SnapshotOrchestrator};
use crate::store::JobStore;
use crate::world::World;
use tw_core::{
    ActionEvent, ActionId, AgentId, Clock, Command, CraftCommand, JobKind, MineCommand,
    Notification, PlaceCommand, WalkCommand,
};
use tw_storage::{ActionJournal, ChangeLog, StorageLayout};

/// What `start` did with a command.
#[derive(Debug, Clone, PartialEq)]
pub enum Accepted {
    /// A job was created; its `queued` event has been sent
    Queued(ActionId),
    /// Placement dry run: nothing was created
    DryRun(PlacementReport),
}

pub struct Engine<C: Clock, T: Transport, S = DefaultSerializer> {
    config: EngineConfig,
    clock: C,
    jobs: JobStore,
    snapshot: SnapshotOrchestrator<S>,
    dispatcher: Dispatcher<T>,
    journal: Option<ActionJournal>,
    layout: StorageLayout,
}

impl<C: Clock, T: Transport> Engine<C, T, DefaultSerializer> {
    pub fn new(config: EngineConfig, clock: C, transport: T, layout: StorageLayout) -> Self {
        Self::with_serializer(config, clock, transport, layout, DefaultSerializer)
    }

    /// Build an engine rooted at the configured `state_dir`.
    pub fn open(config: EngineConfig, clock: C, transport: T) -> Result<Self, ConfigError> {
        let Some(dir) = config.state_dir.clone() else {
            return Err(ConfigError::Invalid { field: "state_dir", reason: "not set".to_string() });
        };
        Ok(Self::new(config, clock, transport, StorageLayout::new(dir)))
    }
}

impl<C, T, S> Engine<C, T, S>
where
    C: Clock,
    T: Transport,
    S: EntitySerializer,
{
    pub fn with_serializer(
        config: EngineConfig,
        clock: C,
        transport: T,
        layout: StorageLayout,
        serializer: S,
    ) -> Self {
        let journal = config.journal.actions.then(|| ActionJournal::open(layout.actions_path()));
        let snapshot =
            SnapshotOrchestrator::new(config.snapshot.clone(), ChangeLog::new(layout.clone()), serializer);
        Self {
            config,
            clock,
            jobs: JobStore::new(),
            snapshot,
            dispatcher: Dispatcher::new(transport),
            journal,
            layout,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn jobs(&self) -> &JobStore {
        &self.jobs
    }

    pub fn job(&self, agent: &AgentId, kind: JobKind) -> Option<&Job> {
        self.jobs.get(agent, kind)
    }

    pub fn snapshot(&self) -> &SnapshotOrchestrator<S> {
        &self.snapshot
    }

    pub fn dispatcher(&self) -> &Dispatcher<T> {
        &self.dispatcher
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Accept a command.
    ///
    /// Conflicts are checked before the world is asked anything, so a
    /// rejected command never touches the world. A placement dry run skips
    /// both and only reports feasibility.
    pub fn start<W: World + ?Sized>(&mut self, cmd: Command, world: &mut W) -> Result<Accepted, JobError> {
        if let Command::Place(place) = &cmd {
            if place.dry_run {
                let report = dry_run(place, &*world, &self.config.placement)?;
                tracing::debug!(
                    agent_id = %place.agent_id,
                    valid = report.valid,
                    invalid = report.invalid,
                    "placement dry run"
                );
                return Ok(Accepted::DryRun(report));
            }
        }
        self.queue(&cmd, world).map(Accepted::Queued)
    }

    pub fn start_walk<W: World + ?Sized>(&mut self, cmd: WalkCommand, world: &mut W) -> Result<ActionId, JobError> {
        self.queue(&Command::Walk(cmd), world)
    }

    pub fn start_mine<W: World + ?Sized>(&mut self, cmd: MineCommand, world: &mut W) -> Result<ActionId, JobError> {
        self.queue(&Command::Mine(cmd), world)
    }

    pub fn start_craft<W: World + ?Sized>(&mut self, cmd: CraftCommand, world: &mut W) -> Result<ActionId, JobError> {
        self.queue(&Command::Craft(cmd), world)
    }

    pub fn start_place<W: World + ?Sized>(&mut self, cmd: PlaceCommand, world: &mut W) -> Result<Accepted, JobError> {
        self.start(Command::Place(cmd), world)
    }

    fn queue<W: World + ?Sized>(&mut self, cmd: &Command, world: &mut W) -> Result<ActionId, JobError> {
        let agent = cmd.agent_id().clone();
        let kind = cmd.kind();
        self.jobs.check(&agent, kind)?;

        let tick = self.clock.now();
        let meta = JobMeta::new(agent, kind, tick);
        let job = match cmd {
            Command::Walk(c) => Job::Walk(WalkJob::plan(meta, c, world, &self.config.walking)?),
            Command::Mine(c) => Job::Mine(MineJob::plan(meta, c, world)?),
            Command::Craft(c) => Job::Craft(CraftJob::plan(meta, c, world)?),
            Command::Place(c) => Job::Place(PlaceJob::plan(meta, c, &self.config.placement)?),
        };

        let payload = match serde_json::to_value(cmd) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(agent_id = %cmd.agent_id(), %kind, error = %e, "could not encode queued payload");
                serde_json::Value::Null
            }
        };
        let queued = job.meta().queued(tick, payload);
        let action_id = job.meta().action_id.clone();
        self.jobs.insert(job)?;

        tracing::info!(agent_id = %queued.agent_id, action_id = %action_id, %kind, "job accepted");
        self.emit_action(queued);
        Ok(action_id)
    }

    /// Cancel the agent's job of `kind`.
    ///
    /// With no such job this is a no-op that reports `cancelled = false`
    /// and sends nothing.
    pub fn cancel<W: World + ?Sized>(&mut self, agent: &AgentId, kind: JobKind, world: &mut W) -> CancelResult {
        let Some(job) = self.jobs.get(agent, kind) else {
            return CancelResult::nothing_to_cancel();
        };
        if let Err(e) = job.release(world) {
            tracing::warn!(agent_id = %agent, %kind, error = %e, "release on cancel failed");
        }
        let Some(job) = self.jobs.remove(agent, kind) else {
            return CancelResult::nothing_to_cancel();
        };

        let meta = job.meta();
        let event = meta.cancelled(self.clock.now(), job.progress_summary());
        tracing::info!(agent_id = %agent, action_id = %meta.action_id, %kind, "job cancelled");
        let action_id = meta.action_id.clone();
        self.emit_action(event);
        CancelResult::cancelled(action_id)
    }

    /// Journal an action event and queue it, followed by the journal's
    /// `file_io` signal when the write succeeded.
    pub(crate) fn record_action(&mut self, event: ActionEvent, out: &mut Vec<Notification>) {
        tracing::debug!("{}", event.log_summary());
        let tick = event.tick;
        let receipt = self.journal.as_mut().map(|journal| journal.append(&event));
        out.push(Notification::Action(event));

        match receipt {
            Some(Ok(r)) => out.push(Notification::FileIo {
                operation: r.operation,
                file_type: r.file_type,
                chunk: None,
                tick,
            }),
            Some(Err(e)) => tracing::warn!(error = %e, "action journal write failed"),
            None => {}
        }
    }

    fn emit_action(&mut self, event: ActionEvent) {
        let mut out = Vec::new();
        self.record_action(event, &mut out);
        self.flush(out);
    }

    /// Sequence and send, in order.
    pub(crate) fn flush(&mut self, notifications: Vec<Notification>) -> usize {
        let n = notifications.len();
        for notification in notifications {
            self.dispatcher.send(notification);
        }
        n
    }
}

#[cfg(test)]
#[path = "../runtime_tests/mod.rs"]
mod tests;
