// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job state machines.
//!
//! Each kind is a resumable struct: the cursor fields are the continuation,
//! and [`Job::advance`] does one bounded unit of work per call.

mod crafting;
mod mining;
mod placement;
mod walking;

pub use crafting::CraftJob;
pub use mining::MineJob;
pub use placement::{build_plan, dry_run, EntryCheck, PlaceJob, PlacementReport, PlanEntry};
pub use walking::WalkJob;

use crate::config::EngineConfig;
use crate::lifecycle::{Advance, JobMeta};
use crate::world::{World, WorldFault};
use thiserror::Error;
use tw_core::{AgentId, JobKind, Position, Tick};

/// Errors returned synchronously when a command is rejected
#[derive(Debug, Error)]
pub enum JobError {
    #[error("agent {agent} has an active {active} job, cannot start {requested}")]
    ConcurrentJob { agent: AgentId, requested: JobKind, active: JobKind },
    #[error("invalid {kind} target: {reason}")]
    InvalidTarget { kind: JobKind, reason: String },
    #[error("world fault: {0}")]
    World(#[from] WorldFault),
}

impl JobError {
    pub(crate) fn invalid(kind: JobKind, reason: impl Into<String>) -> Self {
        JobError::InvalidTarget { kind, reason: reason.into() }
    }
}

/// Per-tick context handed to a job.
pub struct JobCtx<'a, W: World + ?Sized> {
    pub world: &'a mut W,
    pub config: &'a EngineConfig,
    pub tick: Tick,
    /// Positions whose chunk contents this advance changed
    pub touched: Vec<Position>,
}

impl<'a, W: World + ?Sized> JobCtx<'a, W> {
    pub fn new(world: &'a mut W, config: &'a EngineConfig, tick: Tick) -> Self {
        Self { world, config, tick, touched: Vec::new() }
    }
}

/// An in-flight job of any kind.
#[derive(Debug, Clone)]
pub enum Job {
    Walk(WalkJob),
    Mine(MineJob),
    Craft(CraftJob),
    Place(PlaceJob),
}

impl Job {
    pub fn meta(&self) -> &JobMeta {
        match self {
            Job::Walk(j) => &j.meta,
            Job::Mine(j) => &j.meta,
            Job::Craft(j) => &j.meta,
            Job::Place(j) => &j.meta,
        }
    }

    pub fn meta_mut(&mut self) -> &mut JobMeta {
        match self {
            Job::Walk(j) => &mut j.meta,
            Job::Mine(j) => &mut j.meta,
            Job::Craft(j) => &mut j.meta,
            Job::Place(j) => &mut j.meta,
        }
    }

    pub fn kind(&self) -> JobKind {
        self.meta().kind
    }

    pub fn advance<W: World + ?Sized>(&mut self, ctx: &mut JobCtx<'_, W>) -> Result<Advance, WorldFault> {
        match self {
            Job::Walk(j) => j.advance(ctx),
            Job::Mine(j) => j.advance(ctx),
            Job::Craft(j) => j.advance(ctx),
            Job::Place(j) => j.advance(ctx),
        }
    }

    /// Release whatever the job holds in the world (movement, mining,
    /// craft queue). The world is left as-is otherwise.
    pub fn release<W: World + ?Sized>(&self, world: &mut W) -> Result<(), WorldFault> {
        let agent = &self.meta().agent_id;
        match self {
            Job::Walk(_) => world.stop_moving(agent),
            Job::Mine(_) => world.stop_mining(agent),
            Job::Craft(j) if j.enqueued() => world.cancel_craft(agent),
            Job::Craft(_) | Job::Place(_) => Ok(()),
        }
    }

    /// Summary attached to the `cancelled` event.
    pub fn progress_summary(&self) -> serde_json::Value {
        match self {
            Job::Walk(j) => j.summary(),
            Job::Mine(j) => j.summary(),
            Job::Craft(j) => j.summary(),
            Job::Place(j) => j.summary(),
        }
    }
}
