// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Mining: one extraction increment per tick, progress measured by the
//! inventory delta.
//!
//! Yield per unit is the world's business and need not be linear, so the
//! final report carries both the units removed from the resource
//! (`expected`) and the products that actually arrived (`mined`).

use super::{JobCtx, JobError};
use crate::lifecycle::{Advance, JobMeta};
use crate::world::{World, WorldFault};
use serde_json::json;
use tw_core::{FailureReason, JobKind, MineCommand, MineMode, Outcome, Position};

#[derive(Debug, Clone)]
pub struct MineJob {
    pub(crate) meta: JobMeta,
    resource: String,
    position: Position,
    mode: MineMode,
    baseline: u32,
    expected: u32,
    mined: u32,
    stalled_for: u32,
}

impl MineJob {
    pub fn plan<W: World + ?Sized>(meta: JobMeta, cmd: &MineCommand, world: &mut W) -> Result<Self, JobError> {
        if let MineMode::Incremental { target_count: 0 } = cmd.mode {
            return Err(JobError::invalid(JobKind::Mine, "target count must be positive"));
        }
        match world.resource_amount(&cmd.resource, cmd.position)? {
            Some(n) if n > 0 => {}
            _ => {
                return Err(JobError::invalid(
                    JobKind::Mine,
                    format!("no {} at {}", cmd.resource, cmd.position),
                ))
            }
        }
        let baseline = world.inventory_count(&cmd.agent_id, &cmd.resource)?;

        Ok(Self {
            meta,
            resource: cmd.resource.clone(),
            position: cmd.position,
            mode: cmd.mode,
            baseline,
            expected: 0,
            mined: 0,
            stalled_for: 0,
        })
    }

    pub fn mined(&self) -> u32 {
        self.mined
    }

    pub(super) fn advance<W: World + ?Sized>(&mut self, ctx: &mut JobCtx<'_, W>) -> Result<Advance, WorldFault> {
        let agent = &self.meta.agent_id;

        let removed = ctx.world.mine_step(agent, &self.resource, self.position)?;
        if removed > 0 {
            ctx.touched.push(self.position);
        }
        self.expected += removed;

        let actual = ctx.world.inventory_count(agent, &self.resource)?.saturating_sub(self.baseline);
        let progressed = removed > 0 || actual > self.mined;
        self.mined = actual;
        let remaining = ctx.world.resource_amount(&self.resource, self.position)?.unwrap_or(0);

        if let MineMode::Incremental { target_count } = self.mode {
            if actual >= target_count {
                ctx.world.stop_mining(agent)?;
                return Ok(Advance::Finished(Outcome::success(), self.report(remaining)));
            }
        }
        if remaining == 0 {
            ctx.world.stop_mining(agent)?;
            let outcome = match self.mode {
                MineMode::Deplete => Outcome::success(),
                MineMode::Incremental { target_count } => Outcome::failure(
                    FailureReason::ResourceExhausted,
                    format!("{} ran out after {actual} of {target_count}", self.resource),
                ),
            };
            return Ok(Advance::Finished(outcome, self.report(remaining)));
        }

        if progressed {
            self.stalled_for = 0;
        } else {
            self.stalled_for += 1;
            if self.stalled_for >= ctx.config.mining.stall_ticks {
                ctx.world.stop_mining(agent)?;
                return Ok(Advance::Finished(
                    Outcome::failure(
                        FailureReason::Stalled,
                        format!("nothing extracted for {} ticks", self.stalled_for),
                    ),
                    self.report(remaining),
                ));
            }
            return Ok(Advance::Idle);
        }

        Ok(Advance::Progress(json!({
            "mined": actual,
            "expected": self.expected,
            "remaining": remaining,
        })))
    }

    fn target(&self) -> Option<u32> {
        match self.mode {
            MineMode::Incremental { target_count } => Some(target_count),
            MineMode::Deplete => None,
        }
    }

    fn report(&self, remaining: u32) -> serde_json::Value {
        json!({
            "resource": self.resource,
            "position": self.position,
            "target": self.target(),
            "expected": self.expected,
            "mined": self.mined,
            "remaining": remaining,
        })
    }

    pub(super) fn summary(&self) -> serde_json::Value {
        json!({
            "resource": self.resource,
            "target": self.target(),
            "expected": self.expected,
            "mined": self.mined,
        })
    }
}

#[cfg(test)]
#[path = "mining_tests.rs"]
mod tests;
