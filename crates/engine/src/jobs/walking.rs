// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Walking: follow waypoints to a goal, replanning when stuck.

use super::{JobCtx, JobError};
use crate::config::WalkingConfig;
use crate::lifecycle::{Advance, JobMeta};
use crate::world::{World, WorldFault};
use serde_json::json;
use tw_core::{FailureReason, JobKind, Outcome, Position, WalkCommand};

/// Movement below this distance does not count as progress.
const STALL_EPSILON: f64 = 1e-3;

#[derive(Debug, Clone)]
pub struct WalkJob {
    pub(crate) meta: JobMeta,
    goal: Position,
    arrive_radius: f64,
    waypoints: Vec<Position>,
    cursor: usize,
    stalled_for: u32,
    replans: u32,
}

impl WalkJob {
    /// Validate the goal and compute the initial path.
    pub fn plan<W: World + ?Sized>(
        meta: JobMeta,
        cmd: &WalkCommand,
        world: &mut W,
        config: &WalkingConfig,
    ) -> Result<Self, JobError> {
        let arrive_radius = cmd.arrive_radius.unwrap_or(config.arrive_radius);
        if arrive_radius.is_nan() || arrive_radius <= 0.0 {
            return Err(JobError::invalid(JobKind::Walk, "arrive radius must be positive"));
        }
        let waypoints = world
            .find_path(&cmd.agent_id, cmd.goal)?
            .ok_or_else(|| JobError::invalid(JobKind::Walk, format!("no path to {}", cmd.goal)))?;

        Ok(Self { meta, goal: cmd.goal, arrive_radius, waypoints, cursor: 0, stalled_for: 0, replans: 0 })
    }

    pub fn goal(&self) -> Position {
        self.goal
    }

    pub fn replans(&self) -> u32 {
        self.replans
    }

    pub(super) fn advance<W: World + ?Sized>(&mut self, ctx: &mut JobCtx<'_, W>) -> Result<Advance, WorldFault> {
        let cfg = &ctx.config.walking;
        let agent = &self.meta.agent_id;

        let before = ctx.world.agent_position(agent)?;
        if before.distance(&self.goal) <= self.arrive_radius {
            ctx.world.stop_moving(agent)?;
            return Ok(self.arrived(before));
        }

        let target = self.waypoints.get(self.cursor).copied().unwrap_or(self.goal);
        let now = ctx.world.step_toward(agent, target)?;
        if now.distance(&self.goal) <= self.arrive_radius {
            ctx.world.stop_moving(agent)?;
            return Ok(self.arrived(now));
        }

        let mut reached_waypoint = false;
        if self.cursor < self.waypoints.len() && now.distance(&target) <= cfg.waypoint_radius {
            self.cursor += 1;
            reached_waypoint = true;
        }

        if now.distance(&before) > STALL_EPSILON {
            self.stalled_for = 0;
        } else {
            self.stalled_for += 1;
        }

        if self.stalled_for >= cfg.stall_ticks {
            if self.replans >= cfg.max_replans {
                ctx.world.stop_moving(agent)?;
                tracing::debug!(agent_id = %agent, replans = self.replans, "walk stalled");
                return Ok(Advance::Finished(
                    Outcome::failure(
                        FailureReason::Stalled,
                        format!("no progress for {} ticks after {} replans", self.stalled_for, self.replans),
                    ),
                    self.summary_at(now),
                ));
            }
            self.replans += 1;
            self.stalled_for = 0;
            let Some(path) = ctx.world.find_path(agent, self.goal)? else {
                ctx.world.stop_moving(agent)?;
                return Ok(Advance::Finished(
                    Outcome::failure(FailureReason::Unreachable, format!("no path to {} on replan", self.goal)),
                    self.summary_at(now),
                ));
            };
            tracing::debug!(agent_id = %agent, replans = self.replans, waypoints = path.len(), "walk replanned");
            self.waypoints = path;
            self.cursor = 0;
            return Ok(Advance::Progress(json!({
                "replanned": self.replans,
                "waypoints": self.waypoints.len(),
                "position": now,
            })));
        }

        if reached_waypoint {
            return Ok(Advance::Progress(json!({
                "waypoint": self.cursor,
                "waypoints": self.waypoints.len(),
                "position": now,
            })));
        }
        Ok(Advance::Idle)
    }

    fn arrived(&self, position: Position) -> Advance {
        Advance::Finished(Outcome::success(), self.summary_at(position))
    }

    fn summary_at(&self, position: Position) -> serde_json::Value {
        json!({
            "goal": self.goal,
            "position": position,
            "distance": position.distance(&self.goal),
            "replans": self.replans,
        })
    }

    pub(super) fn summary(&self) -> serde_json::Value {
        json!({
            "goal": self.goal,
            "waypoint": self.cursor,
            "waypoints": self.waypoints.len(),
            "replans": self.replans,
        })
    }
}

#[cfg(test)]
#[path = "walking_tests.rs"]
mod tests;
