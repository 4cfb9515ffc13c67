// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Placement: a precomputed plan along a line, one entry per tick.

use super::{JobCtx, JobError};
use crate::config::PlacementConfig;
use crate::lifecycle::{Advance, JobMeta};
use crate::world::{PlaceVerdict, World, WorldFault};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tw_core::{Direction, FailureReason, JobKind, Outcome, PlaceCommand, Position};

/// One planned placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub index: usize,
    pub entity: String,
    pub position: Position,
    pub direction: Direction,
}

/// Feasibility of one plan entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryCheck {
    #[serde(flatten)]
    pub entry: PlanEntry,
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Result of a dry run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacementReport {
    pub entries: Vec<EntryCheck>,
    pub valid: usize,
    pub invalid: usize,
}

impl PlacementReport {
    pub fn all_valid(&self) -> bool {
        self.invalid == 0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
struct Skipped {
    index: usize,
    reason: String,
}

/// Lay out entries from `start` to `end`, `spacing` apart, cycling through
/// the entity list. Positions snap to tile centers.
pub fn build_plan(cmd: &PlaceCommand, config: &PlacementConfig) -> Result<Vec<PlanEntry>, JobError> {
    if cmd.entities.is_empty() {
        return Err(JobError::invalid(JobKind::Place, "no entities to place"));
    }
    if !cmd.spacing.is_finite() || cmd.spacing <= 0.0 {
        return Err(JobError::invalid(JobKind::Place, "spacing must be positive"));
    }

    let length = cmd.start.distance(&cmd.end);
    let steps = (length / cmd.spacing).floor();
    if steps >= config.max_plan_len as f64 {
        return Err(JobError::invalid(
            JobKind::Place,
            format!("plan exceeds {} entries", config.max_plan_len),
        ));
    }
    let count = steps as usize + 1;
    let direction = cmd.orientation.unwrap_or_else(|| Direction::cardinal_between(&cmd.start, &cmd.end));

    let plan = (0..count)
        .map(|i| {
            let position = if length == 0.0 {
                cmd.start
            } else {
                cmd.start.step_toward(&cmd.end, i as f64 * cmd.spacing)
            };
            PlanEntry {
                index: i,
                entity: cmd.entities[i % cmd.entities.len()].clone(),
                position: position.tile_center(),
                direction,
            }
        })
        .collect();
    Ok(plan)
}

/// Check every plan entry without mutating the world.
pub fn dry_run<W: World + ?Sized>(
    cmd: &PlaceCommand,
    world: &W,
    config: &PlacementConfig,
) -> Result<PlacementReport, JobError> {
    let plan = build_plan(cmd, config)?;
    let mut entries = Vec::with_capacity(plan.len());
    for entry in plan {
        let verdict = world.check_placement(&cmd.agent_id, &entry.entity, entry.position, entry.direction)?;
        let (valid, reason) = match verdict {
            PlaceVerdict::Ok => (true, None),
            PlaceVerdict::Rejected(r) => (false, Some(r)),
        };
        entries.push(EntryCheck { entry, valid, reason });
    }
    let valid = entries.iter().filter(|e| e.valid).count();
    let invalid = entries.len() - valid;
    Ok(PlacementReport { entries, valid, invalid })
}

#[derive(Debug, Clone)]
pub struct PlaceJob {
    pub(crate) meta: JobMeta,
    plan: Vec<PlanEntry>,
    cursor: usize,
    skip_invalid: bool,
    placed: usize,
    skipped: Vec<Skipped>,
}

impl PlaceJob {
    pub fn plan(meta: JobMeta, cmd: &PlaceCommand, config: &PlacementConfig) -> Result<Self, JobError> {
        let plan = build_plan(cmd, config)?;
        Ok(Self { meta, plan, cursor: 0, skip_invalid: cmd.skip_invalid, placed: 0, skipped: Vec::new() })
    }

    pub fn entries(&self) -> &[PlanEntry] {
        &self.plan
    }

    pub(super) fn advance<W: World + ?Sized>(&mut self, ctx: &mut JobCtx<'_, W>) -> Result<Advance, WorldFault> {
        let Some(entry) = self.plan.get(self.cursor) else {
            return Ok(self.finish());
        };
        let verdict = ctx.world.place(&self.meta.agent_id, &entry.entity, entry.position, entry.direction)?;
        self.cursor += 1;

        match verdict {
            PlaceVerdict::Ok => {
                self.placed += 1;
                ctx.touched.push(entry.position);
            }
            PlaceVerdict::Rejected(reason) if self.skip_invalid => {
                tracing::debug!(agent_id = %self.meta.agent_id, index = entry.index, %reason, "skipping placement");
                self.skipped.push(Skipped { index: entry.index, reason });
            }
            PlaceVerdict::Rejected(reason) => {
                let detail = format!("{} at {}: {reason}", entry.entity, entry.position);
                return Ok(Advance::Finished(
                    Outcome::failure(FailureReason::PlacementRejected, detail),
                    self.summary(),
                ));
            }
        }

        if self.cursor >= self.plan.len() {
            return Ok(self.finish());
        }
        Ok(Advance::Progress(json!({
            "placed": self.placed,
            "skipped": self.skipped.len(),
            "total": self.plan.len(),
        })))
    }

    fn finish(&self) -> Advance {
        let outcome = if self.placed > 0 {
            Outcome::success()
        } else {
            Outcome::failure(FailureReason::PlacementRejected, "no entry could be placed")
        };
        Advance::Finished(outcome, self.summary())
    }

    pub(super) fn summary(&self) -> serde_json::Value {
        json!({
            "placed": self.placed,
            "attempted": self.cursor,
            "total": self.plan.len(),
            "skipped": self.skipped,
        })
    }
}

#[cfg(test)]
#[path = "placement_tests.rs"]
mod tests;
