// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Crafting: queue the recipe once, then watch the queue drain.

use super::{JobCtx, JobError};
use crate::lifecycle::{Advance, JobMeta};
use crate::world::{World, WorldFault};
use serde_json::json;
use tw_core::{CraftCommand, FailureReason, JobKind, Outcome};

#[derive(Debug, Clone)]
pub struct CraftJob {
    pub(crate) meta: JobMeta,
    recipe: String,
    count: u32,
    queued: Option<u32>,
    remaining: u32,
}

impl CraftJob {
    pub fn plan<W: World + ?Sized>(meta: JobMeta, cmd: &CraftCommand, world: &mut W) -> Result<Self, JobError> {
        if cmd.count == 0 {
            return Err(JobError::invalid(JobKind::Craft, "count must be positive"));
        }
        match world.craftable_count(&cmd.agent_id, &cmd.recipe)? {
            None => return Err(JobError::invalid(JobKind::Craft, format!("unknown recipe {}", cmd.recipe))),
            Some(n) if n < cmd.count => {
                return Err(JobError::invalid(
                    JobKind::Craft,
                    format!("can craft {} only {n} of {} times", cmd.recipe, cmd.count),
                ))
            }
            Some(_) => {}
        }
        Ok(Self { meta, recipe: cmd.recipe.clone(), count: cmd.count, queued: None, remaining: cmd.count })
    }

    pub(super) fn enqueued(&self) -> bool {
        self.queued.is_some()
    }

    pub(super) fn advance<W: World + ?Sized>(&mut self, ctx: &mut JobCtx<'_, W>) -> Result<Advance, WorldFault> {
        let agent = &self.meta.agent_id;

        let queued = match self.queued {
            Some(q) => q,
            None => {
                let q = ctx.world.enqueue_craft(agent, &self.recipe, self.count)?;
                self.queued = Some(q);
                if q == 0 {
                    return Ok(Advance::Finished(
                        Outcome::failure(FailureReason::ResourceExhausted, "nothing could be queued"),
                        self.summary(),
                    ));
                }
                self.remaining = q;
                return Ok(Advance::Progress(json!({ "crafted": 0, "remaining": q })));
            }
        };

        let len = ctx.world.craft_queue_len(agent)?;
        if len == 0 {
            self.remaining = 0;
            return Ok(Advance::Finished(Outcome::success(), self.summary()));
        }
        if len < self.remaining {
            self.remaining = len;
            return Ok(Advance::Progress(json!({
                "crafted": queued.saturating_sub(len),
                "remaining": len,
            })));
        }
        Ok(Advance::Idle)
    }

    pub(super) fn summary(&self) -> serde_json::Value {
        let queued = self.queued.unwrap_or(0);
        json!({
            "recipe": self.recipe,
            "requested": self.count,
            "queued": queued,
            "crafted": queued.saturating_sub(self.remaining),
        })
    }
}

#[cfg(test)]
#[path = "crafting_tests.rs"]
mod tests;
