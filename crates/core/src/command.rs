// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Already-validated inbound commands.
//!
//! Type and bounds checking happens upstream; these structures only carry
//! what the job state machines need.

use crate::geometry::{Direction, Position};
use crate::id::AgentId;
use crate::job::JobKind;
use serde::{Deserialize, Serialize};

/// Walk an agent to a goal position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalkCommand {
    pub agent_id: AgentId,
    pub goal: Position,
    /// Overrides the configured arrival radius
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrive_radius: Option<f64>,
}

/// Stop condition for a mining job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum MineMode {
    /// Stop once `target_count` products have arrived in the inventory
    Incremental { target_count: u32 },
    /// Continue until the target is exhausted
    Deplete,
}

/// Mine a resource entity at (or nearest to) a position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MineCommand {
    pub agent_id: AgentId,
    pub resource: String,
    pub position: Position,
    pub mode: MineMode,
}

/// Hand-craft a recipe `count` times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CraftCommand {
    pub agent_id: AgentId,
    pub recipe: String,
    pub count: u32,
}

/// Place a line of entities from `start` to `end`.
///
/// Entities are spaced `spacing` tiles apart along the line and cycle
/// through `entities` in order (a single entry places the same entity
/// repeatedly).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCommand {
    pub agent_id: AgentId,
    pub entities: Vec<String>,
    pub start: Position,
    pub end: Position,
    pub spacing: f64,
    /// Fixed orientation; defaults to the cardinal direction of the line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orientation: Option<Direction>,
    /// Continue past entries that cannot be placed instead of aborting
    #[serde(default)]
    pub skip_invalid: bool,
    /// Validate the plan without creating a job or touching the world
    #[serde(default)]
    pub dry_run: bool,
}

/// Any inbound job command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Command {
    Walk(WalkCommand),
    Mine(MineCommand),
    Craft(CraftCommand),
    Place(PlaceCommand),
}

impl Command {
    pub fn kind(&self) -> JobKind {
        match self {
            Command::Walk(_) => JobKind::Walk,
            Command::Mine(_) => JobKind::Mine,
            Command::Craft(_) => JobKind::Craft,
            Command::Place(_) => JobKind::Place,
        }
    }

    pub fn agent_id(&self) -> &AgentId {
        match self {
            Command::Walk(c) => &c.agent_id,
            Command::Mine(c) => &c.agent_id,
            Command::Craft(c) => &c.agent_id,
            Command::Place(c) => &c.agent_id,
        }
    }
}
