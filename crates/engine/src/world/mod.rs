// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The authoritative world simulation, seen from the engine.
//!
//! Pathfinding, extraction, crafting and placement rules live in the host.
//! The engine only calls these operations, once per job per tick at most,
//! and never holds on to world state between calls.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tw_core::{AgentId, ChunkPos, Direction, Position, ResourceTile};

/// Fault raised by the world while performing an operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldFault {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),
    #[error("{operation} failed: {message}")]
    Operation { operation: &'static str, message: String },
}

impl WorldFault {
    pub fn operation(operation: &'static str, message: impl Into<String>) -> Self {
        WorldFault::Operation { operation, message: message.into() }
    }
}

/// Whether an entity can be (or was) placed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaceVerdict {
    Ok,
    Rejected(String),
}

impl PlaceVerdict {
    pub fn is_ok(&self) -> bool {
        matches!(self, PlaceVerdict::Ok)
    }
}

/// A live entity as returned by a chunk scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldEntity {
    /// Host-assigned unique number, when the entity kind has one
    pub unit_number: Option<u64>,
    pub name: String,
    pub position: Position,
    pub direction: Direction,
    pub config: serde_json::Value,
}

/// Result of the single bulk query made for a chunk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChunkContents {
    pub entities: Vec<WorldEntity>,
    pub resources: Vec<ResourceTile>,
}

pub trait World {
    fn agent_position(&self, agent: &AgentId) -> Result<Position, WorldFault>;

    /// Compute waypoints to `goal`; `None` when it is unreachable.
    fn find_path(&mut self, agent: &AgentId, goal: Position) -> Result<Option<Vec<Position>>, WorldFault>;

    /// Move the agent one tick's worth toward `target`; returns the new position.
    fn step_toward(&mut self, agent: &AgentId, target: Position) -> Result<Position, WorldFault>;

    fn stop_moving(&mut self, agent: &AgentId) -> Result<(), WorldFault>;

    /// Units left in the resource at `position`; `None` if there is none.
    fn resource_amount(&self, resource: &str, position: Position) -> Result<Option<u32>, WorldFault>;

    /// One extraction increment. Returns units removed from the resource;
    /// products arrive in the agent's inventory at the world's own yield.
    fn mine_step(&mut self, agent: &AgentId, resource: &str, position: Position) -> Result<u32, WorldFault>;

    fn stop_mining(&mut self, agent: &AgentId) -> Result<(), WorldFault>;

    fn inventory_count(&self, agent: &AgentId, item: &str) -> Result<u32, WorldFault>;

    /// How many times the agent could craft `recipe` now; `None` for an unknown recipe.
    fn craftable_count(&self, agent: &AgentId, recipe: &str) -> Result<Option<u32>, WorldFault>;

    /// Queue crafts; returns how many were queued.
    fn enqueue_craft(&mut self, agent: &AgentId, recipe: &str, count: u32) -> Result<u32, WorldFault>;

    /// Crafts still queued for the agent.
    fn craft_queue_len(&self, agent: &AgentId) -> Result<u32, WorldFault>;

    fn cancel_craft(&mut self, agent: &AgentId) -> Result<(), WorldFault>;

    /// Check placement without mutating anything.
    fn check_placement(
        &self,
        agent: &AgentId,
        entity: &str,
        position: Position,
        direction: Direction,
    ) -> Result<PlaceVerdict, WorldFault>;

    fn place(
        &mut self,
        agent: &AgentId,
        entity: &str,
        position: Position,
        direction: Direction,
    ) -> Result<PlaceVerdict, WorldFault>;

    /// Everything in a chunk, in one query.
    fn scan_chunk(&self, chunk: ChunkPos, chunk_size: u32) -> Result<ChunkContents, WorldFault>;
}

#[cfg(any(test, feature = "test-support"))]
mod fake;

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeWorld;
