// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Deterministic in-memory world for tests.

use super::{ChunkContents, PlaceVerdict, World, WorldEntity, WorldFault};
use std::cell::Cell;
use std::collections::{BTreeMap, HashMap, HashSet};
use tw_core::{AgentId, ChunkPos, Direction, Position, ResourceTile};

#[derive(Debug, Clone)]
struct FakeAgent {
    position: Position,
    speed: f64,
    inventory: HashMap<String, u32>,
    moving: bool,
    mining: bool,
    frozen: bool,
    craft_queue: u32,
    craft_recipe: Option<String>,
}

#[derive(Debug, Clone)]
struct FakeResource {
    name: String,
    position: Position,
    amount: u32,
    per_step: u32,
    yield_factor: f64,
}

/// World with straight-line pathing, fixed extraction rates and one craft
/// per [`FakeWorld::tick`].
///
/// Operations named with [`FakeWorld::fail`] raise a [`WorldFault`] until
/// healed.
#[derive(Debug, Default)]
pub struct FakeWorld {
    agents: BTreeMap<AgentId, FakeAgent>,
    resources: Vec<FakeResource>,
    recipes: HashMap<String, u32>,
    entities: Vec<WorldEntity>,
    blocked: HashSet<(i64, i64)>,
    unreachable: Vec<Position>,
    faults: HashSet<&'static str>,
    next_unit: u64,
    path_segment: f64,
    scans: Cell<usize>,
}

fn tile(p: Position) -> (i64, i64) {
    (p.x.floor() as i64, p.y.floor() as i64)
}

impl FakeWorld {
    pub fn new() -> Self {
        Self { next_unit: 1, path_segment: 4.0, ..Default::default() }
    }

    /// Add an agent moving one tile per tick.
    pub fn with_agent(mut self, agent: &str, position: Position) -> Self {
        self.add_agent(agent, position, 1.0);
        self
    }

    pub fn add_agent(&mut self, agent: &str, position: Position, speed: f64) {
        self.agents.insert(
            AgentId::new(agent),
            FakeAgent {
                position,
                speed,
                inventory: HashMap::new(),
                moving: false,
                mining: false,
                frozen: false,
                craft_queue: 0,
                craft_recipe: None,
            },
        );
    }

    /// Add a resource yielding one product per unit removed.
    pub fn with_resource(mut self, name: &str, position: Position, amount: u32, per_step: u32) -> Self {
        self.add_resource(name, position, amount, per_step, 1.0);
        self
    }

    pub fn add_resource(&mut self, name: &str, position: Position, amount: u32, per_step: u32, yield_factor: f64) {
        self.resources.push(FakeResource {
            name: name.to_string(),
            position,
            amount,
            per_step,
            yield_factor,
        });
    }

    /// Make `recipe` craftable `count` more times.
    pub fn with_recipe(mut self, recipe: &str, count: u32) -> Self {
        self.recipes.insert(recipe.to_string(), count);
        self
    }

    pub fn block_tile(&mut self, position: Position) {
        self.blocked.insert(tile(position));
    }

    pub fn set_unreachable(&mut self, goal: Position) {
        self.unreachable.push(goal);
    }

    pub fn clear_unreachable(&mut self) {
        self.unreachable.clear();
    }

    /// Agent stops making progress toward any target.
    pub fn freeze(&mut self, agent: &str) {
        if let Some(a) = self.agents.get_mut(agent) {
            a.frozen = true;
        }
    }

    pub fn unfreeze(&mut self, agent: &str) {
        if let Some(a) = self.agents.get_mut(agent) {
            a.frozen = false;
        }
    }

    pub fn fail(&mut self, operation: &'static str) {
        self.faults.insert(operation);
    }

    pub fn heal(&mut self, operation: &'static str) {
        self.faults.remove(operation);
    }

    /// Progress every craft queue by one item.
    pub fn tick(&mut self) {
        for agent in self.agents.values_mut() {
            if agent.craft_queue == 0 {
                continue;
            }
            agent.craft_queue -= 1;
            if let Some(recipe) = &agent.craft_recipe {
                *agent.inventory.entry(recipe.clone()).or_default() += 1;
            }
        }
    }

    pub fn add_entity(&mut self, name: &str, position: Position, direction: Direction) -> u64 {
        let unit = self.next_unit;
        self.next_unit += 1;
        self.entities.push(WorldEntity {
            unit_number: Some(unit),
            name: name.to_string(),
            position,
            direction,
            config: serde_json::Value::Null,
        });
        unit
    }

    fn entity_mut(&mut self, unit: u64) -> Option<&mut WorldEntity> {
        self.entities.iter_mut().find(|e| e.unit_number == Some(unit))
    }

    pub fn rotate_entity(&mut self, unit: u64, direction: Direction) {
        if let Some(e) = self.entity_mut(unit) {
            e.direction = direction;
        }
    }

    pub fn configure_entity(&mut self, unit: u64, config: serde_json::Value) {
        if let Some(e) = self.entity_mut(unit) {
            e.config = config;
        }
    }

    pub fn move_entity(&mut self, unit: u64, position: Position) {
        if let Some(e) = self.entity_mut(unit) {
            e.position = position;
        }
    }

    pub fn remove_entity(&mut self, unit: u64) {
        self.entities.retain(|e| e.unit_number != Some(unit));
    }

    pub fn entities(&self) -> &[WorldEntity] {
        &self.entities
    }

    pub fn position(&self, agent: &str) -> Option<Position> {
        self.agents.get(agent).map(|a| a.position)
    }

    pub fn inventory(&self, agent: &str, item: &str) -> u32 {
        self.agents.get(agent).and_then(|a| a.inventory.get(item).copied()).unwrap_or(0)
    }

    pub fn is_moving(&self, agent: &str) -> bool {
        self.agents.get(agent).is_some_and(|a| a.moving)
    }

    pub fn is_mining(&self, agent: &str) -> bool {
        self.agents.get(agent).is_some_and(|a| a.mining)
    }

    /// Number of chunk scans performed.
    pub fn scans(&self) -> usize {
        self.scans.get()
    }

    fn check(&self, operation: &'static str) -> Result<(), WorldFault> {
        if self.faults.contains(operation) {
            return Err(WorldFault::operation(operation, "injected fault"));
        }
        Ok(())
    }

    fn agent(&self, agent: &AgentId) -> Result<&FakeAgent, WorldFault> {
        self.agents.get(agent).ok_or_else(|| WorldFault::AgentNotFound(agent.clone()))
    }

    fn agent_mut(&mut self, agent: &AgentId) -> Result<&mut FakeAgent, WorldFault> {
        self.agents.get_mut(agent).ok_or_else(|| WorldFault::AgentNotFound(agent.clone()))
    }

    fn resource_index(&self, name: &str, position: Position) -> Option<usize> {
        self.resources
            .iter()
            .position(|r| r.name == name && r.amount > 0 && r.position.distance(&position) <= 1.0)
    }

    fn verdict(&self, position: Position) -> PlaceVerdict {
        let t = tile(position);
        if self.blocked.contains(&t) {
            return PlaceVerdict::Rejected("tile is blocked".to_string());
        }
        if self.entities.iter().any(|e| tile(e.position) == t) {
            return PlaceVerdict::Rejected("tile is occupied".to_string());
        }
        PlaceVerdict::Ok
    }
}

impl World for FakeWorld {
    fn agent_position(&self, agent: &AgentId) -> Result<Position, WorldFault> {
        self.check("agent_position")?;
        Ok(self.agent(agent)?.position)
    }

    fn find_path(&mut self, agent: &AgentId, goal: Position) -> Result<Option<Vec<Position>>, WorldFault> {
        self.check("find_path")?;
        let from = self.agent(agent)?.position;
        if self.unreachable.iter().any(|u| u.distance(&goal) < 0.5) {
            return Ok(None);
        }
        let mut path = Vec::new();
        let mut at = from;
        while at.distance(&goal) > self.path_segment {
            at = at.step_toward(&goal, self.path_segment);
            path.push(at);
        }
        path.push(goal);
        Ok(Some(path))
    }

    fn step_toward(&mut self, agent: &AgentId, target: Position) -> Result<Position, WorldFault> {
        self.check("step_toward")?;
        let a = self.agent_mut(agent)?;
        a.moving = true;
        if !a.frozen {
            a.position = a.position.step_toward(&target, a.speed);
        }
        Ok(a.position)
    }

    fn stop_moving(&mut self, agent: &AgentId) -> Result<(), WorldFault> {
        self.check("stop_moving")?;
        self.agent_mut(agent)?.moving = false;
        Ok(())
    }

    fn resource_amount(&self, resource: &str, position: Position) -> Result<Option<u32>, WorldFault> {
        self.check("resource_amount")?;
        Ok(self.resource_index(resource, position).map(|i| self.resources[i].amount))
    }

    fn mine_step(&mut self, agent: &AgentId, resource: &str, position: Position) -> Result<u32, WorldFault> {
        self.check("mine_step")?;
        self.agent(agent)?;
        let Some(i) = self.resource_index(resource, position) else {
            return Ok(0);
        };
        let res = &mut self.resources[i];
        let removed = res.per_step.min(res.amount);
        res.amount -= removed;
        let produced = (f64::from(removed) * res.yield_factor).round() as u32;
        let name = res.name.clone();

        let a = self.agent_mut(agent)?;
        a.mining = true;
        *a.inventory.entry(name).or_default() += produced;
        Ok(removed)
    }

    fn stop_mining(&mut self, agent: &AgentId) -> Result<(), WorldFault> {
        self.check("stop_mining")?;
        self.agent_mut(agent)?.mining = false;
        Ok(())
    }

    fn inventory_count(&self, agent: &AgentId, item: &str) -> Result<u32, WorldFault> {
        self.check("inventory_count")?;
        Ok(self.agent(agent)?.inventory.get(item).copied().unwrap_or(0))
    }

    fn craftable_count(&self, agent: &AgentId, recipe: &str) -> Result<Option<u32>, WorldFault> {
        self.check("craftable_count")?;
        self.agent(agent)?;
        Ok(self.recipes.get(recipe).copied())
    }

    fn enqueue_craft(&mut self, agent: &AgentId, recipe: &str, count: u32) -> Result<u32, WorldFault> {
        self.check("enqueue_craft")?;
        self.agent(agent)?;
        let available = self.recipes.get(recipe).copied().unwrap_or(0);
        let queued = count.min(available);
        self.recipes.insert(recipe.to_string(), available - queued);
        let a = self.agent_mut(agent)?;
        a.craft_queue += queued;
        a.craft_recipe = Some(recipe.to_string());
        Ok(queued)
    }

    fn craft_queue_len(&self, agent: &AgentId) -> Result<u32, WorldFault> {
        self.check("craft_queue_len")?;
        Ok(self.agent(agent)?.craft_queue)
    }

    fn cancel_craft(&mut self, agent: &AgentId) -> Result<(), WorldFault> {
        self.check("cancel_craft")?;
        let a = self.agent_mut(agent)?;
        a.craft_queue = 0;
        a.craft_recipe = None;
        Ok(())
    }

    fn check_placement(
        &self,
        agent: &AgentId,
        _entity: &str,
        position: Position,
        _direction: Direction,
    ) -> Result<PlaceVerdict, WorldFault> {
        self.check("check_placement")?;
        self.agent(agent)?;
        Ok(self.verdict(position))
    }

    fn place(
        &mut self,
        agent: &AgentId,
        entity: &str,
        position: Position,
        direction: Direction,
    ) -> Result<PlaceVerdict, WorldFault> {
        self.check("place")?;
        self.agent(agent)?;
        let verdict = self.verdict(position);
        if verdict.is_ok() {
            self.add_entity(entity, position, direction);
        }
        Ok(verdict)
    }

    fn scan_chunk(&self, chunk: ChunkPos, chunk_size: u32) -> Result<ChunkContents, WorldFault> {
        self.check("scan_chunk")?;
        self.scans.set(self.scans.get() + 1);
        let entities = self
            .entities
            .iter()
            .filter(|e| chunk.contains(&e.position, chunk_size))
            .cloned()
            .collect();
        let resources = self
            .resources
            .iter()
            .filter(|r| r.amount > 0 && chunk.contains(&r.position, chunk_size))
            .map(|r| ResourceTile { name: r.name.clone(), position: r.position, amount: r.amount })
            .collect();
        Ok(ChunkContents { entities, resources })
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
