// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared harness for the scenario tests.

pub use std::collections::BTreeMap;
pub use tempfile::TempDir;
pub use tw_core::{
    ActionEvent, ActionStatus, AgentId, ChunkPos, Command, Direction, Envelope, JobKind,
    MineCommand, MineMode, Notification, PlaceCommand, Position, SnapshotState, StepClock,
    WalkCommand,
};
pub use tw_engine::{
    Accepted, CancelResult, Engine, EngineConfig, FakeWorld, JobError, MemoryTransport,
};
pub use tw_storage::StorageLayout;

pub struct Sim {
    pub dir: TempDir,
    pub engine: Engine<StepClock, MemoryTransport>,
    pub world: FakeWorld,
    pub clock: StepClock,
    pub transport: MemoryTransport,
}

impl Sim {
    pub fn new(world: FakeWorld) -> Self {
        Self::with_config(world, EngineConfig::default())
    }

    pub fn with_config(world: FakeWorld, config: EngineConfig) -> Self {
        let dir = TempDir::new().unwrap();
        let clock = StepClock::new();
        let transport = MemoryTransport::new();
        let engine = Engine::new(config, clock.clone(), transport.clone(), StorageLayout::new(dir.path()));
        Self { dir, engine, world, clock, transport }
    }

    pub fn tick(&mut self) {
        self.clock.advance();
        self.world.tick();
        self.engine.run_tick(&mut self.world);
    }

    pub fn ticks(&mut self, n: usize) {
        for _ in 0..n {
            self.tick();
        }
    }

    pub fn sent(&self) -> Vec<Envelope> {
        self.transport.sent()
    }

    pub fn actions(&self) -> Vec<ActionEvent> {
        self.sent()
            .into_iter()
            .filter_map(|e| match e.notification {
                Notification::Action(ev) => Some(ev),
                _ => None,
            })
            .collect()
    }

    /// Snapshot states observed per chunk, in order.
    pub fn chunk_states(&self) -> BTreeMap<ChunkPos, Vec<SnapshotState>> {
        let mut map: BTreeMap<ChunkPos, Vec<SnapshotState>> = BTreeMap::new();
        for e in self.sent() {
            if let Notification::SnapshotState { state, chunk, .. } = e.notification {
                map.entry(chunk).or_default().push(state);
            }
        }
        map
    }
}

pub fn agent(name: &str) -> AgentId {
    AgentId::new(name)
}

pub fn walk(name: &str, x: f64, y: f64) -> Command {
    Command::Walk(WalkCommand { agent_id: agent(name), goal: Position::new(x, y), arrive_radius: None })
}

pub fn deplete(name: &str, resource: &str, at: Position) -> Command {
    Command::Mine(MineCommand {
        agent_id: agent(name),
        resource: resource.to_string(),
        position: at,
        mode: MineMode::Deplete,
    })
}

pub fn place_line(name: &str, entity: &str, start: Position, end: Position) -> PlaceCommand {
    PlaceCommand {
        agent_id: agent(name),
        entities: vec![entity.to_string()],
        start,
        end,
        spacing: 1.0,
        orientation: None,
        skip_invalid: false,
        dry_run: false,
    }
}
