// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::notify::MemoryTransport;
use crate::world::FakeWorld;
use tempfile::TempDir;
use tw_core::{ActionStatus, Envelope, Position, StepClock};

mod lifecycle;
mod persistence;
mod snapshot;

struct TestContext {
    dir: TempDir,
    engine: Engine<StepClock, MemoryTransport>,
    world: FakeWorld,
    clock: StepClock,
    transport: MemoryTransport,
}

fn setup() -> TestContext {
    setup_with(EngineConfig::default())
}

/// Route engine logs to the test harness; filter with `RUST_LOG`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn setup_with(config: EngineConfig) -> TestContext {
    init_tracing();
    let dir = TempDir::new().unwrap();
    let clock = StepClock::new();
    let transport = MemoryTransport::new();
    let engine = Engine::new(config, clock.clone(), transport.clone(), StorageLayout::new(dir.path()));
    let world = FakeWorld::new().with_agent("a1", Position::new(0.0, 0.0));
    TestContext { dir, engine, world, clock, transport }
}

impl TestContext {
    /// Advance the clock and the world, then run the engine.
    fn tick(&mut self) -> TickReport {
        self.clock.advance();
        self.world.tick();
        self.engine.run_tick(&mut self.world)
    }

    /// Tick until no job is active, at most `limit` times.
    fn run_jobs(&mut self, limit: usize) -> usize {
        for n in 1..=limit {
            self.tick();
            if self.engine.jobs().is_empty() {
                return n;
            }
        }
        panic!("jobs still active after {limit} ticks");
    }

    fn sent(&self) -> Vec<Envelope> {
        self.transport.sent()
    }

    fn actions(&self) -> Vec<ActionEvent> {
        self.sent()
            .into_iter()
            .filter_map(|e| match e.notification {
                Notification::Action(ev) => Some(ev),
                _ => None,
            })
            .collect()
    }

    fn statuses(&self, action_id: &ActionId) -> Vec<ActionStatus> {
        self.actions().iter().filter(|e| &e.action_id == action_id).map(|e| e.status).collect()
    }
}

fn walk_to(agent: &str, x: f64, y: f64) -> WalkCommand {
    WalkCommand { agent_id: AgentId::new(agent), goal: Position::new(x, y), arrive_radius: None }
}
