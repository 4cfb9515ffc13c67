// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::EngineConfig;
use crate::world::FakeWorld;
use tw_core::{AgentId, Tick};

fn walk(world: &mut FakeWorld, config: &EngineConfig, goal: Position) -> Result<WalkJob, JobError> {
    let cmd = WalkCommand { agent_id: AgentId::new("a1"), goal, arrive_radius: None };
    WalkJob::plan(JobMeta::new(cmd.agent_id.clone(), JobKind::Walk, Tick(0)), &cmd, world, &config.walking)
}

/// Advance until finished or `limit` ticks; returns the outcome and tick count.
fn run(job: &mut WalkJob, world: &mut FakeWorld, config: &EngineConfig, limit: u64) -> (Outcome, serde_json::Value, u64) {
    for t in 1..=limit {
        let mut ctx = JobCtx::new(world, config, Tick(t));
        if let Advance::Finished(outcome, payload) = job.advance(&mut ctx).unwrap() {
            return (outcome, payload, t);
        }
    }
    panic!("walk did not finish in {limit} ticks");
}

#[test]
fn walks_to_goal_and_stops() {
    let config = EngineConfig::default();
    let mut world = FakeWorld::new().with_agent("a1", Position::new(0.0, 0.0));
    let mut job = walk(&mut world, &config, Position::new(10.0, 0.0)).unwrap();

    let (outcome, payload, ticks) = run(&mut job, &mut world, &config, 50);

    assert!(outcome.success);
    assert_eq!(ticks, 9);
    assert!(payload["distance"].as_f64().unwrap() <= 1.0);
    assert!(!world.is_moving("a1"));
}

#[test]
fn already_at_goal_completes_on_first_advance() {
    let config = EngineConfig::default();
    let mut world = FakeWorld::new().with_agent("a1", Position::new(3.0, 3.0));
    let mut job = walk(&mut world, &config, Position::new(3.5, 3.0)).unwrap();

    let (outcome, _, ticks) = run(&mut job, &mut world, &config, 5);
    assert!(outcome.success);
    assert_eq!(ticks, 1);
}

#[test]
fn unreachable_goal_is_rejected_at_start() {
    let config = EngineConfig::default();
    let mut world = FakeWorld::new().with_agent("a1", Position::new(0.0, 0.0));
    world.set_unreachable(Position::new(9.0, 9.0));

    let err = walk(&mut world, &config, Position::new(9.0, 9.0)).unwrap_err();
    assert!(matches!(err, JobError::InvalidTarget { kind: JobKind::Walk, .. }));
}

#[test]
fn stall_triggers_bounded_replans_then_fails() {
    let mut config = EngineConfig::default();
    config.walking.stall_ticks = 2;
    config.walking.max_replans = 1;
    let mut world = FakeWorld::new().with_agent("a1", Position::new(0.0, 0.0));
    let mut job = walk(&mut world, &config, Position::new(10.0, 0.0)).unwrap();
    world.freeze("a1");

    let (outcome, _, ticks) = run(&mut job, &mut world, &config, 20);

    assert_eq!(outcome.reason, Some(FailureReason::Stalled));
    assert_eq!(job.replans(), 1);
    assert_eq!(ticks, 4);
    assert!(!world.is_moving("a1"));
}

#[test]
fn replan_to_vanished_path_is_unreachable() {
    let mut config = EngineConfig::default();
    config.walking.stall_ticks = 1;
    let mut world = FakeWorld::new().with_agent("a1", Position::new(0.0, 0.0));
    let goal = Position::new(10.0, 0.0);
    let mut job = walk(&mut world, &config, goal).unwrap();
    world.freeze("a1");
    world.set_unreachable(goal);

    let (outcome, _, _) = run(&mut job, &mut world, &config, 5);
    assert_eq!(outcome.reason, Some(FailureReason::Unreachable));
}

#[test]
fn recovers_after_replan() {
    let mut config = EngineConfig::default();
    config.walking.stall_ticks = 2;
    let mut world = FakeWorld::new().with_agent("a1", Position::new(0.0, 0.0));
    let mut job = walk(&mut world, &config, Position::new(5.0, 0.0)).unwrap();
    world.freeze("a1");

    for t in 1..=2 {
        let mut ctx = JobCtx::new(&mut world, &config, Tick(t));
        job.advance(&mut ctx).unwrap();
    }
    assert_eq!(job.replans(), 1);
    world.unfreeze("a1");

    let (outcome, _, _) = run(&mut job, &mut world, &config, 20);
    assert!(outcome.success);
}

#[test]
fn world_fault_propagates_to_caller() {
    let config = EngineConfig::default();
    let mut world = FakeWorld::new().with_agent("a1", Position::new(0.0, 0.0));
    let mut job = walk(&mut world, &config, Position::new(10.0, 0.0)).unwrap();
    world.fail("step_toward");

    let mut ctx = JobCtx::new(&mut world, &config, Tick(1));
    assert!(job.advance(&mut ctx).is_err());
}
