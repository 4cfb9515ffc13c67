// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::EngineConfig;
use crate::world::FakeWorld;
use tw_core::{AgentId, Position, Tick};

fn craft(world: &mut FakeWorld, recipe: &str, count: u32) -> Result<CraftJob, JobError> {
    let cmd = CraftCommand { agent_id: AgentId::new("a1"), recipe: recipe.to_string(), count };
    CraftJob::plan(JobMeta::new(cmd.agent_id.clone(), JobKind::Craft, Tick(0)), &cmd, world)
}

fn world() -> FakeWorld {
    FakeWorld::new().with_agent("a1", Position::default()).with_recipe("iron-gear-wheel", 10)
}

#[test]
fn completes_when_queue_drains() {
    let config = EngineConfig::default();
    let mut world = world();
    let mut job = craft(&mut world, "iron-gear-wheel", 3).unwrap();

    let mut ctx = JobCtx::new(&mut world, &config, Tick(1));
    assert_eq!(
        job.advance(&mut ctx).unwrap(),
        Advance::Progress(json!({ "crafted": 0, "remaining": 3 }))
    );

    let mut finished = None;
    for t in 2..10 {
        world.tick();
        let mut ctx = JobCtx::new(&mut world, &config, Tick(t));
        if let Advance::Finished(outcome, payload) = job.advance(&mut ctx).unwrap() {
            finished = Some((outcome, payload, t));
            break;
        }
    }
    let (outcome, payload, t) = finished.unwrap();
    assert!(outcome.success);
    assert_eq!(t, 4);
    assert_eq!(payload["crafted"], 3);
    assert_eq!(world.inventory("a1", "iron-gear-wheel"), 3);
}

#[test]
fn queue_not_draining_reports_nothing() {
    let config = EngineConfig::default();
    let mut world = world();
    let mut job = craft(&mut world, "iron-gear-wheel", 2).unwrap();

    let mut ctx = JobCtx::new(&mut world, &config, Tick(1));
    job.advance(&mut ctx).unwrap();
    let mut ctx = JobCtx::new(&mut world, &config, Tick(2));
    assert_eq!(job.advance(&mut ctx).unwrap(), Advance::Idle);
}

#[test]
fn unknown_recipe_is_invalid() {
    let mut world = world();
    let err = craft(&mut world, "rocket-silo", 1).unwrap_err();
    assert!(matches!(err, JobError::InvalidTarget { kind: JobKind::Craft, .. }));
}

#[test]
fn insufficient_ingredients_is_invalid() {
    let mut world = world();
    let err = craft(&mut world, "iron-gear-wheel", 11).unwrap_err();
    assert!(err.to_string().contains("only 10"));
}

#[test]
fn zero_count_is_invalid() {
    let mut world = world();
    assert!(craft(&mut world, "iron-gear-wheel", 0).is_err());
}
