// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::EngineConfig;
use crate::jobs::{CraftJob, MineJob, PlaceJob, WalkJob};
use crate::lifecycle::JobMeta;
use crate::world::FakeWorld;
use proptest::prelude::*;
use tw_core::test_support::strategies::arb_job_kind;
use tw_core::{CraftCommand, MineCommand, MineMode, PlaceCommand, Position, Tick, WalkCommand};
use yare::parameterized;

fn world() -> FakeWorld {
    FakeWorld::new()
        .with_agent("a1", Position::default())
        .with_agent("a2", Position::default())
        .with_resource("stone", Position::new(1.5, 1.5), 100, 5)
        .with_recipe("gear", 10)
}

fn job(agent: &str, kind: JobKind, tick: u64) -> Job {
    let mut world = world();
    let config = EngineConfig::default();
    let agent_id = AgentId::new(agent);
    let meta = JobMeta::new(agent_id.clone(), kind, Tick(tick));
    let result = match kind {
        JobKind::Walk => {
            let cmd = WalkCommand { agent_id, goal: Position::new(8.0, 8.0), arrive_radius: None };
            WalkJob::plan(meta, &cmd, &mut world, &config.walking).map(Job::Walk)
        }
        JobKind::Mine => {
            let cmd = MineCommand {
                agent_id,
                resource: "stone".into(),
                position: Position::new(1.5, 1.5),
                mode: MineMode::Deplete,
            };
            MineJob::plan(meta, &cmd, &mut world).map(Job::Mine)
        }
        JobKind::Craft => {
            let cmd = CraftCommand { agent_id, recipe: "gear".into(), count: 2 };
            CraftJob::plan(meta, &cmd, &mut world).map(Job::Craft)
        }
        JobKind::Place => {
            let cmd = PlaceCommand {
                agent_id,
                entities: vec!["belt".into()],
                start: Position::default(),
                end: Position::new(3.0, 0.0),
                spacing: 1.0,
                orientation: None,
                skip_invalid: false,
                dry_run: false,
            };
            PlaceJob::plan(meta, &cmd, &config.placement).map(Job::Place)
        }
    };
    result.unwrap()
}

#[parameterized(
    walk_blocks_mine = { JobKind::Walk, JobKind::Mine },
    mine_blocks_walk = { JobKind::Mine, JobKind::Walk },
    walk_blocks_place = { JobKind::Walk, JobKind::Place },
    place_blocks_walk = { JobKind::Place, JobKind::Walk },
    craft_blocks_craft = { JobKind::Craft, JobKind::Craft },
)]
fn conflicting_kind_is_rejected(active: JobKind, requested: JobKind) {
    let mut store = JobStore::new();
    store.insert(job("a1", active, 1)).unwrap();

    let err = store.insert(job("a1", requested, 2)).unwrap_err();

    match err {
        JobError::ConcurrentJob { agent, requested: r, active: a } => {
            assert_eq!(agent, "a1");
            assert_eq!((r, a), (requested, active));
        }
        other => panic!("expected ConcurrentJob, got {other:?}"),
    }
}

#[parameterized(
    craft_with_walk = { JobKind::Walk, JobKind::Craft },
    mine_with_place = { JobKind::Mine, JobKind::Place },
    place_with_craft = { JobKind::Place, JobKind::Craft },
)]
fn compatible_kinds_coexist(first: JobKind, second: JobKind) {
    let mut store = JobStore::new();
    store.insert(job("a1", first, 1)).unwrap();
    store.insert(job("a1", second, 1)).unwrap();

    assert_eq!(store.len(), 2);
}

#[test]
fn agents_are_independent() {
    let mut store = JobStore::new();
    store.insert(job("a1", JobKind::Walk, 1)).unwrap();
    store.insert(job("a2", JobKind::Walk, 1)).unwrap();

    assert_eq!(
        store.keys(),
        vec![(AgentId::new("a1"), JobKind::Walk), (AgentId::new("a2"), JobKind::Walk)]
    );
}

#[test]
fn remove_drops_empty_agents() {
    let mut store = JobStore::new();
    store.insert(job("a1", JobKind::Craft, 1)).unwrap();

    assert!(store.remove(&AgentId::new("a1"), JobKind::Craft).is_some());
    assert!(store.remove(&AgentId::new("a1"), JobKind::Craft).is_none());
    assert!(store.is_empty());
}

proptest! {
    #[test]
    fn same_kind_twice_never_replaces_existing(kind in arb_job_kind()) {
        let mut store = JobStore::new();
        store.insert(job("a1", kind, 1)).unwrap();

        let rejected = store.insert(job("a1", kind, 2));

        prop_assert!(
            matches!(rejected, Err(JobError::ConcurrentJob { .. })),
            "expected ConcurrentJob, got {:?}",
            rejected
        );
        let existing = store.get(&AgentId::new("a1"), kind).unwrap();
        prop_assert_eq!(existing.meta().queued_at, Tick(1));
        prop_assert_eq!(store.len(), 1);
    }
}
