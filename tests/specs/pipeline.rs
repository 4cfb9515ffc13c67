// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sync pipeline scenarios.

use crate::prelude::*;
use tw_storage::ChangeLog;

fn follows(prev: Option<SnapshotState>, next: SnapshotState) -> bool {
    use SnapshotState::*;
    matches!(
        (prev, next),
        (None, FindEntities)
            | (None, Idle)
            | (Some(Idle), FindEntities)
            | (Some(FindEntities), Serialize)
            | (Some(Serialize), Write)
            | (Some(Write), Complete)
            | (Some(Complete), Idle)
    )
}

fn busy_sim() -> Sim {
    let mut config = EngineConfig::default();
    config.snapshot.chunk_size = 8;
    config.snapshot.budget_per_tick = 3;
    config.snapshot.rows_per_step = 2;

    let mut world = FakeWorld::new()
        .with_agent("a1", Position::new(0.0, 0.0))
        .with_resource("copper-ore", Position::new(12.5, 3.5), 40, 5);
    world.add_agent("a2", Position::new(0.0, 20.0), 1.0);
    for i in 0..6 {
        world.add_entity("wooden-chest", Position::new(0.5 + i as f64, 9.5), Direction::North);
    }
    Sim::with_config(world, config)
}

fn drive(sim: &mut Sim) {
    for x in 0..3 {
        for y in 0..3 {
            sim.engine.chart_chunk(ChunkPos::new(x, y), "world");
        }
    }
    sim.engine
        .start(deplete("a1", "copper-ore", Position::new(12.5, 3.5)), &mut sim.world)
        .unwrap();
    let line = place_line("a2", "small-electric-pole", Position::new(1.5, 17.5), Position::new(20.5, 17.5));
    sim.engine.start_place(line, &mut sim.world).unwrap();

    for t in 0..80 {
        if t < 30 && t % 7 == 3 {
            sim.engine.mark_dirty(ChunkPos::new(0, 1));
            sim.engine.mark_dirty(ChunkPos::new(0, 1));
        }
        sim.tick();
    }
}

#[test]
fn chunk_dirtied_twice_is_requeued_once() {
    let mut config = EngineConfig::default();
    config.snapshot.budget_per_tick = 2;
    let mut sim = Sim::with_config(FakeWorld::new(), config);
    let origin = ChunkPos::new(0, 0);

    sim.engine.chart_chunk(origin, "world");
    sim.tick();
    sim.engine.mark_dirty(origin);
    sim.engine.mark_dirty(origin);
    sim.ticks(10);

    let states = sim.chunk_states().remove(&origin).unwrap();
    similar_asserts::assert_eq!(
        states,
        vec![
            SnapshotState::FindEntities,
            SnapshotState::Serialize,
            SnapshotState::Write,
            SnapshotState::Complete,
            SnapshotState::Idle,
            SnapshotState::FindEntities,
            SnapshotState::Serialize,
            SnapshotState::Write,
            SnapshotState::Complete,
        ]
    );
}

#[test]
fn phase_transitions_never_skip_or_reorder() {
    let mut sim = busy_sim();
    drive(&mut sim);

    let all = sim.chunk_states();
    assert!(all.len() >= 9);
    for (chunk, states) in all {
        let mut prev = None;
        for state in states {
            assert!(follows(prev, state), "chunk {chunk}: {prev:?} -> {state:?}");
            prev = Some(state);
        }
        assert_eq!(prev, Some(SnapshotState::Complete), "chunk {chunk} did not settle");
    }
}

#[test]
fn sequence_is_strictly_increasing_without_gaps() {
    let mut sim = busy_sim();
    drive(&mut sim);

    let sent = sim.sent();
    assert!(sent.len() > 50);
    for (i, envelope) in sent.iter().enumerate() {
        assert_eq!(envelope.sequence, i as u64 + 1);
    }
    assert_eq!(sim.engine.dispatcher().stats().dropped, 0);
}

#[test]
fn dropped_notifications_leave_visible_gaps() {
    let mut sim = busy_sim();
    sim.transport.drop_next(3);
    drive(&mut sim);

    let seqs: Vec<u64> = sim.sent().iter().map(|e| e.sequence).collect();
    assert_eq!(seqs[0], 4);
    assert!(seqs.windows(2).all(|w| w[1] == w[0] + 1));
    assert_eq!(sim.engine.dispatcher().stats().dropped, 3);
}

#[test]
fn change_logs_are_tick_ordered() {
    let mut sim = busy_sim();
    drive(&mut sim);

    let layout = StorageLayout::new(sim.dir.path());
    let chunks = layout.stored_chunks().unwrap();
    assert!(!chunks.is_empty());

    let log = ChangeLog::new(layout);
    let mut total = 0;
    for chunk in chunks {
        let entries = log.read_log(chunk).unwrap();
        total += entries.len();
        assert!(entries.windows(2).all(|w| w[0].tick <= w[1].tick), "chunk {chunk} out of order");
    }
    // six chests plus the pole line
    assert!(total >= 6 + 20);
}

#[test]
fn entity_operations_match_the_log() {
    let mut sim = busy_sim();
    drive(&mut sim);

    let notified = sim
        .sent()
        .into_iter()
        .filter(|e| e.notification.name() == "entity_operation")
        .count();
    let layout = StorageLayout::new(sim.dir.path());
    let log = ChangeLog::new(layout.clone());
    let logged: usize = layout.stored_chunks().unwrap().into_iter().map(|c| log.read_log(c).unwrap().len()).sum();
    assert_eq!(notified, logged);
}

#[test]
fn dry_run_creates_no_job_and_no_log_entries() {
    let mut sim = Sim::new(FakeWorld::new().with_agent("a1", Position::new(0.0, 0.0)));
    sim.engine.chart_chunk(ChunkPos::new(0, 0), "world");
    sim.ticks(2);
    let sent_before = sim.sent().len();

    let mut cmd = place_line("a1", "stone-wall", Position::new(0.5, 0.5), Position::new(9.5, 0.5));
    cmd.dry_run = true;
    let Accepted::DryRun(report) = sim.engine.start_place(cmd, &mut sim.world).unwrap() else {
        panic!("dry run should not queue a job");
    };
    assert_eq!(report.entries.len(), 10);
    assert!(report.all_valid());

    sim.ticks(3);
    assert!(sim.engine.jobs().is_empty());
    assert!(sim.world.entities().is_empty());
    assert_eq!(sim.sent().len(), sent_before);
    let log = ChangeLog::new(StorageLayout::new(sim.dir.path()));
    assert!(log.read_log(ChunkPos::new(0, 0)).unwrap().is_empty());
}
