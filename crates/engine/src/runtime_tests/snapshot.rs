// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::snapshot::DirtyMark;
use tw_core::{ChunkPhase, ChunkPos, Direction, LogOp, SnapshotState};

fn states(sent: &[Envelope], chunk: ChunkPos) -> Vec<SnapshotState> {
    sent.iter()
        .filter_map(|e| match e.notification {
            Notification::SnapshotState { state, chunk: c, .. } if c == chunk => Some(state),
            _ => None,
        })
        .collect()
}

fn place_one(agent: &str, x: f64, y: f64) -> PlaceCommand {
    PlaceCommand {
        agent_id: AgentId::new(agent),
        entities: vec!["iron-chest".to_string()],
        start: Position::new(x, y),
        end: Position::new(x, y),
        spacing: 1.0,
        orientation: Some(Direction::North),
        skip_invalid: false,
        dry_run: false,
    }
}

#[test]
fn chart_chunk_notifies_once() {
    let mut ctx = setup();
    assert!(ctx.engine.chart_chunk(ChunkPos::new(2, -1), "scout"));
    assert!(!ctx.engine.chart_chunk(ChunkPos::new(2, -1), "scout"));

    let sent = ctx.sent();
    assert_eq!(sent.len(), 1);
    assert!(matches!(
        &sent[0].notification,
        Notification::ChunkCharted { chunk, charted_by, .. } if *chunk == ChunkPos::new(2, -1) && charted_by == "scout"
    ));
}

#[test]
fn marking_an_unknown_chunk_charts_it_for_the_world() {
    let mut ctx = setup();
    assert_eq!(ctx.engine.mark_dirty(ChunkPos::new(0, 0)), DirtyMark::Revealed);
    assert_eq!(ctx.engine.mark_dirty_at(Position::new(3.0, 3.0)), DirtyMark::Marked);

    let charted: Vec<String> = ctx
        .sent()
        .into_iter()
        .filter_map(|e| match e.notification {
            Notification::ChunkCharted { charted_by, .. } => Some(charted_by),
            _ => None,
        })
        .collect();
    assert_eq!(charted, vec!["world".to_string()]);
}

#[test]
fn placement_marks_its_chunk_and_the_same_tick_snapshots_it() {
    let mut ctx = setup();
    ctx.engine.start_place(place_one("a1", 2.5, 2.5), &mut ctx.world).unwrap();
    let report = ctx.tick();

    assert_eq!(report.jobs_finished, 1);
    assert_eq!(report.chunk_steps, 4);
    assert_eq!(report.chunks_completed, vec![ChunkPos::new(0, 0)]);

    let sent = ctx.sent();
    let names: Vec<&str> = sent.iter().map(|e| e.notification.name()).collect();
    let last_action = names.iter().rposition(|n| *n == "action").unwrap();
    let charted = names.iter().position(|n| *n == "chunk_charted").unwrap();
    let first_state = names.iter().position(|n| *n == "snapshot_state").unwrap();
    assert!(last_action < charted);
    assert!(charted < first_state);

    assert!(sent.iter().any(|e| matches!(
        &e.notification,
        Notification::ChunkCharted { charted_by, .. } if charted_by == "a1"
    )));

    let log = ctx.engine.snapshot().change_log().read_log(ChunkPos::new(0, 0)).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].op, LogOp::Upsert);
    assert_eq!(log[0].tick, report.tick);
}

#[test]
fn snapshot_budget_is_spread_across_ticks() {
    let mut config = EngineConfig::default();
    config.snapshot.budget_per_tick = 2;
    let mut ctx = setup_with(config);
    for x in 0..3 {
        ctx.engine.chart_chunk(ChunkPos::new(x, 0), "world");
    }

    let mut completed = Vec::new();
    for _ in 0..6 {
        let report = ctx.tick();
        assert!(report.chunk_steps <= 2);
        completed.extend(report.chunks_completed);
    }
    assert_eq!(completed, vec![ChunkPos::new(0, 0), ChunkPos::new(1, 0), ChunkPos::new(2, 0)]);
    assert_eq!(ctx.tick().chunk_steps, 0);
}

#[test]
fn resync_all_rewrites_nothing_when_the_world_is_unchanged() {
    let mut ctx = setup();
    ctx.world.add_entity("iron-chest", Position::new(4.5, 4.5), Direction::North);
    ctx.engine.chart_chunk(ChunkPos::new(0, 0), "world");
    ctx.tick();
    let before = ctx.engine.snapshot().change_log().read_log(ChunkPos::new(0, 0)).unwrap().len();

    ctx.engine.resync_all();
    ctx.transport.take();
    let report = ctx.tick();

    assert_eq!(report.chunks_completed, vec![ChunkPos::new(0, 0)]);
    let sent = ctx.sent();
    assert!(sent.iter().all(|e| e.notification.name() != "entity_operation"));
    assert_eq!(
        states(&sent, ChunkPos::new(0, 0)),
        vec![
            SnapshotState::Idle,
            SnapshotState::FindEntities,
            SnapshotState::Serialize,
            SnapshotState::Write,
            SnapshotState::Complete,
        ]
    );
    assert_eq!(ctx.engine.snapshot().change_log().read_log(ChunkPos::new(0, 0)).unwrap().len(), before);
}

#[test]
fn external_change_is_picked_up_on_the_next_pass() {
    let mut ctx = setup();
    let unit = ctx.world.add_entity("inserter", Position::new(1.5, 1.5), Direction::North);
    ctx.engine.chart_chunk(ChunkPos::new(0, 0), "world");
    ctx.tick();

    ctx.world.rotate_entity(unit, Direction::East);
    ctx.engine.mark_dirty_at(Position::new(1.5, 1.5));
    ctx.tick();

    let log = ctx.engine.snapshot().change_log().read_log(ChunkPos::new(0, 0)).unwrap();
    let ops: Vec<LogOp> = log.iter().map(|e| e.op).collect();
    assert_eq!(ops, vec![LogOp::Upsert, LogOp::Rotate]);
    assert_eq!(ctx.engine.snapshot().tracker().get(ChunkPos::new(0, 0)).map(|r| r.phase), Some(ChunkPhase::Complete));
}

#[test]
fn sequence_numbers_are_gap_free_across_event_types() {
    let mut ctx = setup();
    ctx.world = FakeWorld::new()
        .with_agent("a1", Position::new(0.0, 0.0))
        .with_resource("coal", Position::new(40.5, 0.5), 30, 10);
    ctx.engine.chart_chunk(ChunkPos::new(0, 0), "world");
    ctx.engine.start_place(place_one("a1", 6.5, 6.5), &mut ctx.world).unwrap();
    let mine = MineCommand {
        agent_id: AgentId::new("a1"),
        resource: "coal".to_string(),
        position: Position::new(40.5, 0.5),
        mode: tw_core::MineMode::Deplete,
    };
    ctx.engine.start_mine(mine, &mut ctx.world).unwrap();
    ctx.run_jobs(10);
    ctx.tick();

    let seqs: Vec<u64> = ctx.sent().iter().map(|e| e.sequence).collect();
    let expected: Vec<u64> = (1..=seqs.len() as u64).collect();
    assert_eq!(seqs, expected);

    let kinds: std::collections::BTreeSet<&str> = ctx.sent().iter().map(|e| e.notification.name()).collect();
    assert!(kinds.len() >= 4, "expected a mix of event types, got {kinds:?}");
}
