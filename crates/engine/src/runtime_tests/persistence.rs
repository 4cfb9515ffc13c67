// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::config::ConfigError;
use tw_core::{ChunkPhase, ChunkPos, Direction, FileType, Position, Tick};

#[test]
fn checkpoint_round_trips_chunks_and_sequence() {
    let mut config = EngineConfig::default();
    config.snapshot.budget_per_tick = 6;
    let mut ctx = setup_with(config.clone());
    ctx.engine.chart_chunk(ChunkPos::new(0, 0), "world");
    ctx.engine.chart_chunk(ChunkPos::new(1, 0), "world");
    ctx.tick();

    let tick = ctx.engine.checkpoint().unwrap();
    assert!(ctx.engine.layout().checkpoint_path().exists());
    let last = ctx.sent().pop().unwrap();
    assert!(matches!(last.notification, Notification::FileIo { file_type: FileType::Checkpoint, .. }));

    let transport = MemoryTransport::new();
    let mut restored = Engine::new(config, StepClock::new(), transport.clone(), StorageLayout::new(ctx.dir.path()));
    assert_eq!(restored.restore().unwrap(), Some(tick));
    assert_eq!(restored.dispatcher().next_sequence(), last.sequence + 1);

    let tracker = restored.snapshot().tracker();
    let done = tracker.get(ChunkPos::new(0, 0)).unwrap();
    assert_eq!(done.phase, ChunkPhase::Complete);
    assert!(done.ever_written);
    let mid = tracker.get(ChunkPos::new(1, 0)).unwrap();
    assert_eq!(mid.phase, ChunkPhase::Idle);
    assert!(mid.needs_resync);

    restored.run_tick(&mut ctx.world);
    let resumed = transport.sent();
    assert_eq!(resumed.first().map(|e| e.sequence), Some(last.sequence + 1));
    assert_eq!(restored.snapshot().tracker().get(ChunkPos::new(1, 0)).map(|r| r.phase), Some(ChunkPhase::Complete));
}

/// Checkpoint at tick 1, then let a later pass write the chunk at tick 6.
fn checkpoint_then_write_later(ctx: &mut TestContext) -> Tick {
    ctx.engine.chart_chunk(ChunkPos::new(0, 0), "world");
    ctx.tick();
    let checkpoint = ctx.engine.checkpoint().unwrap();

    ctx.clock.advance_by(4);
    ctx.world.add_entity("wooden-chest", Position::new(2.5, 2.5), Direction::North);
    ctx.engine.mark_dirty(ChunkPos::new(0, 0));
    ctx.tick();
    checkpoint
}

fn restored_engine(ctx: &TestContext, clock: &StepClock) -> Engine<StepClock, MemoryTransport> {
    Engine::new(EngineConfig::default(), clock.clone(), MemoryTransport::new(), StorageLayout::new(ctx.dir.path()))
}

#[test]
fn restore_resumes_at_the_newest_logged_tick() {
    let mut ctx = setup();
    let checkpoint = checkpoint_then_write_later(&mut ctx);
    assert_eq!(checkpoint, Tick(1));

    let clock = StepClock::new();
    let mut restored = restored_engine(&ctx, &clock);
    assert_eq!(restored.restore().unwrap(), Some(Tick(6)));
}

#[test]
fn rewound_clock_after_restore_still_completes_the_chunk() {
    let mut ctx = setup();
    let checkpoint = checkpoint_then_write_later(&mut ctx);

    let clock = StepClock::new();
    let mut restored = restored_engine(&ctx, &clock);
    restored.restore().unwrap();
    clock.set(checkpoint);

    ctx.world.add_entity("iron-chest", Position::new(6.5, 2.5), Direction::East);
    restored.mark_dirty(ChunkPos::new(0, 0));
    for _ in 0..3 {
        clock.advance();
        restored.run_tick(&mut ctx.world);
    }

    let record = restored.snapshot().tracker().get(ChunkPos::new(0, 0)).unwrap();
    assert!(!record.failed);
    assert_eq!(record.phase, ChunkPhase::Complete);
    let ticks: Vec<Tick> =
        restored.snapshot().change_log().read_log(ChunkPos::new(0, 0)).unwrap().iter().map(|e| e.tick).collect();
    assert_eq!(ticks.len(), 2);
    assert!(ticks.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(ticks.last(), Some(&Tick(6)));
}

#[test]
fn restore_without_checkpoint_is_a_noop() {
    let mut ctx = setup();
    assert_eq!(ctx.engine.restore().unwrap(), None);
    assert!(ctx.engine.snapshot().tracker().is_empty());
    assert_eq!(ctx.engine.dispatcher().next_sequence(), 1);
}

#[test]
fn open_requires_a_state_dir() {
    let result = Engine::open(EngineConfig::default(), StepClock::new(), MemoryTransport::new());
    assert!(matches!(result, Err(ConfigError::Invalid { field: "state_dir", .. })));

    let dir = TempDir::new().unwrap();
    let config = EngineConfig { state_dir: Some(dir.path().to_path_buf()), ..EngineConfig::default() };
    let engine = Engine::open(config, StepClock::new(), MemoryTransport::new()).unwrap();
    assert_eq!(engine.layout().root(), dir.path());
}
