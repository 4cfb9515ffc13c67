// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tw_core::{FailureReason, FileIoOp, FileType, MineMode};

#[test]
fn walk_reports_full_lifecycle() {
    let mut ctx = setup();
    let id = ctx.engine.start_walk(walk_to("a1", 10.0, 10.0), &mut ctx.world).unwrap();
    assert_eq!(id, "walk:a1:0");

    let ticks = ctx.run_jobs(40);
    assert_eq!(ticks, 14);

    let statuses = ctx.statuses(&id);
    assert_eq!(statuses.first(), Some(&ActionStatus::Queued));
    assert_eq!(statuses.get(1), Some(&ActionStatus::Started));
    assert_eq!(statuses.last(), Some(&ActionStatus::Completed));

    let last = ctx.actions().pop().unwrap();
    assert!(last.succeeded());
    let distance = last.payload["distance"].as_f64().unwrap();
    assert!(distance <= ctx.engine.config().walking.arrive_radius);
    assert!(ctx.engine.job(&AgentId::new("a1"), JobKind::Walk).is_none());
}

#[test]
fn queued_event_carries_the_command() {
    let mut ctx = setup();
    ctx.engine.start_walk(walk_to("a1", 5.0, 0.0), &mut ctx.world).unwrap();

    let queued = &ctx.actions()[0];
    assert_eq!(queued.status, ActionStatus::Queued);
    assert_eq!(queued.payload["kind"], "walk");
    assert_eq!(queued.payload["goal"]["x"], 5.0);
}

#[test]
fn second_job_of_same_kind_is_rejected_without_touching_the_first() {
    let mut ctx = setup();
    let id = ctx.engine.start_walk(walk_to("a1", 10.0, 0.0), &mut ctx.world).unwrap();
    ctx.tick();
    let before = ctx.engine.job(&AgentId::new("a1"), JobKind::Walk).map(|j| j.meta().clone());

    let err = ctx.engine.start_walk(walk_to("a1", -10.0, 0.0), &mut ctx.world).unwrap_err();
    assert!(matches!(
        err,
        JobError::ConcurrentJob { requested: JobKind::Walk, active: JobKind::Walk, .. }
    ));

    let after = ctx.engine.job(&AgentId::new("a1"), JobKind::Walk).map(|j| j.meta().clone());
    assert_eq!(before, after);
    assert_eq!(after.map(|m| m.action_id), Some(id));
}

#[test]
fn conflicting_kind_is_rejected_but_independent_kind_starts() {
    let mut ctx = setup();
    ctx.world = FakeWorld::new()
        .with_agent("a1", Position::new(0.0, 0.0))
        .with_resource("iron-ore", Position::new(0.5, 0.5), 100, 5)
        .with_recipe("gear", 3);
    ctx.engine.start_walk(walk_to("a1", 10.0, 0.0), &mut ctx.world).unwrap();

    let mine = MineCommand {
        agent_id: AgentId::new("a1"),
        resource: "iron-ore".to_string(),
        position: Position::new(0.5, 0.5),
        mode: MineMode::Deplete,
    };
    let err = ctx.engine.start_mine(mine, &mut ctx.world).unwrap_err();
    assert!(matches!(err, JobError::ConcurrentJob { requested: JobKind::Mine, active: JobKind::Walk, .. }));

    let craft = CraftCommand { agent_id: AgentId::new("a1"), recipe: "gear".to_string(), count: 2 };
    ctx.engine.start_craft(craft, &mut ctx.world).unwrap();
    assert_eq!(ctx.engine.jobs().active_kinds(&AgentId::new("a1")), vec![JobKind::Walk, JobKind::Craft]);
}

#[test]
fn invalid_target_is_rejected_without_events() {
    let mut ctx = setup();
    ctx.world.set_unreachable(Position::new(50.0, 50.0));

    let err = ctx.engine.start_walk(walk_to("a1", 50.0, 50.0), &mut ctx.world).unwrap_err();
    assert!(matches!(err, JobError::InvalidTarget { kind: JobKind::Walk, .. }));
    assert!(ctx.engine.jobs().is_empty());
    assert!(ctx.sent().is_empty());
}

#[test]
fn cancel_without_job_is_a_silent_noop() {
    let mut ctx = setup();
    let result = ctx.engine.cancel(&AgentId::new("a1"), JobKind::Mine, &mut ctx.world);

    assert_eq!(result, CancelResult::nothing_to_cancel());
    assert!(result.success);
    assert!(!result.cancelled);
    assert!(ctx.sent().is_empty());
}

#[test]
fn cancel_releases_movement_and_reports_progress() {
    let mut ctx = setup();
    let id = ctx.engine.start_walk(walk_to("a1", 20.0, 0.0), &mut ctx.world).unwrap();
    ctx.tick();
    ctx.tick();
    assert!(ctx.world.is_moving("a1"));

    let result = ctx.engine.cancel(&AgentId::new("a1"), JobKind::Walk, &mut ctx.world);
    assert_eq!(result, CancelResult::cancelled(id.clone()));
    assert!(!ctx.world.is_moving("a1"));
    assert!(ctx.engine.jobs().is_empty());

    let last = ctx.actions().pop().unwrap();
    assert_eq!(last.status, ActionStatus::Cancelled);
    assert_eq!(last.action_id, id);
    assert_eq!(last.payload["goal"]["x"], 20.0);

    // Nothing further for a cancelled action
    let events_before = ctx.actions().len();
    ctx.tick();
    assert_eq!(ctx.actions().len(), events_before);
    assert!(!ctx.engine.cancel(&AgentId::new("a1"), JobKind::Walk, &mut ctx.world).cancelled);
}

#[test]
fn world_fault_fails_only_the_faulting_job() {
    let mut ctx = setup();
    ctx.world = FakeWorld::new().with_agent("a1", Position::new(0.0, 0.0)).with_recipe("gear", 5);
    ctx.world.add_agent("a2", Position::new(5.0, 5.0), 1.0);

    let walk_id = ctx.engine.start_walk(walk_to("a1", 10.0, 0.0), &mut ctx.world).unwrap();
    let craft = CraftCommand { agent_id: AgentId::new("a2"), recipe: "gear".to_string(), count: 3 };
    ctx.engine.start_craft(craft, &mut ctx.world).unwrap();

    ctx.world.fail("step_toward");
    let report = ctx.tick();
    assert_eq!(report.jobs_advanced, 2);
    assert_eq!(report.jobs_finished, 1);

    let failed = ctx.actions().into_iter().find(|e| e.action_id == walk_id && e.is_terminal()).unwrap();
    let outcome = failed.outcome.unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.reason, Some(FailureReason::WorldFault));
    assert!(!ctx.world.is_moving("a1"));

    assert!(ctx.engine.job(&AgentId::new("a2"), JobKind::Craft).is_some());
    ctx.run_jobs(10);
    assert_eq!(ctx.world.inventory("a2", "gear"), 3);
}

#[test]
fn deplete_mining_finishes_in_five_ticks() {
    let mut ctx = setup();
    ctx.world = FakeWorld::new()
        .with_agent("a1", Position::new(0.0, 0.0))
        .with_resource("stone", Position::new(1.5, 1.5), 50, 10);
    let cmd = MineCommand {
        agent_id: AgentId::new("a1"),
        resource: "stone".to_string(),
        position: Position::new(1.5, 1.5),
        mode: MineMode::Deplete,
    };
    let id = ctx.engine.start_mine(cmd, &mut ctx.world).unwrap();

    assert_eq!(ctx.run_jobs(10), 5);
    let last = ctx.actions().into_iter().filter(|e| e.action_id == id).last().unwrap();
    assert!(last.succeeded());
    assert_eq!(ctx.world.inventory("a1", "stone"), 50);
}

#[test]
fn every_action_event_is_journaled() {
    let mut ctx = setup();
    ctx.engine.start_walk(walk_to("a1", 3.0, 0.0), &mut ctx.world).unwrap();
    ctx.run_jobs(10);

    let journaled = tw_storage::ActionJournal::open(ctx.engine.layout().actions_path()).read_all().unwrap();
    assert_eq!(journaled, ctx.actions());

    let sent = ctx.sent();
    let journal_io: Vec<FileIoOp> = sent
        .iter()
        .filter_map(|e| match &e.notification {
            Notification::FileIo { operation, file_type: FileType::Actions, .. } => Some(*operation),
            _ => None,
        })
        .collect();
    assert_eq!(journal_io.len(), journaled.len());
    assert_eq!(journal_io[0], FileIoOp::Written);
    assert!(journal_io[1..].iter().all(|op| *op == FileIoOp::Appended));

    // Each journal signal directly follows its action event
    for pair in sent.windows(2) {
        if let Notification::FileIo { file_type: FileType::Actions, .. } = pair[1].notification {
            assert!(matches!(pair[0].notification, Notification::Action(_)));
        }
    }
}

#[test]
fn journal_can_be_disabled() {
    let mut config = EngineConfig::default();
    config.journal.actions = false;
    let mut ctx = setup_with(config);
    ctx.engine.start_walk(walk_to("a1", 3.0, 0.0), &mut ctx.world).unwrap();
    ctx.run_jobs(10);

    assert!(!ctx.engine.layout().actions_path().exists());
    assert!(ctx.sent().iter().all(|e| !matches!(e.notification, Notification::FileIo { .. })));
}

#[test]
fn placement_dry_run_creates_nothing() {
    let mut ctx = setup();
    ctx.world.block_tile(Position::new(2.5, 0.5));
    let cmd = PlaceCommand {
        agent_id: AgentId::new("a1"),
        entities: vec!["stone-furnace".to_string()],
        start: Position::new(0.5, 0.5),
        end: Position::new(4.5, 0.5),
        spacing: 1.0,
        orientation: None,
        skip_invalid: false,
        dry_run: true,
    };

    let Accepted::DryRun(report) = ctx.engine.start_place(cmd, &mut ctx.world).unwrap() else {
        panic!("expected a dry-run report");
    };
    assert_eq!(report.entries.len(), 5);
    assert_eq!(report.invalid, 1);
    assert!(!report.entries[2].valid);

    assert!(ctx.engine.jobs().is_empty());
    assert!(ctx.sent().is_empty());
    assert!(ctx.world.entities().is_empty());
    ctx.tick();
    assert!(ctx.engine.layout().stored_chunks().unwrap().is_empty());
}

#[test]
fn placement_with_skip_invalid_places_the_rest() {
    let mut ctx = setup();
    ctx.world.block_tile(Position::new(1.5, 0.5));
    let cmd = PlaceCommand {
        agent_id: AgentId::new("a1"),
        entities: vec!["small-lamp".to_string(), "wooden-pole".to_string()],
        start: Position::new(0.5, 0.5),
        end: Position::new(3.5, 0.5),
        spacing: 1.0,
        orientation: None,
        skip_invalid: true,
        dry_run: false,
    };
    let Accepted::Queued(id) = ctx.engine.start_place(cmd, &mut ctx.world).unwrap() else {
        panic!("expected a queued job");
    };

    ctx.run_jobs(10);
    assert_eq!(ctx.world.entities().len(), 3);
    let last = ctx.actions().into_iter().filter(|e| e.action_id == id).last().unwrap();
    assert!(last.succeeded());
    assert_eq!(last.payload["placed"], 3);
}
