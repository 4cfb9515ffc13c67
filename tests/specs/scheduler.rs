// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job scheduler scenarios.

use crate::prelude::*;

fn world() -> FakeWorld {
    FakeWorld::new()
        .with_agent("a1", Position::new(0.0, 0.0))
        .with_resource("stone", Position::new(2.5, 2.5), 50, 10)
        .with_recipe("iron-gear-wheel", 10)
}

#[test]
fn walk_to_goal_completes_within_arrive_radius() {
    let mut sim = Sim::new(world());
    let Accepted::Queued(id) = sim.engine.start(walk("a1", 10.0, 10.0), &mut sim.world).unwrap() else {
        panic!("walk should queue");
    };

    sim.ticks(30);

    let events: Vec<ActionEvent> = sim.actions().into_iter().filter(|e| e.action_id == id).collect();
    let done = events.last().unwrap();
    assert_eq!(done.status, ActionStatus::Completed);
    assert!(done.succeeded());

    let at = sim.world.position("a1").unwrap();
    assert!(at.distance(&Position::new(10.0, 10.0)) <= sim.engine.config().walking.arrive_radius);
}

#[test]
fn deplete_fifty_units_at_ten_per_tick_takes_five_ticks() {
    let mut sim = Sim::new(world());
    sim.engine.start(deplete("a1", "stone", Position::new(2.5, 2.5)), &mut sim.world).unwrap();

    sim.ticks(4);
    assert!(sim.engine.job(&agent("a1"), JobKind::Mine).is_some());
    sim.tick();
    assert!(sim.engine.job(&agent("a1"), JobKind::Mine).is_none());

    let done = sim.actions().pop().unwrap();
    assert_eq!(done.status, ActionStatus::Completed);
    assert!(done.succeeded());
    assert_eq!(done.payload["mined"], 50);
}

#[test]
fn at_most_one_job_per_agent_and_kind() {
    let mut sim = Sim::new(world());
    let commands = vec![
        walk("a1", 20.0, 0.0),
        Command::Craft(tw_core::CraftCommand {
            agent_id: agent("a1"),
            recipe: "iron-gear-wheel".to_string(),
            count: 2,
        }),
    ];
    for cmd in &commands {
        sim.engine.start(cmd.clone(), &mut sim.world).unwrap();
    }
    let jobs_before = sim.engine.jobs().keys();
    let sent_before = sim.sent().len();

    for cmd in commands {
        let kind = cmd.kind();
        let err = sim.engine.start(cmd, &mut sim.world).unwrap_err();
        assert!(
            matches!(err, JobError::ConcurrentJob { requested, active, .. } if requested == kind && active == kind),
            "{kind}: {err}"
        );
    }

    assert_eq!(sim.engine.jobs().keys(), jobs_before);
    assert_eq!(sim.sent().len(), sent_before);
}

#[test]
fn cancel_is_idempotent() {
    let mut sim = Sim::new(world());
    for kind in JobKind::ALL {
        let result = sim.engine.cancel(&agent("a1"), kind, &mut sim.world);
        assert_eq!(result, CancelResult { success: true, cancelled: false, action_id: None });
    }
    assert!(sim.sent().is_empty());

    sim.engine.start(walk("a1", 20.0, 0.0), &mut sim.world).unwrap();
    sim.tick();
    assert!(sim.engine.cancel(&agent("a1"), JobKind::Walk, &mut sim.world).cancelled);
    let after_first = sim.sent().len();
    assert!(!sim.engine.cancel(&agent("a1"), JobKind::Walk, &mut sim.world).cancelled);
    assert_eq!(sim.sent().len(), after_first);
}

#[test]
fn lifecycle_events_are_well_formed_per_action() {
    let mut sim = Sim::new(world());
    sim.world.add_agent("a2", Position::new(8.0, 8.0), 1.0);
    sim.engine.start(walk("a1", 6.0, 0.0), &mut sim.world).unwrap();
    sim.engine.start(deplete("a1", "stone", Position::new(2.5, 2.5)), &mut sim.world).unwrap_err();
    sim.engine
        .start(
            Command::Craft(tw_core::CraftCommand {
                agent_id: agent("a2"),
                recipe: "iron-gear-wheel".to_string(),
                count: 4,
            }),
            &mut sim.world,
        )
        .unwrap();
    sim.ticks(20);

    let mut by_action: BTreeMap<String, Vec<ActionStatus>> = BTreeMap::new();
    for event in sim.actions() {
        by_action.entry(event.action_id.to_string()).or_default().push(event.status);
    }
    assert_eq!(by_action.len(), 2);

    for (id, statuses) in by_action {
        assert_eq!(statuses[0], ActionStatus::Queued, "{id}");
        assert_eq!(statuses[1], ActionStatus::Started, "{id}");
        let terminal = statuses.iter().filter(|s| s.is_terminal()).count();
        assert_eq!(terminal, 1, "{id}: {statuses:?}");
        assert!(statuses.last().unwrap().is_terminal(), "{id}: {statuses:?}");
        assert!(statuses[2..statuses.len() - 1].iter().all(|s| *s == ActionStatus::Progress), "{id}");
    }
}
