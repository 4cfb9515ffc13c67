// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn agent_id_display_and_eq() {
    let id = AgentId::new("engineer-1");
    assert_eq!(id.to_string(), "engineer-1");
    assert_eq!(id, "engineer-1");
    assert_eq!(AgentId::from("engineer-1"), id);
}

#[test]
fn agent_id_serde_is_transparent() {
    let id = AgentId::new("a7");
    let json = serde_json::to_string(&id).unwrap();
    assert_eq!(json, "\"a7\"");
    let parsed: AgentId = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, id);
}

#[test]
fn action_id_is_deterministic() {
    let agent = AgentId::new("a1");
    let first = ActionId::generate(&agent, JobKind::Walk, Tick(120));
    let again = ActionId::generate(&agent, JobKind::Walk, Tick(120));
    assert_eq!(first, again);
    assert_eq!(first, "walk:a1:120");
}

#[yare::parameterized(
    other_tick  = { "a1", JobKind::Walk, 121 },
    other_kind  = { "a1", JobKind::Mine, 120 },
    other_agent = { "a2", JobKind::Walk, 120 },
)]
fn action_id_differs_when_any_input_differs(agent: &str, kind: JobKind, tick: u64) {
    let base = ActionId::generate(&AgentId::new("a1"), JobKind::Walk, Tick(120));
    assert_ne!(ActionId::generate(&AgentId::new(agent), kind, Tick(tick)), base);
}

#[test]
fn action_id_reports_its_kind() {
    let id = ActionId::generate(&AgentId::new("x:y"), JobKind::Craft, Tick(1));
    assert_eq!(id.kind(), Some(JobKind::Craft));
    assert_eq!(ActionId::new("nonsense").kind(), None);
}
