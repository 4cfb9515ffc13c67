// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action lifecycle envelope shared by every job kind.
//!
//! A job emits `queued` when accepted, `started` on its first advance, any
//! number of `progress` events, then exactly one terminal `completed` or
//! `cancelled`.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tw_core::{ActionEvent, ActionId, ActionStatus, AgentId, JobKind, Outcome, Tick};

/// Identity and bookkeeping common to all jobs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobMeta {
    pub action_id: ActionId,
    pub agent_id: AgentId,
    pub kind: JobKind,
    pub queued_at: Tick,
    pub started: bool,
}

impl JobMeta {
    pub fn new(agent_id: AgentId, kind: JobKind, tick: Tick) -> Self {
        Self {
            action_id: ActionId::generate(&agent_id, kind, tick),
            agent_id,
            kind,
            queued_at: tick,
            started: false,
        }
    }

    fn event(&self, status: ActionStatus, tick: Tick, outcome: Option<Outcome>, payload: Value) -> ActionEvent {
        ActionEvent {
            action_id: self.action_id.clone(),
            agent_id: self.agent_id.clone(),
            kind: self.kind,
            status,
            tick,
            outcome,
            payload,
        }
    }

    pub fn queued(&self, tick: Tick, payload: Value) -> ActionEvent {
        self.event(ActionStatus::Queued, tick, None, payload)
    }

    pub fn started(&self, tick: Tick) -> ActionEvent {
        self.event(ActionStatus::Started, tick, None, Value::Null)
    }

    pub fn progress(&self, tick: Tick, payload: Value) -> ActionEvent {
        self.event(ActionStatus::Progress, tick, None, payload)
    }

    pub fn completed(&self, tick: Tick, outcome: Outcome, payload: Value) -> ActionEvent {
        self.event(ActionStatus::Completed, tick, Some(outcome), payload)
    }

    pub fn cancelled(&self, tick: Tick, payload: Value) -> ActionEvent {
        self.event(ActionStatus::Cancelled, tick, None, payload)
    }
}

/// What one advance of a job produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// Still running, nothing to report
    Idle,
    /// Still running, report progress
    Progress(Value),
    /// Terminal; the job is removed after its `completed` event
    Finished(Outcome, Value),
}

/// Reply to a cancel request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelResult {
    pub success: bool,
    pub cancelled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_id: Option<ActionId>,
}

impl CancelResult {
    pub fn nothing_to_cancel() -> Self {
        Self { success: true, cancelled: false, action_id: None }
    }

    pub fn cancelled(action_id: ActionId) -> Self {
        Self { success: true, cancelled: true, action_id: Some(action_id) }
    }
}

#[cfg(test)]
#[path = "lifecycle_tests.rs"]
mod tests;
