// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Action lifecycle envelope shared by every job kind.

use crate::clock::Tick;
use crate::id::{ActionId, AgentId};
use crate::job::{ActionStatus, FailureReason, JobKind};
use serde::{Deserialize, Serialize};

/// Terminal result recorded on `completed` and `cancelled` events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<FailureReason>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl Outcome {
    pub fn success() -> Self {
        Self { success: true, reason: None, detail: None }
    }

    pub fn failure(reason: FailureReason, detail: impl Into<String>) -> Self {
        Self { success: false, reason: Some(reason), detail: Some(detail.into()) }
    }
}

/// One lifecycle transition of one action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionEvent {
    pub action_id: ActionId,
    pub agent_id: AgentId,
    pub kind: JobKind,
    pub status: ActionStatus,
    pub tick: Tick,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    /// Kind-specific detail (progress counters, final report).
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
}

impl ActionEvent {
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether this event reports a successful terminal transition.
    pub fn succeeded(&self) -> bool {
        self.outcome.as_ref().is_some_and(|o| o.success)
    }

    /// One-line summary for logs.
    pub fn log_summary(&self) -> String {
        let mut s = format!("{} {} agent={} {}", self.kind, self.status, self.agent_id, self.action_id);
        if let Some(outcome) = &self.outcome {
            if let Some(reason) = outcome.reason {
                s.push_str(&format!(" reason={reason}"));
            }
        }
        s
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
