// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job kinds and lifecycle status vocabulary.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of long-running agent activity.
///
/// An agent holds at most one active job per kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Walk,
    Mine,
    Craft,
    Place,
}

crate::simple_display! {
    JobKind {
        Walk => "walk",
        Mine => "mine",
        Craft => "craft",
        Place => "place",
    }
}

impl FromStr for JobKind {
    type Err = UnknownJobKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "walk" => Ok(JobKind::Walk),
            "mine" => Ok(JobKind::Mine),
            "craft" => Ok(JobKind::Craft),
            "place" => Ok(JobKind::Place),
            other => Err(UnknownJobKind(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown job kind: {0}")]
pub struct UnknownJobKind(pub String);

impl JobKind {
    pub const ALL: [JobKind; 4] = [JobKind::Walk, JobKind::Mine, JobKind::Craft, JobKind::Place];

    /// Whether a job of kind `self` and a job of kind `other` contend for the
    /// same agent capability and therefore cannot both be active.
    ///
    /// Walking moves the character, which interrupts hand mining and
    /// placement reach. Crafting only uses the craft queue.
    pub fn conflicts_with(self, other: JobKind) -> bool {
        use JobKind::*;
        matches!(
            (self, other),
            (Walk, Walk)
                | (Mine, Mine)
                | (Craft, Craft)
                | (Place, Place)
                | (Walk, Mine)
                | (Mine, Walk)
                | (Walk, Place)
                | (Place, Walk)
        )
    }
}

/// Status carried by an action lifecycle event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Queued,
    Started,
    Progress,
    Completed,
    Cancelled,
}

crate::simple_display! {
    ActionStatus {
        Queued => "queued",
        Started => "started",
        Progress => "progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

impl ActionStatus {
    /// Terminal statuses end the job; no further events follow for its action ID.
    pub fn is_terminal(self) -> bool {
        matches!(self, ActionStatus::Completed | ActionStatus::Cancelled)
    }
}

/// Structured reason attached to an unsuccessful completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
    /// No path to the goal, initially or after a replan
    Unreachable,
    /// No movement or extraction for too many ticks
    Stalled,
    /// The mining target ran out before the requested count
    ResourceExhausted,
    /// A plan entry could not be placed and `skip_invalid` was off
    PlacementRejected,
    /// The world raised a fault while the job was active
    WorldFault,
}

crate::simple_display! {
    FailureReason {
        Unreachable => "unreachable",
        Stalled => "stalled",
        ResourceExhausted => "resource_exhausted",
        PlacementRejected => "placement_rejected",
        WorldFault => "world_fault",
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
