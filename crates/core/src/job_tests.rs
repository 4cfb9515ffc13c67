// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::test_support::strategies::*;
use proptest::prelude::*;

#[test]
fn job_kind_parses_its_display() {
    for kind in JobKind::ALL {
        assert_eq!(kind.to_string().parse::<JobKind>(), Ok(kind));
    }
    assert!("fly".parse::<JobKind>().is_err());
}

#[test]
fn job_kind_serde_is_snake_case() {
    assert_eq!(serde_json::to_string(&JobKind::Place).unwrap(), "\"place\"");
    assert_eq!(serde_json::to_string(&FailureReason::ResourceExhausted).unwrap(), "\"resource_exhausted\"");
}

#[yare::parameterized(
    walk_walk   = { JobKind::Walk, JobKind::Walk, true },
    walk_mine   = { JobKind::Walk, JobKind::Mine, true },
    walk_place  = { JobKind::Walk, JobKind::Place, true },
    walk_craft  = { JobKind::Walk, JobKind::Craft, false },
    mine_place  = { JobKind::Mine, JobKind::Place, false },
    craft_craft = { JobKind::Craft, JobKind::Craft, true },
    craft_mine  = { JobKind::Craft, JobKind::Mine, false },
)]
fn conflict_table(a: JobKind, b: JobKind, expected: bool) {
    assert_eq!(a.conflicts_with(b), expected);
}

#[test]
fn terminal_statuses() {
    assert!(ActionStatus::Completed.is_terminal());
    assert!(ActionStatus::Cancelled.is_terminal());
    assert!(!ActionStatus::Queued.is_terminal());
    assert!(!ActionStatus::Started.is_terminal());
    assert!(!ActionStatus::Progress.is_terminal());
}

proptest! {
    #[test]
    fn conflicts_are_symmetric(a in arb_job_kind(), b in arb_job_kind()) {
        prop_assert_eq!(a.conflicts_with(b), b.conflicts_with(a));
    }

    #[test]
    fn every_kind_conflicts_with_itself(kind in arb_job_kind()) {
        prop_assert!(kind.conflicts_with(kind));
    }
}
