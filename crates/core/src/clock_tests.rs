// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn step_clock_starts_at_zero() {
    let clock = StepClock::new();
    assert_eq!(clock.now(), Tick::ZERO);
}

#[test]
fn step_clock_can_be_advanced() {
    let clock = StepClock::new();
    assert_eq!(clock.advance(), Tick(1));
    assert_eq!(clock.advance_by(9), Tick(10));
    assert_eq!(clock.now(), Tick(10));
}

#[test]
fn step_clock_is_cloneable_and_shared() {
    let host = StepClock::new();
    let engine = host.clone();
    host.advance_by(30);
    assert_eq!(engine.now(), Tick(30));
}

#[test]
fn step_clock_set_and_starting_at() {
    let clock = StepClock::starting_at(Tick(500));
    assert_eq!(clock.now(), Tick(500));
    clock.set(Tick(42));
    assert_eq!(clock.now(), Tick(42));
}

#[test]
fn tick_since_saturates() {
    assert_eq!(Tick(10).since(Tick(4)), 6);
    assert_eq!(Tick(4).since(Tick(10)), 0);
}

#[test]
fn tick_serializes_as_number() {
    assert_eq!(serde_json::to_string(&Tick(77)).unwrap(), "77");
}
