// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Simulation-step clock.
//!
//! Time in tickwork is the host's discrete step counter. Nothing reads wall
//! time; every timeout-like mechanism counts ticks.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One discrete simulation step.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);

    pub fn get(self) -> u64 {
        self.0
    }

    /// Number of ticks elapsed since `earlier` (zero if `earlier` is later).
    pub fn since(self, earlier: Tick) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn next(self) -> Tick {
        Tick(self.0 + 1)
    }
}

impl std::fmt::Display for Tick {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Tick {
    fn from(v: u64) -> Self {
        Tick(v)
    }
}

/// A clock that reports the current simulation step
pub trait Clock: Clone + Send + Sync {
    fn now(&self) -> Tick;
}

/// Clock advanced explicitly by the host once per simulation step.
///
/// Clones share the same counter, so the host can keep one handle and give
/// another to the engine.
#[derive(Clone, Default)]
pub struct StepClock {
    current: Arc<Mutex<Tick>>,
}

impl StepClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start counting from a specific tick (e.g. after restoring a checkpoint).
    pub fn starting_at(tick: Tick) -> Self {
        Self { current: Arc::new(Mutex::new(tick)) }
    }

    /// Advance by one step and return the new tick
    pub fn advance(&self) -> Tick {
        let mut guard = self.current.lock();
        *guard = guard.next();
        *guard
    }

    /// Advance by `n` steps
    pub fn advance_by(&self, n: u64) -> Tick {
        let mut guard = self.current.lock();
        *guard = Tick(guard.0 + n);
        *guard
    }

    /// Set the clock to a specific tick
    pub fn set(&self, tick: Tick) {
        *self.current.lock() = tick;
    }
}

impl Clock for StepClock {
    fn now(&self) -> Tick {
        *self.current.lock()
    }
}

#[cfg(test)]
#[path = "clock_tests.rs"]
mod tests;
