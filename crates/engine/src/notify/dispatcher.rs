// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sequence stamping and dispatch.

use super::transport::Transport;
use tw_core::{Envelope, Notification};

/// Delivery counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub sent: u64,
    pub dropped: u64,
}

/// Stamps every notification with the next process-wide sequence number
/// and pushes it to the transport.
///
/// The sequence advances whether or not delivery succeeds, so a consumer
/// sees a gap for every dropped notification.
pub struct Dispatcher<T> {
    transport: T,
    next_sequence: u64,
    stats: DispatchStats,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T) -> Self {
        Self::resume(transport, 1)
    }

    /// Continue a sequence from a checkpoint.
    pub fn resume(transport: T, next_sequence: u64) -> Self {
        Self { transport, next_sequence: next_sequence.max(1), stats: DispatchStats::default() }
    }

    pub fn send(&mut self, notification: Notification) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        let envelope = Envelope { sequence, notification };

        match self.transport.send(&envelope) {
            Ok(()) => self.stats.sent += 1,
            Err(e) => {
                self.stats.dropped += 1;
                tracing::debug!(sequence, event = envelope.notification.name(), error = %e, "notification dropped");
            }
        }
        sequence
    }

    /// Move the counter forward to at least `next_sequence`. Never moves it back.
    pub fn advance_to(&mut self, next_sequence: u64) {
        self.next_sequence = self.next_sequence.max(next_sequence);
    }

    pub fn next_sequence(&self) -> u64 {
        self.next_sequence
    }

    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }
}

#[cfg(test)]
#[path = "dispatcher_tests.rs"]
mod tests;
