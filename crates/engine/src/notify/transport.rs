// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fire-and-forget notification transports.
//!
//! Delivery is never guaranteed. Callers treat a failed send as a dropped
//! notification; the change logs and chunk table stay the source of truth.

use std::io::ErrorKind;
use std::net::{SocketAddr, ToSocketAddrs, UdpSocket};
use thiserror::Error;
use tokio::sync::mpsc;
use tw_core::Envelope;

/// Errors from a single send
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("receiver closed")]
    Closed,
    #[error("transport full")]
    Full,
}

pub trait Transport {
    fn send(&self, envelope: &Envelope) -> Result<(), TransportError>;
}

/// One JSON datagram per notification, sent without blocking.
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    target: SocketAddr,
}

impl UdpTransport {
    pub fn connect(bind: impl ToSocketAddrs, target: SocketAddr) -> Result<Self, TransportError> {
        let socket = UdpSocket::bind(bind)?;
        socket.set_nonblocking(true)?;
        Ok(Self { socket, target })
    }

    pub fn target(&self) -> SocketAddr {
        self.target
    }
}

impl Transport for UdpTransport {
    fn send(&self, envelope: &Envelope) -> Result<(), TransportError> {
        let body = serde_json::to_vec(envelope)?;
        match self.socket.send_to(&body, self.target) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::WouldBlock => Err(TransportError::Full),
            Err(e) => Err(e.into()),
        }
    }
}

/// Hands notifications to an in-process async consumer.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::Sender<Envelope>,
}

impl ChannelTransport {
    pub fn new(tx: mpsc::Sender<Envelope>) -> Self {
        Self { tx }
    }

    /// Create a transport and the receiver it feeds.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Envelope>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl Transport for ChannelTransport {
    fn send(&self, envelope: &Envelope) -> Result<(), TransportError> {
        self.tx.try_send(envelope.clone()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => TransportError::Full,
            mpsc::error::TrySendError::Closed(_) => TransportError::Closed,
        })
    }
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullTransport;

impl Transport for NullTransport {
    fn send(&self, _envelope: &Envelope) -> Result<(), TransportError> {
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
mod memory {
    use super::{Transport, TransportError};
    use parking_lot::Mutex;
    use std::sync::Arc;
    use tw_core::Envelope;

    #[derive(Default)]
    struct MemoryState {
        sent: Vec<Envelope>,
        drop_next: usize,
    }

    /// Records sent envelopes; clones share the record.
    #[derive(Clone, Default)]
    pub struct MemoryTransport {
        inner: Arc<Mutex<MemoryState>>,
    }

    impl MemoryTransport {
        pub fn new() -> Self {
            Self::default()
        }

        /// Every envelope delivered so far.
        pub fn sent(&self) -> Vec<Envelope> {
            self.inner.lock().sent.clone()
        }

        /// Drain delivered envelopes.
        pub fn take(&self) -> Vec<Envelope> {
            std::mem::take(&mut self.inner.lock().sent)
        }

        /// Fail the next `n` sends.
        pub fn drop_next(&self, n: usize) {
            self.inner.lock().drop_next = n;
        }
    }

    impl Transport for MemoryTransport {
        fn send(&self, envelope: &Envelope) -> Result<(), TransportError> {
            let mut state = self.inner.lock();
            if state.drop_next > 0 {
                state.drop_next -= 1;
                return Err(TransportError::Full);
            }
            state.sent.push(envelope.clone());
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use memory::MemoryTransport;

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
