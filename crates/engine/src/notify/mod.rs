// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Outbound notifications: sequencing and best-effort transports.

mod dispatcher;
mod transport;

pub use dispatcher::{DispatchStats, Dispatcher};
pub use transport::{ChannelTransport, NullTransport, Transport, TransportError, UdpTransport};

#[cfg(any(test, feature = "test-support"))]
pub use transport::MemoryTransport;
