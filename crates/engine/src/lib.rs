// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tw-engine: per-agent job scheduler and incremental world-state sync

pub mod config;
pub mod jobs;
pub mod lifecycle;
pub mod notify;
pub mod runtime;
pub mod snapshot;
pub mod store;
pub mod world;

pub use config::{ConfigError, EngineConfig};
pub use jobs::{Job, JobError, PlacementReport};
pub use lifecycle::{Advance, CancelResult, JobMeta};
pub use notify::{Dispatcher, Transport, TransportError};
pub use runtime::{Accepted, Engine, TickReport};
pub use snapshot::{DefaultSerializer, DirtyMark, EntitySerializer, SnapshotOrchestrator};
pub use store::JobStore;
pub use world::{ChunkContents, PlaceVerdict, World, WorldEntity, WorldFault};

#[cfg(any(test, feature = "test-support"))]
pub use notify::MemoryTransport;
#[cfg(any(test, feature = "test-support"))]
pub use world::FakeWorld;
