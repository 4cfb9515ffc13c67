// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tw-core: data model shared by the tickwork scheduler and sync pipeline

pub mod macros;

pub mod action;
pub mod chunk;
pub mod clock;
pub mod command;
pub mod event;
pub mod geometry;
pub mod id;
pub mod job;
pub mod oplog;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use action::{ActionEvent, Outcome};
pub use chunk::{ChunkPhase, ChunkRecord, SnapshotState};
pub use clock::{Clock, StepClock, Tick};
pub use command::{Command, CraftCommand, MineCommand, MineMode, PlaceCommand, WalkCommand};
pub use event::{Envelope, FileIoOp, FileType, Notification};
pub use geometry::{ChunkPos, Direction, Position, DEFAULT_CHUNK_SIZE};
pub use id::{ActionId, AgentId};
pub use job::{ActionStatus, FailureReason, JobKind, UnknownJobKind};
pub use oplog::{EntityRecord, LogOp, OpLogEntry, ResourceTile};
