// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! World-state synchronization pipeline.

mod orchestrator;
mod serializer;
mod tracker;

pub use orchestrator::{PassReport, SnapshotError, SnapshotOrchestrator};
pub use serializer::{DefaultSerializer, EntitySerializer, SerializeError};
pub use tracker::{ChunkTracker, DirtyMark};
