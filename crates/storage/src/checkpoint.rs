// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Checkpoint persistence for restart.
//!
//! A checkpoint stores the chunk table and the dispatcher's next sequence
//! number at a given tick. Recovery loads the checkpoint and resumes; the
//! per-chunk operation logs hold everything else.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tw_core::{ChunkRecord, Tick};

/// Current checkpoint schema version
pub const CURRENT_CHECKPOINT_VERSION: u32 = 1;

/// Errors that can occur in checkpoint operations
#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("storage error: {0}")]
    Storage(#[from] crate::StorageError),
    #[error("unsupported checkpoint version {0} (current {CURRENT_CHECKPOINT_VERSION})")]
    UnsupportedVersion(u32),
}

/// Resumable state of the sync pipeline at a point in time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Schema version
    #[serde(rename = "v")]
    pub version: u32,
    /// Tick at which the checkpoint was taken
    pub tick: Tick,
    /// Next notification sequence number to assign
    pub next_sequence: u64,
    /// Chunk table, in raster order
    pub chunks: Vec<ChunkRecord>,
    /// When this checkpoint was written
    pub created_at: DateTime<Utc>,
}

impl Checkpoint {
    pub fn new(tick: Tick, next_sequence: u64, chunks: Vec<ChunkRecord>) -> Self {
        Self {
            version: CURRENT_CHECKPOINT_VERSION,
            tick,
            next_sequence,
            chunks,
            created_at: Utc::now(),
        }
    }

    /// Write atomically: temp file, rotate the previous checkpoint to
    /// `.bak`, then rename into place.
    pub fn save(&self, path: &Path) -> Result<(), CheckpointError> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("tmp");
        {
            let mut file = File::create(&tmp)?;
            file.write_all(&serde_json::to_vec_pretty(self)?)?;
            file.sync_all()?;
        }
        if path.exists() {
            let bak = rotate_bak_path(path);
            fs::rename(path, bak)?;
        }
        fs::rename(&tmp, path)?;
        tracing::info!(tick = %self.tick, chunks = self.chunks.len(), seq = self.next_sequence, "checkpoint saved");
        Ok(())
    }

    /// Load a checkpoint, or `None` if none has been written.
    pub fn load(path: &Path) -> Result<Option<Checkpoint>, CheckpointError> {
        if !path.exists() {
            return Ok(None);
        }
        let bytes = fs::read(path)?;
        let checkpoint: Checkpoint = serde_json::from_slice(&bytes)?;
        if checkpoint.version > CURRENT_CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion(checkpoint.version));
        }
        Ok(Some(checkpoint))
    }
}

const MAX_BAK_FILES: u32 = 3;

/// Pick the next `.bak` / `.bak.N` path, rotating older backups out.
///
/// Keeps up to [`MAX_BAK_FILES`] backups: `.bak`, `.bak.2`, `.bak.3`.
/// The oldest backup is removed when the limit is reached.
pub(crate) fn rotate_bak_path(path: &Path) -> PathBuf {
    let bak = |n: u32| {
        if n == 1 {
            path.with_extension("bak")
        } else {
            path.with_extension(format!("bak.{n}"))
        }
    };

    let oldest = bak(MAX_BAK_FILES);
    if oldest.exists() {
        let _ = fs::remove_file(&oldest);
    }

    for n in (1..MAX_BAK_FILES).rev() {
        let src = bak(n);
        if src.exists() {
            let _ = fs::rename(&src, bak(n + 1));
        }
    }

    bak(1)
}

#[cfg(test)]
#[path = "checkpoint_tests.rs"]
mod tests;
