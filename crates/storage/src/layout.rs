// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! On-disk layout of the mirrored world state.
//!
//! ```text
//! {root}/
//!   checkpoint.json            chunk table + sequence counter
//!   actions.jsonl              action lifecycle journal
//!   chunks/{x}_{y}/
//!     entities.jsonl           append-only operation log
//!     resources.jsonl          bulk resource grid (rewritten wholesale)
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tw_core::{ChunkPos, FileType};

const CHUNKS_DIR: &str = "chunks";

#[derive(Debug, Clone)]
pub struct StorageLayout {
    root: PathBuf,
}

impl StorageLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn checkpoint_path(&self) -> PathBuf {
        self.root.join("checkpoint.json")
    }

    pub fn actions_path(&self) -> PathBuf {
        self.root.join("actions.jsonl")
    }

    pub fn chunk_dir(&self, chunk: ChunkPos) -> PathBuf {
        self.root.join(CHUNKS_DIR).join(chunk.key())
    }

    /// Path of a per-chunk file.
    pub fn chunk_file(&self, chunk: ChunkPos, file_type: FileType) -> PathBuf {
        self.chunk_dir(chunk).join(file_name(file_type))
    }

    /// Chunks that have a storage directory.
    pub fn stored_chunks(&self) -> std::io::Result<Vec<ChunkPos>> {
        let dir = self.root.join(CHUNKS_DIR);
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut chunks = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            if let Some(pos) = entry.file_name().to_str().and_then(ChunkPos::parse_key) {
                chunks.push(pos);
            }
        }
        chunks.sort();
        Ok(chunks)
    }
}

fn file_name(file_type: FileType) -> &'static str {
    match file_type {
        FileType::Entities => "entities.jsonl",
        FileType::Resources => "resources.jsonl",
        FileType::Actions => "actions.jsonl",
        FileType::Checkpoint => "checkpoint.json",
    }
}
