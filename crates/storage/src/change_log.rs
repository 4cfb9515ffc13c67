// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-chunk change log writer.
//!
//! Two write paths:
//! - [`ChangeLog::append_batch`] appends operation entries to a chunk's
//!   `entities.jsonl`. Writes happen synchronously, so entries from one tick
//!   are on disk before the next tick starts. The first append for a chunk
//!   creates its directory and file; every later append only appends.
//! - [`ChangeLog::rewrite_whole`] replaces a bulk file (resource grids) in
//!   full via temp file + rename. Never merges.

use crate::rotate_bak_path;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tw_core::{ChunkPos, EntityRecord, FileIoOp, FileType, LogOp, OpLogEntry, Tick};

use crate::layout::StorageLayout;

/// Errors that can occur while persisting or reading chunk data
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("out-of-order append for chunk {chunk}: tick {got} after {last}")]
    OutOfOrder { chunk: ChunkPos, last: Tick, got: Tick },
    #[error("{0} is not a per-chunk file type")]
    NotChunkFile(FileType),
}

/// Result of one successful write, used to emit the matching `file_io` notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReceipt {
    pub operation: FileIoOp,
    pub file_type: FileType,
    pub path: PathBuf,
    pub lines: usize,
}

/// What is known about a chunk's log once it has been opened.
#[derive(Debug, Clone, Copy)]
struct Partition {
    last_tick: Tick,
    /// File length after our last write; anything else means the tail changed
    len: u64,
}

/// Append-only per-chunk operation logs plus whole-file bulk data.
pub struct ChangeLog {
    layout: StorageLayout,
    partitions: HashMap<ChunkPos, Partition>,
}

impl ChangeLog {
    pub fn new(layout: StorageLayout) -> Self {
        Self { layout, partitions: HashMap::new() }
    }

    pub fn layout(&self) -> &StorageLayout {
        &self.layout
    }

    /// Append one entry.
    pub fn append(&mut self, chunk: ChunkPos, entry: &OpLogEntry) -> Result<WriteReceipt, StorageError> {
        self.append_batch(chunk, std::slice::from_ref(entry))
    }

    /// Append entries to a chunk's operation log.
    ///
    /// Entries must be tick-ordered, both within the batch and relative to
    /// what the log already holds; an out-of-order batch is rejected whole
    /// before anything is written.
    pub fn append_batch(
        &mut self,
        chunk: ChunkPos,
        entries: &[OpLogEntry],
    ) -> Result<WriteReceipt, StorageError> {
        let path = self.layout.chunk_file(chunk, FileType::Entities);
        let known = self.open_partition(chunk, &path)?;

        let mut last = known.map(|p| p.last_tick).unwrap_or(Tick::ZERO);
        let mut buf = String::new();
        for entry in entries {
            if entry.tick < last {
                return Err(StorageError::OutOfOrder { chunk, last, got: entry.tick });
            }
            last = entry.tick;
            buf.push_str(&serde_json::to_string(entry)?);
            buf.push('\n');
        }

        let (mut file, operation) = match known {
            Some(_) => (OpenOptions::new().append(true).open(&path)?, FileIoOp::Appended),
            None => create_first(&path)?,
        };
        let start = file.metadata()?.len();
        if let Err(e) = file.write_all(buf.as_bytes()).and_then(|()| file.flush()) {
            // Drop a partial line so later appends never land behind it
            self.partitions.remove(&chunk);
            if let Err(trunc) = file.set_len(start) {
                tracing::warn!(chunk = %chunk, error = %trunc, "could not truncate torn append");
            }
            return Err(e.into());
        }

        let len = start + buf.len() as u64;
        self.partitions.insert(chunk, Partition { last_tick: last, len });
        tracing::debug!(chunk = %chunk, lines = entries.len(), op = %operation, "change log write");
        Ok(WriteReceipt { operation, file_type: FileType::Entities, path, lines: entries.len() })
    }

    /// Replace a chunk's bulk file with `rows`, one JSON line per row.
    ///
    /// Callers pass the complete current dataset; the previous file content
    /// is discarded, not merged.
    pub fn rewrite_whole<T: Serialize>(
        &mut self,
        chunk: ChunkPos,
        file_type: FileType,
        rows: &[T],
    ) -> Result<WriteReceipt, StorageError> {
        if file_type != FileType::Resources {
            return Err(StorageError::NotChunkFile(file_type));
        }
        let path = self.layout.chunk_file(chunk, file_type);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let mut buf = String::new();
        for row in rows {
            buf.push_str(&serde_json::to_string(row)?);
            buf.push('\n');
        }

        let tmp = path.with_extension("jsonl.tmp");
        {
            let mut file = File::create(&tmp)?;
            file.write_all(buf.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;

        Ok(WriteReceipt { operation: FileIoOp::Written, file_type, path, lines: rows.len() })
    }

    /// Read every entry of a chunk's operation log.
    pub fn read_log(&self, chunk: ChunkPos) -> Result<Vec<OpLogEntry>, StorageError> {
        let path = self.layout.chunk_file(chunk, FileType::Entities);
        if !path.exists() {
            return Ok(Vec::new());
        }
        Ok(read_entries(&path)?.0)
    }

    /// Read a chunk's bulk file.
    pub fn read_whole<T: DeserializeOwned>(
        &self,
        chunk: ChunkPos,
        file_type: FileType,
    ) -> Result<Vec<T>, StorageError> {
        let path = self.layout.chunk_file(chunk, file_type);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(path)?);
        let mut rows = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            rows.push(serde_json::from_str(&line)?);
        }
        Ok(rows)
    }

    /// Replay a chunk's log into the entity set it describes.
    ///
    /// Every non-remove entry carries the full record, so replay is a fold of
    /// inserts and removals in log order.
    pub fn materialize(&mut self, chunk: ChunkPos) -> Result<BTreeMap<String, EntityRecord>, StorageError> {
        let path = self.layout.chunk_file(chunk, FileType::Entities);
        self.open_partition(chunk, &path)?;

        let mut state = BTreeMap::new();
        for entry in self.read_log(chunk)? {
            match entry.op {
                LogOp::Remove => {
                    state.remove(&entry.key);
                }
                LogOp::Upsert | LogOp::Rotate | LogOp::ConfigurationChanged => {
                    match serde_json::from_value::<EntityRecord>(entry.payload) {
                        Ok(record) => {
                            state.insert(entry.key, record);
                        }
                        Err(e) => {
                            tracing::warn!(chunk = %chunk, key = %entry.key, error = %e, "skipping unreadable log payload");
                        }
                    }
                }
            }
        }
        Ok(state)
    }

    /// Last tick appended for a chunk, if its log exists.
    pub fn last_tick(&mut self, chunk: ChunkPos) -> Result<Option<Tick>, StorageError> {
        let path = self.layout.chunk_file(chunk, FileType::Entities);
        Ok(self.open_partition(chunk, &path)?.map(|p| p.last_tick))
    }

    /// Newest tick across every stored chunk log.
    pub fn newest_tick(&mut self) -> Result<Option<Tick>, StorageError> {
        let mut newest = None;
        for chunk in self.layout.stored_chunks()? {
            newest = newest.max(self.last_tick(chunk)?);
        }
        Ok(newest)
    }

    /// Learn a chunk's log state.
    ///
    /// Returns `None` when the log does not exist yet. The cached state is
    /// trusted only while the file length matches our last write. A log
    /// with unreadable lines (e.g. torn by a crash mid-write) is backed up
    /// to `.bak` and rewritten with its valid entries.
    fn open_partition(&mut self, chunk: ChunkPos, path: &Path) -> Result<Option<Partition>, StorageError> {
        let on_disk = match fs::metadata(path) {
            Ok(meta) => Some(meta.len()),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        let Some(on_disk) = on_disk else {
            self.partitions.remove(&chunk);
            return Ok(None);
        };
        match self.partitions.get(&chunk) {
            Some(p) if p.len == on_disk => return Ok(Some(*p)),
            Some(_) => {
                tracing::warn!(chunk = %chunk, "change log changed behind the writer, rescanning");
                self.partitions.remove(&chunk);
            }
            None => {}
        }

        let (entries, corrupt) = read_entries(path)?;
        let mut len = on_disk;
        if corrupt {
            let bak = rotate_bak_path(path);
            tracing::warn!(chunk = %chunk, backup = %bak.display(), valid = entries.len(), "corrupt change log, rewriting valid entries");
            fs::rename(path, &bak)?;
            let mut buf = String::new();
            for entry in &entries {
                buf.push_str(&serde_json::to_string(entry)?);
                buf.push('\n');
            }
            fs::write(path, &buf)?;
            len = buf.len() as u64;
        }

        let last_tick = entries.iter().map(|e| e.tick).max().unwrap_or(Tick::ZERO);
        let partition = Partition { last_tick, len };
        self.partitions.insert(chunk, partition);
        Ok(Some(partition))
    }
}

/// Create the chunk directory and its log file.
///
/// `create_new` makes creation atomic; if another writer won the race the
/// file is opened for append instead.
fn create_first(path: &Path) -> Result<(File, FileIoOp), StorageError> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    match OpenOptions::new().write(true).create_new(true).open(path) {
        Ok(file) => Ok((file, FileIoOp::Written)),
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            Ok((OpenOptions::new().append(true).open(path)?, FileIoOp::Appended))
        }
        Err(e) => Err(e.into()),
    }
}

/// Read log entries, stopping at the first unreadable line.
///
/// Returns the valid prefix and whether anything was discarded.
fn read_entries(path: &Path) -> Result<(Vec<OpLogEntry>, bool), StorageError> {
    let reader = BufReader::new(File::open(path)?);
    let mut entries = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<OpLogEntry>(&line) {
            Ok(entry) => entries.push(entry),
            Err(_) => return Ok((entries, true)),
        }
    }
    Ok((entries, false))
}

#[cfg(test)]
#[path = "change_log_tests.rs"]
mod tests;
