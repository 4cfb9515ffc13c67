// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only journal of action lifecycle events.
//!
//! Jobs are ephemeral; the journal is their durable trace.

use crate::change_log::{StorageError, WriteReceipt};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use tw_core::{ActionEvent, FileIoOp, FileType};

pub struct ActionJournal {
    path: PathBuf,
    exists: bool,
}

impl ActionJournal {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let exists = path.exists();
        Self { path, exists }
    }

    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn append(&mut self, event: &ActionEvent) -> Result<WriteReceipt, StorageError> {
        let mut line = serde_json::to_string(event)?;
        line.push('\n');

        if !self.exists {
            if let Some(dir) = self.path.parent() {
                fs::create_dir_all(dir)?;
            }
        }
        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(line.as_bytes())?;
        file.flush()?;

        let operation = if self.exists { FileIoOp::Appended } else { FileIoOp::Written };
        self.exists = true;
        Ok(WriteReceipt { operation, file_type: FileType::Actions, path: self.path.clone(), lines: 1 })
    }

    /// Read every journaled event, skipping unreadable lines.
    pub fn read_all(&self) -> Result<Vec<ActionEvent>, StorageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(File::open(&self.path)?);
        let mut events = Vec::new();
        for line in reader.lines() {
            let line = line?;
            match serde_json::from_str(&line) {
                Ok(ev) => events.push(ev),
                Err(e) => tracing::warn!(error = %e, "skipping unreadable journal line"),
            }
        }
        Ok(events)
    }
}
