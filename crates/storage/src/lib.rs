// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! tw-storage: durable mirror of world state (change logs, journal, checkpoint)

mod change_log;
mod checkpoint;
mod journal;
mod layout;

pub use change_log::{ChangeLog, StorageError, WriteReceipt};
pub use checkpoint::{Checkpoint, CheckpointError, CURRENT_CHECKPOINT_VERSION};
pub use journal::ActionJournal;
pub use layout::StorageLayout;

pub(crate) use checkpoint::rotate_bak_path;

#[cfg(test)]
#[path = "journal_tests.rs"]
mod journal_tests;
