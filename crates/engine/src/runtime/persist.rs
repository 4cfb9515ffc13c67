// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::Engine;
use crate::notify::Transport;
use crate::snapshot::EntitySerializer;
use tw_core::{Clock, FileIoOp, FileType, Notification, Tick};
use tw_storage::{Checkpoint, CheckpointError};

impl<C, T, S> Engine<C, T, S>
where
    C: Clock,
    T: Transport,
    S: EntitySerializer,
{
    /// Save the chunk table and sequence counter.
    ///
    /// The stored counter already accounts for the `file_io` notification
    /// sent for the checkpoint itself.
    pub fn checkpoint(&mut self) -> Result<Tick, CheckpointError> {
        let tick = self.clock.now();
        let next_sequence = self.dispatcher.next_sequence() + 1;
        let checkpoint = Checkpoint::new(tick, next_sequence, self.snapshot.records());
        checkpoint.save(&self.layout.checkpoint_path())?;

        self.flush(vec![Notification::FileIo {
            operation: FileIoOp::Written,
            file_type: FileType::Checkpoint,
            chunk: None,
            tick,
        }]);
        Ok(tick)
    }

    /// Load the last checkpoint, if any, and resume from it.
    ///
    /// Returns the tick the host should resume its clock at: the checkpoint
    /// tick, or the newest tick already in a chunk log if writes landed
    /// after the checkpoint. Chunks that were mid-pass start over from `Idle`.
    pub fn restore(&mut self) -> Result<Option<Tick>, CheckpointError> {
        let Some(checkpoint) = Checkpoint::load(&self.layout.checkpoint_path())? else {
            return Ok(None);
        };
        tracing::info!(
            tick = %checkpoint.tick,
            chunks = checkpoint.chunks.len(),
            seq = checkpoint.next_sequence,
            "restoring from checkpoint"
        );
        self.snapshot.restore(checkpoint.chunks);
        self.dispatcher.advance_to(checkpoint.next_sequence);

        let logged = self.snapshot.change_log_mut().newest_tick()?;
        let resume = logged.map_or(checkpoint.tick, |t| t.max(checkpoint.tick));
        if resume > checkpoint.tick {
            tracing::info!(checkpoint = %checkpoint.tick, %resume, "change logs are ahead of the checkpoint");
        }
        Ok(Some(resume))
    }
}
