//! Groups consecutive small changes into one undo step.
//!
//! Callers bracket each logical edit with [`ChangeBuffer::lock`] and
//! [`ChangeBuffer::unlock`] and report the atomic units they changed through
//! [`ChangeBuffer::input`]. Locks nest. While the depth is above zero the
//! buffered step is never closed. Once it drops back to zero the step is
//! closed when it grew past the configured size, and on the next lock when
//! the user went idle or somebody else changed the document in between.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use crate::document::Document;
use crate::error::ChangeBufferError;
use crate::history::BatchId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChangeBufferConfig {
    /// Units after which the buffered step is closed on unlock.
    pub undo_step_size: usize,
    /// Pause after which the next lock starts a new step.
    pub idle_timeout: Duration,
}

impl Default for ChangeBufferConfig {
    fn default() -> Self {
        Self {
            undo_step_size: 20,
            idle_timeout: Duration::from_millis(1500),
        }
    }
}

impl ChangeBufferConfig {
    pub fn with_undo_step_size(mut self, undo_step_size: usize) -> Self {
        self.undo_step_size = undo_step_size;
        self
    }

    pub fn with_idle_timeout(mut self, idle_timeout: Duration) -> Self {
        self.idle_timeout = idle_timeout;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct ChangeBuffer {
    config: ChangeBufferConfig,
    depth: usize,
    size: usize,
    batch: Option<BatchId>,
    last_input: Option<Instant>,
    /// Document and selection versions seen at the last unlock to zero.
    observed: Option<(u64, u64)>,
}

impl ChangeBuffer {
    pub fn new(config: ChangeBufferConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ChangeBufferConfig {
        &self.config
    }

    /// Units buffered in the open step.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_locked(&self) -> bool {
        self.depth > 0
    }

    pub fn lock(&mut self, document: &mut Document) {
        self.lock_at(document, Instant::now());
    }

    /// Like [`ChangeBuffer::lock`] with an explicit clock reading.
    pub fn lock_at(&mut self, document: &mut Document, now: Instant) {
        if self.depth == 0 {
            if self.is_idle(now) {
                debug!(size = self.size, "closing undo step after idle timeout");
                self.close_step(document);
            } else if self.changed_externally(document) {
                debug!(size = self.size, "closing undo step after external change");
                self.close_step(document);
            }
        }
        self.depth += 1;
        trace!(depth = self.depth, "change buffer locked");
    }

    pub fn unlock(&mut self, document: &mut Document) -> Result<(), ChangeBufferError> {
        if self.depth == 0 {
            return Err(ChangeBufferError::Unbalanced);
        }
        self.depth -= 1;
        trace!(depth = self.depth, "change buffer unlocked");
        if self.depth == 0 {
            if self.size >= self.config.undo_step_size {
                debug!(size = self.size, "closing undo step at size threshold");
                self.close_step(document);
            }
            self.observed = Some((document.version(), document.selection_version()));
        }
        Ok(())
    }

    pub fn input(&mut self, count: usize) -> Result<(), ChangeBufferError> {
        self.input_at(count, Instant::now())
    }

    /// Adds `count` changed units to the open step.
    pub fn input_at(&mut self, count: usize, now: Instant) -> Result<(), ChangeBufferError> {
        if self.depth == 0 {
            return Err(ChangeBufferError::NotLocked);
        }
        if count == 0 {
            return Ok(());
        }
        self.size += count;
        self.last_input = Some(now);
        trace!(count, size = self.size, "change buffer input");
        Ok(())
    }

    /// Closes the buffered step right away.
    pub fn flush(&mut self, document: &mut Document) -> Result<(), ChangeBufferError> {
        if self.depth > 0 {
            return Err(ChangeBufferError::Locked(self.depth));
        }
        debug!(size = self.size, "closing undo step on request");
        self.close_step(document);
        Ok(())
    }

    /// Batch the buffered changes are recorded in, created on first use.
    pub fn batch(&mut self, document: &mut Document) -> BatchId {
        match self.batch {
            Some(batch) => batch,
            None => {
                let batch = document.history_mut().create_batch();
                self.batch = Some(batch);
                batch
            }
        }
    }

    fn is_idle(&self, now: Instant) -> bool {
        self.last_input
            .is_some_and(|last| now.saturating_duration_since(last) > self.config.idle_timeout)
    }

    fn changed_externally(&self, document: &Document) -> bool {
        self.observed
            .is_some_and(|seen| seen != (document.version(), document.selection_version()))
    }

    fn close_step(&mut self, document: &mut Document) {
        if let Some(batch) = self.batch.take() {
            document.history_mut().close_step(batch, self.size);
        }
        self.size = 0;
        self.last_input = None;
        self.observed = None;
    }
}

/// Lock held for the lifetime of one command invocation. Dropping it
/// unlocks the buffer on every exit path.
pub(crate) struct ChangeScope<'a> {
    buffer: &'a mut ChangeBuffer,
    document: &'a mut Document,
}

impl<'a> ChangeScope<'a> {
    pub(crate) fn open(buffer: &'a mut ChangeBuffer, document: &'a mut Document) -> Self {
        buffer.lock(document);
        Self { buffer, document }
    }

    pub(crate) fn document(&mut self) -> &mut Document {
        &mut *self.document
    }

    pub(crate) fn batch(&mut self) -> BatchId {
        self.buffer.batch(&mut *self.document)
    }

    pub(crate) fn input(&mut self, count: usize) -> Result<(), ChangeBufferError> {
        self.buffer.input(count)
    }
}

impl Drop for ChangeScope<'_> {
    fn drop(&mut self) {
        let result = self.buffer.unlock(&mut *self.document);
        debug_assert!(result.is_ok(), "change scope unlocked an unlocked buffer");
    }
}

#[cfg(test)]
#[path = "change_buffer_tests.rs"]
mod change_buffer_tests;
