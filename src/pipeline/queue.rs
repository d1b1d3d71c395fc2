//! Shared work queue
//!
//! A FIFO of raw log lines built on an unbounded crossbeam channel. The
//! producer side lives behind a mutex so `close()` can take it exactly
//! once; dropping the sender is the stop signal, and it wakes every
//! blocked consumer. Lines already buffered when the queue closes are
//! still delivered, so closing starts a drain rather than discarding work.

use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::Mutex;
use thiserror::Error;

/// Contract violations surfaced by the pipeline
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// A line was submitted after the queue was closed.
    #[error("work queue is closed: submit after finish is not allowed")]
    QueueClosed,
}

/// Thread-safe FIFO of raw lines with a close signal
pub struct WorkQueue {
    sender: Mutex<Option<Sender<String>>>,
    receiver: Receiver<String>,
}

impl WorkQueue {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self {
            sender: Mutex::new(Some(sender)),
            receiver,
        }
    }

    /// Append a line to the tail of the queue, waking a blocked consumer.
    ///
    /// Never blocks: the queue is logically unbounded. Fails only after
    /// `close()` has been called.
    pub fn push(&self, line: String) -> Result<(), PipelineError> {
        let guard = match self.sender.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        match guard.as_ref() {
            Some(sender) => sender.send(line).map_err(|_| PipelineError::QueueClosed),
            None => Err(PipelineError::QueueClosed),
        }
    }

    /// Consumer handle for a worker. Each line is delivered to exactly one
    /// of the cloned receivers; `recv` blocks until a line arrives or the
    /// queue is closed and empty.
    pub fn worker_receiver(&self) -> Receiver<String> {
        self.receiver.clone()
    }

    /// Stop signal: no further pushes are accepted, blocked consumers are
    /// woken, and already-queued lines drain normally. Idempotent.
    pub fn close(&self) {
        let mut guard = match self.sender.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.take();
    }

    pub fn is_closed(&self) -> bool {
        let guard = match self.sender.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.is_none()
    }
}

impl Default for WorkQueue {
    fn default() -> Self {
        Self::new()
    }
}
