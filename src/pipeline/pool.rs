//! Worker pool lifecycle
//!
//! Owns a fixed number of worker threads sharing one work queue. Draining
//! is message-passing: every worker sends a completion summary after its
//! final flush, so `stop_and_drain` just closes the queue, collects the
//! summaries, and joins the threads to surface panics.

use crossbeam_channel::{unbounded, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::queue::WorkQueue;
use super::worker::{worker_thread, WorkerSummary};
use crate::stats::IngestStats;
use crate::storage::StorageGateway;

/// Fixed pool of worker threads consuming a shared queue
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
    done_receiver: Receiver<WorkerSummary>,
    drained: Option<IngestStats>,
}

impl WorkerPool {
    /// Launch exactly `num_workers` workers against the queue.
    pub fn start(
        num_workers: usize,
        queue: &WorkQueue,
        gateway: Arc<dyn StorageGateway>,
        batch_size: usize,
    ) -> Self {
        let (done_sender, done_receiver) = unbounded();

        let mut handles = Vec::with_capacity(num_workers);
        for worker_id in 0..num_workers {
            let work_receiver = queue.worker_receiver();
            let worker_gateway = Arc::clone(&gateway);
            let worker_done = done_sender.clone();

            handles.push(thread::spawn(move || {
                worker_thread(
                    worker_id,
                    work_receiver,
                    worker_gateway,
                    batch_size,
                    worker_done,
                )
            }));
        }
        // Workers hold the only senders now; the done channel disconnects
        // once the last worker has reported.
        drop(done_sender);

        Self {
            handles,
            done_receiver,
            drained: None,
        }
    }

    /// Close the queue and block until every worker has flushed its final
    /// batch and terminated. Returns the merged worker stats. Calling this
    /// again returns the cached result immediately.
    pub fn stop_and_drain(&mut self, queue: &WorkQueue) -> IngestStats {
        if let Some(stats) = &self.drained {
            return stats.clone();
        }

        queue.close();

        let mut merged = IngestStats::new();
        while let Ok(summary) = self.done_receiver.recv() {
            merged.merge(&summary.stats);
        }

        for (idx, handle) in self.handles.drain(..).enumerate() {
            handle
                .join()
                .unwrap_or_else(|e| panic!("Worker thread {} panicked: {:?}", idx, e));
        }

        self.drained = Some(merged.clone());
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn test_pool_drains_all_submitted_lines() {
        let queue = WorkQueue::new();
        let store = Arc::new(MemoryStore::new());
        let mut pool = WorkerPool::start(4, &queue, store.clone(), 3);

        for i in 0..100 {
            queue.push(format!("line {}", i)).unwrap();
        }

        let stats = pool.stop_and_drain(&queue);
        assert_eq!(stats.attempted, 100);
        assert_eq!(stats.inserted, 100);
        assert_eq!(store.len(), 100);
    }

    #[test]
    fn test_stop_and_drain_is_idempotent() {
        let queue = WorkQueue::new();
        let store = Arc::new(MemoryStore::new());
        let mut pool = WorkerPool::start(2, &queue, store, 5);

        queue.push("only line".to_string()).unwrap();

        let first = pool.stop_and_drain(&queue);
        let second = pool.stop_and_drain(&queue);
        assert_eq!(first.inserted, 1);
        assert_eq!(second.inserted, 1);
        assert_eq!(second.attempted, first.attempted);
    }

    #[test]
    fn test_pool_with_empty_queue_terminates() {
        let queue = WorkQueue::new();
        let store = Arc::new(MemoryStore::new());
        let mut pool = WorkerPool::start(3, &queue, store, 10);

        let stats = pool.stop_and_drain(&queue);
        assert_eq!(stats.attempted, 0);
    }
}
