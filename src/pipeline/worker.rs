//! Worker thread for the ingestion pipeline
//!
//! Each worker owns a local batch buffer: lines dequeued from the shared
//! queue accumulate there and are flushed to the storage gateway when the
//! batch is full, and once more on the termination path. A dequeued line
//! is never lost: it is either already flushed or still resident in the
//! batch when the final flush runs.

use crossbeam_channel::{Receiver, Sender};
use std::sync::Arc;

use crate::stats::IngestStats;
use crate::storage::StorageGateway;

/// Completion signal sent by a worker after its final flush
pub(crate) struct WorkerSummary {
    pub worker_id: usize,
    pub stats: IngestStats,
}

/// Worker thread: dequeue, accumulate, flush.
pub(crate) fn worker_thread(
    worker_id: usize,
    work_receiver: Receiver<String>,
    gateway: Arc<dyn StorageGateway>,
    batch_size: usize,
    done_sender: Sender<WorkerSummary>,
) {
    let mut batch: Vec<String> = Vec::with_capacity(batch_size);
    let mut stats = IngestStats::new();

    // recv() returns Err only when the queue is closed and empty, which is
    // exactly the termination condition.
    while let Ok(line) = work_receiver.recv() {
        batch.push(line);
        if batch.len() >= batch_size {
            flush_batch(worker_id, &mut batch, gateway.as_ref(), &mut stats);
        }
    }

    // Termination path: flush whatever the batch still holds.
    if !batch.is_empty() {
        flush_batch(worker_id, &mut batch, gateway.as_ref(), &mut stats);
    }

    // The pool only cares that every worker reports once; if it already
    // went away there is nobody left to count the stats.
    let _ = done_sender.send(WorkerSummary { worker_id, stats });
}

/// Flush the batch to the gateway and clear it, folding the outcome into
/// the worker's stats. Per-line failures are warned and counted; they never
/// terminate the worker.
fn flush_batch(
    worker_id: usize,
    batch: &mut Vec<String>,
    gateway: &dyn StorageGateway,
    stats: &mut IngestStats,
) {
    let report = gateway.insert_batch(batch);

    stats.attempted += report.attempted;
    stats.inserted += report.inserted;
    stats.duplicates += report.duplicates;
    stats.failed += report.failures.len();

    for failure in &report.failures {
        eprintln!(
            "Warning: worker {} failed to store line {:?}: {}",
            worker_id, failure.line, failure.error
        );
    }

    batch.clear();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crossbeam_channel::unbounded;

    #[test]
    fn test_worker_flushes_full_batches_and_remainder_on_drain() {
        let (work_sender, work_receiver) = unbounded();
        let (done_sender, done_receiver) = unbounded();
        let store = Arc::new(MemoryStore::new());

        for i in 0..5 {
            work_sender.send(format!("line {}", i)).unwrap();
        }
        drop(work_sender);

        let gateway: Arc<dyn StorageGateway> = store.clone();
        worker_thread(0, work_receiver, gateway, 2, done_sender);

        let summary = done_receiver.recv().unwrap();
        assert_eq!(summary.stats.attempted, 5);
        assert_eq!(summary.stats.inserted, 5);
        assert_eq!(store.recorded_batch_sizes(), vec![2, 2, 1]);
    }

    #[test]
    fn test_worker_survives_storage_failures() {
        let (work_sender, work_receiver) = unbounded();
        let (done_sender, done_receiver) = unbounded();
        let store = Arc::new(MemoryStore::with_failures(["broken"]));

        work_sender.send("ok".to_string()).unwrap();
        work_sender.send("broken".to_string()).unwrap();
        work_sender.send("fine".to_string()).unwrap();
        drop(work_sender);

        let gateway: Arc<dyn StorageGateway> = store.clone();
        worker_thread(3, work_receiver, gateway, 10, done_sender);

        let summary = done_receiver.recv().unwrap();
        assert_eq!(summary.worker_id, 3);
        assert_eq!(summary.stats.inserted, 2);
        assert_eq!(summary.stats.failed, 1);
        assert!(store.contains("fine"));
    }

    #[test]
    fn test_worker_with_no_input_reports_empty_stats() {
        let (work_sender, work_receiver) = unbounded::<String>();
        let (done_sender, done_receiver) = unbounded();
        drop(work_sender);

        let store = Arc::new(MemoryStore::new());
        let gateway: Arc<dyn StorageGateway> = store.clone();
        worker_thread(0, work_receiver, gateway, 4, done_sender);

        let summary = done_receiver.recv().unwrap();
        assert_eq!(summary.stats.attempted, 0);
        // No flush at all for an empty batch
        assert!(store.recorded_batch_sizes().is_empty());
    }
}
