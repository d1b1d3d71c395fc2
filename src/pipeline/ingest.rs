//! Ingestion pipeline orchestrator
//!
//! Feeds lines from an external source into the work queue, then closes
//! the queue and waits for the pool to drain. `finish()` does not return
//! until every submitted line is either stored or accounted for as a
//! reported failure.

use anyhow::Result;
use std::io::BufRead;
use std::sync::Arc;
use std::time::Instant;

use super::pool::WorkerPool;
use super::queue::{PipelineError, WorkQueue};
use crate::config::IngestConfig;
use crate::platform::SignalHandler;
use crate::stats::IngestStats;
use crate::storage::StorageGateway;

/// Orchestrator owning the work queue and the worker pool
pub struct IngestionPipeline {
    queue: WorkQueue,
    pool: WorkerPool,
    lines_read: usize,
    started: Instant,
    finished: Option<IngestStats>,
}

impl IngestionPipeline {
    pub fn new(gateway: Arc<dyn StorageGateway>, config: &IngestConfig) -> Self {
        let queue = WorkQueue::new();
        let pool = WorkerPool::start(config.workers, &queue, gateway, config.batch_size);
        Self {
            queue,
            pool,
            lines_read: 0,
            started: Instant::now(),
            finished: None,
        }
    }

    /// Enqueue one raw line. Always succeeds while the pipeline is open;
    /// after `finish()` it fails with `PipelineError::QueueClosed`.
    pub fn submit(&mut self, line: String) -> Result<(), PipelineError> {
        self.queue.push(line)?;
        self.lines_read += 1;
        Ok(())
    }

    /// Feed every line of the reader into the pipeline, stopping early if
    /// a shutdown signal arrives between lines.
    pub fn ingest_reader<R: BufRead>(&mut self, mut reader: R) -> Result<()> {
        let mut buffer = String::new();
        loop {
            if SignalHandler::should_terminate() {
                break;
            }

            buffer.clear();
            let bytes_read = reader.read_line(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }

            // Strip only the line terminator; interior and leading
            // whitespace is part of the line's identity.
            let line = buffer.trim_end_matches(&['\n', '\r'][..]).to_string();
            self.submit(line)?;
        }
        Ok(())
    }

    /// Close the queue, drain the pool, and return the final stats.
    /// Idempotent: a second call returns the same stats without waiting.
    pub fn finish(&mut self) -> IngestStats {
        if let Some(stats) = &self.finished {
            return stats.clone();
        }

        let mut stats = self.pool.stop_and_drain(&self.queue);
        stats.lines_read = self.lines_read;
        stats.processing_time = self.started.elapsed();

        self.finished = Some(stats.clone());
        stats
    }
}

/// A pipeline dropped without `finish()` (early return, error propagation)
/// still closes the queue and joins the workers, so every submitted line
/// reaches storage before the threads go away.
impl Drop for IngestionPipeline {
    fn drop(&mut self) {
        if self.finished.is_none() {
            self.finish();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use std::io::Cursor;

    fn test_config(workers: usize, batch_size: usize) -> IngestConfig {
        IngestConfig {
            workers,
            batch_size,
            ..Default::default()
        }
    }

    #[test]
    fn test_submit_after_finish_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let mut pipeline = IngestionPipeline::new(store, &test_config(2, 4));

        pipeline.submit("early".to_string()).unwrap();
        pipeline.finish();

        assert_eq!(
            pipeline.submit("late".to_string()),
            Err(PipelineError::QueueClosed)
        );
    }

    #[test]
    fn test_finish_is_idempotent() {
        let store = Arc::new(MemoryStore::new());
        let mut pipeline = IngestionPipeline::new(store, &test_config(2, 4));

        pipeline.submit("a".to_string()).unwrap();
        let first = pipeline.finish();
        let second = pipeline.finish();
        assert_eq!(first.inserted, second.inserted);
        assert_eq!(first.lines_read, 1);
    }

    #[test]
    fn test_ingest_reader_counts_lines_and_strips_newlines() {
        let store = Arc::new(MemoryStore::new());
        let mut pipeline = IngestionPipeline::new(store.clone(), &test_config(1, 2));

        pipeline
            .ingest_reader(Cursor::new("one\ntwo\r\nthree\n"))
            .unwrap();
        let stats = pipeline.finish();

        assert_eq!(stats.lines_read, 3);
        assert!(store.contains("two"));
        assert!(!store.contains("two\r"));
    }

    #[test]
    fn test_reader_error_does_not_lose_submitted_lines() {
        let store = Arc::new(MemoryStore::new());
        let mut pipeline = IngestionPipeline::new(store.clone(), &test_config(2, 4));

        // Second line is not valid UTF-8, so read_line fails after the
        // first line was already submitted.
        let result = pipeline.ingest_reader(Cursor::new(b"good line\n\xff\xfe\n".to_vec()));
        assert!(result.is_err());

        let stats = pipeline.finish();
        assert_eq!(stats.lines_read, 1);
        assert!(store.contains("good line"));
    }

    #[test]
    fn test_drop_without_finish_flushes_everything() {
        let store = Arc::new(MemoryStore::new());
        let mut pipeline = IngestionPipeline::new(store.clone(), &test_config(2, 3));

        for i in 0..10 {
            pipeline.submit(format!("line {}", i)).unwrap();
        }
        drop(pipeline);

        assert_eq!(store.len(), 10);
    }
}
