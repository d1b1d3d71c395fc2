//! Concurrent ingestion pipeline
//!
//! Lines flow from a single producer through a shared work queue into a
//! fixed pool of worker threads. Each worker accumulates lines into a
//! local batch and flushes it to the storage gateway when full, and once
//! more on shutdown. Queue access and storage access are independent
//! synchronization domains: the queue is a channel, the store serializes
//! its own check-and-insert critical section.
//!
//! # Module Structure
//!
//! - `queue`: shared work queue with a close signal
//! - `worker`: worker thread and batch flushing
//! - `pool`: worker lifecycle (start, stop-and-drain)
//! - `ingest`: the `IngestionPipeline` orchestrator

mod ingest;
mod pool;
mod queue;
mod worker;

pub use ingest::IngestionPipeline;
pub use pool::WorkerPool;
pub use queue::{PipelineError, WorkQueue};
