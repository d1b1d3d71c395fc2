// Core library for the logvault log ingestion tool

pub mod cli;
pub mod config;
pub mod pipeline;
pub mod platform;
pub mod readers;
pub mod stats;
pub mod storage;

pub use cli::Cli;
pub use config::IngestConfig;
pub use pipeline::{IngestionPipeline, PipelineError, WorkQueue, WorkerPool};
pub use readers::LogReader;
pub use stats::IngestStats;
pub use storage::{
    BatchReport, LineFailure, MemoryStore, SqliteStore, StorageError, StorageGateway,
};
