//! Storage boundary for the ingestion pipeline
//!
//! The pipeline only needs two capabilities from the persistent store:
//! checking whether a line is already recorded, and inserting a batch of
//! lines with duplicates silently skipped. Everything behind this trait
//! (schema, durability, indexing) belongs to the store implementation.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::{SqliteStore, SEED_ENTRIES};

use thiserror::Error;

/// Errors surfaced by a storage gateway
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store could not be opened at all. Fatal: the pipeline must not
    /// start without a usable store handle.
    #[error("failed to open store {path}: {message}")]
    Open { path: String, message: String },

    /// A single operation against the store failed. Reported per attempted
    /// line; never aborts the rest of a batch.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// A line whose storage attempt failed
#[derive(Debug)]
pub struct LineFailure {
    pub line: String,
    pub error: StorageError,
}

/// Outcome of one `insert_batch` call
#[derive(Debug, Default)]
pub struct BatchReport {
    pub attempted: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub failures: Vec<LineFailure>,
}

/// Capability interface to the persistent store.
///
/// Implementations must serialize concurrent `insert_batch` calls so that
/// the check-and-insert step is atomic with respect to other callers: two
/// workers flushing the same text concurrently must produce exactly one
/// stored record and one duplicate skip.
pub trait StorageGateway: Send + Sync {
    /// Whether a record with this exact text is already stored.
    fn exists(&self, text: &str) -> Result<bool, StorageError>;

    /// Insert every line of the batch that is not already stored.
    ///
    /// Duplicates (within the batch or against prior state) are skipped,
    /// not errors. A failure on one line is recorded in the report and the
    /// remaining lines are still attempted.
    fn insert_batch(&self, lines: &[String]) -> BatchReport;
}
