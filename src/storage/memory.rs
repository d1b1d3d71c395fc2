//! In-memory storage gateway
//!
//! Backs the test suite: a HashSet behind a mutex gives the same atomic
//! check-and-insert contract as the SQLite store, plus optional per-line
//! failure injection and a record of flush sizes for batch-boundary
//! assertions.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};

use super::{BatchReport, LineFailure, StorageError, StorageGateway};

#[derive(Default)]
struct Inner {
    records: HashSet<String>,
    batch_sizes: Vec<usize>,
}

/// In-memory log line store
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
    fail_lines: HashSet<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that reports `StorageError::Unavailable` for the given lines.
    pub fn with_failures<I, S>(fail_lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            inner: Mutex::new(Inner::default()),
            fail_lines: fail_lines.into_iter().map(Into::into).collect(),
        }
    }

    fn lock_inner(&self) -> MutexGuard<'_, Inner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                eprintln!("Warning: worker thread panicked, recovering memory store");
                poisoned.into_inner()
            }
        }
    }

    pub fn contains(&self, text: &str) -> bool {
        self.lock_inner().records.contains(text)
    }

    pub fn len(&self) -> usize {
        self.lock_inner().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock_inner().records.is_empty()
    }

    /// Sizes of every batch flushed into this store, in arrival order.
    pub fn recorded_batch_sizes(&self) -> Vec<usize> {
        self.lock_inner().batch_sizes.clone()
    }
}

impl StorageGateway for MemoryStore {
    fn exists(&self, text: &str) -> Result<bool, StorageError> {
        Ok(self.lock_inner().records.contains(text))
    }

    fn insert_batch(&self, lines: &[String]) -> BatchReport {
        let mut report = BatchReport {
            attempted: lines.len(),
            ..Default::default()
        };

        let mut inner = self.lock_inner();
        inner.batch_sizes.push(lines.len());

        for line in lines {
            if self.fail_lines.contains(line) {
                report.failures.push(LineFailure {
                    line: line.clone(),
                    error: StorageError::Unavailable("injected failure".to_string()),
                });
                continue;
            }

            if inner.records.insert(line.clone()) {
                report.inserted += 1;
            } else {
                report.duplicates += 1;
            }
        }

        report
    }
}
