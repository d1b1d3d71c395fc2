//! SQLite-backed storage gateway
//!
//! One connection guarded by a mutex. Each `insert_batch` call holds the
//! lock for the whole batch, so the per-line check-and-insert is atomic
//! with respect to every other worker. The `logs.line` UNIQUE constraint
//! backs the same invariant at the schema level: a constraint violation is
//! counted as a duplicate skip, never an error.

use rusqlite::{params, Connection, ErrorCode, OpenFlags};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{BatchReport, LineFailure, StorageError, StorageGateway};

/// Fixture rows inserted by `--seed`
pub const SEED_ENTRIES: [&str; 3] = [
    "2024-10-22 10:23:34 - User login attempt",
    "2024-10-22 10:24:45 - User logout",
    "2024-10-22 10:25:56 - Server restarted",
];

/// SQLite-backed log line store
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open (or create) the database file and initialize the schema.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let open_error = |e: rusqlite::Error| StorageError::Open {
            path: path.display().to_string(),
            message: e.to_string(),
        };

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE,
        )
        .map_err(open_error)?;

        Self::configure_connection(&conn).map_err(open_error)?;
        Self::init_schema(&conn).map_err(open_error)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// In-memory database, used by tests.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let open_error = |e: rusqlite::Error| StorageError::Open {
            path: ":memory:".to_string(),
            message: e.to_string(),
        };
        let conn = Connection::open_in_memory().map_err(open_error)?;
        Self::init_schema(&conn).map_err(open_error)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        Ok(())
    }

    fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                line TEXT NOT NULL UNIQUE
            )",
            [],
        )?;
        Ok(())
    }

    /// Lock the connection with poison recovery
    fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        match self.conn.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                eprintln!("Warning: worker thread panicked, recovering store connection");
                poisoned.into_inner()
            }
        }
    }

    /// Insert the fixture rows, skipping any that already exist.
    /// Returns the number of rows actually inserted.
    pub fn seed(&self) -> Result<usize, StorageError> {
        let conn = self.lock_conn();
        let mut inserted = 0;
        for entry in SEED_ENTRIES {
            inserted += conn
                .execute(
                    "INSERT OR IGNORE INTO logs (line) VALUES (?1)",
                    params![entry],
                )
                .map_err(|e| StorageError::Unavailable(e.to_string()))?;
        }
        Ok(inserted)
    }

    /// Total number of stored records.
    pub fn count(&self) -> Result<u64, StorageError> {
        let conn = self.lock_conn();
        conn.query_row("SELECT COUNT(*) FROM logs", [], |row| row.get(0))
            .map_err(|e| StorageError::Unavailable(e.to_string()))
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation
    )
}

impl StorageGateway for SqliteStore {
    fn exists(&self, text: &str) -> Result<bool, StorageError> {
        let conn = self.lock_conn();
        conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM logs WHERE line = ?1)",
            params![text],
            |row| row.get(0),
        )
        .map_err(|e| StorageError::Unavailable(e.to_string()))
    }

    fn insert_batch(&self, lines: &[String]) -> BatchReport {
        let mut report = BatchReport {
            attempted: lines.len(),
            ..Default::default()
        };

        // One critical section per batch: the exists check and the insert
        // below cannot interleave with another worker's flush.
        let conn = self.lock_conn();

        for line in lines {
            let already_stored = conn
                .query_row(
                    "SELECT EXISTS(SELECT 1 FROM logs WHERE line = ?1)",
                    params![line],
                    |row| row.get::<_, bool>(0),
                )
                .unwrap_or(false);

            if already_stored {
                report.duplicates += 1;
                continue;
            }

            match conn.execute("INSERT INTO logs (line) VALUES (?1)", params![line]) {
                Ok(_) => report.inserted += 1,
                Err(e) if is_unique_violation(&e) => report.duplicates += 1,
                Err(e) => report.failures.push(LineFailure {
                    line: line.clone(),
                    error: StorageError::Unavailable(e.to_string()),
                }),
            }
        }

        report
    }
}
