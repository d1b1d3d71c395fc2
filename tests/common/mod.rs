// tests/common/mod.rs
// Shared test utilities for integration tests
#![allow(dead_code)]

use std::io::Write;
use std::process::{Command, Stdio};
use tempfile::NamedTempFile;

/// Run the logvault binary with the given arguments and stdin input
pub fn run_logvault_with_input(args: &[&str], input: &str) -> (String, String, i32) {
    // Use the built binary directly instead of cargo run to avoid compilation output
    let binary_path = if cfg!(debug_assertions) {
        "./target/debug/logvault"
    } else {
        "./target/release/logvault"
    };

    let mut cmd = Command::new(binary_path)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to start logvault");

    if let Some(stdin) = cmd.stdin.as_mut() {
        stdin
            .write_all(input.as_bytes())
            .expect("Failed to write to stdin");
    }

    let output = cmd.wait_with_output().expect("Failed to read output");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// Write content to a temp log file and run logvault against it.
/// Extra args come before the positional log file path.
pub fn run_logvault_with_log_file(args: &[&str], log_content: &str) -> (String, String, i32) {
    let mut log_file = NamedTempFile::new().expect("Failed to create temp log file");
    log_file
        .write_all(log_content.as_bytes())
        .expect("Failed to write to temp log file");
    log_file.flush().expect("Failed to flush temp log file");

    let mut full_args: Vec<&str> = args.to_vec();
    let path = log_file.path().to_str().unwrap().to_string();
    full_args.push(&path);

    run_logvault_with_input(&full_args, "")
}

/// Count the rows in a logvault database file
pub fn count_db_rows(db_path: &std::path::Path) -> u64 {
    let conn = rusqlite::Connection::open(db_path).expect("Failed to open database");
    conn.query_row("SELECT COUNT(*) FROM logs", [], |row| row.get(0))
        .expect("Failed to count rows")
}
