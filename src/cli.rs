use clap::Parser;
use std::path::PathBuf;

/// Command-line interface for logvault
#[derive(Parser, Debug)]
#[command(name = "logvault")]
#[command(about = "Ingest log files into a deduplicating SQLite store")]
#[command(
    long_about = "Ingest log files into a deduplicating SQLite store\n\nEach unique line of the input becomes exactly one stored record. Lines are\nprocessed by a pool of worker threads that batch their writes; duplicate\nlines are skipped, not errors. Gzip and zstd compressed inputs are\ndecompressed transparently."
)]
#[command(version)]
pub struct Cli {
    /// SQLite database file (created if missing)
    pub database: PathBuf,

    /// Log file to ingest; reads stdin when omitted
    pub log_file: Option<PathBuf>,

    /// Number of worker threads (defaults to the CPU count)
    #[arg(short = 'w', long = "workers", help_heading = "Performance Options")]
    pub workers: Option<usize>,

    /// Lines accumulated per worker before a flush to storage
    #[arg(short = 'b', long = "batch-size", help_heading = "Performance Options")]
    pub batch_size: Option<usize>,

    /// Insert the fixture rows before ingesting
    #[arg(long = "seed", help_heading = "Database Options")]
    pub seed: bool,

    /// Suppress the summary line printed after the drain
    #[arg(short = 'q', long = "quiet", help_heading = "Output Options")]
    pub quiet: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_positional_and_flags() {
        let cli = Cli::parse_from([
            "logvault",
            "logs.db",
            "app.log",
            "--workers",
            "2",
            "--batch-size",
            "5",
            "--seed",
        ]);
        assert_eq!(cli.database, PathBuf::from("logs.db"));
        assert_eq!(cli.log_file, Some(PathBuf::from("app.log")));
        assert_eq!(cli.workers, Some(2));
        assert_eq!(cli.batch_size, Some(5));
        assert!(cli.seed);
        assert!(!cli.quiet);
    }

    #[test]
    fn test_log_file_is_optional() {
        let cli = Cli::parse_from(["logvault", "logs.db"]);
        assert!(cli.log_file.is_none());
        assert!(cli.workers.is_none());
    }
}
