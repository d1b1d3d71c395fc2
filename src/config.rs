use anyhow::{bail, Result};

use crate::cli::Cli;

/// Default lines accumulated per worker before a flush
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Resolved runtime configuration for an ingestion run
#[derive(Debug, Clone)]
pub struct IngestConfig {
    pub workers: usize,
    pub batch_size: usize,
    pub seed: bool,
    pub quiet: bool,
}

impl IngestConfig {
    /// Resolve configuration from CLI arguments, applying defaults.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            workers: cli.workers.unwrap_or_else(num_cpus::get),
            batch_size: cli.batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
            seed: cli.seed,
            quiet: cli.quiet,
        }
    }

    /// Both knobs must be at least 1 for the pipeline to make progress.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            bail!("--workers must be at least 1");
        }
        if self.batch_size == 0 {
            bail!("--batch-size must be at least 1");
        }
        Ok(())
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get(),
            batch_size: DEFAULT_BATCH_SIZE,
            seed: false,
            quiet: false,
        }
    }
}
