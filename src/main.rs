use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;

use logvault::cli::Cli;
use logvault::config::IngestConfig;
use logvault::pipeline::IngestionPipeline;
use logvault::platform::{ExitCode, SignalHandler};
use logvault::readers::LogReader;
use logvault::storage::{SqliteStore, StorageGateway};

fn main() {
    let cli = Cli::parse();

    let config = IngestConfig::from_cli(&cli);
    if let Err(e) = config.validate() {
        eprintln!("Error: {:#}", e);
        ExitCode::InvalidUsage.exit();
    }

    match run(&cli, &config) {
        Ok(()) => {
            if let Some(code) = SignalHandler::termination_code() {
                code.exit();
            }
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::GeneralError.exit();
        }
    }
}

fn run(cli: &Cli, config: &IngestConfig) -> Result<()> {
    let _signals = SignalHandler::install().context("Failed to install signal handler")?;

    // A store that cannot be opened is the one fatal condition: the
    // pipeline never starts without a usable handle.
    let store = SqliteStore::open(&cli.database)?;

    if config.seed {
        let inserted = store.seed()?;
        if !config.quiet {
            eprintln!("Seeded {} fixture rows", inserted);
        }
    }

    let reader = LogReader::open(cli.log_file.as_deref())?;

    let gateway: Arc<dyn StorageGateway> = Arc::new(store);
    let mut pipeline = IngestionPipeline::new(gateway, config);

    // Drain before surfacing a feed error: lines already submitted must
    // reach storage even when the reader fails mid-file.
    let feed_result = pipeline.ingest_reader(reader);
    let stats = pipeline.finish();

    if !config.quiet {
        eprintln!("{}", stats.format_summary());
    }

    feed_result?;
    Ok(())
}
