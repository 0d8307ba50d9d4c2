//! Local runner for the digest pipeline.
//!
//! # Usage
//!
//! ```bash
//! # One batch against the configured DynamoDB table
//! digest run
//!
//! # Dry run: records are kept in memory and discarded on exit
//! digest run --memory-store
//!
//! # Print the stored record for an item
//! digest lookup dQw4w9WgXcQ
//! ```

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use std::sync::Arc;

use daily_digest::core::config::AppConfig;
use daily_digest::core::models::RunStatus;
use daily_digest::store::{MemoryRecordTable, ProcessedTracker, RecordTable};
use daily_digest::worker::handler::{build_pipeline, dynamo_table, load_sdk_config};

#[derive(Parser, Debug)]
#[command(name = "digest")]
#[command(about = "Summarize newly published videos and share them")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Process every configured source once
    Run {
        /// Keep processed records in memory instead of DynamoDB
        #[arg(long)]
        memory_store: bool,
    },
    /// Print the processed record stored for an item
    Lookup {
        item_id: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    daily_digest::setup_logging();

    let args = Args::parse();
    let config = AppConfig::from_env().map_err(|e| anyhow!(e))?;
    let sdk_config = load_sdk_config(&config).await;

    match args.command {
        Command::Run { memory_store } => {
            let table: Arc<dyn RecordTable> = if memory_store {
                Arc::new(MemoryRecordTable::new(config.table_name.clone()))
            } else {
                dynamo_table(&config, &sdk_config)
            };
            let outcome = build_pipeline(&config, &sdk_config, table)
                .run_once()
                .await;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            if outcome.status == RunStatus::Error {
                std::process::exit(1);
            }
        }
        Command::Lookup { item_id } => {
            let tracker =
                ProcessedTracker::new(dynamo_table(&config, &sdk_config), config.record_mode);
            let record = tracker
                .get_record(&item_id)
                .await
                .with_context(|| format!("Failed to look up item {item_id}"))?;
            match record {
                Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
                None => println!("No record for item {item_id}"),
            }
        }
    }

    Ok(())
}
