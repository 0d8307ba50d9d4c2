/// Daily digest - summarizes newly published videos and shares them.
///
/// Each run reads a list of sources, discovers items published within the
/// lookback window, skips ones already recorded, fetches transcripts, asks an
/// LLM for a summary, fans a compact version out to the enabled sinks, and
/// records the item so it is never processed twice.
///
/// # Architecture
///
/// The system uses:
/// - AWS Lambda for the scheduled entry point
/// - S3 for the shared configuration document
/// - DynamoDB for the processed-item record
/// - openai-api-rs message types for chat completions
/// - Tokio for async runtime
///
/// # Example
///
/// ```no_run
/// use daily_digest::core::config::AppConfig;
/// use daily_digest::worker::handler::{build_pipeline, dynamo_table, load_sdk_config};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     daily_digest::setup_logging();
///
///     let config = AppConfig::from_env()?;
///     let sdk_config = load_sdk_config(&config).await;
///     let pipeline = build_pipeline(&config, &sdk_config, dynamo_table(&config, &sdk_config));
///
///     let report = pipeline.run().await?;
///     println!("{}", report.summary_line());
///     Ok(())
/// }
/// ```
pub mod ai;
pub mod clients;
pub mod content;
pub mod core;
pub mod discovery;
pub mod errors;
pub mod prompt;
pub mod store;
pub mod worker;

pub use errors::DigestError;

/// Configure structured logging with JSON format for AWS Lambda environments.
///
/// The filter comes from `RUST_LOG` and defaults to `info`. Calling this more
/// than once keeps the first subscriber.
///
/// # Example
///
/// ```
/// daily_digest::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
