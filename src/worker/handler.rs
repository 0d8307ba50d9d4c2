#![allow(clippy::missing_errors_doc)]
use aws_config::{BehaviorVersion, Region, SdkConfig};
use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info};

use super::deliver::{Distributor, Sink};
use super::pipeline::Pipeline;
use super::sinks::{LongformSink, MicroblogSink};
use crate::ai::{Summarizer, TextGenerator};
use crate::clients::{OpenAiGenerator, S3ConfigSource, TimedTextClient, XClient, YouTubeClient};
use crate::core::config::AppConfig;
use crate::core::models::RunOutcome;
use crate::core::resolver::{ConfigResolver, RemoteConfigSource};
use crate::store::{DynamoRecordTable, ProcessedTracker, RecordTable};

pub async fn load_sdk_config(config: &AppConfig) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()))
        .load()
        .await
}

#[must_use]
pub fn dynamo_table(config: &AppConfig, sdk_config: &SdkConfig) -> Arc<dyn RecordTable> {
    Arc::new(DynamoRecordTable::from_sdk_config(sdk_config, config.table_name.clone()))
}

/// Wire the production clients around `table`.
#[must_use]
pub fn build_pipeline(
    config: &AppConfig,
    sdk_config: &SdkConfig,
    table: Arc<dyn RecordTable>,
) -> Pipeline {
    let remote = config.config_bucket.as_ref().map(|bucket| {
        Box::new(S3ConfigSource::from_sdk_config(
            sdk_config,
            bucket.clone(),
            config.config_key.clone(),
        )) as Box<dyn RemoteConfigSource>
    });
    let resolver = ConfigResolver::new(remote, config.config_path.clone());

    let generator = OpenAiGenerator::from_config(config)
        .map(|g| Box::new(g) as Box<dyn TextGenerator>);
    let summarizer = Arc::new(Summarizer::new(generator, config.sink_model.clone()));

    let sinks: Vec<Box<dyn Sink>> = vec![
        Box::new(MicroblogSink::new(
            Arc::clone(&summarizer),
            XClient::from_config(config),
        )),
        Box::new(LongformSink),
    ];

    Pipeline::new(
        resolver,
        ProcessedTracker::new(table, config.record_mode),
        Box::new(YouTubeClient::from_config(config)),
        Arc::new(TimedTextClient::from_config(config)),
        summarizer,
        Distributor::new(sinks),
        config.transcript_language.clone(),
    )
}

/// Run one batch against DynamoDB, or report why the environment was
/// rejected. Always yields the status/message pair the scheduler expects.
pub async fn run_with_config(config: Result<AppConfig, String>) -> RunOutcome {
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Config error: {}", e);
            return RunOutcome::error(format!("Invalid configuration: {e}"));
        }
    };

    let sdk_config = load_sdk_config(&config).await;
    let table = dynamo_table(&config, &sdk_config);
    build_pipeline(&config, &sdk_config, table).run_once().await
}

/// Lambda handler for the scheduled trigger. The event payload is ignored.
pub async fn function_handler(event: LambdaEvent<Value>) -> Result<RunOutcome, Error> {
    info!(
        "Digest Lambda invoked (request {})",
        event.context.request_id
    );

    Ok(run_with_config(AppConfig::from_env()).await)
}
