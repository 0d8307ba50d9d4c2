//! DynamoDB-backed record table.

use async_trait::async_trait;
use aws_sdk_dynamodb::Client as DynamoClient;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, AttributeValue, BillingMode, KeySchemaElement, KeyType,
    ScalarAttributeType, TableStatus,
};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use super::{PutOutcome, RecordTable, ScanPage};
use crate::core::config::RecordMode;
use crate::core::models::ProcessedRecord;
use crate::errors::DigestError;

const KEY_ATTR: &str = "video_id";
const SOURCE_ATTR: &str = "channel_name";
const SUMMARY_ATTR: &str = "summary";
const PROCESSED_AT_ATTR: &str = "processed_at";

const ACTIVE_POLL_INTERVAL: Duration = Duration::from_secs(2);
const ACTIVE_POLL_ATTEMPTS: usize = 30;

fn aws_error(op: &str, e: impl std::error::Error) -> DigestError {
    DigestError::AwsError(format!("dynamodb {op}: {}", DisplayErrorContext(e)))
}

fn string_attr(item: &HashMap<String, AttributeValue>, name: &str) -> Option<String> {
    item.get(name).and_then(|v| v.as_s().ok()).cloned()
}

fn record_from_item(item: &HashMap<String, AttributeValue>) -> Result<ProcessedRecord, DigestError> {
    let item_id = string_attr(item, KEY_ATTR)
        .ok_or_else(|| DigestError::PersistenceFailed(format!("record without {KEY_ATTR}")))?;
    Ok(ProcessedRecord {
        item_id,
        source_name: string_attr(item, SOURCE_ATTR).unwrap_or_default(),
        summary: string_attr(item, SUMMARY_ATTR).unwrap_or_default(),
        processed_at: string_attr(item, PROCESSED_AT_ATTR).unwrap_or_default(),
    })
}

pub struct DynamoRecordTable {
    client: DynamoClient,
    table_name: String,
}

impl DynamoRecordTable {
    #[must_use]
    pub fn new(client: DynamoClient, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    #[must_use]
    pub fn from_sdk_config(sdk_config: &aws_config::SdkConfig, table_name: impl Into<String>) -> Self {
        Self::new(DynamoClient::new(sdk_config), table_name)
    }

    async fn status(&self) -> Result<Option<TableStatus>, DigestError> {
        match self
            .client
            .describe_table()
            .table_name(&self.table_name)
            .send()
            .await
        {
            Ok(out) => Ok(out.table().and_then(|t| t.table_status()).cloned()),
            Err(e) => {
                if e.as_service_error()
                    .is_some_and(|se| se.is_resource_not_found_exception())
                {
                    Ok(None)
                } else {
                    Err(aws_error("describe_table", e))
                }
            }
        }
    }
}

#[async_trait]
impl RecordTable for DynamoRecordTable {
    fn name(&self) -> &str {
        &self.table_name
    }

    async fn exists(&self) -> Result<bool, DigestError> {
        Ok(self.status().await?.is_some())
    }

    async fn create_and_wait(&self) -> Result<(), DigestError> {
        let key_schema = KeySchemaElement::builder()
            .attribute_name(KEY_ATTR)
            .key_type(KeyType::Hash)
            .build()
            .map_err(|e| aws_error("key schema", e))?;
        let key_attr = AttributeDefinition::builder()
            .attribute_name(KEY_ATTR)
            .attribute_type(ScalarAttributeType::S)
            .build()
            .map_err(|e| aws_error("attribute definition", e))?;

        self.client
            .create_table()
            .table_name(&self.table_name)
            .key_schema(key_schema)
            .attribute_definitions(key_attr)
            .billing_mode(BillingMode::PayPerRequest)
            .send()
            .await
            .map_err(|e| aws_error("create_table", e))?;

        for attempt in 1..=ACTIVE_POLL_ATTEMPTS {
            if self.status().await? == Some(TableStatus::Active) {
                return Ok(());
            }
            debug!(
                "Waiting for table {} to become active (attempt {})",
                self.table_name, attempt
            );
            tokio::time::sleep(ACTIVE_POLL_INTERVAL).await;
        }

        Err(DigestError::AwsError(format!(
            "table {} did not become active",
            self.table_name
        )))
    }

    async fn scan_ids(&self, start_key: Option<String>) -> Result<ScanPage, DigestError> {
        let exclusive_start = start_key.map(|key| {
            HashMap::from([(KEY_ATTR.to_string(), AttributeValue::S(key))])
        });

        let out = self
            .client
            .scan()
            .table_name(&self.table_name)
            .projection_expression(KEY_ATTR)
            .set_exclusive_start_key(exclusive_start)
            .send()
            .await
            .map_err(|e| aws_error("scan", e))?;

        let ids = out
            .items()
            .iter()
            .filter_map(|item| string_attr(item, KEY_ATTR))
            .collect();
        let next_start_key = out
            .last_evaluated_key()
            .and_then(|key| string_attr(key, KEY_ATTR));

        Ok(ScanPage {
            ids,
            next_start_key,
        })
    }

    async fn put(&self, record: &ProcessedRecord, mode: RecordMode) -> Result<PutOutcome, DigestError> {
        let mut request = self
            .client
            .put_item()
            .table_name(&self.table_name)
            .item(KEY_ATTR, AttributeValue::S(record.item_id.clone()))
            .item(SOURCE_ATTR, AttributeValue::S(record.source_name.clone()))
            .item(SUMMARY_ATTR, AttributeValue::S(record.summary.clone()))
            .item(PROCESSED_AT_ATTR, AttributeValue::S(record.processed_at.clone()));

        if mode == RecordMode::InsertIfAbsent {
            request = request.condition_expression(format!("attribute_not_exists({KEY_ATTR})"));
        }

        match request.send().await {
            Ok(_) => Ok(PutOutcome::Written),
            Err(e) => {
                if e.as_service_error()
                    .is_some_and(|se| se.is_conditional_check_failed_exception())
                {
                    Ok(PutOutcome::AlreadyPresent)
                } else {
                    Err(aws_error("put_item", e))
                }
            }
        }
    }

    async fn get(&self, item_id: &str) -> Result<Option<ProcessedRecord>, DigestError> {
        let out = self
            .client
            .get_item()
            .table_name(&self.table_name)
            .key(KEY_ATTR, AttributeValue::S(item_id.to_string()))
            .send()
            .await
            .map_err(|e| aws_error("get_item", e))?;

        out.item().map(record_from_item).transpose()
    }
}
