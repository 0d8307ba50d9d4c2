//! Durable record of processed items, keyed by item id.

pub mod dynamo;
pub mod memory;

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{error, info, warn};

use crate::core::config::RecordMode;
use crate::core::models::ProcessedRecord;
use crate::errors::DigestError;

pub use dynamo::DynamoRecordTable;
pub use memory::MemoryRecordTable;

/// One page of a key-only scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    pub ids: Vec<String>,
    /// Key to resume from; `None` on the last page.
    pub next_start_key: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Written,
    /// Conditional write found an existing record and left it in place.
    AlreadyPresent,
}

/// Backing table operations. Implementations do no logging of their own
/// beyond debug detail; the tracker owns the failure policy.
#[async_trait]
pub trait RecordTable: Send + Sync {
    fn name(&self) -> &str;

    async fn exists(&self) -> Result<bool, DigestError>;

    /// Create the table and return once it is usable.
    async fn create_and_wait(&self) -> Result<(), DigestError>;

    async fn scan_ids(&self, start_key: Option<String>) -> Result<ScanPage, DigestError>;

    async fn put(&self, record: &ProcessedRecord, mode: RecordMode) -> Result<PutOutcome, DigestError>;

    async fn get(&self, item_id: &str) -> Result<Option<ProcessedRecord>, DigestError>;
}

#[async_trait]
impl<T: RecordTable + ?Sized> RecordTable for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn exists(&self) -> Result<bool, DigestError> {
        (**self).exists().await
    }

    async fn create_and_wait(&self) -> Result<(), DigestError> {
        (**self).create_and_wait().await
    }

    async fn scan_ids(&self, start_key: Option<String>) -> Result<ScanPage, DigestError> {
        (**self).scan_ids(start_key).await
    }

    async fn put(&self, record: &ProcessedRecord, mode: RecordMode) -> Result<PutOutcome, DigestError> {
        (**self).put(record, mode).await
    }

    async fn get(&self, item_id: &str) -> Result<Option<ProcessedRecord>, DigestError> {
        (**self).get(item_id).await
    }
}

pub struct ProcessedTracker<T> {
    table: T,
    mode: RecordMode,
    ready: AtomicBool,
}

impl<T: RecordTable> ProcessedTracker<T> {
    #[must_use]
    pub fn new(table: T, mode: RecordMode) -> Self {
        Self {
            table,
            mode,
            ready: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn table(&self) -> &T {
        &self.table
    }

    /// Create the backing table if it is absent. Idempotent; once the table
    /// is known to exist later calls return without a round trip.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceFailed` when the table cannot be checked or created.
    pub async fn ensure_store_exists(&self) -> Result<(), DigestError> {
        if self.ready.load(Ordering::Acquire) {
            return Ok(());
        }

        let exists = self.table.exists().await.map_err(as_persistence)?;
        if !exists {
            self.table.create_and_wait().await.map_err(as_persistence)?;
            info!("Created record table: {}", self.table.name());
        }

        self.ready.store(true, Ordering::Release);
        Ok(())
    }

    /// Every processed item id. Degrades to an empty set when the store is
    /// unusable so the run processes everything instead of halting.
    pub async fn get_processed_ids(&self) -> HashSet<String> {
        match self.scan_all().await {
            Ok(ids) => {
                info!("Retrieved {} processed items from {}", ids.len(), self.table.name());
                ids
            }
            Err(e) => {
                warn!("Record table unusable, treating processed set as empty: {}", e);
                HashSet::new()
            }
        }
    }

    async fn scan_all(&self) -> Result<HashSet<String>, DigestError> {
        self.ensure_store_exists().await?;

        let mut ids = HashSet::new();
        let mut start_key = None;
        loop {
            let page = self.table.scan_ids(start_key).await.map_err(as_persistence)?;
            ids.extend(page.ids);
            match page.next_start_key {
                Some(next) => start_key = Some(next),
                None => break,
            }
        }
        Ok(ids)
    }

    /// Record `item_id` as processed, stamped with the current time.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceFailed` on any storage failure.
    pub async fn mark_processed(
        &self,
        item_id: &str,
        source_name: &str,
        summary: &str,
    ) -> Result<(), DigestError> {
        self.ensure_store_exists().await?;

        let record = ProcessedRecord {
            item_id: item_id.to_string(),
            source_name: source_name.to_string(),
            summary: summary.to_string(),
            processed_at: Utc::now().to_rfc3339(),
        };

        match self.table.put(&record, self.mode).await {
            Ok(PutOutcome::Written) => {
                info!("Marked item {} as processed", item_id);
                Ok(())
            }
            Ok(PutOutcome::AlreadyPresent) => {
                info!("Item {} was already recorded, leaving existing record", item_id);
                Ok(())
            }
            Err(e) => {
                error!("Error marking item {} as processed: {}", item_id, e);
                Err(as_persistence(e))
            }
        }
    }

    /// Point lookup for auditing and replay tooling.
    ///
    /// # Errors
    ///
    /// Returns `PersistenceFailed` when the store cannot be read.
    pub async fn get_record(&self, item_id: &str) -> Result<Option<ProcessedRecord>, DigestError> {
        self.ensure_store_exists().await?;
        let record = self.table.get(item_id).await.map_err(as_persistence)?;
        if record.is_none() {
            warn!("Item {} not found in {}", item_id, self.table.name());
        }
        Ok(record)
    }
}

fn as_persistence(e: DigestError) -> DigestError {
    match e {
        DigestError::PersistenceFailed(_) => e,
        other => DigestError::PersistenceFailed(other.to_string()),
    }
}
