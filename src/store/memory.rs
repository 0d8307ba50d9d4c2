//! In-process record table for local dry runs and tests.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{PutOutcome, RecordTable, ScanPage};
use crate::core::config::RecordMode;
use crate::core::models::ProcessedRecord;
use crate::errors::DigestError;

const DEFAULT_PAGE_SIZE: usize = 100;

pub struct MemoryRecordTable {
    name: String,
    records: Mutex<BTreeMap<String, ProcessedRecord>>,
    exists: AtomicBool,
    page_size: usize,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    writes: AtomicUsize,
}

impl Default for MemoryRecordTable {
    fn default() -> Self {
        Self::new("memory")
    }
}

impl MemoryRecordTable {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Mutex::new(BTreeMap::new()),
            exists: AtomicBool::new(false),
            page_size: DEFAULT_PAGE_SIZE,
            fail_reads: AtomicBool::new(false),
            fail_writes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Seed existing records; the table is marked as existing.
    #[must_use]
    pub fn with_records(self, records: impl IntoIterator<Item = ProcessedRecord>) -> Self {
        {
            let mut map = self.lock();
            for record in records {
                map.insert(record.item_id.clone(), record);
            }
        }
        self.exists.store(true, Ordering::Release);
        self
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Release);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::Release);
    }

    /// Number of successful `put` calls that wrote a record.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn records(&self) -> Vec<ProcessedRecord> {
        self.lock().values().cloned().collect()
    }

    #[must_use]
    pub fn is_created(&self) -> bool {
        self.exists.load(Ordering::Acquire)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, ProcessedRecord>> {
        self.records
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn check_reads(&self) -> Result<(), DigestError> {
        if self.fail_reads.load(Ordering::Acquire) {
            return Err(DigestError::AwsError("simulated read failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordTable for MemoryRecordTable {
    fn name(&self) -> &str {
        &self.name
    }

    async fn exists(&self) -> Result<bool, DigestError> {
        self.check_reads()?;
        Ok(self.is_created())
    }

    async fn create_and_wait(&self) -> Result<(), DigestError> {
        self.exists.store(true, Ordering::Release);
        Ok(())
    }

    async fn scan_ids(&self, start_key: Option<String>) -> Result<ScanPage, DigestError> {
        self.check_reads()?;
        let map = self.lock();
        let mut keys = map
            .keys()
            .filter(|k| start_key.as_ref().is_none_or(|start| *k > start))
            .take(self.page_size + 1)
            .cloned()
            .collect::<Vec<_>>();

        let next_start_key = if keys.len() > self.page_size {
            keys.truncate(self.page_size);
            keys.last().cloned()
        } else {
            None
        };

        Ok(ScanPage {
            ids: keys,
            next_start_key,
        })
    }

    async fn put(&self, record: &ProcessedRecord, mode: RecordMode) -> Result<PutOutcome, DigestError> {
        if self.fail_writes.load(Ordering::Acquire) {
            return Err(DigestError::AwsError("simulated write failure".to_string()));
        }
        let mut map = self.lock();
        if mode == RecordMode::InsertIfAbsent && map.contains_key(&record.item_id) {
            return Ok(PutOutcome::AlreadyPresent);
        }
        map.insert(record.item_id.clone(), record.clone());
        self.writes.fetch_add(1, Ordering::AcqRel);
        Ok(PutOutcome::Written)
    }

    async fn get(&self, item_id: &str) -> Result<Option<ProcessedRecord>, DigestError> {
        self.check_reads()?;
        Ok(self.lock().get(item_id).cloned())
    }
}
