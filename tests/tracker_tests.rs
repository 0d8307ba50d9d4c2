use daily_digest::core::config::RecordMode;
use daily_digest::core::models::ProcessedRecord;
use daily_digest::errors::DigestError;
use daily_digest::store::{MemoryRecordTable, ProcessedTracker};

fn record(id: &str) -> ProcessedRecord {
    ProcessedRecord {
        item_id: id.to_string(),
        source_name: "Rust Talks".to_string(),
        summary: format!("summary of {id}"),
        processed_at: "2024-05-01T00:00:00+00:00".to_string(),
    }
}

#[tokio::test]
async fn test_ensure_store_creates_missing_table_once() {
    let tracker = ProcessedTracker::new(MemoryRecordTable::new("videos"), RecordMode::Upsert);
    assert!(!tracker.table().is_created());

    tracker.ensure_store_exists().await.unwrap();
    tracker.ensure_store_exists().await.unwrap();

    assert!(tracker.table().is_created());
}

#[tokio::test]
async fn test_processed_ids_read_every_page() {
    let table = MemoryRecordTable::new("videos")
        .with_page_size(2)
        .with_records((0..7).map(|i| record(&format!("vid{i}"))));
    let tracker = ProcessedTracker::new(table, RecordMode::Upsert);

    let ids = tracker.get_processed_ids().await;

    assert_eq!(ids.len(), 7);
    assert!(ids.contains("vid0"));
    assert!(ids.contains("vid6"));
}

#[tokio::test]
async fn test_unreadable_store_yields_empty_set() {
    let table = MemoryRecordTable::new("videos").with_records([record("vid1")]);
    table.set_fail_reads(true);
    let tracker = ProcessedTracker::new(table, RecordMode::Upsert);

    assert!(tracker.get_processed_ids().await.is_empty());
}

#[tokio::test]
async fn test_mark_processed_writes_record() {
    let tracker = ProcessedTracker::new(MemoryRecordTable::default(), RecordMode::Upsert);

    tracker
        .mark_processed("vid1", "Rust Talks", "A summary")
        .await
        .unwrap();

    let stored = tracker.get_record("vid1").await.unwrap().unwrap();
    assert_eq!(stored.source_name, "Rust Talks");
    assert_eq!(stored.summary, "A summary");
    assert!(chrono::DateTime::parse_from_rfc3339(&stored.processed_at).is_ok());
    assert!(tracker.get_processed_ids().await.contains("vid1"));
}

#[tokio::test]
async fn test_mark_processed_failure_is_persistence_error() {
    let table = MemoryRecordTable::default();
    table.set_fail_writes(true);
    let tracker = ProcessedTracker::new(table, RecordMode::Upsert);

    let result = tracker.mark_processed("vid1", "Rust Talks", "A summary").await;

    assert!(matches!(result, Err(DigestError::PersistenceFailed(_))));
}

#[tokio::test]
async fn test_insert_if_absent_keeps_existing_record() {
    let table = MemoryRecordTable::new("videos").with_records([record("vid1")]);
    let tracker = ProcessedTracker::new(table, RecordMode::InsertIfAbsent);

    tracker
        .mark_processed("vid1", "Other", "replacement")
        .await
        .unwrap();

    let stored = tracker.get_record("vid1").await.unwrap().unwrap();
    assert_eq!(stored.summary, "summary of vid1");
    assert_eq!(tracker.table().writes(), 0);
}

#[tokio::test]
async fn test_upsert_overwrites_existing_record() {
    let table = MemoryRecordTable::new("videos").with_records([record("vid1")]);
    let tracker = ProcessedTracker::new(table, RecordMode::Upsert);

    tracker
        .mark_processed("vid1", "Other", "replacement")
        .await
        .unwrap();

    let stored = tracker.get_record("vid1").await.unwrap().unwrap();
    assert_eq!(stored.summary, "replacement");
}

#[tokio::test]
async fn test_get_record_missing_item() {
    let tracker = ProcessedTracker::new(MemoryRecordTable::default(), RecordMode::Upsert);
    assert!(tracker.get_record("nope").await.unwrap().is_none());
}
