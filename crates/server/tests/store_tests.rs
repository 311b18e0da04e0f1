//! Integration tests for the SQLite store: record lifecycle, write-once
//! chunk semantics, ordered reassembly, and listing.

use bytes::Bytes;
use coffer_core::{FileId, FileStatus};
use coffer_store::{BlobStore, ChunkStore, FileCursor, FileIndex, SqliteStore, StoreError};
use futures::TryStreamExt;
use tempfile::TempDir;
use time::{Duration, OffsetDateTime};

async fn build_store() -> (TempDir, SqliteStore) {
    let temp = tempfile::tempdir().expect("Failed to create temp directory");
    let store = SqliteStore::new(temp.path().join("coffer.db"), None)
        .await
        .expect("Failed to create store");
    (temp, store)
}

#[tokio::test]
async fn create_and_get_record() {
    let (_temp, store) = build_store().await;

    let record = store
        .create_record("report.pdf", "application/pdf", 1024)
        .await
        .unwrap();
    assert_eq!(record.status, FileStatus::Pending);
    assert_eq!(record.length, 0);
    assert_eq!(record.chunk_count, 0);

    let fetched = store.get_record(record.id).await.unwrap();
    assert_eq!(fetched.id, record.id);
    assert_eq!(fetched.filename, "report.pdf");
    assert_eq!(fetched.content_type, "application/pdf");
    assert_eq!(fetched.chunk_size, 1024);
    assert_eq!(fetched.status, FileStatus::Pending);
    assert!(fetched.completed_at.is_none());
}

#[tokio::test]
async fn get_record_not_found() {
    let (_temp, store) = build_store().await;

    let err = store.get_record(FileId::new()).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn mark_complete_transitions_pending_record() {
    let (_temp, store) = build_store().await;

    let record = store
        .create_record("a.bin", "application/octet-stream", 1024)
        .await
        .unwrap();
    store.mark_complete(record.id, 2500, 3).await.unwrap();

    let fetched = store.get_record(record.id).await.unwrap();
    assert_eq!(fetched.status, FileStatus::Complete);
    assert_eq!(fetched.length, 2500);
    assert_eq!(fetched.chunk_count, 3);
    assert!(fetched.completed_at.is_some());
    assert_eq!(fetched.expected_chunk_count(), 3);
}

#[tokio::test]
async fn mark_complete_missing_record_is_not_found() {
    let (_temp, store) = build_store().await;

    let err = store.mark_complete(FileId::new(), 0, 0).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn mark_complete_twice_is_invalid_transition() {
    let (_temp, store) = build_store().await;

    let record = store
        .create_record("a.bin", "application/octet-stream", 1024)
        .await
        .unwrap();
    store.mark_complete(record.id, 10, 1).await.unwrap();

    let err = store.mark_complete(record.id, 10, 1).await.unwrap_err();
    match err {
        StoreError::InvalidTransition { from, to, .. } => {
            assert_eq!(from, "complete");
            assert_eq!(to, "complete");
        }
        other => panic!("expected InvalidTransition, got {other:?}"),
    }
}

#[tokio::test]
async fn write_chunk_is_write_once() {
    let (_temp, store) = build_store().await;
    let record = store
        .create_record("a.bin", "application/octet-stream", 1024)
        .await
        .unwrap();

    store
        .write_chunk(record.id, 0, Bytes::from_static(b"hello"))
        .await
        .unwrap();

    // A retry with identical bytes is a success.
    store
        .write_chunk(record.id, 0, Bytes::from_static(b"hello"))
        .await
        .unwrap();

    // Divergent bytes for the same key are a violation.
    let err = store
        .write_chunk(record.id, 0, Bytes::from_static(b"world"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StoreError::DuplicateChunk { seq: 0, .. }
    ));

    // The original data is untouched.
    let data = store.read_chunk(record.id, 0).await.unwrap();
    assert_eq!(&data[..], b"hello");
}

#[tokio::test]
async fn read_chunk_not_found() {
    let (_temp, store) = build_store().await;

    let err = store.read_chunk(FileId::new(), 0).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn chunks_reassemble_in_sequence_order() {
    let (_temp, store) = build_store().await;
    let record = store
        .create_record("a.bin", "application/octet-stream", 1024)
        .await
        .unwrap();

    // Write out of order; reassembly order must come from the sequence
    // numbers, not the write order.
    store
        .write_chunk(record.id, 2, Bytes::from_static(b"cc"))
        .await
        .unwrap();
    store
        .write_chunk(record.id, 0, Bytes::from_static(b"aa"))
        .await
        .unwrap();
    store
        .write_chunk(record.id, 1, Bytes::from_static(b"bb"))
        .await
        .unwrap();

    let chunks: Vec<(u64, Bytes)> = store
        .read_chunks_in_order(record.id)
        .await
        .unwrap()
        .try_collect()
        .await
        .unwrap();

    assert_eq!(
        chunks,
        vec![
            (0, Bytes::from_static(b"aa")),
            (1, Bytes::from_static(b"bb")),
            (2, Bytes::from_static(b"cc")),
        ]
    );
}

#[tokio::test]
async fn missing_sequence_is_a_gap() {
    let (_temp, store) = build_store().await;
    let record = store
        .create_record("a.bin", "application/octet-stream", 1024)
        .await
        .unwrap();

    store
        .write_chunk(record.id, 0, Bytes::from_static(b"aa"))
        .await
        .unwrap();
    store
        .write_chunk(record.id, 2, Bytes::from_static(b"cc"))
        .await
        .unwrap();

    let Err(err) = store.read_chunks_in_order(record.id).await else {
        panic!("expected error");
    };
    assert!(matches!(err, StoreError::GapDetected { missing: 1, .. }));
}

#[tokio::test]
async fn delete_all_chunks_is_idempotent() {
    let (_temp, store) = build_store().await;
    let record = store
        .create_record("a.bin", "application/octet-stream", 1024)
        .await
        .unwrap();

    for seq in 0..3u64 {
        store
            .write_chunk(record.id, seq, Bytes::from_static(b"x"))
            .await
            .unwrap();
    }
    assert_eq!(store.count_chunks(record.id).await.unwrap(), 3);

    assert_eq!(store.delete_all_chunks(record.id).await.unwrap(), 3);
    assert_eq!(store.count_chunks(record.id).await.unwrap(), 0);

    // Deleting again removes nothing and still succeeds.
    assert_eq!(store.delete_all_chunks(record.id).await.unwrap(), 0);
}

#[tokio::test]
async fn list_records_pages_in_creation_order() {
    let (_temp, store) = build_store().await;

    let mut created = Vec::new();
    for i in 0..5 {
        let record = store
            .create_record(&format!("file-{i}.bin"), "application/octet-stream", 1024)
            .await
            .unwrap();
        created.push(record.id);
    }

    // Walk the listing two records at a time.
    let mut seen = Vec::new();
    let mut cursor: Option<FileCursor> = None;
    loop {
        let page = store.list_records(cursor, 2).await.unwrap();
        if page.is_empty() {
            break;
        }
        cursor = page.last().map(FileCursor::after);
        seen.extend(page);
    }

    assert_eq!(seen.len(), 5);
    assert!(seen.windows(2).all(|pair| {
        (pair[0].created_at, pair[0].id.as_uuid()) <= (pair[1].created_at, pair[1].id.as_uuid())
    }));
    for id in created {
        assert!(seen.iter().any(|record| record.id == id));
    }
}

#[tokio::test]
async fn list_stale_pending_exposes_aborted_uploads() {
    let (_temp, store) = build_store().await;

    let aborted = store
        .create_record("aborted.bin", "application/octet-stream", 1024)
        .await
        .unwrap();
    let committed = store
        .create_record("done.bin", "application/octet-stream", 1024)
        .await
        .unwrap();
    store.mark_complete(committed.id, 0, 0).await.unwrap();

    let cutoff = OffsetDateTime::now_utc() + Duration::seconds(1);
    let stale = store.list_stale_pending(cutoff, 10).await.unwrap();

    assert_eq!(stale.len(), 1);
    assert_eq!(stale[0].id, aborted.id);
    assert_eq!(stale[0].status, FileStatus::Pending);
}

#[tokio::test]
async fn mark_deleting_and_remove_returns_record_once() {
    let (_temp, store) = build_store().await;

    let record = store
        .create_record("a.bin", "application/octet-stream", 1024)
        .await
        .unwrap();
    store.mark_complete(record.id, 5, 1).await.unwrap();

    let removed = store.mark_deleting_and_remove(record.id).await.unwrap();
    assert_eq!(removed.id, record.id);
    assert_eq!(removed.status, FileStatus::Deleting);
    assert_eq!(removed.length, 5);

    let err = store.mark_deleting_and_remove(record.id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));

    let err = store.get_record(record.id).await.unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[tokio::test]
async fn migrate_is_reentrant() {
    let (_temp, store) = build_store().await;
    // New() already migrated once; a second run must be a no-op.
    store.migrate().await.unwrap();
    store.health_check().await.unwrap();
}
