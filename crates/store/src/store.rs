//! Store trait and SQLite implementation.

use crate::error::{StoreError, StoreResult};
use crate::repos::{BlobStore, ChunkStore, ChunkStream, FileCursor, FileIndex};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

/// SQLite-backed blob store.
///
/// Every statement issued here is a single atomic document operation; the
/// store provides no cross-call transaction beyond the few multi-statement
/// invariants that are wrapped explicitly.
pub struct SqliteStore {
    pool: Pool<Sqlite>,
    #[allow(dead_code)] // Reserved for a future timeout wrapper
    query_timeout_secs: u64,
}

impl SqliteStore {
    /// Open (creating if missing) a SQLite store and run migrations.
    pub async fn new(
        path: impl AsRef<Path>,
        query_timeout_secs: Option<u64>,
    ) -> StoreResult<Self> {
        let path = path.as_ref();
        let query_timeout_secs = query_timeout_secs.unwrap_or(600);

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }

        let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}?mode=rwc", path.display()))
            .map_err(StoreError::Database)?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
            .foreign_keys(true)
            // Prevent transient "database is locked" errors under concurrent access.
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            // SQLite permits limited write concurrency; a single connection avoids
            // persistent "database is locked" failures under server concurrency.
            .max_connections(1)
            .connect_with(opts)
            .await?;

        let store = Self {
            pool,
            query_timeout_secs,
        };
        store.migrate().await?;

        tracing::debug!(path = %path.display(), "SQLite store opened");
        Ok(store)
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }
}

#[async_trait]
impl BlobStore for SqliteStore {
    async fn migrate(&self) -> StoreResult<()> {
        sqlx::query(SCHEMA_SQL).execute(&self.pool).await?;
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

mod sqlite_impl {
    use super::*;
    use crate::models::{ChunkRow, FileRow};
    use bytes::Bytes;
    use coffer_core::{FileId, FileRecord, FileStatus};
    use futures::StreamExt;
    use time::OffsetDateTime;

    #[async_trait]
    impl FileIndex for SqliteStore {
        async fn create_record(
            &self,
            filename: &str,
            content_type: &str,
            chunk_size: u64,
        ) -> StoreResult<FileRecord> {
            let record = FileRecord::new(filename, content_type, chunk_size);

            sqlx::query(
                r#"
                INSERT INTO files (
                    file_id, filename, content_type, length, chunk_size,
                    chunk_count, status, created_at, completed_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(*record.id.as_uuid())
            .bind(&record.filename)
            .bind(&record.content_type)
            .bind(record.length as i64)
            .bind(record.chunk_size as i64)
            .bind(record.chunk_count as i64)
            .bind(record.status.as_str())
            .bind(record.created_at)
            .bind(record.completed_at)
            .execute(&self.pool)
            .await?;

            Ok(record)
        }

        async fn mark_complete(
            &self,
            id: FileId,
            length: u64,
            chunk_count: u64,
        ) -> StoreResult<()> {
            // Guarded transition: only a pending record can commit. The
            // single UPDATE is the atomicity boundary.
            let result = sqlx::query(
                r#"
                UPDATE files
                SET status = 'complete', length = ?, chunk_count = ?, completed_at = ?
                WHERE file_id = ? AND status = 'pending'
                "#,
            )
            .bind(length as i64)
            .bind(chunk_count as i64)
            .bind(OffsetDateTime::now_utc())
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await?;

            if result.rows_affected() > 0 {
                return Ok(());
            }

            // Disambiguate: missing record vs. wrong state.
            let status: Option<(String,)> =
                sqlx::query_as("SELECT status FROM files WHERE file_id = ?")
                    .bind(*id.as_uuid())
                    .fetch_optional(&self.pool)
                    .await?;

            match status {
                None => Err(StoreError::NotFound(format!("file {id}"))),
                Some((from,)) => Err(StoreError::InvalidTransition {
                    file_id: id,
                    from,
                    to: FileStatus::Complete.as_str().to_string(),
                }),
            }
        }

        async fn get_record(&self, id: FileId) -> StoreResult<FileRecord> {
            let row = sqlx::query_as::<_, FileRow>("SELECT * FROM files WHERE file_id = ?")
                .bind(*id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;

            match row {
                Some(row) => row.into_record(),
                None => Err(StoreError::NotFound(format!("file {id}"))),
            }
        }

        async fn list_records(
            &self,
            after: Option<FileCursor>,
            limit: u32,
        ) -> StoreResult<Vec<FileRecord>> {
            let rows = match after {
                Some(cursor) => {
                    sqlx::query_as::<_, FileRow>(
                        r#"
                        SELECT * FROM files
                        WHERE (created_at, file_id) > (?, ?)
                        ORDER BY created_at, file_id
                        LIMIT ?
                        "#,
                    )
                    .bind(cursor.created_at)
                    .bind(*cursor.file_id.as_uuid())
                    .bind(limit as i64)
                    .fetch_all(&self.pool)
                    .await?
                }
                None => {
                    sqlx::query_as::<_, FileRow>(
                        "SELECT * FROM files ORDER BY created_at, file_id LIMIT ?",
                    )
                    .bind(limit as i64)
                    .fetch_all(&self.pool)
                    .await?
                }
            };

            rows.into_iter().map(FileRow::into_record).collect()
        }

        async fn list_stale_pending(
            &self,
            older_than: OffsetDateTime,
            limit: u32,
        ) -> StoreResult<Vec<FileRecord>> {
            let rows = sqlx::query_as::<_, FileRow>(
                r#"
                SELECT * FROM files
                WHERE status = 'pending' AND created_at < ?
                ORDER BY created_at
                LIMIT ?
                "#,
            )
            .bind(older_than)
            .bind(limit as i64)
            .fetch_all(&self.pool)
            .await?;

            rows.into_iter().map(FileRow::into_record).collect()
        }

        async fn mark_deleting_and_remove(&self, id: FileId) -> StoreResult<FileRecord> {
            // Read, transition to deleting, and remove in one transaction so
            // no reader can observe the record after this returns.
            let mut tx = self.pool.begin().await?;

            let row = sqlx::query_as::<_, FileRow>("SELECT * FROM files WHERE file_id = ?")
                .bind(*id.as_uuid())
                .fetch_optional(&mut *tx)
                .await?;

            let Some(row) = row else {
                return Err(StoreError::NotFound(format!("file {id}")));
            };

            sqlx::query("UPDATE files SET status = 'deleting' WHERE file_id = ?")
                .bind(*id.as_uuid())
                .execute(&mut *tx)
                .await?;

            sqlx::query("DELETE FROM files WHERE file_id = ?")
                .bind(*id.as_uuid())
                .execute(&mut *tx)
                .await?;

            tx.commit().await?;

            let mut record = row.into_record()?;
            record.status = FileStatus::Deleting;
            Ok(record)
        }
    }

    #[async_trait]
    impl ChunkStore for SqliteStore {
        async fn write_chunk(&self, file_id: FileId, seq: u64, data: Bytes) -> StoreResult<()> {
            let result = sqlx::query("INSERT INTO chunks (file_id, seq, data) VALUES (?, ?, ?)")
                .bind(*file_id.as_uuid())
                .bind(seq as i64)
                .bind(data.as_ref())
                .execute(&self.pool)
                .await;

            match result {
                Ok(_) => Ok(()),
                Err(sqlx::Error::Database(db_err))
                    if db_err.message().contains("UNIQUE constraint") =>
                {
                    // Write-once: a retry carrying identical bytes is a
                    // success, anything else is a duplicate-write violation.
                    let existing: Option<(Vec<u8>,)> = sqlx::query_as(
                        "SELECT data FROM chunks WHERE file_id = ? AND seq = ?",
                    )
                    .bind(*file_id.as_uuid())
                    .bind(seq as i64)
                    .fetch_optional(&self.pool)
                    .await?;

                    match existing {
                        Some((stored,)) if stored.as_slice() == data.as_ref() => Ok(()),
                        _ => Err(StoreError::DuplicateChunk { file_id, seq }),
                    }
                }
                Err(e) => Err(e.into()),
            }
        }

        async fn read_chunk(&self, file_id: FileId, seq: u64) -> StoreResult<Bytes> {
            let row = sqlx::query_as::<_, ChunkRow>(
                "SELECT * FROM chunks WHERE file_id = ? AND seq = ?",
            )
            .bind(*file_id.as_uuid())
            .bind(seq as i64)
            .fetch_optional(&self.pool)
            .await?;

            match row {
                Some(row) => Ok(Bytes::from(row.data)),
                None => Err(StoreError::NotFound(format!("chunk {file_id}/{seq}"))),
            }
        }

        async fn read_chunks_in_order(&self, file_id: FileId) -> StoreResult<ChunkStream> {
            // Fetch the sequence index first: cheap (no payloads) and lets a
            // gap fail the operation before any bytes are handed out.
            let seqs: Vec<i64> =
                sqlx::query_scalar("SELECT seq FROM chunks WHERE file_id = ? ORDER BY seq")
                    .bind(*file_id.as_uuid())
                    .fetch_all(&self.pool)
                    .await?;

            for (expected, seq) in seqs.iter().enumerate() {
                if *seq != expected as i64 {
                    return Err(StoreError::GapDetected {
                        file_id,
                        missing: expected as u64,
                    });
                }
            }

            // Fetch payloads one at a time as the consumer advances, so
            // memory stays bounded regardless of file size.
            let pool = self.pool.clone();
            let stream = futures::stream::iter(seqs).then(move |seq| {
                let pool = pool.clone();
                async move {
                    let row = sqlx::query_as::<_, ChunkRow>(
                        "SELECT * FROM chunks WHERE file_id = ? AND seq = ?",
                    )
                    .bind(*file_id.as_uuid())
                    .bind(seq)
                    .fetch_optional(&pool)
                    .await?;

                    match row {
                        Some(row) => Ok((row.seq as u64, Bytes::from(row.data))),
                        // The chunk was present in the index scan but is gone
                        // now (concurrent delete).
                        None => Err(StoreError::GapDetected {
                            file_id,
                            missing: seq as u64,
                        }),
                    }
                }
            });

            Ok(Box::pin(stream))
        }

        async fn count_chunks(&self, file_id: FileId) -> StoreResult<u64> {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chunks WHERE file_id = ?")
                .bind(*file_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;
            Ok(count as u64)
        }

        async fn delete_all_chunks(&self, file_id: FileId) -> StoreResult<u64> {
            let result = sqlx::query("DELETE FROM chunks WHERE file_id = ?")
                .bind(*file_id.as_uuid())
                .execute(&self.pool)
                .await?;
            Ok(result.rows_affected())
        }
    }
}

const SCHEMA_SQL: &str = r#"
-- File metadata, one row per logical file
CREATE TABLE IF NOT EXISTS files (
    file_id BLOB PRIMARY KEY,
    filename TEXT NOT NULL,
    content_type TEXT NOT NULL,
    length INTEGER NOT NULL DEFAULT 0,
    chunk_size INTEGER NOT NULL,
    chunk_count INTEGER NOT NULL DEFAULT 0,
    status TEXT NOT NULL DEFAULT 'pending',
    created_at TEXT NOT NULL,
    completed_at TEXT
);
CREATE INDEX IF NOT EXISTS idx_files_status_created ON files(status, created_at);
CREATE INDEX IF NOT EXISTS idx_files_created ON files(created_at, file_id);

-- Chunk payloads. The composite primary key enforces write-once semantics
-- and backs the ordered range scan used for reassembly.
CREATE TABLE IF NOT EXISTS chunks (
    file_id BLOB NOT NULL,
    seq INTEGER NOT NULL,
    data BLOB NOT NULL,
    PRIMARY KEY (file_id, seq)
);
"#;
