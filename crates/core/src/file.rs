//! File identifiers, status machine, and metadata records.

use serde::{Deserialize, Serialize};
use std::fmt;
use time::OffsetDateTime;
use uuid::Uuid;

/// Unique identifier for a stored file.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(Uuid);

impl FileId {
    /// Generate a new random file ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create from an existing UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Parse from a string.
    pub fn parse(s: &str) -> crate::Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| crate::Error::InvalidFileId(format!("{s}: {e}")))
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for FileId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FileId({})", self.0)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// File record state.
///
/// A record starts `Pending`, becomes `Complete` only once every chunk is
/// durably written, and passes through `Deleting` on its way out. A record
/// that never leaves `Pending` is an aborted upload, visible to an external
/// reaper but never to readers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// Upload in progress; chunks may be missing.
    Pending,
    /// All chunks written and the record committed.
    Complete,
    /// Deletion has begun; the record is about to be removed.
    Deleting,
}

impl FileStatus {
    /// String form used by the persistence layer.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Complete => "complete",
            Self::Deleting => "deleting",
        }
    }

    /// Parse from the persisted string form.
    pub fn parse(s: &str) -> crate::Result<Self> {
        match s {
            "pending" => Ok(Self::Pending),
            "complete" => Ok(Self::Complete),
            "deleting" => Ok(Self::Deleting),
            other => Err(crate::Error::InvalidStatus(other.to_string())),
        }
    }

    /// Check if the file is readable.
    pub fn is_complete(&self) -> bool {
        matches!(self, Self::Complete)
    }

    /// Check if the file is still accepting chunks.
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metadata record for one logical file.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FileRecord {
    /// Unique identifier, assigned at creation, immutable.
    pub id: FileId,
    /// Display name. Not required to be unique.
    pub filename: String,
    /// MIME type, informational only.
    pub content_type: String,
    /// Total byte count, set once the upload commits.
    pub length: u64,
    /// Bytes per chunk, fixed at creation.
    pub chunk_size: u64,
    /// Number of chunks; derived from length, stored for fast validation.
    pub chunk_count: u64,
    /// Current lifecycle state.
    pub status: FileStatus,
    /// When the record was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// When the upload committed, if it has.
    #[serde(with = "time::serde::rfc3339::option")]
    pub completed_at: Option<OffsetDateTime>,
}

impl FileRecord {
    /// Create a new pending record with a fresh ID.
    pub fn new(filename: &str, content_type: &str, chunk_size: u64) -> Self {
        Self {
            id: FileId::new(),
            filename: filename.to_string(),
            content_type: content_type.to_string(),
            length: 0,
            chunk_size,
            chunk_count: 0,
            status: FileStatus::Pending,
            created_at: OffsetDateTime::now_utc(),
            completed_at: None,
        }
    }

    /// Calculate the chunk count implied by `length` and `chunk_size`.
    pub fn expected_chunk_count(&self) -> u64 {
        crate::chunk::chunk_count(self.length, self.chunk_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_id_roundtrip() {
        let id = FileId::new();
        let as_str = id.to_string();
        let parsed = FileId::parse(&as_str).unwrap();
        assert_eq!(id, parsed);
        assert_eq!(id.as_uuid(), parsed.as_uuid());
        assert!(FileId::parse("not-a-uuid").is_err());
    }

    #[test]
    fn test_status_roundtrip() {
        for status in [
            FileStatus::Pending,
            FileStatus::Complete,
            FileStatus::Deleting,
        ] {
            assert_eq!(FileStatus::parse(status.as_str()).unwrap(), status);
        }
        assert!(FileStatus::parse("committed").is_err());
    }

    #[test]
    fn test_status_flags() {
        assert!(FileStatus::Pending.is_pending());
        assert!(!FileStatus::Pending.is_complete());
        assert!(FileStatus::Complete.is_complete());
        assert!(!FileStatus::Deleting.is_complete());
        assert!(!FileStatus::Deleting.is_pending());
    }

    #[test]
    fn test_new_record_is_pending() {
        let record = FileRecord::new("a.txt", "text/plain", 64);
        assert_eq!(record.status, FileStatus::Pending);
        assert_eq!(record.length, 0);
        assert_eq!(record.chunk_count, 0);
        assert!(record.completed_at.is_none());
    }

    #[test]
    fn test_expected_chunk_count() {
        let mut record = FileRecord::new("a.txt", "text/plain", 64);
        record.length = 100;
        assert_eq!(record.expected_chunk_count(), 2);
        record.length = 128;
        assert_eq!(record.expected_chunk_count(), 2);
        record.length = 0;
        assert_eq!(record.expected_chunk_count(), 0);
    }
}
