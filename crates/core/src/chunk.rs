//! Chunk-size math.

/// Number of chunks needed to hold `length` bytes at `chunk_size` bytes each.
///
/// Zero-length input needs zero chunks. The last chunk may be shorter than
/// `chunk_size`; all others are exactly `chunk_size`.
pub fn chunk_count(length: u64, chunk_size: u64) -> u64 {
    if chunk_size == 0 {
        return 0;
    }
    length.div_ceil(chunk_size)
}

/// Validate a chunk size against the supported bounds.
pub fn validate_chunk_size(size: u64) -> crate::Result<()> {
    if size < crate::MIN_CHUNK_SIZE || size > crate::MAX_CHUNK_SIZE {
        return Err(crate::Error::InvalidChunkSize {
            size,
            min: crate::MIN_CHUNK_SIZE,
            max: crate::MAX_CHUNK_SIZE,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_count() {
        assert_eq!(chunk_count(0, 30), 0);
        assert_eq!(chunk_count(1, 30), 1);
        assert_eq!(chunk_count(30, 30), 1);
        assert_eq!(chunk_count(31, 30), 2);
        assert_eq!(chunk_count(100, 30), 4); // Last chunk holds 10 bytes
    }

    #[test]
    fn test_default_chunk_size_count() {
        // 600000 bytes at the default 255 KiB chunk size: two full chunks
        // plus a remainder.
        assert_eq!(chunk_count(600_000, crate::DEFAULT_CHUNK_SIZE), 3);
    }

    #[test]
    fn test_validate_chunk_size() {
        assert!(validate_chunk_size(crate::DEFAULT_CHUNK_SIZE).is_ok());
        assert!(validate_chunk_size(crate::MIN_CHUNK_SIZE).is_ok());
        assert!(validate_chunk_size(crate::MAX_CHUNK_SIZE).is_ok());
        assert!(validate_chunk_size(0).is_err());
        assert!(validate_chunk_size(crate::MAX_CHUNK_SIZE + 1).is_err());
    }
}
