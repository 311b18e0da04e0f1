//! Test data helpers.

use bytes::Bytes;
use futures::Stream;

/// Deterministic payload of the given length. The 251-byte period makes
/// chunk-boundary mistakes (swapped, repeated, truncated chunks) visible.
pub fn test_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}

/// Turn a payload into a byte source, fragmented without regard to any
/// chunk size.
pub fn byte_source(
    data: &[u8],
    fragment_size: usize,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + use<> {
    let parts: Vec<Result<Bytes, std::io::Error>> = data
        .chunks(fragment_size.max(1))
        .map(|part| Ok(Bytes::copy_from_slice(part)))
        .collect();
    futures::stream::iter(parts)
}
