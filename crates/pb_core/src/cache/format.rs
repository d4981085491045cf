//! Cache entry envelope: MessagePack + LZ4 with versioning and an integrity
//! checksum.

use super::error::CacheError;
use super::CACHE_VERSION;
use crate::play::converter::WirePlay;
use serde::{Deserialize, Serialize};

use lz4_flex::{compress_prepend_size, decompress_size_prepended};
use rmp_serde::{from_slice, to_vec_named};
use sha2::{Digest, Sha256};

/// One cached play, wrapped with enough metadata to detect skew.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CacheEntry {
    /// Entry format version for migration.
    pub version: u32,

    /// Write timestamp (unix milliseconds).
    pub saved_at: u64,

    /// Play id this entry mirrors.
    pub play_id: i64,

    /// The wire-format play data.
    pub data: WirePlay,
}

impl CacheEntry {
    pub fn new(play_id: i64, data: WirePlay) -> Self {
        Self {
            version: CACHE_VERSION,
            saved_at: current_timestamp(),
            play_id,
            data,
        }
    }
}

/// Serialize a cache entry to its on-disk byte form.
pub fn serialize_and_compress(entry: &CacheEntry) -> Result<Vec<u8>, CacheError> {
    // 1. Serialize to MessagePack with field names
    let msgpack = to_vec_named(entry)?;

    // 2. Compress with LZ4 (size prepended for easy decompression)
    let compressed = compress_prepend_size(&msgpack);

    // 3. Add SHA256 checksum at the end
    let mut hasher = Sha256::new();
    hasher.update(&compressed);
    let checksum = hasher.finalize();

    let mut result = compressed;
    result.extend_from_slice(&checksum);

    Ok(result)
}

/// Parse on-disk bytes back into a cache entry.
pub fn decompress_and_deserialize(bytes: &[u8]) -> Result<CacheEntry, CacheError> {
    // Minimum size: LZ4 size header + checksum
    if bytes.len() < 4 + 32 {
        return Err(CacheError::Corrupted);
    }

    let (payload, checksum_bytes) = bytes.split_at(bytes.len() - 32);

    let mut hasher = Sha256::new();
    hasher.update(payload);
    let calculated_checksum = hasher.finalize();

    if &calculated_checksum[..] != checksum_bytes {
        return Err(CacheError::ChecksumMismatch);
    }

    let msgpack =
        decompress_size_prepended(payload).map_err(|_| CacheError::Decompression)?;

    let entry: CacheEntry = from_slice(&msgpack)?;

    if entry.version > CACHE_VERSION {
        return Err(CacheError::VersionMismatch {
            found: entry.version,
            expected: CACHE_VERSION,
        });
    }

    Ok(entry)
}

pub fn current_timestamp() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}
