// Offline mirror for wire-format plays
// MessagePack + LZ4 entries with versioning and integrity checks

pub mod error;
pub mod format;
pub mod store;

pub use error::CacheError;
pub use format::{decompress_and_deserialize, serialize_and_compress, CacheEntry};
pub use store::PlayCache;

pub const CACHE_VERSION: u32 = 1;
