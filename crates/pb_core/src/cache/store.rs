//! Keyed on-disk store mirroring wire plays for offline use.

use super::error::CacheError;
use super::format::{decompress_and_deserialize, serialize_and_compress, CacheEntry};
use crate::play::converter::WirePlay;

use std::fs::{remove_dir_all, rename, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

const ENTRY_EXTENSION: &str = "pbc";

/// One entry per play id, last write wins.
///
/// Cache failures are never fatal to callers: [`try_load`] degrades misses
/// and corrupt entries to `None` so the session can fall through to the
/// remote store.
///
/// [`try_load`]: PlayCache::try_load
pub struct PlayCache {
    dir: PathBuf,
}

impl PlayCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write (or overwrite) the entry for `play_id`.
    pub fn save(&self, play_id: i64, data: &WirePlay) -> Result<(), CacheError> {
        std::fs::create_dir_all(&self.dir)?;

        let entry = CacheEntry::new(play_id, data.clone());
        let bytes = serialize_and_compress(&entry)?;

        // Atomic save: write to temp file, then rename
        let path = self.entry_path(play_id);
        let temp_path = path.with_extension("tmp");

        {
            let mut file = File::create(&temp_path)?;
            file.write_all(&bytes)?;
            file.flush()?;
            file.sync_all()?;
        }
        rename(&temp_path, &path)?;

        log::debug!("Cached play {} ({} bytes) at {:?}", play_id, bytes.len(), path);
        Ok(())
    }

    /// Strict load, reporting why an entry was unusable.
    pub fn load(&self, play_id: i64) -> Result<WirePlay, CacheError> {
        let path = self.entry_path(play_id);
        if !path.exists() {
            return Err(CacheError::EntryNotFound { play_id });
        }

        let mut file = File::open(&path)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        let entry = decompress_and_deserialize(&bytes)?;
        Ok(entry.data)
    }

    /// Non-fatal load: any failure is logged and reported as a miss.
    pub fn try_load(&self, play_id: i64) -> Option<WirePlay> {
        match self.load(play_id) {
            Ok(data) => Some(data),
            Err(CacheError::EntryNotFound { .. }) => {
                log::debug!("No cache entry for play {}", play_id);
                None
            }
            Err(err) => {
                log::warn!("Cache entry for play {} unusable: {}", play_id, err);
                None
            }
        }
    }

    pub fn exists(&self, play_id: i64) -> bool {
        self.entry_path(play_id).exists()
    }

    /// Remove every entry unconditionally.
    pub fn clear_all(&self) -> Result<(), CacheError> {
        if self.dir.exists() {
            remove_dir_all(&self.dir)?;
            log::info!("Play cache cleared");
        }
        Ok(())
    }

    fn entry_path(&self, play_id: i64) -> PathBuf {
        self.dir.join(format!("play_{}.{}", play_id, ENTRY_EXTENSION))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::play::converter::{FlagRecord, PositionRecord, WireStep};
    use tempfile::TempDir;

    fn sample_wire(x: f32) -> WirePlay {
        WirePlay {
            steps: vec![WireStep {
                duration: 0.5,
                positions: vec![PositionRecord { id: 0, x, y: 0.0, z: 0.0 }],
                block_actions: vec![FlagRecord { id: 0, block: true }],
            }],
        }
    }

    #[test]
    fn save_then_try_load_roundtrips() {
        let temp = TempDir::new().unwrap();
        let cache = PlayCache::new(temp.path().join("plays"));

        cache.save(7, &sample_wire(1.0)).unwrap();
        assert!(cache.exists(7));

        let loaded = cache.try_load(7).unwrap();
        assert_eq!(loaded, sample_wire(1.0));
    }

    #[test]
    fn save_overwrites_existing_entry() {
        let temp = TempDir::new().unwrap();
        let cache = PlayCache::new(temp.path().join("plays"));

        cache.save(7, &sample_wire(1.0)).unwrap();
        cache.save(7, &sample_wire(2.0)).unwrap();

        assert_eq!(cache.try_load(7).unwrap(), sample_wire(2.0));
    }

    #[test]
    fn entries_are_independent() {
        let temp = TempDir::new().unwrap();
        let cache = PlayCache::new(temp.path().join("plays"));

        cache.save(1, &sample_wire(1.0)).unwrap();
        cache.save(2, &sample_wire(2.0)).unwrap();

        assert_eq!(cache.try_load(1).unwrap(), sample_wire(1.0));
        assert_eq!(cache.try_load(2).unwrap(), sample_wire(2.0));
    }

    #[test]
    fn clear_all_removes_every_entry() {
        let temp = TempDir::new().unwrap();
        let cache = PlayCache::new(temp.path().join("plays"));

        cache.save(7, &sample_wire(1.0)).unwrap();
        cache.clear_all().unwrap();

        assert!(!cache.exists(7));
        assert!(cache.try_load(7).is_none());

        // Clearing an already-empty cache is fine.
        cache.clear_all().unwrap();
    }

    #[test]
    fn missing_entry_is_a_miss_not_an_error() {
        let temp = TempDir::new().unwrap();
        let cache = PlayCache::new(temp.path().join("plays"));

        assert!(cache.try_load(42).is_none());
        assert!(matches!(
            cache.load(42),
            Err(CacheError::EntryNotFound { play_id: 42 })
        ));
    }

    #[test]
    fn corrupt_entry_degrades_to_a_miss() {
        let temp = TempDir::new().unwrap();
        let cache = PlayCache::new(temp.path().join("plays"));

        cache.save(7, &sample_wire(1.0)).unwrap();

        // Flip a byte in the stored entry.
        let path = temp.path().join("plays").join("play_7.pbc");
        let mut bytes = std::fs::read(&path).unwrap();
        let mid = bytes.len() / 2;
        bytes[mid] = bytes[mid].wrapping_add(1);
        std::fs::write(&path, bytes).unwrap();

        assert!(cache.try_load(7).is_none());
    }

    #[test]
    fn no_temp_file_left_behind() {
        let temp = TempDir::new().unwrap();
        let cache = PlayCache::new(temp.path().join("plays"));

        cache.save(7, &sample_wire(1.0)).unwrap();
        assert!(!temp.path().join("plays").join("play_7.tmp").exists());
    }
}
