//! Single-slot load cache for the sensor log
//!
//! The CSV is parsed on first use and the parsed log is shared by every
//! request until [`LoadCache::invalidate`] is called. There is exactly one
//! slot, keyed by the source path the cache was built with.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use crate::sensors::{LoadError, SensorLog};

/// Memoized sensor log loader.
#[derive(Debug)]
pub struct LoadCache {
    path: PathBuf,
    slot: RwLock<Option<Arc<SensorLog>>>,
    loads: AtomicU64,
}

impl LoadCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            slot: RwLock::new(None),
            loads: AtomicU64::new(0),
        }
    }

    /// Cache pre-filled with an already parsed log. `invalidate()` will drop
    /// it and the next `get()` reads `path`.
    pub fn with_log(path: impl Into<PathBuf>, log: SensorLog) -> Self {
        let cache = Self::new(path);
        *cache.write_slot() = Some(Arc::new(log));
        cache
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the cached log, loading it if the slot is empty.
    pub fn get(&self) -> Result<Arc<SensorLog>, LoadError> {
        if let Some(log) = self.read_slot().as_ref() {
            return Ok(Arc::clone(log));
        }

        let mut slot = self.write_slot();
        // Another caller may have filled the slot while we waited for the lock
        if let Some(log) = slot.as_ref() {
            return Ok(Arc::clone(log));
        }

        let log = Arc::new(SensorLog::load(&self.path)?);
        self.loads.fetch_add(1, Ordering::Relaxed);
        *slot = Some(Arc::clone(&log));
        Ok(log)
    }

    /// Drop the cached log so the next `get()` re-reads the file.
    pub fn invalidate(&self) {
        let had_log = self.write_slot().take().is_some();
        info!(path = %self.path.display(), had_log, "Sensor log cache invalidated");
    }

    pub fn is_loaded(&self) -> bool {
        self.read_slot().is_some()
    }

    /// Number of times the file has been read from disk.
    pub fn load_count(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }

    fn read_slot(&self) -> std::sync::RwLockReadGuard<'_, Option<Arc<SensorLog>>> {
        self.slot.read().unwrap_or_else(|e| {
            warn!("RwLock poisoned on load cache read, recovering");
            e.into_inner()
        })
    }

    fn write_slot(&self) -> std::sync::RwLockWriteGuard<'_, Option<Arc<SensorLog>>> {
        self.slot.write().unwrap_or_else(|e| {
            warn!("RwLock poisoned on load cache write, recovering");
            e.into_inner()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("sensors.csv");
        let mut f = std::fs::File::create(&path).unwrap();
        f.write_all(body.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_reads_file_once_until_invalidated() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "timestamp,machine_id,maintenance_required\n2025-01-01 00:00:00,A,0\n",
        );
        let cache = LoadCache::new(&path);
        assert!(!cache.is_loaded());

        let first = cache.get().unwrap();
        let second = cache.get().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.load_count(), 1);

        // File changes are not observed until invalidation
        write_csv(
            &dir,
            "timestamp,machine_id,maintenance_required\n2025-01-01 00:00:00,A,0\n2025-01-01 00:01:00,B,1\n",
        );
        assert_eq!(cache.get().unwrap().len(), 1);

        cache.invalidate();
        assert!(!cache.is_loaded());
        assert_eq!(cache.get().unwrap().len(), 2);
        assert_eq!(cache.load_count(), 2);
    }

    #[test]
    fn test_failed_load_leaves_slot_empty() {
        let cache = LoadCache::new("/no/such/file.csv");
        assert!(cache.get().is_err());
        assert!(!cache.is_loaded());
        assert_eq!(cache.load_count(), 0);
    }

    #[test]
    fn test_with_log_skips_disk() {
        let cache = LoadCache::with_log("/no/such/file.csv", SensorLog::from_readings(Vec::new()));
        assert!(cache.get().is_ok());
        assert_eq!(cache.load_count(), 0);
    }
}
