use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::walker::SizeReport;

/// Time-bounded memo of directory sizes.
///
/// A zero TTL disables the cache entirely, so every lookup misses and sizes
/// are recomputed on each request. With a non-zero TTL a reported size may be
/// up to `ttl` old; nothing watches the filesystem for invalidation.
#[derive(Debug)]
pub struct SizeCache {
    ttl: Duration,
    entries: Mutex<HashMap<PathBuf, (Instant, SizeReport)>>,
}

impl SizeCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh cached report for `path`, if any. Expired entries are evicted.
    pub fn get(&self, path: &Path) -> Option<SizeReport> {
        if !self.is_enabled() {
            return None;
        }

        let mut entries = self.entries.lock().ok()?;
        match entries.get(path) {
            Some((stored, report)) if stored.elapsed() < self.ttl => Some(*report),
            Some(_) => {
                entries.remove(path);
                None
            }
            None => None,
        }
    }

    /// Store `report` for `path`, dropping every expired entry on the way.
    pub fn insert(&self, path: &Path, report: SizeReport) {
        if !self.is_enabled() {
            return;
        }
        if let Ok(mut entries) = self.entries.lock() {
            entries.retain(|_, (stored, _)| stored.elapsed() < self.ttl);
            entries.insert(path.to_path_buf(), (Instant::now(), report));
        }
    }

    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SizeCache {
    fn default() -> Self {
        Self::disabled()
    }
}
