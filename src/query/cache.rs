//! LRU cache of compiled paths
//!
//! Repeated lookups of the same path string (typical when a caller walks
//! many slave entries with identical queries) skip validation and splitting.

use super::path::{CompiledPath, PathError};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, PoisonError};

/// Entries kept when no capacity is given
pub const DEFAULT_CAPACITY: usize = 128;

/// Hit/miss counters
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
}

pub struct PathCache {
    inner: Mutex<LruCache<String, Arc<CompiledPath>>>,
    stats: Mutex<CacheStats>,
}

impl PathCache {
    /// A zero capacity is raised to one
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        PathCache {
            inner: Mutex::new(LruCache::new(capacity)),
            stats: Mutex::new(CacheStats::default()),
        }
    }

    /// Return the compiled form of `path`, compiling on a miss.
    ///
    /// Invalid paths are not cached.
    pub fn get_or_compile(&self, path: &str) -> Result<Arc<CompiledPath>, PathError> {
        let mut cache = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = cache.get(path) {
            self.record(true);
            return Ok(Arc::clone(hit));
        }

        let compiled = Arc::new(CompiledPath::compile(path)?);
        cache.put(path.to_string(), Arc::clone(&compiled));
        self.record(false);
        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().map_or(0, |c| c.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        self.stats.lock().map(|s| *s).unwrap_or_default()
    }

    fn record(&self, hit: bool) {
        if let Ok(mut stats) = self.stats.lock() {
            if hit {
                stats.hits += 1;
            } else {
                stats.misses += 1;
            }
        }
    }
}

impl Default for PathCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
