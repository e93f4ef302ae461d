// =============================================================================
// Result Cache - time-boxed results keyed by (symbol, timeframe)
// =============================================================================
//
// Thread safety:
//   - parking_lot::RwLock around the entry map; concurrent readers never
//     block each other, writers replace whole entries.
//   - Results are handed out as `Arc<ComputedResult>`, so a hit returns the
//     very object that was stored.
//   - Atomic hit / miss counters for lock-free stats.
//   - Every entry carries the config generation it was computed under.
//     `invalidate` bumps the generation while holding the entry lock, so an
//     insert computed against an older config is dropped instead of stored.
// =============================================================================

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::Serialize;

use crate::engine::result::ComputedResult;
use crate::market_data::SeriesKey;

#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: Arc<ComputedResult>,
    pub produced_at: Instant,
    pub generation: u64,
}

impl CacheEntry {
    pub fn is_fresh(&self, ttl: Duration) -> bool {
        self.produced_at.elapsed() < ttl
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
pub struct ResultCache {
    entries: RwLock<HashMap<SeriesKey, CacheEntry>>,
    generation: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current config generation.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Acquire)
    }

    /// The cached result for `key` if it is younger than `ttl` and was
    /// computed under `generation`.
    pub fn get_fresh(&self, key: &SeriesKey, ttl: Duration, generation: u64) -> Option<Arc<ComputedResult>> {
        let entries = self.entries.read();
        match entries.get(key) {
            Some(entry) if entry.generation == generation && entry.is_fresh(ttl) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(Arc::clone(&entry.data))
            }
            _ => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Store `data` for `key` unless the generation has moved on since it was
    /// computed.  Returns whether the entry was stored.
    pub fn insert(&self, key: SeriesKey, data: Arc<ComputedResult>, generation: u64) -> bool {
        let mut entries = self.entries.write();
        if generation != self.generation() {
            return false;
        }
        entries.insert(
            key,
            CacheEntry {
                data,
                produced_at: Instant::now(),
                generation,
            },
        );
        true
    }

    /// Remove every entry whose symbol and timeframe match the given
    /// filters; `None` matches anything.  Returns the number removed.
    pub fn remove_matching(&self, symbol: Option<&str>, timeframe: Option<&str>) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|key, _| {
            let symbol_hit = symbol.map_or(true, |s| key.symbol == s);
            let timeframe_hit = timeframe.map_or(true, |t| key.timeframe == t);
            !(symbol_hit && timeframe_hit)
        });
        before - entries.len()
    }

    pub fn clear(&self) -> usize {
        let mut entries = self.entries.write();
        let removed = entries.len();
        entries.clear();
        removed
    }

    /// Start a new generation and drop every entry.  Returns the number
    /// removed.
    pub fn invalidate(&self) -> usize {
        let mut entries = self.entries.write();
        self.generation.fetch_add(1, Ordering::AcqRel);
        let removed = entries.len();
        entries.clear();
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
