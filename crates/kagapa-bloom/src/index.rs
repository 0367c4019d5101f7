use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use kagapa_core::config::BloomSettings;
use kagapa_core::traits::DictionaryStore;
use kagapa_core::types::Table;
use kagapa_core::{normalize_word, Error, Result, WordStream};

use crate::filter::{estimated_memory_bytes, BloomFilter};

/// A completed build, published as one immutable unit.
struct LoadedIndex {
    filter: BloomFilter,
    capacity: usize,
    error_rate: f64,
    words_loaded: usize,
    last_rebuild: DateTime<Utc>,
}

/// Fast "is this word in the main dictionary?" pre-check.
///
/// Starts empty and answers `true` for everything until the first
/// [`rebuild`](Self::rebuild) completes (fail-open: `true` only ever means
/// "ask the store"). Rebuilds never mutate the published filter; they build a
/// fresh one and swap it in, so readers see the old or the new index and
/// never a half-built one. New store words become visible at the next rebuild.
#[derive(Default)]
pub struct DictionaryExistenceIndex {
    rebuild_lock: Mutex<()>,
    published: RwLock<Option<Arc<LoadedIndex>>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndexStats {
    pub loaded: bool,
    pub capacity: usize,
    pub error_rate: f64,
    pub words_loaded: usize,
    pub estimated_memory_bytes: u64,
    pub last_rebuild: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebuildReport {
    pub words_loaded: usize,
    pub elapsed_ms: u64,
}

impl DictionaryExistenceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from every word in the main dictionary.
    ///
    /// Concurrent calls run one after another. On any store error the build
    /// is dropped and the previously published index stays in place.
    pub fn rebuild(&self, store: &dyn DictionaryStore, settings: &BloomSettings) -> Result<RebuildReport> {
        let BloomSettings { capacity, error_rate, batch_size } = *settings;
        if capacity == 0 {
            return Err(Error::InvalidInput("bloom capacity must be positive".into()));
        }
        if !(error_rate > 0.0 && error_rate < 1.0) {
            return Err(Error::InvalidInput(format!("bloom error rate must be in (0, 1), got {error_rate}")));
        }

        let _guard = self.rebuild_lock.lock();
        info!(capacity, error_rate, "Rebuilding main dictionary bloom filter");
        let start = Instant::now();

        let mut filter = BloomFilter::with_rate(capacity, error_rate);
        let mut words_loaded = 0usize;
        for word in WordStream::new(store, Table::Main, batch_size) {
            let word = word.inspect_err(|e| warn!(error = %e, "Bloom rebuild aborted; keeping previous filter"))?;
            filter.insert(&normalize_word(&word));
            words_loaded += 1;
        }
        if words_loaded > capacity {
            warn!(words_loaded, capacity, "Bloom filter over capacity; false-positive rate will exceed target");
        }

        let loaded = LoadedIndex { filter, capacity, error_rate, words_loaded, last_rebuild: Utc::now() };
        *self.published.write() = Some(Arc::new(loaded));

        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(words_loaded, elapsed_ms, "Bloom rebuild completed");
        Ok(RebuildReport { words_loaded, elapsed_ms })
    }

    /// `false` means the word is definitely absent from the last rebuild's
    /// snapshot; `true` means it may be present (or nothing is loaded yet).
    pub fn might_exist(&self, word: &str) -> bool {
        match self.current() {
            None => true,
            Some(loaded) => loaded.filter.contains(&normalize_word(word)),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.published.read().is_some()
    }

    pub fn stats(&self) -> IndexStats {
        match self.current() {
            None => IndexStats {
                loaded: false,
                capacity: 0,
                error_rate: 0.0,
                words_loaded: 0,
                estimated_memory_bytes: 0,
                last_rebuild: None,
            },
            Some(loaded) => IndexStats {
                loaded: true,
                capacity: loaded.capacity,
                error_rate: loaded.error_rate,
                words_loaded: loaded.words_loaded,
                estimated_memory_bytes: estimated_memory_bytes(loaded.capacity, loaded.error_rate),
                last_rebuild: Some(loaded.last_rebuild),
            },
        }
    }

    fn current(&self) -> Option<Arc<LoadedIndex>> {
        self.published.read().clone()
    }
}
