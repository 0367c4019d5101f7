use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use kagapa_bloom::{estimated_memory_bytes, BloomFilter, DictionaryExistenceIndex};
use kagapa_core::config::BloomSettings;
use kagapa_core::traits::{DictionaryStore, StoreTransaction};
use kagapa_core::types::{DictionaryEntry, EntryFilter, ListQuery, Listing, Table, Token};
use kagapa_core::Error;
use kagapa_store::MemoryStore;

fn settings(capacity: usize, error_rate: f64, batch_size: usize) -> BloomSettings {
    BloomSettings { capacity, error_rate, batch_size }
}

fn store_with(words: &[String]) -> anyhow::Result<MemoryStore> {
    let store = MemoryStore::in_memory();
    let mut tx = store.begin()?;
    for w in words {
        tx.insert(Table::Main, DictionaryEntry::new(Table::Main, Token::new(w), 1, None))?;
    }
    tx.commit()?;
    Ok(store)
}

fn words(prefix: &str, n: usize) -> Vec<String> {
    (0..n).map(|i| format!("{prefix}{i}")).collect()
}

/// Delegates to a real store but fails `scan_words` after `ok_pages` calls.
struct FlakyStore {
    inner: MemoryStore,
    ok_pages: usize,
    calls: AtomicUsize,
}

impl DictionaryStore for FlakyStore {
    fn begin(&self) -> kagapa_core::Result<Box<dyn StoreTransaction + '_>> {
        self.inner.begin()
    }
    fn scan_words(&self, table: Table, after: Option<&str>, limit: usize) -> kagapa_core::Result<Vec<String>> {
        if self.calls.fetch_add(1, Ordering::SeqCst) >= self.ok_pages {
            return Err(Error::StoreUnavailable("connection reset".into()));
        }
        self.inner.scan_words(table, after, limit)
    }
    fn find_by_word(&self, table: Table, word: &str) -> kagapa_core::Result<Option<DictionaryEntry>> {
        self.inner.find_by_word(table, word)
    }
    fn count(&self, table: Table, filter: &EntryFilter) -> kagapa_core::Result<usize> {
        self.inner.count(table, filter)
    }
    fn list(&self, table: Table, query: &ListQuery) -> kagapa_core::Result<Listing> {
        self.inner.list(table, query)
    }
}

#[test]
fn unbuilt_index_fails_open() {
    let index = DictionaryExistenceIndex::new();
    for w in ["", "anything", "ಕನ್ನಡ", "  "] {
        assert!(index.might_exist(w));
    }
    let stats = index.stats();
    assert!(!stats.loaded);
    assert!(stats.last_rebuild.is_none());
}

#[test]
fn no_false_negatives_after_rebuild() -> anyhow::Result<()> {
    let mut all = words("word", 2000);
    all.extend(["ಕನ್ನಡ", "ಭಾಷೆ", "ಕ್ಷ", "Bengaluru"].map(String::from));
    let store = store_with(&all)?;
    let index = DictionaryExistenceIndex::new();
    let report = index.rebuild(&store, &settings(5000, 0.001, 128))?;
    assert_eq!(report.words_loaded, all.len());

    for w in &all {
        assert!(index.might_exist(w), "false negative for {w}");
    }
    // lookups normalize first
    assert!(index.might_exist("  ಕನ್ನಡ\n"));
    Ok(())
}

#[test]
fn false_positive_rate_is_near_target() -> anyhow::Result<()> {
    let store = store_with(&words("in", 10_000))?;
    let index = DictionaryExistenceIndex::new();
    index.rebuild(&store, &settings(10_000, 0.01, 1000))?;

    let samples = 20_000;
    let hits = (0..samples).filter(|i| index.might_exist(&format!("out{i}"))).count();
    let rate = hits as f64 / samples as f64;
    assert!(rate < 0.03, "false positive rate {rate} far above 0.01");
    Ok(())
}

#[test]
fn stats_report_analytical_memory() -> anyhow::Result<()> {
    let store = store_with(&words("w", 10))?;
    let index = DictionaryExistenceIndex::new();
    index.rebuild(&store, &settings(1_000_000, 0.001, 4))?;
    let stats = index.stats();
    assert!(stats.loaded);
    assert_eq!(stats.capacity, 1_000_000);
    assert_eq!(stats.words_loaded, 10);
    assert_eq!(stats.estimated_memory_bytes, estimated_memory_bytes(1_000_000, 0.001));
    assert!(stats.last_rebuild.is_some());
    Ok(())
}

#[test]
fn rebuild_replaces_previous_state() -> anyhow::Result<()> {
    let store = store_with(&["old".to_string()])?;
    let index = DictionaryExistenceIndex::new();
    index.rebuild(&store, &settings(100, 0.001, 10))?;

    let mut tx = store.begin()?;
    tx.delete(Table::Main, "old")?;
    tx.insert(Table::Main, DictionaryEntry::new(Table::Main, Token::new("new"), 1, None))?;
    tx.commit()?;
    // stale until the next rebuild
    assert!(!index.might_exist("new"));

    index.rebuild(&store, &settings(100, 0.001, 10))?;
    assert!(index.might_exist("new"));
    assert_eq!(index.stats().words_loaded, 1);
    Ok(())
}

#[test]
fn failed_rebuild_keeps_previous_filter() -> anyhow::Result<()> {
    let flaky = FlakyStore { inner: store_with(&words("w", 50))?, ok_pages: usize::MAX, calls: AtomicUsize::new(0) };
    let index = DictionaryExistenceIndex::new();
    index.rebuild(&flaky, &settings(1000, 0.001, 10))?;
    let before = index.stats();

    let failing = FlakyStore { inner: store_with(&words("x", 50))?, ok_pages: 2, calls: AtomicUsize::new(0) };
    let err = index.rebuild(&failing, &settings(1000, 0.001, 10)).unwrap_err();
    assert!(matches!(err, Error::StoreUnavailable(_)));

    assert_eq!(index.stats(), before);
    assert!(index.might_exist("w7"));
    Ok(())
}

#[test]
fn failed_first_rebuild_stays_fail_open() -> anyhow::Result<()> {
    let failing = FlakyStore { inner: store_with(&words("x", 5))?, ok_pages: 0, calls: AtomicUsize::new(0) };
    let index = DictionaryExistenceIndex::new();
    assert!(index.rebuild(&failing, &settings(10, 0.01, 2)).is_err());
    assert!(!index.is_loaded());
    assert!(index.might_exist("definitely-not-there"));
    Ok(())
}

#[test]
fn invalid_parameters_are_rejected() -> anyhow::Result<()> {
    let store = store_with(&[])?;
    let index = DictionaryExistenceIndex::new();
    for bad in [settings(0, 0.01, 10), settings(10, 0.0, 10), settings(10, 1.0, 10), settings(10, f64::NAN, 10)] {
        assert!(matches!(index.rebuild(&store, &bad), Err(Error::InvalidInput(_))));
    }
    assert!(!index.is_loaded());
    Ok(())
}

#[test]
fn readers_and_rebuilds_run_concurrently() -> anyhow::Result<()> {
    let all = words("k", 500);
    let store = Arc::new(store_with(&all)?);
    let index = Arc::new(DictionaryExistenceIndex::new());
    index.rebuild(store.as_ref(), &settings(1000, 0.001, 50))?;

    let mut handles = Vec::new();
    for _ in 0..3 {
        let (store, index) = (Arc::clone(&store), Arc::clone(&index));
        handles.push(thread::spawn(move || {
            for _ in 0..5 {
                index.rebuild(store.as_ref(), &settings(1000, 0.001, 50)).expect("rebuild");
            }
        }));
    }
    for _ in 0..4 {
        let (index, all) = (Arc::clone(&index), all.clone());
        handles.push(thread::spawn(move || {
            for w in all.iter().cycle().take(5000) {
                assert!(index.might_exist(w), "reader saw a partial filter");
            }
        }));
    }
    for h in handles {
        h.join().expect("thread");
    }
    assert_eq!(index.stats().words_loaded, all.len());
    Ok(())
}

#[test]
fn raw_filter_has_no_false_negatives() {
    let mut filter = BloomFilter::with_rate(100, 0.01);
    let items: Vec<String> = (0..100).map(|i| format!("item-{i}")).collect();
    for it in &items {
        filter.insert(it);
    }
    assert!(items.iter().all(|it| filter.contains(it)));
}
