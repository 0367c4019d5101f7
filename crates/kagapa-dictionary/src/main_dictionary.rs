use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use kagapa_bloom::{DictionaryExistenceIndex, IndexStats, RebuildReport};
use kagapa_core::config::BloomSettings;
use kagapa_core::traits::DictionaryStore;
use kagapa_core::types::{DictionaryEntry, EntryFilter, InsertOutcome, ListOrder, ListQuery, Listing, Table};
use kagapa_core::{normalize_word, Result};

use crate::input::WordInput;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateReport {
    pub created: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeleteReport {
    pub deleted: Vec<String>,
    pub not_found: Vec<String>,
}

/// The verified dictionary plus its Bloom pre-check.
///
/// Writes go straight to the store; the index only learns about them at the
/// next [`rebuild_index`](Self::rebuild_index).
pub struct MainDictionaryService {
    store: Arc<dyn DictionaryStore>,
    index: Arc<DictionaryExistenceIndex>,
}

impl MainDictionaryService {
    pub fn new(store: Arc<dyn DictionaryStore>, index: Arc<DictionaryExistenceIndex>) -> Self {
        Self { store, index }
    }

    pub fn index(&self) -> &DictionaryExistenceIndex {
        &self.index
    }

    /// Insert each word with frequency 1. Words already present, and words
    /// that normalize to nothing, are skipped.
    pub fn create(&self, words: impl Into<WordInput>, added_by: Option<&str>) -> Result<CreateReport> {
        let mut report = CreateReport::default();
        for raw in words.into().into_words()? {
            let word = normalize_word(&raw);
            if word.is_empty() {
                report.skipped.push(raw);
                continue;
            }
            let mut tx = self.store.begin()?;
            let entry = DictionaryEntry::new(Table::Main, word.clone(), 1, added_by.map(str::to_string));
            match tx.insert(Table::Main, entry)? {
                InsertOutcome::Inserted => {
                    tx.commit()?;
                    info!(%word, "Main dictionary word added");
                    report.created.push(word.into_string());
                }
                InsertOutcome::AlreadyExists => {
                    warn!(%word, "Duplicate main dictionary word");
                    report.skipped.push(word.into_string());
                }
            }
        }
        Ok(report)
    }

    pub fn get_word(&self, word: &str) -> Result<Option<DictionaryEntry>> {
        self.store.find_by_word(Table::Main, &normalize_word(word))
    }

    /// Bloom pre-check, confirmed against the store. A `false` from the
    /// filter skips the lookup; a `true` is never trusted on its own.
    pub fn exists_fast(&self, word: &str) -> Result<bool> {
        if !self.index.might_exist(word) {
            return Ok(false);
        }
        Ok(self.get_word(word)?.is_some())
    }

    /// Page through the dictionary, most frequent first, optionally
    /// narrowed by a case-insensitive substring.
    pub fn list(&self, limit: usize, offset: usize, search: Option<&str>) -> Result<Listing> {
        let query = ListQuery {
            filter: EntryFilter { verified: None, search: search.map(str::to_string) },
            order: ListOrder::FrequencyDesc,
            limit,
            offset,
        };
        self.store.list(Table::Main, &query)
    }

    /// `false` when the word is not in the dictionary.
    pub fn increment_frequency(&self, word: &str) -> Result<bool> {
        let word = normalize_word(word);
        let mut tx = self.store.begin()?;
        let Some(mut entry) = tx.find_by_word(Table::Main, &word)? else {
            return Ok(false);
        };
        entry.bump(1);
        tx.update(Table::Main, &entry)?;
        tx.commit()?;
        Ok(true)
    }

    pub fn delete(&self, words: impl Into<WordInput>) -> Result<DeleteReport> {
        delete_words(self.store.as_ref(), Table::Main, words.into())
    }

    pub fn rebuild_index(&self, settings: &BloomSettings) -> Result<RebuildReport> {
        self.index.rebuild(self.store.as_ref(), settings)
    }

    pub fn index_stats(&self) -> IndexStats {
        self.index.stats()
    }
}

/// Per-word delete, one transaction each.
pub(crate) fn delete_words(store: &dyn DictionaryStore, table: Table, words: WordInput) -> Result<DeleteReport> {
    let mut report = DeleteReport::default();
    for raw in words.into_words()? {
        let word = normalize_word(&raw);
        let mut tx = store.begin()?;
        if tx.delete(table, &word)? {
            tx.commit()?;
            info!(%word, table = table.name(), "Word deleted");
            report.deleted.push(word.into_string());
        } else {
            report.not_found.push(word.into_string());
        }
    }
    Ok(report)
}
