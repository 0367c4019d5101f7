use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{error, info, warn};

use kagapa_core::traits::DictionaryStore;
use kagapa_core::types::{DictionaryEntry, EntryFilter, InsertOutcome, ListOrder, ListQuery, Table};
use kagapa_core::{normalize_word, Result, Token};

use crate::input::WordInput;
use crate::main_dictionary::{delete_words, DeleteReport};
use crate::upsert::{Upsert, Upserted};

/// Result of [`UserDictionaryService::add`]. The maps hold the frequency
/// each word ended up with.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AddReport {
    pub added: BTreeMap<String, u64>,
    pub updated: BTreeMap<String, u64>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApproveReport {
    pub moved: Vec<String>,
    pub already_exists: Vec<String>,
    pub not_found: Vec<String>,
    pub failed: Vec<String>,
}

enum Promotion {
    Moved,
    AlreadyExists,
    NotFound,
}

/// Staging table for words suggested by users, and their promotion into
/// the main dictionary.
pub struct UserDictionaryService {
    store: Arc<dyn DictionaryStore>,
}

impl UserDictionaryService {
    pub fn new(store: Arc<dyn DictionaryStore>) -> Self {
        Self { store }
    }

    /// Count one submission per word: new words start at 1, known words are
    /// incremented. Blank words are skipped.
    pub fn add(&self, words: impl Into<WordInput>, added_by: Option<&str>) -> Result<AddReport> {
        let mut report = AddReport::default();
        for raw in words.into().into_words()? {
            let word = normalize_word(&raw);
            if word.is_empty() {
                report.skipped.push(raw);
                continue;
            }
            let upsert = Upsert { word: &word, by: 1, added_by, backfill_added_by: true };
            match upsert.run(self.store.as_ref())? {
                Upserted::Inserted(frequency) => {
                    info!(%word, "User word added");
                    report.added.insert(word.into_string(), frequency);
                }
                Upserted::Updated(frequency) => {
                    info!(%word, frequency, "User word frequency incremented");
                    report.updated.insert(word.into_string(), frequency);
                }
                Upserted::Vanished => {
                    warn!(%word, "Failed to add or update user word");
                    report.skipped.push(word.into_string());
                }
            }
        }
        Ok(report)
    }

    pub fn get_word(&self, word: &str) -> Result<Option<DictionaryEntry>> {
        self.store.find_by_word(Table::UserAdded, &normalize_word(word))
    }

    /// Unverified submissions, oldest first.
    pub fn list_pending(&self, limit: usize, offset: usize) -> Result<Vec<DictionaryEntry>> {
        let query = ListQuery {
            filter: EntryFilter { verified: Some(false), search: None },
            order: ListOrder::CreatedAsc,
            limit,
            offset,
        };
        Ok(self.store.list(Table::UserAdded, &query)?.data)
    }

    pub fn delete(&self, words: impl Into<WordInput>) -> Result<DeleteReport> {
        delete_words(self.store.as_ref(), Table::UserAdded, words.into())
    }

    /// Move each word into the main dictionary, carrying its frequency.
    ///
    /// Each move is one transaction: the main insert and the user delete
    /// land together or not at all. A word already in the main dictionary
    /// keeps its user row. Store failures are tallied under `failed` and do
    /// not stop the rest of the batch.
    pub fn approve_and_move_to_main(&self, words: impl Into<WordInput>, admin: Option<&str>) -> Result<ApproveReport> {
        let mut report = ApproveReport::default();
        for raw in words.into().into_words()? {
            let word = normalize_word(&raw);
            match self.promote(&word, admin) {
                Ok(Promotion::Moved) => {
                    info!(%word, "Word moved to main dictionary");
                    report.moved.push(word.into_string());
                }
                Ok(Promotion::AlreadyExists) => {
                    warn!(%word, "Word already in main dictionary; user entry kept");
                    report.already_exists.push(word.into_string());
                }
                Ok(Promotion::NotFound) => report.not_found.push(word.into_string()),
                Err(e) => {
                    error!(%word, error = %e, "Failed to move word");
                    report.failed.push(word.into_string());
                }
            }
        }
        Ok(report)
    }

    fn promote(&self, word: &Token, admin: Option<&str>) -> Result<Promotion> {
        let mut tx = self.store.begin()?;
        let Some(user_entry) = tx.find_by_word(Table::UserAdded, word)? else {
            return Ok(Promotion::NotFound);
        };
        let added_by = admin.map(str::to_string).or(user_entry.added_by);
        let main_entry = DictionaryEntry::new(Table::Main, word.clone(), user_entry.frequency, added_by);
        if tx.insert(Table::Main, main_entry)? == InsertOutcome::AlreadyExists {
            return Ok(Promotion::AlreadyExists);
        }
        tx.delete(Table::UserAdded, word)?;
        tx.commit()?;
        Ok(Promotion::Moved)
    }
}
