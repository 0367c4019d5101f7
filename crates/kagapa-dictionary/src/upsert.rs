//! Increment-or-insert against the user table, shared by `add` and bulk upload.

use tracing::{debug, info};

use kagapa_core::traits::DictionaryStore;
use kagapa_core::types::{DictionaryEntry, InsertOutcome, Table};
use kagapa_core::{Result, Token};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Upserted {
    /// New row; carries its frequency.
    Inserted(u64),
    /// Existing row incremented; carries the new frequency.
    Updated(u64),
    /// Lost an insert race and the winning row was gone by the retry.
    Vanished,
}

pub(crate) struct Upsert<'a> {
    pub word: &'a Token,
    pub by: u64,
    pub added_by: Option<&'a str>,
    /// Fill in `added_by` on an existing row that has none.
    pub backfill_added_by: bool,
}

impl Upsert<'_> {
    /// One transaction for the check and the write. An insert that reports
    /// `AlreadyExists` was beaten by a concurrent writer and is retried once
    /// as an update in a fresh transaction.
    pub(crate) fn run(&self, store: &dyn DictionaryStore) -> Result<Upserted> {
        let mut tx = store.begin()?;
        if let Some(mut existing) = tx.find_by_word(Table::UserAdded, self.word)? {
            self.apply(&mut existing);
            tx.update(Table::UserAdded, &existing)?;
            tx.commit()?;
            return Ok(Upserted::Updated(existing.frequency));
        }

        let entry = DictionaryEntry::new(Table::UserAdded, self.word.clone(), self.by, self.added_by.map(str::to_string));
        match tx.insert(Table::UserAdded, entry)? {
            InsertOutcome::Inserted => {
                tx.commit()?;
                Ok(Upserted::Inserted(self.by))
            }
            InsertOutcome::AlreadyExists => {
                drop(tx);
                debug!(word = %self.word, "Insert raced with another writer; retrying as update");
                self.retry_as_update(store)
            }
        }
    }

    fn retry_as_update(&self, store: &dyn DictionaryStore) -> Result<Upserted> {
        let mut tx = store.begin()?;
        let Some(mut existing) = tx.find_by_word(Table::UserAdded, self.word)? else {
            return Ok(Upserted::Vanished);
        };
        self.apply(&mut existing);
        tx.update(Table::UserAdded, &existing)?;
        tx.commit()?;
        info!(word = %self.word, frequency = existing.frequency, "User word frequency incremented after race");
        Ok(Upserted::Updated(existing.frequency))
    }

    fn apply(&self, existing: &mut DictionaryEntry) {
        existing.bump(self.by);
        if self.backfill_added_by && existing.added_by.as_deref().map_or(true, str::is_empty) {
            if let Some(name) = self.added_by {
                existing.added_by = Some(name.to_string());
            }
        }
    }
}
