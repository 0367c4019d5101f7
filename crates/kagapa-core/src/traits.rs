use crate::error::Result;
use crate::types::{DictionaryEntry, EntryFilter, InsertOutcome, Listing, ListQuery, Table};

/// Persistent home of the two dictionary tables.
///
/// Writes go through a [`StoreTransaction`] obtained from [`begin`](Self::begin);
/// reads that need no isolation are available directly. Any backend failure
/// surfaces as [`Error::StoreUnavailable`](crate::Error::StoreUnavailable).
pub trait DictionaryStore: Send + Sync {
    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>>;

    /// Up to `limit` words of `table` strictly greater than `after`, ascending.
    fn scan_words(&self, table: Table, after: Option<&str>, limit: usize) -> Result<Vec<String>>;

    fn find_by_word(&self, table: Table, word: &str) -> Result<Option<DictionaryEntry>>;

    fn count(&self, table: Table, filter: &EntryFilter) -> Result<usize>;

    fn list(&self, table: Table, query: &ListQuery) -> Result<Listing>;
}

/// A unit of work against the store. Dropping it without calling
/// [`commit`](Self::commit) rolls every change back.
pub trait StoreTransaction {
    fn find_by_word(&mut self, table: Table, word: &str) -> Result<Option<DictionaryEntry>>;

    /// Insert a new row. A row with the same word is reported as
    /// [`InsertOutcome::AlreadyExists`], not as an error.
    fn insert(&mut self, table: Table, entry: DictionaryEntry) -> Result<InsertOutcome>;

    /// Replace the row keyed by `entry.word`; `NotFound` when there is none.
    fn update(&mut self, table: Table, entry: &DictionaryEntry) -> Result<()>;

    /// Remove the row for `word`, returning whether one existed.
    fn delete(&mut self, table: Table, word: &str) -> Result<bool>;

    fn commit(self: Box<Self>) -> Result<()>;
}
