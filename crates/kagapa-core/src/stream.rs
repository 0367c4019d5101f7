use crate::error::Result;
use crate::traits::DictionaryStore;
use crate::types::Table;

/// Lazily walks every word of a table, `batch_size` words per store call.
///
/// Uses keyset pagination (`after` = last word seen), so memory stays bounded
/// by one batch no matter how large the table is. A store error is yielded
/// once and ends the stream.
pub struct WordStream<'a> {
    store: &'a dyn DictionaryStore,
    table: Table,
    batch_size: usize,
    after: Option<String>,
    buffer: std::vec::IntoIter<String>,
    done: bool,
}

impl<'a> WordStream<'a> {
    pub fn new(store: &'a dyn DictionaryStore, table: Table, batch_size: usize) -> Self {
        Self { store, table, batch_size: batch_size.max(1), after: None, buffer: Vec::new().into_iter(), done: false }
    }
}

impl Iterator for WordStream<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(word) = self.buffer.next() {
            return Some(Ok(word));
        }
        if self.done {
            return None;
        }
        match self.store.scan_words(self.table, self.after.as_deref(), self.batch_size) {
            Ok(batch) => {
                if batch.len() < self.batch_size { self.done = true; }
                self.after = batch.last().cloned();
                self.buffer = batch.into_iter();
                self.buffer.next().map(Ok)
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
