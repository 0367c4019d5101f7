use parking_lot::{Mutex, MutexGuard};
use std::cmp::Reverse;
use std::ops::Bound;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use kagapa_core::traits::{DictionaryStore, StoreTransaction};
use kagapa_core::types::{DictionaryEntry, EntryFilter, InsertOutcome, ListOrder, ListQuery, Listing, Table};
use kagapa_core::{Error, Result};

use crate::journal::{self, Journal, Op};
use crate::snapshot::{self, Tables};

/// Commits between two snapshot rewrites when none is configured.
pub const DEFAULT_COMPACT_EVERY: usize = 10_000;

struct State {
    tables: Tables,
    journal: Option<Journal>,
}

/// Dictionary store held in memory, optionally persisted as a JSON snapshot
/// plus an append-only journal of the commits since.
///
/// Transactions take the store lock for their whole lifetime, so they are
/// serializable; keep them short (one word or one promotion).
pub struct MemoryStore {
    state: Mutex<State>,
    snapshot_path: Option<PathBuf>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl MemoryStore {
    pub fn in_memory() -> Self {
        Self { state: Mutex::new(State { tables: Tables::default(), journal: None }), snapshot_path: None }
    }

    /// [`open_with`](Self::open_with) at the default compaction interval.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with(path, DEFAULT_COMPACT_EVERY)
    }

    /// Load the snapshot at `path` if it exists and replay the journal beside
    /// it. A replayed journal is folded into a fresh snapshot straight away.
    /// Each commit then appends one journal line, and every `compact_every`
    /// commits the snapshot is rewritten and the journal emptied.
    pub fn open_with(path: &Path, compact_every: usize) -> Result<Self> {
        let mut tables = snapshot::load(path)?;
        let replayed = journal::replay(&journal::journal_path(path), &mut tables)?;
        let mut journal = Journal::new(path, compact_every);
        if replayed > 0 {
            journal.compact(&tables)?;
        }
        debug!(
            path = %path.display(),
            main = tables.main.len(),
            user_added = tables.user_added.len(),
            replayed,
            "Opened dictionary snapshot"
        );
        Ok(Self { state: Mutex::new(State { tables, journal: Some(journal) }), snapshot_path: Some(path.to_path_buf()) })
    }

    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }
}

impl DictionaryStore for MemoryStore {
    fn begin(&self) -> Result<Box<dyn StoreTransaction + '_>> {
        Ok(Box::new(MemoryTransaction { state: self.state.lock(), undo: Vec::new(), redo: Vec::new(), committed: false }))
    }

    fn scan_words(&self, table: Table, after: Option<&str>, limit: usize) -> Result<Vec<String>> {
        let state = self.state.lock();
        let lower = match after {
            Some(a) => Bound::Excluded(a),
            None => Bound::Unbounded,
        };
        Ok(state.tables.table(table).range::<str, _>((lower, Bound::Unbounded)).take(limit).map(|(w, _)| w.clone()).collect())
    }

    fn find_by_word(&self, table: Table, word: &str) -> Result<Option<DictionaryEntry>> {
        Ok(self.state.lock().tables.table(table).get(word).cloned())
    }

    fn count(&self, table: Table, filter: &EntryFilter) -> Result<usize> {
        Ok(self.state.lock().tables.table(table).values().filter(|e| filter.matches(e)).count())
    }

    fn list(&self, table: Table, query: &ListQuery) -> Result<Listing> {
        let state = self.state.lock();
        let rows = state.tables.table(table);
        let unsearched = EntryFilter { verified: query.filter.verified, search: None };
        let total = rows.values().filter(|e| unsearched.matches(e)).count();
        let mut matching: Vec<&DictionaryEntry> = rows.values().filter(|e| query.filter.matches(e)).collect();
        let filtered = matching.len();
        match query.order {
            ListOrder::FrequencyDesc => matching.sort_by_key(|e| (Reverse(e.frequency), e.word.clone())),
            ListOrder::CreatedAsc => matching.sort_by_key(|e| (e.created_at, e.word.clone())),
        }
        let data = matching.into_iter().skip(query.offset).take(query.limit).cloned().collect();
        Ok(Listing { total, filtered, data })
    }
}

enum Undo {
    Remove(Table, String),
    Restore(Table, DictionaryEntry),
}

struct MemoryTransaction<'a> {
    state: MutexGuard<'a, State>,
    undo: Vec<Undo>,
    /// Journal ops for the changes made so far, in order.
    redo: Vec<Op>,
    committed: bool,
}

impl MemoryTransaction<'_> {
    fn rollback(&mut self) {
        while let Some(step) = self.undo.pop() {
            match step {
                Undo::Remove(table, word) => {
                    self.state.tables.table_mut(table).remove(&word);
                }
                Undo::Restore(table, entry) => {
                    self.state.tables.table_mut(table).insert(entry.word.to_string(), entry);
                }
            }
        }
    }
}

impl StoreTransaction for MemoryTransaction<'_> {
    fn find_by_word(&mut self, table: Table, word: &str) -> Result<Option<DictionaryEntry>> {
        Ok(self.state.tables.table(table).get(word).cloned())
    }

    fn insert(&mut self, table: Table, entry: DictionaryEntry) -> Result<InsertOutcome> {
        let key = entry.word.to_string();
        let rows = self.state.tables.table_mut(table);
        if rows.contains_key(&key) {
            return Ok(InsertOutcome::AlreadyExists);
        }
        rows.insert(key.clone(), entry.clone());
        self.undo.push(Undo::Remove(table, key));
        self.redo.push(Op::Put { table, entry });
        Ok(InsertOutcome::Inserted)
    }

    fn update(&mut self, table: Table, entry: &DictionaryEntry) -> Result<()> {
        let rows = self.state.tables.table_mut(table);
        let Some(slot) = rows.get_mut(entry.word.as_str()) else {
            return Err(Error::NotFound(format!("{} in {}", entry.word, table.name())));
        };
        let previous = std::mem::replace(slot, entry.clone());
        self.undo.push(Undo::Restore(table, previous));
        self.redo.push(Op::Put { table, entry: entry.clone() });
        Ok(())
    }

    fn delete(&mut self, table: Table, word: &str) -> Result<bool> {
        match self.state.tables.table_mut(table).remove(word) {
            Some(previous) => {
                self.undo.push(Undo::Restore(table, previous));
                self.redo.push(Op::Remove { table, word: word.to_string() });
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn commit(mut self: Box<Self>) -> Result<()> {
        let redo = std::mem::take(&mut self.redo);
        let state = &mut *self.state;
        if let (Some(journal), false) = (state.journal.as_mut(), redo.is_empty()) {
            if let Err(e) = journal.append(&redo) {
                warn!(error = %e, "Journal write failed; rolling back");
                return Err(e);
            }
            if journal.due_for_compaction() {
                // the commit is already durable in the journal
                if let Err(e) = journal.compact(&state.tables) {
                    warn!(error = %e, "Snapshot compaction failed; journal kept");
                }
            }
        }
        self.committed = true;
        Ok(())
    }
}

impl Drop for MemoryTransaction<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.rollback();
        }
    }
}
