//! Append-only redo log kept next to the snapshot.
//!
//! Each committed transaction becomes one JSON line holding the final state
//! of every row it touched. Opening a store replays the log over the snapshot
//! and folds it back in; while running, the log is folded in every
//! `compact_every` commits.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use kagapa_core::types::{DictionaryEntry, Table};
use kagapa_core::Result;

use crate::snapshot::{self, unavailable, Tables};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum Op {
    Put { table: Table, entry: DictionaryEntry },
    Remove { table: Table, word: String },
}

impl Op {
    fn apply(self, tables: &mut Tables) {
        match self {
            Op::Put { table, entry } => {
                tables.table_mut(table).insert(entry.word.to_string(), entry);
            }
            Op::Remove { table, word } => {
                tables.table_mut(table).remove(&word);
            }
        }
    }
}

#[derive(Serialize)]
struct RecordRef<'a> {
    ops: &'a [Op],
}

#[derive(Deserialize)]
struct Record {
    ops: Vec<Op>,
}

/// `words.json` -> `words.json.journal`
pub(crate) fn journal_path(snapshot: &Path) -> PathBuf {
    let mut name = OsString::from(snapshot.as_os_str());
    name.push(".journal");
    PathBuf::from(name)
}

/// Apply every record in `path` to `tables`, returning how many were applied.
///
/// A final line that does not parse is a write torn by a crash and is
/// ignored. A bad line anywhere else means the log is corrupt.
pub(crate) fn replay(path: &Path, tables: &mut Tables) -> Result<usize> {
    if !path.exists() {
        return Ok(0);
    }
    let text = fs::read_to_string(path).map_err(|e| unavailable(path, e))?;
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let mut applied = 0;
    for (i, line) in lines.iter().enumerate() {
        match serde_json::from_str::<Record>(line) {
            Ok(record) => {
                record.ops.into_iter().for_each(|op| op.apply(tables));
                applied += 1;
            }
            Err(e) if i + 1 == lines.len() => {
                warn!(path = %path.display(), error = %e, "Ignoring torn journal tail");
            }
            Err(e) => return Err(unavailable(path, format!("line {}: {}", i + 1, e))),
        }
    }
    Ok(applied)
}

/// Writer half of the log. The file is opened on the first append so a
/// store over an unwritable location still opens and fails on commit.
pub(crate) struct Journal {
    path: PathBuf,
    snapshot_path: PathBuf,
    file: Option<File>,
    appended: usize,
    compact_every: usize,
}

impl Journal {
    pub(crate) fn new(snapshot_path: &Path, compact_every: usize) -> Self {
        Self {
            path: journal_path(snapshot_path),
            snapshot_path: snapshot_path.to_path_buf(),
            file: None,
            appended: 0,
            compact_every: compact_every.max(1),
        }
    }

    fn open_file<'a>(slot: &'a mut Option<File>, path: &Path) -> Result<&'a mut File> {
        if slot.is_none() {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| unavailable(parent, e))?;
            }
            let file = OpenOptions::new().create(true).append(true).open(path).map_err(|e| unavailable(path, e))?;
            *slot = Some(file);
        }
        slot.as_mut().ok_or_else(|| unavailable(path, "journal not open"))
    }

    /// Durably append one committed transaction.
    ///
    /// On failure the file is cut back to its previous length so the log
    /// never holds a half-written line followed by good ones.
    pub(crate) fn append(&mut self, ops: &[Op]) -> Result<()> {
        let mut line = serde_json::to_vec(&RecordRef { ops }).map_err(|e| unavailable(&self.path, e))?;
        line.push(b'\n');
        let file = Self::open_file(&mut self.file, &self.path)?;
        let start = file.metadata().map_err(|e| unavailable(&self.path, e))?.len();
        if let Err(e) = file.write_all(&line).and_then(|()| file.sync_data()) {
            if let Err(trunc) = file.set_len(start) {
                warn!(path = %self.path.display(), error = %trunc, "Could not trim failed journal write");
            }
            return Err(unavailable(&self.path, e));
        }
        self.appended += 1;
        Ok(())
    }

    pub(crate) fn due_for_compaction(&self) -> bool {
        self.appended >= self.compact_every
    }

    /// Rewrite the snapshot from `tables` and empty the log.
    pub(crate) fn compact(&mut self, tables: &Tables) -> Result<()> {
        snapshot::save(tables, &self.snapshot_path)?;
        match &self.file {
            Some(file) => file.set_len(0).map_err(|e| unavailable(&self.path, e))?,
            None if self.path.exists() => fs::remove_file(&self.path).map_err(|e| unavailable(&self.path, e))?,
            None => {}
        }
        debug!(path = %self.snapshot_path.display(), records = self.appended, "Compacted journal into snapshot");
        self.appended = 0;
        Ok(())
    }
}
