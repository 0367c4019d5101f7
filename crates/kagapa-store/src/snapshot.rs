use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::warn;

use kagapa_core::types::{DictionaryEntry, Table};
use kagapa_core::{Error, Result};

/// Both tables keyed by normalized word.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct Tables {
    pub main: BTreeMap<String, DictionaryEntry>,
    pub user_added: BTreeMap<String, DictionaryEntry>,
}

impl Tables {
    pub fn table(&self, table: Table) -> &BTreeMap<String, DictionaryEntry> {
        match table {
            Table::Main => &self.main,
            Table::UserAdded => &self.user_added,
        }
    }

    pub fn table_mut(&mut self, table: Table) -> &mut BTreeMap<String, DictionaryEntry> {
        match table {
            Table::Main => &mut self.main,
            Table::UserAdded => &mut self.user_added,
        }
    }

    /// Key every row by its entry's word. Words are normalized as they are
    /// read, so a hand-edited file with decomposed keys stays reachable.
    fn rekeyed(self) -> Self {
        fn rekey(rows: BTreeMap<String, DictionaryEntry>) -> BTreeMap<String, DictionaryEntry> {
            let mut out = BTreeMap::new();
            for entry in rows.into_values() {
                let key = entry.word.to_string();
                if out.contains_key(&key) {
                    warn!(word = %key, "Snapshot holds two spellings of one word; keeping the first");
                    continue;
                }
                out.insert(key, entry);
            }
            out
        }
        Self { main: rekey(self.main), user_added: rekey(self.user_added) }
    }
}

pub(crate) fn unavailable(path: &Path, e: impl std::fmt::Display) -> Error {
    Error::StoreUnavailable(format!("{}: {}", path.display(), e))
}

pub(crate) fn load(path: &Path) -> Result<Tables> {
    if !path.exists() {
        return Ok(Tables::default());
    }
    let file = File::open(path).map_err(|e| unavailable(path, e))?;
    let tables: Tables = serde_json::from_reader(BufReader::new(file)).map_err(|e| unavailable(path, e))?;
    Ok(tables.rekeyed())
}

/// Write through a temp file in the same directory and rename over `path`, so
/// readers only ever see a complete snapshot.
pub(crate) fn save(tables: &Tables, path: &Path) -> Result<()> {
    let parent_dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir).map_err(|e| unavailable(path, e))?;

    let temp_file = NamedTempFile::new_in(parent_dir).map_err(|e| unavailable(path, e))?;
    {
        let mut writer = BufWriter::new(&temp_file);
        serde_json::to_writer(&mut writer, tables).map_err(|e| unavailable(path, e))?;
        writer.flush().map_err(|e| unavailable(path, e))?;
    }
    temp_file.persist(path).map_err(|e| unavailable(path, e))?;
    Ok(())
}
