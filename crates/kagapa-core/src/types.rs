//! Domain types shared by the text engine, the existence index and the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::ops::Deref;

use crate::normalize::normalize_word;

/// A normalized word: NFC-composed with surrounding whitespace stripped.
///
/// Build one with [`Token::new`] (or [`normalize_word`]); equality, ordering
/// and hashing all act on the normalized form. Deserializing normalizes too.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Token(String);

impl Token {
    pub fn new(raw: &str) -> Self {
        normalize_word(raw)
    }

    pub(crate) fn from_normalized(s: String) -> Self {
        Self(s)
    }

    /// Lowercased copy, used by the ranking pipeline.
    pub fn lowercased(&self) -> Self {
        normalize_word(&self.0.to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for Token {
    type Target = str;
    fn deref(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Token {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Token {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Token {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<Token> for String {
    fn from(token: Token) -> Self {
        token.0
    }
}

/// The two record kinds kept by a dictionary store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Table {
    /// Verified, authoritative words.
    Main,
    /// User-submitted words awaiting review.
    UserAdded,
}

impl Table {
    pub fn name(self) -> &'static str {
        match self {
            Table::Main => "main_dictionary",
            Table::UserAdded => "user_added_words",
        }
    }

    /// Value of `verified` for rows created in this table.
    pub fn verified_by_default(self) -> bool {
        matches!(self, Table::Main)
    }
}

/// One row of either dictionary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DictionaryEntry {
    pub word: Token,
    pub frequency: u64,
    pub added_by: Option<String>,
    pub verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DictionaryEntry {
    pub fn new(table: Table, word: Token, frequency: u64, added_by: Option<String>) -> Self {
        let now = Utc::now();
        Self { word, frequency, added_by, verified: table.verified_by_default(), created_at: now, updated_at: now }
    }

    /// Add `by` to the frequency counter and touch `updated_at`.
    pub fn bump(&mut self, by: u64) {
        self.frequency = self.frequency.saturating_add(by);
        self.updated_at = Utc::now();
    }
}

/// Result of an insert against a unique `word` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

/// Row filter for `count` and `list`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryFilter {
    pub verified: Option<bool>,
    /// Case-insensitive substring of `word`.
    pub search: Option<String>,
}

impl EntryFilter {
    pub fn matches(&self, entry: &DictionaryEntry) -> bool {
        if let Some(v) = self.verified {
            if entry.verified != v { return false; }
        }
        match self.search.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => entry.word.to_lowercase().contains(&s.to_lowercase()),
            _ => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListOrder {
    /// Highest frequency first, ties by word.
    #[default]
    FrequencyDesc,
    /// Oldest first, ties by word.
    CreatedAsc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: EntryFilter,
    pub order: ListOrder,
    pub limit: usize,
    pub offset: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self { filter: EntryFilter::default(), order: ListOrder::default(), limit: 100, offset: 0 }
    }
}

/// A page of rows plus the counts a paginated view needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Listing {
    /// Rows in the table, ignoring the search filter.
    pub total: usize,
    /// Rows matching the filter.
    pub filtered: usize,
    pub data: Vec<DictionaryEntry>,
}
