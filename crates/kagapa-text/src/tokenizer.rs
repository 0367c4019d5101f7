//! The two tokenizer pipelines.
//!
//! Ranking keeps only Latin letters and the Kannada block, folds case and
//! deduplicates. Ingestion accepts any Unicode word characters, keeps case
//! and keeps duplicates, because it counts occurrences.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

use kagapa_core::{normalize_word, Token};

use crate::document::Document;

const RANKING_PATTERN: &str = r"[A-Za-z\x{0C80}-\x{0CFF}]+";
const INGESTION_PATTERN: &str = r"\w+";

fn ranking_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(RANKING_PATTERN).expect("ranking token pattern compiles"))
}

fn ingestion_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(INGESTION_PATTERN).expect("word token pattern compiles"))
}

/// Output of the ranking pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankingTokens {
    /// Unique lowercased tokens in first-occurrence order.
    pub tokens: Vec<Token>,
    /// Pattern matches before deduplication.
    pub total_raw_count: usize,
}

/// Output of the ingestion pipeline: every normalized occurrence, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestionTokens {
    pub tokens: Vec<Token>,
}

impl IngestionTokens {
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

pub struct Tokenizer;

impl Tokenizer {
    pub fn for_ranking(doc: &Document) -> RankingTokens {
        Self::ranking_text(&doc.text(" "))
    }

    pub fn for_ingestion(doc: &Document) -> IngestionTokens {
        Self::ingestion_text(&doc.text("\n"))
    }

    pub fn ranking_text(text: &str) -> RankingTokens {
        let mut total_raw_count = 0;
        let mut seen = HashSet::new();
        let mut tokens = Vec::new();
        for m in ranking_regex().find_iter(text) {
            total_raw_count += 1;
            let token = normalize_word(m.as_str()).lowercased();
            if token.is_empty() { continue; }
            if seen.insert(token.clone()) { tokens.push(token); }
        }
        RankingTokens { tokens, total_raw_count }
    }

    pub fn ingestion_text(text: &str) -> IngestionTokens {
        let tokens = ingestion_regex()
            .find_iter(text)
            .map(|m| normalize_word(m.as_str()))
            .filter(|t| !t.is_empty())
            .collect();
        IngestionTokens { tokens }
    }
}
