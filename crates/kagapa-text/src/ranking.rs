use serde::Serialize;

use kagapa_core::Token;

use crate::akshara::AksharaCounter;

/// A token with its akshara length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankedToken {
    pub word: Token,
    pub length: usize,
}

/// Both length orderings of a token set plus the extreme lengths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Ranking {
    /// Shortest first; equal lengths alphabetical.
    pub ascending: Vec<RankedToken>,
    /// Longest first; equal lengths still alphabetical.
    pub descending: Vec<RankedToken>,
    pub min_length: usize,
    pub max_length: usize,
}

impl Ranking {
    pub fn ascending_words(&self) -> Vec<&str> {
        self.ascending.iter().map(|r| r.word.as_str()).collect()
    }

    pub fn descending_words(&self) -> Vec<&str> {
        self.descending.iter().map(|r| r.word.as_str()).collect()
    }
}

/// Rank `tokens` by Kannada akshara length.
pub fn rank(tokens: &[Token]) -> Ranking {
    rank_with(&AksharaCounter::kannada(), tokens)
}

pub fn rank_with(counter: &AksharaCounter, tokens: &[Token]) -> Ranking {
    if tokens.is_empty() {
        return Ranking::default();
    }
    let measured: Vec<RankedToken> = tokens
        .iter()
        .map(|t| RankedToken { word: t.clone(), length: counter.count(t) })
        .collect();

    let mut ascending = measured.clone();
    ascending.sort_by(|a, b| a.length.cmp(&b.length).then_with(|| a.word.cmp(&b.word)));
    let mut descending = measured;
    descending.sort_by(|a, b| b.length.cmp(&a.length).then_with(|| a.word.cmp(&b.word)));

    let min_length = ascending[0].length;
    let max_length = descending[0].length;
    Ranking { ascending, descending, min_length, max_length }
}
