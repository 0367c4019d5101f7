use std::collections::HashMap;

use kagapa_core::Token;

/// Occurrence counts keyed by token, iterated in first-occurrence order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrequencyTable {
    counts: Vec<(Token, u64)>,
    index: HashMap<Token, usize>,
}

impl FrequencyTable {
    pub fn add(&mut self, token: &Token) {
        match self.index.get(token) {
            Some(&slot) => self.counts[slot].1 += 1,
            None => {
                self.index.insert(token.clone(), self.counts.len());
                self.counts.push((token.clone(), 1));
            }
        }
    }

    pub fn get(&self, word: &str) -> Option<u64> {
        self.index.get(word).map(|&slot| self.counts[slot].1)
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, c)| c).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Token, u64)> + '_ {
        self.counts.iter().map(|(t, c)| (t, *c))
    }
}

pub fn aggregate<'a, I>(tokens: I) -> FrequencyTable
where
    I: IntoIterator<Item = &'a Token>,
{
    let mut table = FrequencyTable::default();
    for token in tokens {
        table.add(token);
    }
    table
}
