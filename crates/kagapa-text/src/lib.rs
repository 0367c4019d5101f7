//! kagapa-text
//!
//! Script-aware text processing: akshara counting, document reading,
//! the two tokenizer pipelines, length ranking and frequency aggregation.
//! Everything here is pure and safe to call from any number of threads.

pub mod akshara;
pub mod document;
pub mod frequency;
pub mod ranking;
pub mod tokenizer;

pub use akshara::{count_aksharas, AksharaCounter};
pub use document::{Document, DocumentFormat};
pub use frequency::{aggregate, FrequencyTable};
pub use ranking::{rank, rank_with, RankedToken, Ranking};
pub use tokenizer::{IngestionTokens, RankingTokens, Tokenizer};
