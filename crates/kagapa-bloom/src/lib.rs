//! kagapa-bloom
//!
//! Approximate membership over the main dictionary. `filter` is the bit-array
//! Bloom filter itself; `index` wraps it with rebuild-from-store, fail-open
//! lookups and stats, safe to share across request threads.

pub mod filter;
pub mod index;

pub use filter::{estimated_memory_bytes, optimal_num_bits, BloomFilter};
pub use index::{DictionaryExistenceIndex, IndexStats, RebuildReport};
