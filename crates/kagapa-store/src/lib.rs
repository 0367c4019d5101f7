//! kagapa-store
//!
//! In-process implementation of `DictionaryStore`: ordered maps behind one
//! lock and undo-log transactions, optionally persisted as a JSON snapshot
//! plus an append-only journal that is folded back in periodically.

mod journal;
pub mod memory;
mod snapshot;

pub use memory::{MemoryStore, DEFAULT_COMPACT_EVERY};
