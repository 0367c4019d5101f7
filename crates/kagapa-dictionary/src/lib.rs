//! kagapa-dictionary
//!
//! Services over a [`DictionaryStore`](kagapa_core::traits::DictionaryStore):
//! the verified main dictionary, the user-submitted staging table with its
//! promotion path, bulk document ingestion and the length-sorting tool.

pub mod input;
pub mod main_dictionary;
pub mod sort_doc;
pub mod upload;
pub mod user_dictionary;
mod upsert;

pub use input::WordInput;
pub use main_dictionary::{CreateReport, DeleteReport, MainDictionaryService};
pub use sort_doc::{write_ranked_csv, SortDocService, SortReport};
pub use upload::{BulkUploadService, UploadError, UploadReport};
pub use user_dictionary::{AddReport, ApproveReport, UserDictionaryService};
