//! Bulk ingestion: a document's word counts upserted into the user table.

use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

use kagapa_core::traits::DictionaryStore;
use kagapa_core::Result;
use kagapa_text::{aggregate, Document, Tokenizer};

use crate::upsert::{Upsert, Upserted};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadError {
    pub word: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadReport {
    pub file: String,
    pub total_tokens: usize,
    pub unique_words: usize,
    pub inserted: Vec<String>,
    pub updated: Vec<String>,
    pub skipped: Vec<String>,
    pub errors: Vec<UploadError>,
}

pub struct BulkUploadService {
    store: Arc<dyn DictionaryStore>,
}

impl BulkUploadService {
    pub fn new(store: Arc<dyn DictionaryStore>) -> Self {
        Self { store }
    }

    /// Count every word of `doc` and add the counts to the user table, one
    /// transaction per distinct word. Per-word store failures land in
    /// `errors`; the remaining words are still processed.
    pub fn process_document(&self, doc: &Document, added_by: Option<&str>) -> Result<UploadReport> {
        info!(file = doc.name(), "Processing uploaded file");
        let tokens = Tokenizer::for_ingestion(doc);
        let counts = aggregate(&tokens.tokens);

        let mut report = UploadReport {
            file: doc.name().to_string(),
            total_tokens: tokens.len(),
            unique_words: counts.len(),
            ..UploadReport::default()
        };

        for (word, count) in counts.iter() {
            let upsert = Upsert { word, by: count, added_by, backfill_added_by: false };
            match upsert.run(self.store.as_ref()) {
                Ok(Upserted::Inserted(_)) => report.inserted.push(word.to_string()),
                Ok(Upserted::Updated(_)) => report.updated.push(word.to_string()),
                Ok(Upserted::Vanished) => {
                    warn!(%word, "Row vanished during insert race; skipped");
                    report.skipped.push(word.to_string());
                }
                Err(e) => {
                    error!(%word, error = %e, "Failed to upsert word");
                    report.errors.push(UploadError { word: word.to_string(), error: e.to_string() });
                }
            }
        }

        info!(
            file = %report.file,
            total_tokens = report.total_tokens,
            unique = report.unique_words,
            inserted = report.inserted.len(),
            updated = report.updated.len(),
            errors = report.errors.len(),
            "Processed uploaded file"
        );
        Ok(report)
    }
}
