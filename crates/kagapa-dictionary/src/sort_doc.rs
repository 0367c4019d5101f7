//! The sort tool: a document's distinct words ranked by akshara length.

use serde::Serialize;
use std::io::Write;

use kagapa_core::{Error, Result};
use kagapa_text::{rank_with, AksharaCounter, Document, RankedToken, Tokenizer};

/// Written ahead of the CSV so spreadsheet tools read it as UTF-8.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SortReport {
    pub file: String,
    pub total_word_count: usize,
    pub unique_word_count: usize,
    pub min_word_length: usize,
    pub max_word_length: usize,
    /// Shortest words first.
    pub lowest: Vec<RankedToken>,
    /// Longest words first.
    pub highest: Vec<RankedToken>,
}

#[derive(Debug, Clone, Default)]
pub struct SortDocService {
    counter: AksharaCounter,
}

impl SortDocService {
    pub fn new(counter: AksharaCounter) -> Self {
        Self { counter }
    }

    pub fn rank_document(&self, doc: &Document) -> SortReport {
        let extracted = Tokenizer::for_ranking(doc);
        let ranking = rank_with(&self.counter, &extracted.tokens);
        SortReport {
            file: doc.name().to_string(),
            total_word_count: extracted.total_raw_count,
            unique_word_count: extracted.tokens.len(),
            min_word_length: ranking.min_length,
            max_word_length: ranking.max_length,
            lowest: ranking.ascending,
            highest: ranking.descending,
        }
    }
}

/// Write `rows` as a `word,length` CSV, prefixed with a UTF-8 BOM.
pub fn write_ranked_csv<W: Write>(mut out: W, rows: &[RankedToken]) -> Result<()> {
    out.write_all(UTF8_BOM)?;
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(["word", "length"]).map_err(csv_error)?;
    for row in rows {
        writer.serialize((row.word.as_str(), row.length)).map_err(csv_error)?;
    }
    writer.flush()?;
    Ok(())
}

fn csv_error(e: csv::Error) -> Error {
    Error::Document(format!("csv: {e}"))
}
