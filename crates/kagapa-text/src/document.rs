//! Uploaded documents: format detection and text extraction.

use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use kagapa_core::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DocumentFormat {
    PlainText,
    Docx,
}

impl DocumentFormat {
    pub const ALLOWED_EXTENSIONS: [&'static str; 2] = [".txt", ".docx"];

    /// Pick the reader from the file name; unknown extensions are rejected
    /// before anything is read.
    pub fn from_filename(name: &str) -> Result<Self> {
        let lower = name.to_lowercase();
        if lower.ends_with(".txt") {
            Ok(Self::PlainText)
        } else if lower.ends_with(".docx") {
            Ok(Self::Docx)
        } else {
            Err(Error::UnsupportedFormat(name.to_string()))
        }
    }
}

/// UTF-8 decode that skips undecodable bytes instead of substituting
/// U+FFFD, so `ab\xffcd` reads as one word `abcd`.
fn decode_dropping_invalid(mut bytes: &[u8]) -> String {
    let mut text = String::with_capacity(bytes.len());
    loop {
        match std::str::from_utf8(bytes) {
            Ok(valid) => {
                text.push_str(valid);
                return text;
            }
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                // valid_up_to marks a prefix that is known to decode
                text.push_str(std::str::from_utf8(valid).unwrap_or_default());
                match e.error_len() {
                    Some(bad) => bytes = &rest[bad..],
                    // truncated sequence at the end
                    None => return text,
                }
            }
        }
    }
}

/// An uploaded document reduced to its paragraphs.
#[derive(Debug, Clone)]
pub struct Document {
    name: String,
    format: DocumentFormat,
    paragraphs: Vec<String>,
}

impl Document {
    pub fn from_bytes(name: &str, bytes: &[u8]) -> Result<Self> {
        let format = DocumentFormat::from_filename(name)?;
        let paragraphs = match format {
            DocumentFormat::PlainText => vec![decode_dropping_invalid(bytes)],
            DocumentFormat::Docx => docx_paragraphs(bytes)?,
        };
        Ok(Self { name: name.to_string(), format, paragraphs })
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        DocumentFormat::from_filename(&name)?;
        let bytes = fs::read(path)?;
        Self::from_bytes(&name, &bytes)
    }

    pub fn plain_text(name: &str, text: &str) -> Self {
        Self { name: name.to_string(), format: DocumentFormat::PlainText, paragraphs: vec![text.to_string()] }
    }

    pub fn from_paragraphs(name: &str, paragraphs: Vec<String>) -> Self {
        Self { name: name.to_string(), format: DocumentFormat::Docx, paragraphs }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    /// Paragraphs joined with `separator`.
    pub fn text(&self, separator: &str) -> String {
        self.paragraphs.join(separator)
    }
}

fn document_error<E: std::fmt::Display>(e: E) -> Error {
    Error::Document(e.to_string())
}

/// Paragraph texts of a `.docx` body, in document order.
fn docx_paragraphs(bytes: &[u8]) -> Result<Vec<String>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(document_error)?;
    let mut xml = String::new();
    archive.by_name("word/document.xml").map_err(document_error)?.read_to_string(&mut xml)?;

    let mut reader = Reader::from_str(&xml);
    let mut paragraphs = Vec::new();
    // w:p can nest (text boxes); each level collects its own text
    let mut open: Vec<String> = Vec::new();
    let mut in_text = false;
    loop {
        match reader.read_event().map_err(document_error)? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => open.push(String::new()),
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:p" => paragraphs.push(String::new()),
                b"w:tab" => if let Some(p) = open.last_mut() { p.push('\t') },
                b"w:br" | b"w:cr" => if let Some(p) = open.last_mut() { p.push('\n') },
                _ => {}
            },
            Event::Text(t) if in_text => {
                let text = t.unescape().map_err(document_error)?;
                if let Some(p) = open.last_mut() { p.push_str(&text) }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text = false,
                b"w:p" => if let Some(p) = open.pop() { paragraphs.push(p) },
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(paragraphs)
}
