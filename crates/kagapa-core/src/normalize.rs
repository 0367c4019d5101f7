//! Canonical form of dictionary keys.
//!
//! Every word that enters the store, the existence index or a frequency table
//! goes through [`normalize_word`] first, so two spellings that differ only in
//! Unicode composition or surrounding whitespace land on the same key.

use unicode_normalization::UnicodeNormalization;

use crate::types::Token;

/// NFC-compose `raw`, then strip leading and trailing whitespace.
///
/// Idempotent. An input that is empty after stripping yields an empty
/// [`Token`]; callers treat those as invalid and skip them.
pub fn normalize_word(raw: &str) -> Token {
    let composed: String = raw.nfc().collect();
    Token::from_normalized(composed.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composes_decomposed_sequences() {
        // e + combining acute
        let decomposed = "caf\u{0065}\u{0301}";
        assert_eq!(normalize_word(decomposed).as_str(), "caf\u{00e9}");
    }

    #[test]
    fn kannada_two_part_vowel_sign_composes() {
        // U+0CC6 + U+0CC2 composes to U+0CCA
        let raw = "\u{0C95}\u{0CC6}\u{0CC2}";
        assert_eq!(normalize_word(raw).as_str(), "\u{0C95}\u{0CCA}");
    }

    #[test]
    fn whitespace_only_is_empty() {
        assert!(normalize_word(" \t\n ").is_empty());
    }
}
