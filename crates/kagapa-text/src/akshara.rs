//! Akshara (orthographic syllable) counting.
//!
//! A base letter opens a new unit, combining marks decorate the unit before
//! them, and `consonant + virama + consonant` chains fold into one conjunct.
//! Scripts without marks or viramas (Latin) fall back to a code-point count.

use unicode_general_category::{get_general_category, GeneralCategory};

pub const KANNADA_VIRAMA: char = '\u{0CCD}';
pub const DEVANAGARI_VIRAMA: char = '\u{094D}';

/// Akshara counter for one Brahmic script, identified by its virama.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AksharaCounter {
    virama: char,
}

impl Default for AksharaCounter {
    fn default() -> Self {
        Self::kannada()
    }
}

impl AksharaCounter {
    pub const fn new(virama: char) -> Self {
        Self { virama }
    }

    pub const fn kannada() -> Self {
        Self::new(KANNADA_VIRAMA)
    }

    pub const fn devanagari() -> Self {
        Self::new(DEVANAGARI_VIRAMA)
    }

    pub fn virama(&self) -> char {
        self.virama
    }

    pub fn count(&self, word: &str) -> usize {
        let chars: Vec<char> = word.chars().collect();
        let len = chars.len();
        let mut count = 0;
        let mut i = 0;
        while i < len {
            if is_combining_mark(chars[i]) {
                i += 1;
                continue;
            }
            count += 1;
            i += 1;
            // virama followed by a letter joins the conjunct just counted
            while i + 1 < len && chars[i] == self.virama && is_letter(chars[i + 1]) {
                i += 2;
                while i < len && is_combining_mark(chars[i]) {
                    i += 1;
                }
            }
        }
        count
    }
}

/// Kannada-aware akshara count; the length metric used for ranking.
pub fn count_aksharas(word: &str) -> usize {
    AksharaCounter::kannada().count(word)
}

fn is_combining_mark(c: char) -> bool {
    matches!(get_general_category(c), GeneralCategory::NonspacingMark | GeneralCategory::SpacingMark)
}

fn is_letter(c: char) -> bool {
    matches!(
        get_general_category(c),
        GeneralCategory::UppercaseLetter
            | GeneralCategory::LowercaseLetter
            | GeneralCategory::TitlecaseLetter
            | GeneralCategory::ModifierLetter
            | GeneralCategory::OtherLetter
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn virama_and_vowel_signs_are_marks() {
        assert!(is_combining_mark(KANNADA_VIRAMA));
        assert!(is_combining_mark('\u{0CBF}'));
        // spacing vowel sign AA
        assert!(is_combining_mark('\u{0CBE}'));
        assert!(!is_combining_mark('\u{0C95}'));
    }

    #[test]
    fn kannada_consonants_are_letters() {
        assert!(is_letter('\u{0C95}'));
        assert!(is_letter('a'));
        assert!(!is_letter(KANNADA_VIRAMA));
        assert!(!is_letter('7'));
    }
}
