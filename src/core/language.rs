//! Per-character language classification

use serde::Serialize;

/// Hebrew block: U+0590 ~ U+05FF
const HEBREW_BLOCK_START: u32 = 0x0590;
const HEBREW_BLOCK_END: u32 = 0x05FF;

/// Language a single character belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Hebrew,
    English,
    /// Digits, punctuation, whitespace and everything else
    Unknown,
}

impl Language {
    /// Hebrew or English, i.e. a character that decides a run's language
    pub fn is_known(self) -> bool {
        !matches!(self, Language::Unknown)
    }
}

/// Whether the character is in the Hebrew Unicode block
pub fn is_hebrew(c: char) -> bool {
    (HEBREW_BLOCK_START..=HEBREW_BLOCK_END).contains(&(c as u32))
}

/// Classify one character
pub fn classify(c: char) -> Language {
    if is_hebrew(c) {
        Language::Hebrew
    } else if c.is_ascii_alphabetic() {
        Language::English
    } else {
        Language::Unknown
    }
}
