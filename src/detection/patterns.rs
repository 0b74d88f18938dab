//! Letter patterns that hint at Hebrew typed on an English layout
//!
//! Plain substring checks, not a statistical model. Common English words
//! ("the", "check") match too, so a hit only means "worth converting" when
//! the text is already mostly Latin letters.

/// Key sequences that are common when Hebrew words are typed on QWERTY
pub const HEBREW_IN_ENGLISH_PATTERNS: &[&str] =
    &["th", "ch", "sh", "ck", "vv", "hh", "zv", "tk", "vut"];

/// Whether the lowercase text contains any of the patterns
pub fn has_hebrew_patterns(text: &str) -> bool {
    let lower = text.to_lowercase();
    HEBREW_IN_ENGLISH_PATTERNS
        .iter()
        .any(|pattern| lower.contains(pattern))
}
