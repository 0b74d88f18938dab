//! Trailing-run layout converter

use crate::core::language::{classify, Language};
use crate::core::layout::{LayoutMap, STANDARD_LAYOUT};

/// Convert the last run of same-language text using the standard table
///
/// Scans from the end of `text` back to the first character whose language
/// differs from the last Hebrew/English character. Digits, punctuation and
/// whitespace belong to the run but never end it. Only the run is remapped;
/// the prefix before it is returned untouched.
pub fn convert_last_language(text: &str) -> String {
    convert_last_language_with(&STANDARD_LAYOUT, text)
}

/// Same as [`convert_last_language`] with an explicit table
pub fn convert_last_language_with(layout: &LayoutMap, text: &str) -> String {
    let (prefix, run, language) = split_trailing_run(text);

    let mut result = String::with_capacity(text.len() * 2);
    result.push_str(prefix);

    match language {
        Some(Language::Hebrew) => result.extend(run.chars().map(|c| layout.hebrew_to_english(c))),
        Some(Language::English) => result.extend(run.chars().map(|c| layout.english_to_hebrew(c))),
        _ => result.push_str(run),
    }

    result
}

/// Split `text` into (untouched prefix, trailing run, run language)
///
/// Language is `None` when the text has no Hebrew or English character.
pub fn split_trailing_run(text: &str) -> (&str, &str, Option<Language>) {
    let mut last_language: Option<Language> = None;
    let mut run_start = text.len();

    for (idx, c) in text.char_indices().rev() {
        let language = classify(c);

        if language.is_known() {
            match last_language {
                None => last_language = Some(language),
                Some(current) if current != language => break,
                Some(_) => {}
            }
        }

        run_start = idx;
    }

    (&text[..run_start], &text[run_start..], last_language)
}
