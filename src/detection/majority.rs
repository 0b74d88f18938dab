//! Whole-text layout detection by majority script
//!
//! Coarse heuristic used by the `detect` command:
//! - mostly Hebrew letters: English typed on the Hebrew layout, convert to English
//! - mostly Latin letters with a Hebrew-ish pattern: Hebrew typed on QWERTY, convert to Hebrew
//! - anything else is left alone

use serde::Serialize;
use std::fmt;

use super::patterns::has_hebrew_patterns;
use crate::core::language::is_hebrew;
use crate::core::layout::{LayoutMap, STANDARD_LAYOUT};

/// Which way the text was converted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionKind {
    ToEnglish,
    ToHebrew,
    NoConversion,
}

impl ConversionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ConversionKind::ToEnglish => "to_english",
            ConversionKind::ToHebrew => "to_hebrew",
            ConversionKind::NoConversion => "no_conversion",
        }
    }
}

impl fmt::Display for ConversionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Detector settings
#[derive(Debug, Clone)]
pub struct MajorityDetectorConfig {
    /// Share of the text (0.0 ~ 1.0) one script must exceed
    pub majority_ratio: f64,
}

impl Default for MajorityDetectorConfig {
    fn default() -> Self {
        Self {
            majority_ratio: 0.7,
        }
    }
}

/// Majority-script detector
#[derive(Debug, Clone)]
pub struct MajorityDetector {
    config: MajorityDetectorConfig,
    layout: &'static LayoutMap,
}

impl MajorityDetector {
    pub fn new(config: MajorityDetectorConfig) -> Self {
        Self {
            config,
            layout: &STANDARD_LAYOUT,
        }
    }

    pub fn with_defaults() -> Self {
        Self::new(MajorityDetectorConfig::default())
    }

    /// Decide the conversion direction without converting
    pub fn detect(&self, text: &str) -> ConversionKind {
        let length = text.chars().count() as f64;
        let hebrew_chars = text.chars().filter(|&c| is_hebrew(c)).count() as f64;
        let english_chars = text.chars().filter(|c| c.is_ascii_alphabetic()).count() as f64;

        let threshold = length * self.config.majority_ratio;

        if hebrew_chars > threshold {
            ConversionKind::ToEnglish
        } else if english_chars > threshold && has_hebrew_patterns(text) {
            ConversionKind::ToHebrew
        } else {
            ConversionKind::NoConversion
        }
    }

    /// Convert the whole text in the detected direction
    pub fn convert_text(&self, text: &str) -> (String, ConversionKind) {
        let kind = self.detect(text);
        let converted = match kind {
            ConversionKind::ToEnglish => text
                .chars()
                .map(|c| self.layout.hebrew_to_english(c))
                .collect(),
            ConversionKind::ToHebrew => text
                .chars()
                .map(|c| self.layout.english_to_hebrew(c))
                .collect(),
            ConversionKind::NoConversion => text.to_string(),
        };
        (converted, kind)
    }
}

impl Default for MajorityDetector {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Convert with the default detector
pub fn convert_text(text: &str) -> (String, ConversionKind) {
    MajorityDetector::with_defaults().convert_text(text)
}
