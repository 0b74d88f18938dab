//! Whole-text wrong-layout detection

mod majority;
mod patterns;

pub use majority::{convert_text, ConversionKind, MajorityDetector, MajorityDetectorConfig};
pub use patterns::{has_hebrew_patterns, HEBREW_IN_ENGLISH_PATTERNS};
