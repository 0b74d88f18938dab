pub mod config;
pub mod core;
pub mod correction;
pub mod detection;
pub mod error;
pub mod gate;
#[cfg(feature = "desktop")]
pub mod platform;
pub mod server;

pub use crate::core::converter::convert_last_language;
pub use crate::core::language::{classify, Language};
pub use crate::core::layout::{LayoutMap, STANDARD_LAYOUT};
pub use crate::detection::{convert_text, ConversionKind, MajorityDetector};
pub use crate::gate::{Admission, ConcurrencyGate, GateConfig, GatePermit, Rejection};
