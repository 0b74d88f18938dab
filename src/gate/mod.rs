//! Admission control for the conversion service
//!
//! A [`ConcurrencyGate`] is built once at startup and shared through an
//! `Arc`. Each request calls [`ConcurrencyGate::acquire`] with its client id
//! and holds the returned [`GatePermit`] for as long as it works; rejected
//! requests never reach the converter.
//!
//! ```
//! use hebfix::gate::{ConcurrencyGate, GateConfig, Rejection};
//! use std::sync::Arc;
//!
//! let gate = Arc::new(ConcurrencyGate::new(GateConfig {
//!     max_concurrent: 1,
//!     ..GateConfig::default()
//! }));
//!
//! let permit = gate.acquire("10.0.0.1").unwrap();
//! assert_eq!(gate.acquire("10.0.0.2").unwrap_err(), Rejection::Overloaded);
//! drop(permit);
//! assert_eq!(gate.active_calls(), 0);
//! ```

mod clock;
mod limiter;

pub use clock::{Clock, ManualClock, SystemClock};
pub use limiter::{Admission, ConcurrencyGate, GateConfig, GatePermit, Rejection};
