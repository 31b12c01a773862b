//! Domain types shared by the table, the gate, the stores and the front-ends.
//!
//! This module defines:
//!
//! - conversion rules (`ConversionRule`, `TemperatureFormula`)
//! - per-session authorization state (`SessionState`)
//! - attempt results (`ConversionOutcome`, `RejectReason`)
//! - history rows (`ConversionRecord`, `StoredRecord`)

pub mod types;

pub use types::*;
