//! Unit-conversion engine.
//!
//! - the registered `(category, direction)` rules (`table`)

pub mod table;

pub use table::*;
