//! Conversion gate: decides whether an attempt may run, runs it, and emits
//! the history record for authenticated callers.
//!
//! - the pure decision function (`policy`)
//! - the per-session single-writer wrapper (`session`)

pub mod policy;
pub mod session;

pub use policy::*;
pub use session::*;
