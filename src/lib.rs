//! `unit-converter` library crate.
//!
//! The binary (`uconv`) is a thin wrapper around this library so that:
//!
//! - the conversion table and the guest gate are testable without a terminal
//! - the CLI and the TUI share one workflow (`app::pipeline`)
//! - stores can be swapped behind the `store` traits

pub mod app;
pub mod cli;
pub mod config;
pub mod convert;
pub mod domain;
pub mod error;
pub mod gate;
pub mod logging;
pub mod report;
pub mod store;
pub mod tui;
