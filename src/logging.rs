//! Tracing initialization.
//!
//! The CLI logs to stderr. The TUI owns the terminal, so it logs to a file.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Mutex, Once};

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::config::DEFAULT_LOG_FILTER;
use crate::error::AppError;

static INIT: Once = Once::new();

#[derive(Debug, Clone)]
pub enum LogTarget {
    Stderr,
    File(PathBuf),
}

/// Install the global subscriber. Only the first call has any effect.
pub fn init_tracing(filter: &str, target: LogTarget) -> Result<(), AppError> {
    let mut result = Ok(());
    INIT.call_once(|| {
        result = install(filter, target);
    });
    result
}

fn install(filter: &str, target: LogTarget) -> Result<(), AppError> {
    let filter = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let installed = match target {
        LogTarget::Stderr => tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .try_init(),
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .map_err(|e| {
                    AppError::runtime(format!("Failed to open log file '{}': {e}", path.display()))
                })?;
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .with(filter)
                .try_init()
        }
    };

    installed.map_err(|e| AppError::runtime(format!("Failed to initialize logging: {e}")))
}
