//! Persistence collaborators: credentials and conversion history.
//!
//! The gate never talks to these directly. The pipeline verifies credentials
//! before a login transition and appends the records the gate emits.
//!
//! - store traits and errors (this module)
//! - SQLite implementation (`sqlite`)
//! - versioned schema (`migrations`)
//! - salted password hashing (`password`)
//! - JSON export of users + history (`export`)

use std::path::PathBuf;

use crate::domain::{ConversionRecord, StoredRecord};

pub mod export;
pub mod migrations;
pub mod password;
pub mod sqlite;

pub use export::{ExportBundle, ExportedUser, export_json};
pub use sqlite::SqliteStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("migration to schema v{version} failed: {reason}")]
    Migration { version: u32, reason: String },

    #[error("I/O error on '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Username/password verification and sign-up.
pub trait CredentialStore {
    /// `true` when `username` exists and `password` matches.
    fn verify(&self, username: &str, password: &str) -> StoreResult<bool>;

    /// Create an account. Returns `false` when the username is already taken.
    fn register(&self, username: &str, password: &str) -> StoreResult<bool>;
}

/// Append-only per-user conversion history.
pub trait HistoryStore {
    fn append(&self, record: &ConversionRecord) -> StoreResult<()>;

    /// All records for `username`, oldest first.
    fn query(&self, username: &str) -> StoreResult<Vec<StoredRecord>>;
}
