//! JSON export of accounts and conversion history.
//!
//! Password hashes and salts never leave the database.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::StoredRecord;
use crate::store::{SqliteStore, StoreError, StoreResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportedUser {
    pub id: i64,
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportBundle {
    pub exported_at: DateTime<Utc>,
    pub users: Vec<ExportedUser>,
    pub history: Vec<StoredRecord>,
}

impl ExportBundle {
    pub fn collect(store: &SqliteStore) -> StoreResult<Self> {
        let users = store
            .users()?
            .into_iter()
            .map(|(id, username)| ExportedUser { id, username })
            .collect();
        Ok(Self {
            exported_at: Utc::now(),
            users,
            history: store.all_history()?,
        })
    }
}

/// Write every user (id + name) and every history row to `path`.
pub fn export_json(store: &SqliteStore, path: &Path) -> StoreResult<ExportBundle> {
    let bundle = ExportBundle::collect(store)?;
    let io_err = |source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut writer = BufWriter::new(File::create(path).map_err(io_err)?);
    serde_json::to_writer_pretty(&mut writer, &bundle)?;
    writer.flush().map_err(io_err)?;
    info!(
        path = %path.display(),
        users = bundle.users.len(),
        history = bundle.history.len(),
        "exported database"
    );
    Ok(bundle)
}
