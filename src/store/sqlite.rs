//! SQLite-backed credential and history store.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use tracing::{debug, info};

use crate::domain::{ConversionRecord, StoredRecord};
use crate::store::migrations::run_migrations;
use crate::store::password::{generate_salt, hash_password};
use crate::store::{CredentialStore, HistoryStore, StoreResult};

/// One connection holding both the `users` and `history` tables.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database file and migrate it to the latest schema.
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        let store = Self::from_connection(conn)?;
        info!(path = %path.display(), "opened conversion database");
        Ok(store)
    }

    /// In-memory database (tests, throwaway sessions).
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(mut conn: Connection) -> StoreResult<Self> {
        conn.busy_timeout(Duration::from_secs(5))?;
        run_migrations(&mut conn)?;
        Ok(Self { conn })
    }

    /// `(id, username)` for every account, oldest first.
    pub fn users(&self) -> StoreResult<Vec<(i64, String)>> {
        let mut stmt = self.conn.prepare("SELECT id, username FROM users ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Every history row regardless of user, oldest first.
    pub fn all_history(&self) -> StoreResult<Vec<StoredRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, category, conversion, input_value, converted_value, created_at
             FROM history ORDER BY id",
        )?;
        let rows = stmt
            .query_map([], stored_record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl CredentialStore for SqliteStore {
    fn verify(&self, username: &str, password: &str) -> StoreResult<bool> {
        let row: Option<(String, String)> = self
            .conn
            .query_row(
                "SELECT password, salt FROM users WHERE username = ?1",
                params![username],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        Ok(match row {
            Some((stored_hash, salt)) => stored_hash == hash_password(password, &salt),
            None => false,
        })
    }

    fn register(&self, username: &str, password: &str) -> StoreResult<bool> {
        let salt = generate_salt();
        let hashed = hash_password(password, &salt);
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO users (username, password, salt) VALUES (?1, ?2, ?3)",
            params![username, hashed, salt],
        )?;
        if inserted == 1 {
            info!(username, "registered user");
        } else {
            debug!(username, "username already taken");
        }
        Ok(inserted == 1)
    }
}

impl HistoryStore for SqliteStore {
    fn append(&self, record: &ConversionRecord) -> StoreResult<()> {
        self.conn.execute(
            "INSERT INTO history (username, category, conversion, input_value, converted_value, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.username,
                record.category,
                record.direction,
                record.input,
                record.output,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn query(&self, username: &str) -> StoreResult<Vec<StoredRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, username, category, conversion, input_value, converted_value, created_at
             FROM history WHERE username = ?1 ORDER BY id",
        )?;
        let rows = stmt
            .query_map(params![username], stored_record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

fn stored_record_from_row(row: &Row<'_>) -> rusqlite::Result<StoredRecord> {
    let created_at: Option<String> = row.get(6)?;
    Ok(StoredRecord {
        id: row.get(0)?,
        record: ConversionRecord {
            username: row.get(1)?,
            category: row.get(2)?,
            direction: row.get(3)?,
            input: row.get(4)?,
            output: row.get(5)?,
        },
        created_at: created_at.as_deref().and_then(parse_timestamp),
    })
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
