//! Versioned schema, tracked in `PRAGMA user_version`.
//!
//! v1: users + history tables.
//! v2: history.created_at and a per-user index.

use rusqlite::Connection;
use tracing::info;

use crate::store::{StoreError, StoreResult};

type Migration = fn(&Connection) -> rusqlite::Result<()>;

const MIGRATIONS: &[(u32, Migration)] = &[(1, v001_base_tables), (2, v002_history_timestamps)];

/// Latest schema version this build knows about.
pub const LATEST_VERSION: u32 = 2;

/// Bring `conn` up to `LATEST_VERSION`. All pending steps run in one
/// transaction; a failure leaves the file at its previous version.
pub fn run_migrations(conn: &mut Connection) -> StoreResult<u32> {
    let current = schema_version(conn)?;
    if current > LATEST_VERSION {
        return Err(StoreError::Migration {
            version: current,
            reason: format!("database is newer than this build (knows v{LATEST_VERSION})"),
        });
    }

    let tx = conn.transaction()?;
    for &(version, migrate) in MIGRATIONS.iter().filter(|(v, _)| *v > current) {
        migrate(&tx).map_err(|e| StoreError::Migration {
            version,
            reason: e.to_string(),
        })?;
        tx.pragma_update(None, "user_version", version)?;
        info!(version, "applied schema migration");
    }
    tx.commit()?;

    schema_version(conn)
}

pub fn schema_version(conn: &Connection) -> StoreResult<u32> {
    let version: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

fn v001_base_tables(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            username  TEXT NOT NULL UNIQUE,
            password  TEXT NOT NULL,
            salt      TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS history (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            username         TEXT NOT NULL,
            category         TEXT NOT NULL,
            conversion       TEXT NOT NULL,
            input_value      REAL NOT NULL,
            converted_value  REAL NOT NULL
        );
        ",
    )
}

fn v002_history_timestamps(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        "
        ALTER TABLE history ADD COLUMN created_at TEXT;
        CREATE INDEX IF NOT EXISTS idx_history_username ON history(username);
        ",
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_reaches_latest_version() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(schema_version(&conn).unwrap(), 0);
        assert_eq!(run_migrations(&mut conn).unwrap(), LATEST_VERSION);
    }

    #[test]
    fn rerunning_is_a_no_op() {
        let mut conn = Connection::open_in_memory().unwrap();
        run_migrations(&mut conn).unwrap();
        assert_eq!(run_migrations(&mut conn).unwrap(), LATEST_VERSION);
    }

    #[test]
    fn newer_database_is_refused() {
        let mut conn = Connection::open_in_memory().unwrap();
        conn.pragma_update(None, "user_version", LATEST_VERSION + 1).unwrap();
        let err = run_migrations(&mut conn).unwrap_err();
        assert!(matches!(err, StoreError::Migration { .. }));
    }

    #[test]
    fn v1_database_is_upgraded_in_place() {
        let mut conn = Connection::open_in_memory().unwrap();
        v001_base_tables(&conn).unwrap();
        conn.pragma_update(None, "user_version", 1).unwrap();
        conn.execute(
            "INSERT INTO history (username, category, conversion, input_value, converted_value)
             VALUES ('alice', 'Length', 'Feet to Meters', 1.0, 0.3048)",
            [],
        )
        .unwrap();

        run_migrations(&mut conn).unwrap();

        let created: Option<String> = conn
            .query_row("SELECT created_at FROM history", [], |row| row.get(0))
            .unwrap();
        assert!(created.is_none());
    }
}
