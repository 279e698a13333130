//! SQLite persistence layer for device-local state.
//!
//! Uses `rusqlite` with bundled SQLite. Handles:
//! - Key/value storage under fixed string keys (settings, token, locale, theme)
//! - The offline cache of fetched API responses

mod cache;
mod kv;

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, Result};
use rusqlite::Connection;

pub use cache::CachedEntry;

/// Manages the SQLite database holding local state.
pub struct Database {
    conn: Mutex<Connection>,
}

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS kv (
        key TEXT PRIMARY KEY NOT NULL,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS query_cache (
        key TEXT PRIMARY KEY NOT NULL,
        payload TEXT NOT NULL,
        updated_at INTEGER NOT NULL
    );
";

impl Database {
    /// Open or create the database at the given path.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;

        // Enable WAL mode for better concurrent read performance.
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open a throwaway database that lives only in memory.
    ///
    /// Used by the web/headless build when no app data directory exists, and by tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("database connection mutex poisoned"))
    }
}

/// Current Unix timestamp in seconds.
pub fn unix_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn open_memory_db() -> Database {
        Database::open_in_memory().expect("in-memory database")
    }

    #[test]
    fn test_open_creates_schema_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lavascope.db");

        let db = Database::open(&path).unwrap();
        db.set("language", "zh").unwrap();
        drop(db);

        let reopened = Database::open(&path).unwrap();
        assert_eq!(reopened.get("language").unwrap().as_deref(), Some("zh"));
    }
}
