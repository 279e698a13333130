//! Offline cache of fetched API responses.
//!
//! Each entry is a serialized response payload plus the time it was written, so a
//! restart can show the last known groups and rules before the first refetch.

use anyhow::Result;
use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{unix_timestamp, Database};

/// A restored cache entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedEntry<T> {
    pub value: T,
    pub updated_at: i64,
}

impl<T> CachedEntry<T> {
    /// Whether the entry is older than `stale_secs` at time `now`.
    pub fn is_stale(&self, now: i64, stale_secs: i64) -> bool {
        now - self.updated_at > stale_secs
    }
}

impl Database {
    /// Persist a response payload under `key`.
    pub fn put_cached<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        self.put_cached_at(key, value, unix_timestamp())
    }

    pub(crate) fn put_cached_at<T: Serialize>(&self, key: &str, value: &T, updated_at: i64) -> Result<()> {
        let payload = serde_json::to_string(value)?;
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO query_cache (key, payload, updated_at) VALUES (?1, ?2, ?3)",
            params![key, payload, updated_at],
        )?;
        Ok(())
    }

    /// Restore the payload stored under `key`.
    ///
    /// Entries that no longer deserialize are dropped and reported as missing.
    /// Staleness is left to the caller (`CachedEntry::is_stale`).
    pub fn get_cached<T: DeserializeOwned>(&self, key: &str) -> Result<Option<CachedEntry<T>>> {
        let row: Option<(String, i64)> = {
            let conn = self.conn()?;
            conn.query_row(
                "SELECT payload, updated_at FROM query_cache WHERE key = ?1",
                params![key],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?
        };

        let Some((payload, updated_at)) = row else {
            return Ok(None);
        };

        match serde_json::from_str(&payload) {
            Ok(value) => Ok(Some(CachedEntry { value, updated_at })),
            Err(e) => {
                tracing::warn!("Dropping unreadable cache entry '{key}': {e}");
                self.remove_cached(key)?;
                Ok(None)
            }
        }
    }

    /// Remove a single cache entry.
    pub fn remove_cached(&self, key: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM query_cache WHERE key = ?1", params![key])?;
        Ok(())
    }

    /// Drop the whole offline cache (e.g. after the API token changes).
    pub fn clear_cache(&self) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM query_cache", [])?;
        if deleted > 0 {
            tracing::info!("Cleared {deleted} cached API responses");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::open_memory_db;
    use super::super::unix_timestamp;

    #[test]
    fn test_cached_payload_is_restored() {
        let db = open_memory_db();
        db.put_cached("groups", &serde_json::json!({ "total": 2 })).unwrap();

        let entry = db
            .get_cached::<serde_json::Value>("groups")
            .unwrap()
            .unwrap();
        assert_eq!(entry.value["total"], 2);
        assert!(!entry.is_stale(entry.updated_at, 30));
        assert!(entry.is_stale(entry.updated_at + 31, 30));
    }

    #[test]
    fn test_unreadable_entry_is_dropped() {
        let db = open_memory_db();
        db.put_cached("rules:abc", &"just a string").unwrap();

        let restored = db.get_cached::<Vec<u32>>("rules:abc").unwrap();
        assert!(restored.is_none());
        // The broken entry is gone, so even a lenient read finds nothing.
        assert!(db
            .get_cached::<serde_json::Value>("rules:abc")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_old_entry_is_kept_and_reported_stale() {
        let db = open_memory_db();
        let written = unix_timestamp() - 3600;
        db.put_cached_at("groups", &1u32, written).unwrap();

        let entry = db.get_cached::<u32>("groups").unwrap().unwrap();
        assert_eq!(entry.value, 1);
        assert_eq!(entry.updated_at, written);
        assert!(entry.is_stale(unix_timestamp(), 60));
    }

    #[test]
    fn test_clear_cache_removes_everything() {
        let db = open_memory_db();
        db.put_cached("groups", &1u32).unwrap();
        db.put_cached("rules:a", &2u32).unwrap();
        assert_eq!(db.clear_cache().unwrap(), 2);
        assert!(db.get_cached::<u32>("groups").unwrap().is_none());
    }
}
