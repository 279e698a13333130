//! Key/value table operations, the device-local equivalent of browser storage.

use anyhow::Result;
use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::Database;

impl Database {
    /// Read the raw string stored under `key`.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Store a raw string under `key`, replacing any previous value.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    /// Remove `key`. Returns whether a value existed.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(deleted > 0)
    }

    /// Read and deserialize a JSON value. Malformed JSON is an error, a missing key is `None`.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    /// Serialize `value` as JSON and store it under `key`.
    pub fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.set(key, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::open_memory_db;

    #[test]
    fn test_get_missing_key_is_none() {
        let db = open_memory_db();
        assert!(db.get("apiToken").unwrap().is_none());
    }

    #[test]
    fn test_set_overwrites_previous_value() {
        let db = open_memory_db();
        db.set("theme", "zinc").unwrap();
        db.set("theme", "stone").unwrap();
        assert_eq!(db.get("theme").unwrap().as_deref(), Some("stone"));
    }

    #[test]
    fn test_remove_reports_existence() {
        let db = open_memory_db();
        db.set("useProxy", "true").unwrap();
        assert!(db.remove("useProxy").unwrap());
        assert!(!db.remove("useProxy").unwrap());
        assert!(db.get("useProxy").unwrap().is_none());
    }

    #[test]
    fn test_json_values_round_trip_and_reject_garbage() {
        let db = open_memory_db();
        db.set_json("v4_endpoints", &vec!["https://a", "https://b"]).unwrap();
        let endpoints: Vec<String> = db.get_json("v4_endpoints").unwrap().unwrap();
        assert_eq!(endpoints, vec!["https://a", "https://b"]);

        db.set("v4_endpoints", "{not json").unwrap();
        assert!(db.get_json::<Vec<String>>("v4_endpoints").is_err());
    }
}
