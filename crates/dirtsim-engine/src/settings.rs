//! # dirtsim-engine::settings
//!
//! A single opaque JSON blob the UI writes through `UserSettingsSet` and
//! every connection is echoed on `UserSettingsUpdated` (spec §3
//! supplemented features). Mirrors the training-result repository's
//! memory/SQLite split since it persists alongside the same database
//! file.

use rusqlite::{params, Connection};

pub trait SettingsStore: Send {
    fn get(&self) -> Result<Option<serde_json::Value>, String>;
    fn set(&mut self, value: serde_json::Value) -> Result<(), String>;
}

#[derive(Default)]
pub struct MemorySettingsStore {
    value: Option<serde_json::Value>,
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self) -> Result<Option<serde_json::Value>, String> {
        Ok(self.value.clone())
    }

    fn set(&mut self, value: serde_json::Value) -> Result<(), String> {
        self.value = Some(value);
        Ok(())
    }
}

/// Backed by a single-row table in the same SQLite file as the
/// training-result repository (a distinct `Connection`; SQLite accepts
/// multiple readers/writers against one file).
pub struct SqliteSettingsStore {
    conn: Connection,
}

impl SqliteSettingsStore {
    pub fn open(path: &str) -> Result<Self, String> {
        let conn = Connection::open(path).map_err(|e| e.to_string())?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, String> {
        let conn = Connection::open_in_memory().map_err(|e| e.to_string())?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self, String> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS user_settings (id INTEGER PRIMARY KEY CHECK (id = 0), value_json TEXT NOT NULL);",
        )
        .map_err(|e| e.to_string())?;
        Ok(Self { conn })
    }
}

impl SettingsStore for SqliteSettingsStore {
    fn get(&self) -> Result<Option<serde_json::Value>, String> {
        let value_json: Option<String> = self
            .conn
            .query_row("SELECT value_json FROM user_settings WHERE id = 0", [], |row| row.get(0))
            .ok();
        value_json
            .map(|json| serde_json::from_str(&json).map_err(|e| e.to_string()))
            .transpose()
    }

    fn set(&mut self, value: serde_json::Value) -> Result<(), String> {
        let value_json = serde_json::to_string(&value).map_err(|e| e.to_string())?;
        self.conn
            .execute(
                "INSERT INTO user_settings (id, value_json) VALUES (0, ?1)
                 ON CONFLICT(id) DO UPDATE SET value_json = excluded.value_json",
                params![value_json],
            )
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn memory_store_round_trips() {
        let mut store = MemorySettingsStore::default();
        assert_eq!(store.get().unwrap(), None);
        store.set(json!({"theme": "dark"})).unwrap();
        assert_eq!(store.get().unwrap(), Some(json!({"theme": "dark"})));
    }

    #[test]
    fn sqlite_store_round_trips_and_upserts() {
        let mut store = SqliteSettingsStore::open_in_memory().unwrap();
        store.set(json!({"theme": "dark"})).unwrap();
        store.set(json!({"theme": "light"})).unwrap();
        assert_eq!(store.get().unwrap(), Some(json!({"theme": "light"})));
    }
}
