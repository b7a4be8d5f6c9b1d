//! On-device key-value store.
//!
//! A small `SQLite` table of string keys to string values. It backs local
//! recipe storage and the persisted session, the way browser local storage
//! would in a web client. Values are usually JSON.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info};

use super::migrations;
use crate::error::{Error, Result};

/// Persistent key-value store on the local device.
///
/// The connection sits behind a mutex so the store can be shared as
/// `Arc<DeviceStore>` across async tasks.
#[derive(Debug)]
pub struct DeviceStore {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl DeviceStore {
    /// Open or create the store at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening device store at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Device store ready at {}", path.display());
        Ok(Self {
            path,
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn: Mutex::new(conn),
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::internal("device store lock poisoned"))
    }

    /// Read the raw value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.lock()?;
        let value = conn
            .query_row("SELECT value FROM entries WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            r"
            INSERT INTO entries (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        debug!(key, bytes = value.len(), "Stored device entry");
        Ok(())
    }

    /// Remove `key`. Returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let conn = self.lock()?;
        let removed = conn.execute("DELETE FROM entries WHERE key = ?1", [key])?;
        debug!(key, removed, "Removed device entry");
        Ok(removed > 0)
    }

    /// When `key` was last written.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn updated_at(&self, key: &str) -> Result<Option<DateTime<Utc>>> {
        let conn = self.lock()?;
        let raw: Option<String> = conn
            .query_row(
                "SELECT updated_at FROM entries WHERE key = ?1",
                [key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(raw
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc)))
    }

    /// Read and deserialize the JSON value under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails or the stored text is
    /// not valid JSON for `T`.
    pub fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.get(key)? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    /// Serialize `value` as JSON and store it under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the database operation fails.
    pub fn set_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let text = serde_json::to_string(value)?;
        self.set(key, &text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[test]
    fn test_open_in_memory() {
        let store = DeviceStore::open_in_memory().unwrap();
        assert_eq!(store.path(), Path::new(":memory:"));
    }

    #[test]
    fn test_get_missing_key() {
        let store = DeviceStore::open_in_memory().unwrap();
        assert!(store.get("nope").unwrap().is_none());
        assert!(store.updated_at("nope").unwrap().is_none());
    }

    #[test]
    fn test_set_then_get() {
        let store = DeviceStore::open_in_memory().unwrap();
        store.set("greeting", "merhaba").unwrap();
        assert_eq!(store.get("greeting").unwrap().as_deref(), Some("merhaba"));
        assert!(store.updated_at("greeting").unwrap().is_some());
    }

    #[test]
    fn test_set_replaces() {
        let store = DeviceStore::open_in_memory().unwrap();
        store.set("k", "one").unwrap();
        store.set("k", "two").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("two"));
    }

    #[test]
    fn test_remove() {
        let store = DeviceStore::open_in_memory().unwrap();
        store.set("k", "v").unwrap();
        assert!(store.remove("k").unwrap());
        assert!(!store.remove("k").unwrap());
        assert!(store.get("k").unwrap().is_none());
    }

    #[test]
    fn test_json_round_trip() {
        let store = DeviceStore::open_in_memory().unwrap();
        let sample = Sample {
            name: "kek".to_string(),
            count: 3,
        };
        store.set_json("sample", &sample).unwrap();
        let loaded: Option<Sample> = store.get_json("sample").unwrap();
        assert_eq!(loaded, Some(sample));
    }

    #[test]
    fn test_get_json_rejects_garbage() {
        let store = DeviceStore::open_in_memory().unwrap();
        store.set("sample", "not json").unwrap();
        let result: Result<Option<Sample>> = store.get_json("sample");
        assert!(matches!(result, Err(Error::Json(_))));
    }

    #[test]
    fn test_open_file_creates_parent_dirs() {
        let dir = std::env::temp_dir().join(format!(
            "tarifdefteri_device_test_{}",
            uuid::Uuid::new_v4()
        ));
        let path = dir.join("nested").join("notebook.db");

        {
            let store = DeviceStore::open(&path).unwrap();
            store.set("k", "v").unwrap();
        }
        let reopened = DeviceStore::open(&path).unwrap();
        assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v"));

        drop(reopened);
        let _ = std::fs::remove_dir_all(&dir);
    }
}
