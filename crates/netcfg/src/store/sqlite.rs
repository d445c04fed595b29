//! SQLite-backed state store.
//!
//! Uses rusqlite with a single `entries` table keyed by the full store key.
//! All access is serialized through a `Mutex<Connection>`.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};

use super::error::StoreError;
use super::{migrations, StateStore};

/// Thread-safe store handle wrapping a single rusqlite connection.
///
/// Cloning is cheap (inner `Arc`). WAL mode is enabled so an inspecting
/// reader does not block a run.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Opens (or creates) the store at the given path and runs all pending
    /// migrations. Any failure is reported as [`StoreError::Unavailable`].
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let unavailable = |reason: String| StoreError::Unavailable {
            location: path.display().to_string(),
            reason,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| unavailable(e.to_string()))?;
            }
        }

        let conn = Connection::open(path).map_err(|e| unavailable(e.to_string()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")
            .map_err(|e| unavailable(e.to_string()))?;
        migrations::run_all(&conn).map_err(|e| unavailable(e.to_string()))?;

        log::info!("State store opened at {}", path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an existing store without creating, migrating or writing
    /// anything. A missing file is reported as [`StoreError::Unavailable`];
    /// writes through the handle fail.
    pub fn open_read_only(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| StoreError::Unavailable {
                location: path.display().to_string(),
                reason: e.to_string(),
            })?;

        log::info!("State store opened read-only at {}", path.display());

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens an in-memory SQLite store. Runs all migrations.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        migrations::run_all(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let conn = self.conn.lock().map_err(|_| StoreError::LockPoisoned)?;
        f(&conn)
    }
}

#[async_trait]
impl StateStore for SqliteStore {
    async fn read(&self, key: &str) -> Result<Vec<u8>, StoreError> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT value FROM entries WHERE key = ?1",
                params![key],
                |r| r.get(0),
            )
            .optional()?
            .ok_or_else(|| StoreError::NotFound(key.to_string()))
        })
    }

    async fn read_recursive(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let keys = self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT key FROM entries
                 WHERE substr(key, 1, length(?1)) = ?1
                 ORDER BY key",
            )?;
            let keys = stmt
                .query_map(params![prefix], |r| r.get::<_, String>(0))?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(keys)
        })?;

        if keys.is_empty() {
            return Err(StoreError::NotFound(prefix.to_string()));
        }
        Ok(keys)
    }

    async fn write(&self, key: &str, value: &[u8]) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO entries (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                 updated_at = excluded.updated_at",
                params![key, value],
            )?;
            Ok(())
        })
    }

    async fn delete(&self, key: &str) -> Result<(), StoreError> {
        self.with_conn(|conn| {
            let removed = conn.execute("DELETE FROM entries WHERE key = ?1", params![key])?;
            if removed == 0 {
                return Err(StoreError::NotFound(key.to_string()));
            }
            Ok(())
        })
    }
}
