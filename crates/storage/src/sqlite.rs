//! `SQLite` key-value storage. All methods here are synchronous; the async
//! trait implementation lives in `sqlite_async`.

use std::path::Path;

use chrono::Utc;
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{OptionalExtension as _, params};

use crate::error::StorageError;
use crate::migrations;

/// Type alias for pooled connection
pub(crate) type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Key-value storage wrapping a `SQLite` connection pool
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pub(crate) pool: Pool<SqliteConnectionManager>,
}

impl SqliteStore {
    /// Opens (and migrates) the database at `db_path`.
    ///
    /// # Errors
    /// Returns error if the pool cannot be built or migrations fail.
    pub fn new(db_path: &Path) -> Result<Self, StorageError> {
        let manager = SqliteConnectionManager::file(db_path);
        let pool = Pool::builder().max_size(4).build(manager)?;
        Self::from_pool(pool)
    }

    /// Private in-memory database. Single connection, so all callers share it.
    ///
    /// # Errors
    /// Returns error if the pool cannot be built or migrations fail.
    pub fn open_in_memory() -> Result<Self, StorageError> {
        let manager = SqliteConnectionManager::memory();
        let pool = Pool::builder().max_size(1).build(manager)?;
        Self::from_pool(pool)
    }

    fn from_pool(pool: Pool<SqliteConnectionManager>) -> Result<Self, StorageError> {
        let conn = pool.get()?;
        migrations::run_migrations(&conn)?;
        Ok(Self { pool })
    }

    pub(crate) fn conn(&self) -> Result<PooledConn, StorageError> {
        Ok(self.pool.get()?)
    }

    /// Read a value.
    ///
    /// # Errors
    /// Returns error if the query fails.
    pub fn get_value(&self, key: &str) -> Result<Option<String>, StorageError> {
        let conn = self.conn()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    /// Insert or replace a value.
    ///
    /// # Errors
    /// Returns error if the write fails.
    pub fn set_value(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
               ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Delete a value. Returns `true` if a row was deleted.
    ///
    /// # Errors
    /// Returns error if the delete fails.
    pub fn remove_value(&self, key: &str) -> Result<bool, StorageError> {
        let conn = self.conn()?;
        let deleted = conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(deleted > 0)
    }

    /// Keys starting with `prefix`, ascending.
    ///
    /// # Errors
    /// Returns error if the query fails.
    pub fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StorageError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT key FROM kv WHERE substr(key, 1, length(?1)) = ?1 ORDER BY key ASC",
        )?;
        let keys = stmt
            .query_map(params![prefix], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }
}
