//! SQLite-backed key-value store.

use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use sheetbook_db::{KeyValueStore, validate_key};
use tracing::debug;

use crate::error::Result;
use crate::schema::{generate_schema_sql, kv_table, validate_prefix};

/// [`KeyValueStore`] backed by a `{prefix}kv` table.
///
/// The table is created on open if it does not exist yet. Writes are
/// upserts, so each key holds exactly one row.
///
/// # Examples
///
/// ```
/// use rusqlite::Connection;
/// use sheetbook_db::KeyValueStore;
/// use sheetbook_sqlite::SqliteStore;
///
/// let conn = Connection::open_in_memory().unwrap();
/// let mut store = SqliteStore::new(conn, "sb_").unwrap();
/// store.set("schemas", "[]").unwrap();
/// assert_eq!(store.get("schemas").unwrap().as_deref(), Some("[]"));
/// ```
pub struct SqliteStore {
    conn: Connection,
    prefix: String,
    label: String,
}

impl SqliteStore {
    /// Opens (or creates) the database at `path`.
    pub fn open(path: impl AsRef<Path>, prefix: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        let mut store = Self::new(conn, prefix)?;
        store.label = format!("sqlite:{}", path.display());
        Ok(store)
    }

    /// Wraps an existing connection, creating the table if needed.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidPrefix`](crate::SqliteError::InvalidPrefix) for a
    /// bad prefix, or a database error if the table cannot be created.
    pub fn new(conn: Connection, prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        validate_prefix(&prefix)?;
        conn.execute_batch(&generate_schema_sql(&prefix)?)?;
        Ok(Self {
            conn,
            prefix,
            label: "sqlite".to_string(),
        })
    }

    /// Returns the table prefix.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn read(&self, key: &str) -> Result<Option<String>> {
        validate_key(key)?;
        let sql = format!("SELECT value FROM {} WHERE key = ?1", kv_table(&self.prefix));
        let value = self
            .conn
            .query_row(&sql, params![key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        validate_key(key)?;
        let sql = format!(
            "INSERT INTO {} (key, value, updated_at) VALUES (?1, ?2, datetime('now'))
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            kv_table(&self.prefix)
        );
        self.conn.execute(&sql, params![key, value])?;
        debug!(store = %self.label, key, bytes = value.len(), "upserted value");
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<()> {
        validate_key(key)?;
        let sql = format!("DELETE FROM {} WHERE key = ?1", kv_table(&self.prefix));
        self.conn.execute(&sql, params![key])?;
        Ok(())
    }
}

impl KeyValueStore for SqliteStore {
    fn get(&self, key: &str) -> sheetbook_db::Result<Option<String>> {
        Ok(self.read(key)?)
    }

    fn set(&mut self, key: &str, value: &str) -> sheetbook_db::Result<()> {
        Ok(self.write(key, value)?)
    }

    fn remove(&mut self, key: &str) -> sheetbook_db::Result<()> {
        Ok(self.delete(key)?)
    }

    fn describe(&self) -> String {
        self.label.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_store() -> SqliteStore {
        SqliteStore::new(Connection::open_in_memory().unwrap(), "sb_").unwrap()
    }

    #[test]
    fn test_get_missing_key() {
        let store = memory_store();
        assert!(store.get("schemas").unwrap().is_none());
    }

    #[test]
    fn test_set_overwrites() {
        let mut store = memory_store();
        store.set("schemas", "[1]").unwrap();
        store.set("schemas", "[2]").unwrap();
        assert_eq!(store.get("schemas").unwrap().as_deref(), Some("[2]"));
        let rows: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM sb_kv", [], |row| row.get(0))
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[test]
    fn test_remove() {
        let mut store = memory_store();
        store.set("a", "1").unwrap();
        store.remove("a").unwrap();
        store.remove("a").unwrap();
        assert!(store.get("a").unwrap().is_none());
    }

    #[test]
    fn test_invalid_key_maps_to_storage_error() {
        let mut store = memory_store();
        assert!(matches!(
            store.set("", "x"),
            Err(sheetbook_db::DatabaseError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_prefixes_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shared.db");
        let mut a = SqliteStore::open(&path, "a_").unwrap();
        let b = SqliteStore::open(&path, "b_").unwrap();
        a.set("schemas", "[]").unwrap();
        assert!(b.get("schemas").unwrap().is_none());
        assert_eq!(a.prefix(), "a_");
        assert!(a.describe().starts_with("sqlite:"));
    }
}
