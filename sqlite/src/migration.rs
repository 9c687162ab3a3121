//! Migration lifecycle operations for the SQLite backend.
//!
//! Provides [`Migration`] for creating and dropping the key-value table and
//! for reporting its status. Mutations run inside transactions.
//!
//! # Example
//!
//! ```no_run
//! use sheetbook_sqlite::Migration;
//! use rusqlite::Connection;
//!
//! let conn = Connection::open("sheetbook.db").unwrap();
//! let mut migration = Migration::new(conn, "sb_").unwrap();
//!
//! migration.up().unwrap();
//! let status = migration.status().unwrap();
//! assert!(status.tables_exist);
//! ```

use rusqlite::{Connection, OptionalExtension};

use crate::error::{Result, SqliteError};
use crate::schema::{generate_drop_sql, generate_schema_sql, kv_table, validate_prefix};

/// Manages the lifecycle of the key-value table.
///
/// [`up`](Self::up) creates it, [`down`](Self::down) drops it (and every
/// stored document with it), [`status`](Self::status) reports what is there.
pub struct Migration {
    conn: Connection,
    prefix: String,
}

impl Migration {
    /// Creates a migration manager for the given connection and table prefix.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::InvalidPrefix`] if the prefix contains invalid characters.
    pub fn new(conn: Connection, prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        validate_prefix(&prefix)?;
        Ok(Self { conn, prefix })
    }

    /// Creates the key-value table.
    ///
    /// Uses `CREATE TABLE IF NOT EXISTS` so it is safe to call multiple times.
    pub fn up(&mut self) -> Result<()> {
        let sql = generate_schema_sql(&self.prefix)?;
        let tx = self.conn.transaction()?;
        tx.execute_batch(&sql)
            .map_err(|e| SqliteError::MigrationError(format!("failed to create tables: {e}")))?;
        tx.commit()?;
        Ok(())
    }

    /// Drops the key-value table.
    ///
    /// Uses `DROP TABLE IF EXISTS` so it is safe to call even if the table
    /// does not exist.
    pub fn down(&mut self) -> Result<()> {
        let sql = generate_drop_sql(&self.prefix)?;
        let tx = self.conn.transaction()?;
        tx.execute_batch(&sql)
            .map_err(|e| SqliteError::MigrationError(format!("failed to drop tables: {e}")))?;
        tx.commit()?;
        Ok(())
    }

    /// Returns the current status of the migration.
    pub fn status(&self) -> Result<MigrationStatus> {
        if !self.tables_exist()? {
            return Ok(MigrationStatus {
                tables_exist: false,
                entry_count: 0,
                total_bytes: 0,
                last_updated: None,
            });
        }

        let table = kv_table(&self.prefix);
        let (entry_count, total_bytes): (i64, i64) = self.conn.query_row(
            &format!("SELECT COUNT(*), COALESCE(SUM(LENGTH(value)), 0) FROM {table}"),
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        let last_updated: Option<String> = self
            .conn
            .query_row(
                &format!("SELECT MAX(updated_at) FROM {table}"),
                [],
                |row| row.get(0),
            )
            .optional()?
            .flatten();

        Ok(MigrationStatus {
            tables_exist: true,
            entry_count: entry_count as usize,
            total_bytes: total_bytes as usize,
            last_updated,
        })
    }

    /// Returns a reference to the underlying connection.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn tables_exist(&self) -> Result<bool> {
        let table_name = kv_table(&self.prefix);
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name=?1",
            [&table_name],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

/// Snapshot of the key-value table returned by [`Migration::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationStatus {
    /// Whether the key-value table exists.
    pub tables_exist: bool,
    /// Number of stored keys.
    pub entry_count: usize,
    /// Total size of all stored values, in bytes.
    pub total_bytes: usize,
    /// Most recent `updated_at` timestamp, if any row exists.
    pub last_updated: Option<String>,
}
