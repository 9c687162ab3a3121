//! SQLite storage backend for Sheetbook documents.
//!
//! This crate provides [`SqliteStore`], a
//! [`KeyValueStore`](sheetbook_db::KeyValueStore) kept in a single
//! `{prefix}kv` table, and [`Migration`] for managing that table's
//! lifecycle.
//!
//! # Quick start
//!
//! ```no_run
//! use sheetbook_db::Storage;
//! use sheetbook_sqlite::SqliteStore;
//!
//! let store = SqliteStore::open("sheetbook.db", "sb_").unwrap();
//! let mut storage = Storage::new(Box::new(store));
//! let schemas = storage.load_or_recover().unwrap().into_schemas();
//! println!("{} schema(s)", schemas.len());
//! ```
//!
//! # Table prefix customization
//!
//! All table names are prefixed with a configurable string, allowing
//! multiple isolated stores within the same SQLite database. Prefixes must
//! contain only alphanumeric characters and underscores.

mod error;
mod migration;
mod schema;
mod store;

pub use error::{Result, SqliteError};
pub use migration::{Migration, MigrationStatus};
pub use schema::{generate_drop_sql, generate_schema_sql};
pub use store::SqliteStore;
