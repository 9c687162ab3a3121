//! Opening the configured store.

use sheetbook_db::{Backend, FileStore, KeyValueStore, MemoryStore, Storage, StorageConfig};
use sheetbook_sqlite::SqliteStore;
use tracing::debug;

/// Opens the key-value store selected by `config`.
///
/// The SQLite backend creates its table on first use.
pub fn open_store(config: &StorageConfig) -> Result<Box<dyn KeyValueStore>, String> {
    let store: Box<dyn KeyValueStore> = match config.backend {
        Backend::File => Box::new(FileStore::new(config.path.clone())),
        Backend::Sqlite => Box::new(
            SqliteStore::open(&config.path, config.table_prefix.as_str()).map_err(|e| {
                format!(
                    "Failed to open database '{}': {e}",
                    config.path.display()
                )
            })?,
        ),
        Backend::Memory => Box::new(MemoryStore::new()),
    };
    debug!(store = %store.describe(), key = %config.key, "opened store");
    Ok(store)
}

/// Opens the configured store and wraps it in [`Storage`].
pub fn open_storage(config: &StorageConfig) -> Result<Storage, String> {
    let store = open_store(config)?;
    Storage::with_key(store, config.key.as_str()).map_err(|e| e.to_string())
}
