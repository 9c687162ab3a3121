//! Persistence and configuration for Sheetbook documents.
//!
//! The whole root collection is stored as one JSON document under a single
//! key of a key-value store, mirroring browser local storage:
//!
//! - [`KeyValueStore`] — the store contract, with [`MemoryStore`] and
//!   [`FileStore`] implementations.
//! - [`Storage`] — full-document `load`/`save` of the schema collection,
//!   with [`load_or_recover`](Storage::load_or_recover) for damaged data.
//! - [`AppConfig`] — YAML configuration for backend, path, key and logging.
//!
//! # Quick start
//!
//! ```no_run
//! use sheetbook_db::{FileStore, Storage};
//!
//! let mut storage = Storage::new(Box::new(FileStore::new("sheetbook.json")));
//! let schemas = storage.load_or_recover().unwrap().into_schemas();
//! storage.save(&schemas).unwrap();
//! ```

mod config;
mod error;
mod storage;
mod store;

pub use config::{AppConfig, Backend, LogConfig, StorageConfig};
pub use error::{DatabaseError, Result};
pub use storage::{CORRUPT_SUFFIX, DEFAULT_STORAGE_KEY, LoadOutcome, Storage};
pub use store::{FileStore, KeyValueStore, MemoryStore, validate_key};
