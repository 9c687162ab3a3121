//! Whole-document persistence of the root collection.
//!
//! [`Storage`] reads and writes every schema as one JSON array stored under a
//! single key of a [`KeyValueStore`]. There are no partial writes: every save
//! serializes the full collection and overwrites the key. There is no version
//! field and no locking; the last save wins.
//!
//! # Example
//!
//! ```
//! use sheetbook_core::Workbook;
//! use sheetbook_db::{MemoryStore, Storage};
//!
//! let mut storage = Storage::new(Box::new(MemoryStore::new()));
//! assert!(storage.load().unwrap().is_empty());
//!
//! let mut wb = Workbook::new();
//! wb.create_schema("Inventory").unwrap();
//! storage.save(wb.schemas()).unwrap();
//!
//! let reloaded = storage.load().unwrap();
//! assert_eq!(reloaded[0].name, "Inventory");
//! ```

use sheetbook_core::Schema;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::store::{KeyValueStore, validate_key};

/// Key the document is stored under unless configured otherwise.
pub const DEFAULT_STORAGE_KEY: &str = "schemas";

/// Suffix of the key a corrupted document is copied to on recovery.
pub const CORRUPT_SUFFIX: &str = ".corrupt";

/// Result of [`Storage::load_or_recover`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Nothing was stored yet.
    Empty,
    /// The stored document parsed.
    Loaded(Vec<Schema>),
    /// The stored document was malformed and was replaced by an empty
    /// collection; the raw text was copied to `backup_key`.
    Recovered {
        /// Key holding the unparseable document.
        backup_key: String,
        /// Parser error message.
        error: String,
    },
}

impl LoadOutcome {
    /// Returns the loaded schemas (empty unless [`LoadOutcome::Loaded`]).
    pub fn into_schemas(self) -> Vec<Schema> {
        match self {
            Self::Loaded(schemas) => schemas,
            Self::Empty | Self::Recovered { .. } => Vec::new(),
        }
    }
}

/// Reads and writes the root collection under one key of a store.
pub struct Storage {
    store: Box<dyn KeyValueStore>,
    key: String,
}

impl Storage {
    /// Creates storage using [`DEFAULT_STORAGE_KEY`].
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            store,
            key: DEFAULT_STORAGE_KEY.to_string(),
        }
    }

    /// Creates storage using a custom key.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidKey`](crate::DatabaseError::InvalidKey) for a blank
    /// key.
    pub fn with_key(store: Box<dyn KeyValueStore>, key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        validate_key(&key)?;
        Ok(Self { store, key })
    }

    /// The key the document lives under.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The underlying store.
    pub fn store(&self) -> &dyn KeyValueStore {
        self.store.as_ref()
    }

    /// Loads the root collection.
    ///
    /// Returns an empty collection when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`JsonError`](crate::DatabaseError::JsonError) if the stored
    /// document is malformed, or the store's own error if it cannot be read.
    pub fn load(&self) -> Result<Vec<Schema>> {
        match self.store.get(&self.key)? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Loads the root collection, recovering from a malformed document.
    ///
    /// A document that fails to parse is copied to `"{key}.corrupt"` and
    /// the caller starts from an empty collection. The original key is left
    /// as is until the next [`save`](Self::save).
    ///
    /// # Errors
    ///
    /// Store failures (I/O, backend) still propagate.
    pub fn load_or_recover(&mut self) -> Result<LoadOutcome> {
        let Some(raw) = self.store.get(&self.key)? else {
            debug!(store = %self.store.describe(), key = %self.key, "no stored document");
            return Ok(LoadOutcome::Empty);
        };
        match serde_json::from_str::<Vec<Schema>>(&raw) {
            Ok(schemas) => {
                debug!(
                    store = %self.store.describe(),
                    schemas = schemas.len(),
                    "loaded document"
                );
                Ok(LoadOutcome::Loaded(schemas))
            }
            Err(err) => {
                let backup_key = format!("{}{CORRUPT_SUFFIX}", self.key);
                self.store.set(&backup_key, &raw)?;
                warn!(
                    store = %self.store.describe(),
                    key = %self.key,
                    backup = %backup_key,
                    error = %err,
                    "stored document is malformed; starting empty"
                );
                Ok(LoadOutcome::Recovered {
                    backup_key,
                    error: err.to_string(),
                })
            }
        }
    }

    /// Serializes the full collection and overwrites the stored document.
    pub fn save(&mut self, schemas: &[Schema]) -> Result<()> {
        let raw = serde_json::to_string(schemas)?;
        self.store.set(&self.key, &raw)?;
        info!(
            store = %self.store.describe(),
            schemas = schemas.len(),
            bytes = raw.len(),
            "saved document"
        );
        Ok(())
    }
}
