//! Application configuration.
//!
//! Defines the YAML-serializable configuration that selects the storage
//! backend, the document key and the default log filter. Every field has a
//! default, so an empty file (or no file at all) is a valid configuration.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! storage:
//!   backend: sqlite
//!   path: sheetbook.db
//!   key: schemas
//!   table_prefix: sb_
//! log:
//!   filter: info
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::DEFAULT_STORAGE_KEY;

/// Which key-value store holds the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// A JSON file of key/value strings (the default).
    #[default]
    File,
    /// A SQLite database table.
    Sqlite,
    /// Process memory; nothing is kept after exit.
    Memory,
}

/// Where and how the document is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Backend kind.
    pub backend: Backend,
    /// File or database path (ignored by the memory backend).
    pub path: PathBuf,
    /// Key the document is stored under.
    pub key: String,
    /// Table name prefix for the SQLite backend.
    pub table_prefix: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: Backend::File,
            path: PathBuf::from("sheetbook.json"),
            key: DEFAULT_STORAGE_KEY.to_string(),
            table_prefix: "sb_".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directive used when `RUST_LOG` is not set.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

/// Top-level application configuration.
///
/// # Examples
///
/// ```
/// use sheetbook_db::{AppConfig, Backend};
///
/// let config: AppConfig = serde_yaml::from_str("storage: { backend: memory }").unwrap();
/// assert_eq!(config.storage.backend, Backend::Memory);
/// assert_eq!(config.storage.key, "schemas");
/// assert_eq!(config.log.filter, "warn");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Storage settings.
    pub storage: StorageConfig,
    /// Logging settings.
    pub log: LogConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            storage: StorageConfig::default(),
            log: LogConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DatabaseError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::DatabaseError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}
