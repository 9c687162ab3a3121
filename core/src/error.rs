//! Error type for store operations.
//!
//! Every fallible [`Workbook`](crate::Workbook) operation returns
//! [`StoreError`]. An `Err` always means nothing was changed.

use std::fmt;

use thiserror::Error;

/// Kind of named entity, used to label empty-name errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Schema,
    Table,
    Header,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Schema => "schema",
            Self::Table => "table",
            Self::Header => "header",
        })
    }
}

/// Errors returned by store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A required name was empty or whitespace-only.
    #[error("please enter a {0} name")]
    EmptyName(EntityKind),

    /// A header count was not a whole number in the accepted range.
    #[error("invalid number of headers: '{0}'")]
    InvalidHeaderCount(String),

    /// The operation needs a selected schema.
    #[error("no schema selected")]
    NoSchemaSelected,

    /// The operation needs a selected table.
    #[error("no table selected")]
    NoTableSelected,

    /// No schema has the given id.
    #[error("schema not found: {0}")]
    SchemaNotFound(i64),

    /// The selected schema has no table with the given id.
    #[error("table not found: {0}")]
    TableNotFound(i64),

    /// Header index outside `0..len`.
    #[error("header {index} is out of range (table has {len} header(s))")]
    HeaderOutOfRange { index: usize, len: usize },

    /// Cell coordinates outside the grid.
    #[error("cell ({row}, {col}) is out of range (table is {rows} x {cols})")]
    CellOutOfRange {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    /// Every id above the largest one in use is taken.
    #[error("no {0} id is left above {1}")]
    IdsExhausted(EntityKind, i64),
}

impl StoreError {
    /// Returns `true` for errors caused by bad user input, as opposed to a
    /// stale selection or index.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::EmptyName(_) | Self::InvalidHeaderCount(_))
    }
}

/// Convenience alias for results with [`StoreError`].
pub type Result<T> = std::result::Result<T, StoreError>;
