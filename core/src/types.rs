//! Data model for schemas, tables and rows.
//!
//! These types mirror the persisted document exactly: a root collection is a
//! `Vec<Schema>`, each schema owns its tables, and each table owns its rows.
//! Field names follow the stored JSON layout (`sortState` keeps its camel-case
//! spelling), so a document written by one version can always be read back.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{EntityKind, Result, StoreError};

/// A single row of cell values, one per table header.
pub type Row = Vec<String>;

/// Per-column sort toggles, keyed by header index.
///
/// The stored value is the direction the *next* sort of that column applies.
/// Missing entries behave as [`SortDirection::Asc`].
pub type SortState = BTreeMap<usize, SortDirection>;

/// Direction of a column sort.
///
/// # Examples
///
/// ```
/// use sheetbook_core::SortDirection;
///
/// assert_eq!(SortDirection::default(), SortDirection::Asc);
/// assert_eq!(SortDirection::Asc.toggled(), SortDirection::Desc);
/// assert_eq!(SortDirection::Desc.toggled(), SortDirection::Asc);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    /// Ascending (the default for a column that was never sorted).
    #[default]
    Asc,
    /// Descending.
    Desc,
}

impl SortDirection {
    /// Returns the opposite direction.
    pub fn toggled(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    /// Returns the persisted spelling (`"asc"` or `"desc"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named grid of headers and rows.
///
/// Every row in [`data`](Table::data) has exactly as many cells as there are
/// [`headers`](Table::headers). The mutating methods on this type keep that
/// invariant; code that edits the public fields directly is responsible for
/// it (see [`validate_schemas`](crate::validate_schemas)).
///
/// # Examples
///
/// ```
/// use sheetbook_core::Table;
///
/// let mut table = Table::new(1, "Items", 2);
/// assert_eq!(table.headers, vec!["Header 1", "Header 2"]);
///
/// table.push_blank_row();
/// table.push_header("Price").unwrap();
/// assert_eq!(table.data, vec![vec!["", "", ""]]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Creation timestamp in milliseconds, unique within the workbook.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Column names, in display order.
    pub headers: Vec<String>,
    /// Rows of cell values.
    pub data: Vec<Row>,
    /// Next sort direction per column.
    #[serde(rename = "sortState", default)]
    pub sort_state: SortState,
}

impl Table {
    /// Creates an empty table with `header_count` generated headers named
    /// `"Header 1"` through `"Header N"`.
    pub fn new(id: i64, name: impl Into<String>, header_count: usize) -> Self {
        Self {
            id,
            name: name.into(),
            headers: default_headers(header_count),
            data: Vec::new(),
            sort_state: SortState::new(),
        }
    }

    /// Number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Number of rows.
    pub fn row_count(&self) -> usize {
        self.data.len()
    }

    /// Appends a row with one empty cell per header and returns its index.
    pub fn push_blank_row(&mut self) -> usize {
        self.data.push(vec![String::new(); self.headers.len()]);
        self.data.len() - 1
    }

    /// Appends a header and one empty cell to every existing row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyName`] if `name` is blank.
    pub fn push_header(&mut self, name: &str) -> Result<usize> {
        let name = require_name(name, EntityKind::Header)?;
        self.headers.push(name);
        for row in &mut self.data {
            row.push(String::new());
        }
        Ok(self.headers.len() - 1)
    }

    /// Renames the header at `index`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::HeaderOutOfRange`] for a bad index, or
    /// [`StoreError::EmptyName`] if `name` is blank.
    pub fn rename_header(&mut self, index: usize, name: &str) -> Result<()> {
        self.check_header(index)?;
        let name = require_name(name, EntityKind::Header)?;
        self.headers[index] = name;
        Ok(())
    }

    /// Removes the header at `index` together with its column in every row.
    ///
    /// Sort toggles are shifted so the remaining entries still describe the
    /// same columns. Returns the removed header name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::HeaderOutOfRange`] for a bad index.
    pub fn remove_header(&mut self, index: usize) -> Result<String> {
        self.check_header(index)?;
        let removed = self.headers.remove(index);
        for row in &mut self.data {
            if index < row.len() {
                row.remove(index);
            }
        }
        self.sort_state = std::mem::take(&mut self.sort_state)
            .into_iter()
            .filter(|(col, _)| *col != index)
            .map(|(col, dir)| if col > index { (col - 1, dir) } else { (col, dir) })
            .collect();
        Ok(removed)
    }

    /// Sorts the rows by the column at `index`.
    ///
    /// Applies the stored direction for the column (ascending when none is
    /// stored), then stores the opposite direction for the next call. The
    /// sort is stable and compares cells by their ordinal string order.
    /// Returns the direction that was applied.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::HeaderOutOfRange`] for a bad index.
    ///
    /// # Examples
    ///
    /// ```
    /// use sheetbook_core::{SortDirection, Table};
    ///
    /// let mut table = Table::new(1, "Letters", 1);
    /// table.data = vec![vec!["b".into()], vec!["a".into()], vec!["c".into()]];
    ///
    /// assert_eq!(table.sort_by_column(0).unwrap(), SortDirection::Asc);
    /// assert_eq!(table.column(0), vec!["a", "b", "c"]);
    ///
    /// assert_eq!(table.sort_by_column(0).unwrap(), SortDirection::Desc);
    /// assert_eq!(table.column(0), vec!["c", "b", "a"]);
    /// ```
    pub fn sort_by_column(&mut self, index: usize) -> Result<SortDirection> {
        self.check_header(index)?;
        let direction = self.sort_state.get(&index).copied().unwrap_or_default();
        match direction {
            SortDirection::Asc => self
                .data
                .sort_by(|a, b| sort_key(a, index).cmp(sort_key(b, index))),
            SortDirection::Desc => self
                .data
                .sort_by(|a, b| sort_key(b, index).cmp(sort_key(a, index))),
        }
        self.sort_state.insert(index, direction.toggled());
        Ok(direction)
    }

    /// Returns the values of the column at `index`, top to bottom.
    pub fn column(&self, index: usize) -> Vec<&str> {
        self.data
            .iter()
            .map(|row| row.get(index).map(String::as_str).unwrap_or(""))
            .collect()
    }

    /// Returns the cell at (`row`, `col`), if both indices are in range.
    pub fn cell(&self, row: usize, col: usize) -> Option<&str> {
        self.data.get(row)?.get(col).map(String::as_str)
    }

    /// Overwrites the cell at (`row`, `col`).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CellOutOfRange`] if either index is outside the
    /// grid; the table is left untouched.
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<String>) -> Result<()> {
        let (rows, cols) = (self.data.len(), self.headers.len());
        match self.data.get_mut(row).and_then(|r| r.get_mut(col)) {
            Some(cell) if col < cols => {
                *cell = value.into();
                Ok(())
            }
            _ => Err(StoreError::CellOutOfRange {
                row,
                col,
                rows,
                cols,
            }),
        }
    }

    fn check_header(&self, index: usize) -> Result<()> {
        if index < self.headers.len() {
            Ok(())
        } else {
            Err(StoreError::HeaderOutOfRange {
                index,
                len: self.headers.len(),
            })
        }
    }
}

/// A named container of tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Creation timestamp in milliseconds, unique within the root collection.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Tables in creation order.
    pub tables: Vec<Table>,
}

impl Schema {
    /// Creates a schema without tables.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            tables: Vec::new(),
        }
    }

    /// Looks up a table by id.
    pub fn table(&self, id: i64) -> Option<&Table> {
        self.tables.iter().find(|t| t.id == id)
    }

    /// Looks up a mutable table by id.
    pub fn table_mut(&mut self, id: i64) -> Option<&mut Table> {
        self.tables.iter_mut().find(|t| t.id == id)
    }

    /// Number of tables in this schema.
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }
}

fn sort_key(row: &Row, index: usize) -> &str {
    row.get(index).map(String::as_str).unwrap_or("")
}

/// Generates `"Header 1"` through `"Header {count}"`.
pub fn default_headers(count: usize) -> Vec<String> {
    (1..=count).map(|i| format!("Header {i}")).collect()
}

/// Trims `name` and rejects it if nothing is left.
pub(crate) fn require_name(name: &str, kind: EntityKind) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(StoreError::EmptyName(kind));
    }
    Ok(trimmed.to_string())
}
