//! In-memory store for the root collection and the current selection.
//!
//! [`Workbook`] owns every schema, table and row plus the transient selection
//! (current schema, current table, active page). Operations take already
//! collected input, validate it, and mutate in place. On `Err` nothing has
//! changed. Persisting and re-rendering after a mutation is left to the
//! caller.
//!
//! Selections are stored as ids and resolved on every access, so a deleted
//! entity can never be reached through a stale reference. Delete operations
//! reconcile the selection themselves.

use chrono::Utc;

use crate::error::{EntityKind, Result, StoreError};
use crate::types::{Schema, SortDirection, Table, require_name};

/// Largest header count accepted when creating a table.
pub const MAX_HEADER_COUNT: usize = 1000;

/// Which screen is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    /// The list of all schemas.
    #[default]
    SchemaList,
    /// Table management for the current schema.
    Tables,
}

/// The root collection together with the selection state.
///
/// # Examples
///
/// ```
/// use sheetbook_core::Workbook;
///
/// let mut wb = Workbook::new();
/// let schema = wb.create_schema("Inventory").unwrap();
/// wb.select_schema(schema).unwrap();
/// wb.create_table("Items", 2).unwrap();
/// wb.add_row().unwrap();
///
/// let table_id = wb.current_table().unwrap().id;
/// wb.set_cell(table_id, 0, 0, "Widget").unwrap();
///
/// let table = wb.current_table().unwrap();
/// assert_eq!(table.headers, vec!["Header 1", "Header 2"]);
/// assert_eq!(table.data, vec![vec!["Widget", ""]]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Workbook {
    schemas: Vec<Schema>,
    current_schema: Option<i64>,
    current_table: Option<i64>,
    page: Page,
}

impl Workbook {
    /// Creates an empty workbook on the schema-list page.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a loaded root collection with nothing selected.
    pub fn from_schemas(schemas: Vec<Schema>) -> Self {
        Self {
            schemas,
            ..Self::default()
        }
    }

    /// The root collection, in creation order.
    pub fn schemas(&self) -> &[Schema] {
        &self.schemas
    }

    /// Consumes the workbook and returns the root collection.
    pub fn into_schemas(self) -> Vec<Schema> {
        self.schemas
    }

    /// Looks up a schema by id.
    pub fn schema(&self, id: i64) -> Option<&Schema> {
        self.schemas.iter().find(|s| s.id == id)
    }

    /// The active page.
    pub fn page(&self) -> Page {
        self.page
    }

    /// The selected schema id, as stored.
    pub fn current_schema_id(&self) -> Option<i64> {
        self.current_schema
    }

    /// The selected table id, as stored.
    pub fn current_table_id(&self) -> Option<i64> {
        self.current_table
    }

    /// The selected schema, if the selection still resolves.
    pub fn current_schema(&self) -> Option<&Schema> {
        self.schema(self.current_schema?)
    }

    /// The selected table, if the selection still resolves.
    pub fn current_table(&self) -> Option<&Table> {
        self.current_schema()?.table(self.current_table?)
    }

    // -- schemas --------------------------------------------------------

    /// Appends a new schema and returns its id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyName`] if `name` is blank.
    pub fn create_schema(&mut self, name: &str) -> Result<i64> {
        let name = require_name(name, EntityKind::Schema)?;
        let id = next_id(self.schemas.iter().map(|s| s.id), EntityKind::Schema)?;
        self.schemas.push(Schema::new(id, name));
        Ok(id)
    }

    /// Renames a schema in place.
    pub fn rename_schema(&mut self, id: i64, name: &str) -> Result<()> {
        let name = require_name(name, EntityKind::Schema)?;
        self.schema_mut(id)?.name = name;
        Ok(())
    }

    /// Removes a schema and all of its tables.
    ///
    /// Returns to the schema-list page. If the removed schema was selected,
    /// both selections are cleared.
    pub fn delete_schema(&mut self, id: i64) -> Result<Schema> {
        let pos = self
            .schemas
            .iter()
            .position(|s| s.id == id)
            .ok_or(StoreError::SchemaNotFound(id))?;
        let removed = self.schemas.remove(pos);
        if self.current_schema == Some(id) {
            self.current_schema = None;
            self.current_table = None;
        }
        self.page = Page::SchemaList;
        Ok(removed)
    }

    /// Selects a schema and switches to the tables page.
    ///
    /// The first table of the schema, if any, becomes the current table.
    pub fn select_schema(&mut self, id: i64) -> Result<()> {
        let first_table = self
            .schema(id)
            .ok_or(StoreError::SchemaNotFound(id))?
            .tables
            .first()
            .map(|t| t.id);
        self.current_schema = Some(id);
        self.current_table = first_table;
        self.page = Page::Tables;
        Ok(())
    }

    /// Switches back to the schema-list page, keeping the selection.
    pub fn show_schema_list(&mut self) {
        self.page = Page::SchemaList;
    }

    // -- tables ---------------------------------------------------------

    /// Creates a table in the current schema and makes it the current table.
    ///
    /// The table gets `header_count` generated headers and no rows.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::EmptyName`] for a blank name,
    /// [`StoreError::InvalidHeaderCount`] above [`MAX_HEADER_COUNT`], or
    /// [`StoreError::NoSchemaSelected`] when no schema is selected.
    pub fn create_table(&mut self, name: &str, header_count: usize) -> Result<i64> {
        let name = require_name(name, EntityKind::Table)?;
        if header_count > MAX_HEADER_COUNT {
            return Err(StoreError::InvalidHeaderCount(header_count.to_string()));
        }
        let id = next_id(
            self.schemas
                .iter()
                .flat_map(|s| s.tables.iter().map(|t| t.id)),
            EntityKind::Table,
        )?;
        self.current_schema_mut()?
            .tables
            .push(Table::new(id, name, header_count));
        self.current_table = Some(id);
        Ok(id)
    }

    /// Renames a table of the current schema.
    pub fn rename_table(&mut self, id: i64, name: &str) -> Result<()> {
        let name = require_name(name, EntityKind::Table)?;
        self.current_schema_mut()?
            .table_mut(id)
            .ok_or(StoreError::TableNotFound(id))?
            .name = name;
        Ok(())
    }

    /// Removes a table (and its rows) from the current schema.
    ///
    /// If the removed table was selected, the first remaining table becomes
    /// the current table, or the table selection is cleared.
    pub fn delete_table(&mut self, id: i64) -> Result<Table> {
        let schema = self.current_schema_mut()?;
        let pos = schema
            .tables
            .iter()
            .position(|t| t.id == id)
            .ok_or(StoreError::TableNotFound(id))?;
        let removed = schema.tables.remove(pos);
        let first_remaining = schema.tables.first().map(|t| t.id);
        if self.current_table == Some(id) {
            self.current_table = first_remaining;
        }
        Ok(removed)
    }

    /// Selects a table of the current schema.
    pub fn select_table(&mut self, id: i64) -> Result<()> {
        let schema = self.current_schema_mut()?;
        if schema.table(id).is_none() {
            return Err(StoreError::TableNotFound(id));
        }
        self.current_table = Some(id);
        Ok(())
    }

    // -- rows, headers, cells -------------------------------------------

    /// Appends a blank row to the current table and returns its index.
    pub fn add_row(&mut self) -> Result<usize> {
        Ok(self.current_table_mut()?.push_blank_row())
    }

    /// Appends a header to the current table and returns its index.
    pub fn add_header(&mut self, name: &str) -> Result<usize> {
        self.current_table_mut()?.push_header(name)
    }

    /// Renames a header of the current table.
    pub fn rename_header(&mut self, index: usize, name: &str) -> Result<()> {
        self.current_table_mut()?.rename_header(index, name)
    }

    /// Removes a header and its column from the current table.
    pub fn delete_header(&mut self, index: usize) -> Result<String> {
        self.current_table_mut()?.remove_header(index)
    }

    /// Sorts the current table by a column, toggling its direction.
    pub fn sort_table(&mut self, index: usize) -> Result<SortDirection> {
        self.current_table_mut()?.sort_by_column(index)
    }

    /// Writes a cell of a table in the current schema.
    ///
    /// The schema is re-resolved from the current schema id and the table
    /// from `table_id`, so the write lands in the root collection even if
    /// the selected table has changed since the cell was displayed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CellOutOfRange`] for coordinates outside the
    /// grid; no cell is written.
    pub fn set_cell(
        &mut self,
        table_id: i64,
        row: usize,
        col: usize,
        value: impl Into<String>,
    ) -> Result<()> {
        self.current_schema_mut()?
            .table_mut(table_id)
            .ok_or(StoreError::TableNotFound(table_id))?
            .set_cell(row, col, value)
    }

    fn schema_mut(&mut self, id: i64) -> Result<&mut Schema> {
        self.schemas
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::SchemaNotFound(id))
    }

    fn current_schema_mut(&mut self) -> Result<&mut Schema> {
        let id = self.current_schema.ok_or(StoreError::NoSchemaSelected)?;
        self.schema_mut(id)
    }

    fn current_table_mut(&mut self) -> Result<&mut Table> {
        let id = self.current_table.ok_or(StoreError::NoTableSelected)?;
        self.current_schema_mut()?
            .table_mut(id)
            .ok_or(StoreError::TableNotFound(id))
    }
}

/// Parses a user-entered header count.
///
/// Accepts a whole number from 0 to [`MAX_HEADER_COUNT`], ignoring
/// surrounding whitespace.
///
/// # Examples
///
/// ```
/// use sheetbook_core::parse_header_count;
///
/// assert_eq!(parse_header_count(" 3 ").unwrap(), 3);
/// assert!(parse_header_count("three").is_err());
/// assert!(parse_header_count("-1").is_err());
/// ```
pub fn parse_header_count(input: &str) -> Result<usize> {
    let trimmed = input.trim();
    match trimmed.parse::<usize>() {
        Ok(n) if n <= MAX_HEADER_COUNT => Ok(n),
        _ => Err(StoreError::InvalidHeaderCount(trimmed.to_string())),
    }
}

/// Returns the current millisecond timestamp, bumped past every id already
/// in use so ids stay unique when several are created within a millisecond.
fn next_id(existing: impl Iterator<Item = i64>, kind: EntityKind) -> Result<i64> {
    let now = Utc::now().timestamp_millis();
    match existing.max() {
        Some(max) if max >= now => max
            .checked_add(1)
            .ok_or(StoreError::IdsExhausted(kind, max)),
        _ => Ok(now),
    }
}
