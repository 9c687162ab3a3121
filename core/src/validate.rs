//! Structural validation of a root collection and its selection.
//!
//! The store operations keep these invariants on their own; validation is
//! for documents that came from elsewhere (a stored file, hand edits) and
//! for tests.
//!
//! # Examples
//!
//! ```
//! use sheetbook_core::*;
//!
//! let mut table = Table::new(1, "T", 2);
//! table.push_blank_row();
//! let mut schema = Schema::new(10, "S");
//! schema.tables.push(table);
//! assert!(validate_schemas(&[schema.clone()]).is_empty());
//!
//! // A row that lost a cell
//! schema.tables[0].data[0].pop();
//! assert!(!validate_schemas(&[schema]).is_empty());
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{Schema, Workbook};

/// Invariant violations found by validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Two schemas share an id.
    #[error("duplicate schema id: {0}")]
    DuplicateSchemaId(i64),
    /// Two tables of one schema share an id.
    #[error("duplicate table id {table} in schema {schema}")]
    DuplicateTableId { schema: i64, table: i64 },
    /// A row's length differs from the table's header count.
    #[error("table {table} row {row} has {actual} cell(s), expected {expected}")]
    RowLengthMismatch {
        table: i64,
        row: usize,
        expected: usize,
        actual: usize,
    },
    /// A sort toggle refers to a column that does not exist.
    #[error("table {table} has a sort state for missing column {index}")]
    SortStateOutOfRange { table: i64, index: usize },
    /// The selected schema id does not resolve.
    #[error("selected schema {0} does not exist")]
    DanglingSchemaSelection(i64),
    /// The selected table id does not resolve within the selected schema.
    #[error("selected table {0} does not exist in the selected schema")]
    DanglingTableSelection(i64),
}

/// Validates a root collection.
///
/// Returns every violation found; an empty vector means the collection is
/// consistent.
pub fn validate_schemas(schemas: &[Schema]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let mut schema_ids = HashSet::new();

    for schema in schemas {
        if !schema_ids.insert(schema.id) {
            errors.push(ValidationError::DuplicateSchemaId(schema.id));
        }
        let mut table_ids = HashSet::new();
        for table in &schema.tables {
            if !table_ids.insert(table.id) {
                errors.push(ValidationError::DuplicateTableId {
                    schema: schema.id,
                    table: table.id,
                });
            }
            let expected = table.headers.len();
            for (row, cells) in table.data.iter().enumerate() {
                if cells.len() != expected {
                    errors.push(ValidationError::RowLengthMismatch {
                        table: table.id,
                        row,
                        expected,
                        actual: cells.len(),
                    });
                }
            }
            for &index in table.sort_state.keys() {
                if index >= expected {
                    errors.push(ValidationError::SortStateOutOfRange {
                        table: table.id,
                        index,
                    });
                }
            }
        }
    }

    errors
}

/// Validates a workbook: its root collection plus the selection.
pub fn validate_workbook(workbook: &Workbook) -> Vec<ValidationError> {
    let mut errors = validate_schemas(workbook.schemas());

    match workbook.current_schema_id() {
        Some(id) => match workbook.schema(id) {
            Some(schema) => {
                if let Some(table) = workbook.current_table_id() {
                    if schema.table(table).is_none() {
                        errors.push(ValidationError::DanglingTableSelection(table));
                    }
                }
            }
            None => errors.push(ValidationError::DanglingSchemaSelection(id)),
        },
        None => {
            if let Some(table) = workbook.current_table_id() {
                errors.push(ValidationError::DanglingTableSelection(table));
            }
        }
    }

    errors
}
