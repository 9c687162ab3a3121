//! Core data model and in-memory store for Sheetbook.
//!
//! Sheetbook keeps named **schemas**, each holding named **tables** made of
//! free-text columns (headers) and rows of cell values:
//!
//! - [`Schema`] — a named container of tables.
//! - [`Table`] — headers, rows and per-column sort toggles.
//! - [`Row`] — one cell value per header.
//! - [`Workbook`] — the root collection plus the current selection, with
//!   every create/edit/delete/sort operation.
//!
//! Operations return [`StoreError`] and leave the workbook untouched on
//! failure. Validation ([`validate_schemas`], [`validate_workbook`]) checks
//! the structural invariants of a loaded document.
//!
//! # Example
//!
//! ```
//! use sheetbook_core::*;
//!
//! let mut wb = Workbook::new();
//! let inventory = wb.create_schema("Inventory").unwrap();
//! wb.select_schema(inventory).unwrap();
//! wb.create_table("Items", parse_header_count("2").unwrap()).unwrap();
//! wb.add_row().unwrap();
//! wb.delete_header(0).unwrap();
//!
//! let table = wb.current_table().unwrap();
//! assert_eq!(table.headers, vec!["Header 2"]);
//! assert_eq!(table.data, vec![vec![""]]);
//! assert!(validate_workbook(&wb).is_empty());
//! ```

mod error;
mod types;
mod validate;
mod workbook;

pub use error::{EntityKind, Result, StoreError};
pub use types::*;
pub use validate::{ValidationError, validate_schemas, validate_workbook};
pub use workbook::{MAX_HEADER_COUNT, Page, Workbook, parse_header_count};
