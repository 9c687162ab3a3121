//! Terminal front end for Sheetbook.
//!
//! - [`render`] projects a [`Workbook`](sheetbook_core::Workbook) into
//!   [`Frame`]s and printable formats.
//! - [`console`] is the prompt/confirm/alert channel.
//! - [`session`] wires user operations to the workbook, storage and console.
//! - [`shell`] is the interactive command loop driving a session.
//! - [`backend`] opens the store selected by configuration.
//!
//! # Example
//!
//! ```
//! use sheetbook_cli::{Outcome, ScriptedConsole, Session};
//! use sheetbook_db::{MemoryStore, Storage};
//!
//! let storage = Storage::new(Box::new(MemoryStore::new()));
//! let mut session = Session::open(storage, ScriptedConsole::new().answer("2")).unwrap();
//! session.create_schema("Inventory").unwrap();
//! let id = session.workbook().schemas()[0].id;
//! session.open_schema(id).unwrap();
//! assert_eq!(session.create_table("Items").unwrap(), Outcome::Applied);
//! assert_eq!(session.workbook().current_table().unwrap().headers.len(), 2);
//! ```

pub mod backend;
pub mod console;
pub mod render;
pub mod session;
pub mod shell;

pub use console::{Console, HeaderAction, ScriptedConsole, TerminalConsole};
pub use render::{Frame, OutputFormat, render};
pub use session::{Outcome, Session, SessionResult};
