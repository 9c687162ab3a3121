//! User-level operations: collect input, mutate, persist, re-render.
//!
//! A [`Session`] owns the [`Workbook`], the [`Storage`] it is mirrored to and
//! the [`Console`] used for prompts. Each operation gathers whatever input
//! it still needs from the console, applies one workbook operation, then
//! saves the whole collection and presents a freshly rendered frame.
//!
//! Failure policy:
//!
//! - rejected input or a stale id is reported with an alert; nothing changes
//!   and nothing is saved ([`Outcome::Rejected`]);
//! - a cancelled prompt, an empty rename or a declined confirmation is a
//!   silent no-op ([`Outcome::Cancelled`]);
//! - deleting a schema, table or header always asks for confirmation;
//! - storage failures are returned as errors. The in-memory change is kept;
//! - a stored collection that fails [`validate_schemas`] opens read-only:
//!   navigation works, every change is rejected so the file is never
//!   rewritten from a broken state.

use sheetbook_core::{
    EntityKind, StoreError, ValidationError, Workbook, parse_header_count, validate_schemas,
};
use sheetbook_db::{DatabaseError, LoadOutcome, Storage};
use tracing::{debug, warn};

use crate::console::{Console, HeaderAction};
use crate::render::render;

/// What an operation ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The operation ran (and was persisted, if it mutated anything).
    Applied,
    /// The user cancelled; nothing changed.
    Cancelled,
    /// Input was rejected and the user was alerted; nothing changed.
    Rejected,
}

/// Result of a session operation.
pub type SessionResult = std::result::Result<Outcome, DatabaseError>;

/// Application state threaded through every user operation.
pub struct Session<C: Console> {
    workbook: Workbook,
    storage: Storage,
    console: C,
    /// Problems found in the collection as loaded. Non-empty means read-only.
    problems: Vec<ValidationError>,
}

impl<C: Console> Session<C> {
    /// Loads the stored collection and shows the schema list.
    ///
    /// A malformed stored document is set aside (see
    /// [`Storage::load_or_recover`]) and the session starts empty; the user
    /// is alerted. A collection that loads but fails validation opens
    /// read-only, also with an alert.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the store itself cannot be read.
    pub fn open(mut storage: Storage, mut console: C) -> Result<Self, DatabaseError> {
        let outcome = storage.load_or_recover()?;
        if let LoadOutcome::Recovered { backup_key, error } = &outcome {
            console.alert(&format!(
                "Stored data could not be read ({error}). Starting with an empty collection; \
                 the unreadable data was kept under '{backup_key}'."
            ));
        }
        let schemas = outcome.into_schemas();
        let problems = validate_schemas(&schemas);
        if let Some(first) = problems.first() {
            warn!(count = problems.len(), first = %first, "stored collection is inconsistent");
            console.alert(&format!(
                "Stored data has {} problem(s), first: {first}. Changes are disabled; \
                 run 'sheetbook check' for details.",
                problems.len()
            ));
        }
        let mut session = Self {
            workbook: Workbook::from_schemas(schemas),
            storage,
            console,
            problems,
        };
        session.refresh();
        Ok(session)
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    /// Problems found when the collection was loaded.
    pub fn problems(&self) -> &[ValidationError] {
        &self.problems
    }

    pub fn is_read_only(&self) -> bool {
        !self.problems.is_empty()
    }

    /// Re-renders the active page without changing anything.
    pub fn refresh(&mut self) {
        let frame = render(&self.workbook);
        self.console.present(&frame);
    }

    // -- schemas --------------------------------------------------------

    /// Creates a schema from a name typed into the schema form.
    pub fn create_schema(&mut self, name: &str) -> SessionResult {
        if let Some(outcome) = self.refuse_if_read_only("create_schema") {
            return Ok(outcome);
        }
        match self.workbook.create_schema(name) {
            Ok(id) => self.commit("create_schema", id),
            Err(err) => Ok(self.reject("create_schema", err)),
        }
    }

    /// Prompts for a new schema name and renames it.
    pub fn edit_schema(&mut self, id: i64) -> SessionResult {
        if let Some(outcome) = self.refuse_if_read_only("edit_schema") {
            return Ok(outcome);
        }
        let current = match self.workbook.schema(id) {
            Some(schema) => schema.name.clone(),
            None => return Ok(self.reject("edit_schema", StoreError::SchemaNotFound(id))),
        };
        let Some(name) = self.ask_name("Enter new schema name:", &current) else {
            return Ok(Outcome::Cancelled);
        };
        match self.workbook.rename_schema(id, &name) {
            Ok(()) => self.commit("edit_schema", id),
            Err(err) => Ok(self.reject("edit_schema", err)),
        }
    }

    /// Deletes a schema and its tables after confirmation.
    pub fn delete_schema(&mut self, id: i64) -> SessionResult {
        if let Some(outcome) = self.refuse_if_read_only("delete_schema") {
            return Ok(outcome);
        }
        if self.workbook.schema(id).is_none() {
            return Ok(self.reject("delete_schema", StoreError::SchemaNotFound(id)));
        }
        if !self
            .console
            .confirm("Are you sure you want to delete this schema?")
        {
            return Ok(Outcome::Cancelled);
        }
        match self.workbook.delete_schema(id) {
            Ok(_) => self.commit("delete_schema", id),
            Err(err) => Ok(self.reject("delete_schema", err)),
        }
    }

    /// Opens a schema's table page; its first table is loaded.
    pub fn open_schema(&mut self, id: i64) -> SessionResult {
        match self.workbook.select_schema(id) {
            Ok(()) => {
                debug!(schema = id, "opened schema");
                self.refresh();
                Ok(Outcome::Applied)
            }
            Err(err) => Ok(self.reject("open_schema", err)),
        }
    }

    /// Returns to the schema list.
    pub fn show_schema_page(&mut self) -> SessionResult {
        self.workbook.show_schema_list();
        self.refresh();
        Ok(Outcome::Applied)
    }

    // -- tables ---------------------------------------------------------

    /// Creates a table in the open schema, prompting for the header count.
    pub fn create_table(&mut self, name: &str) -> SessionResult {
        if let Some(outcome) = self.refuse_if_read_only("create_table") {
            return Ok(outcome);
        }
        if self.workbook.current_schema().is_none() {
            return Ok(self.reject("create_table", StoreError::NoSchemaSelected));
        }
        if name.trim().is_empty() {
            return Ok(self.reject("create_table", StoreError::EmptyName(EntityKind::Table)));
        }
        let Some(answer) = self.console.prompt("Enter number of headers:", None) else {
            return Ok(Outcome::Cancelled);
        };
        let count = match parse_header_count(&answer) {
            Ok(count) => count,
            Err(err) => return Ok(self.reject("create_table", err)),
        };
        match self.workbook.create_table(name, count) {
            Ok(id) => self.commit("create_table", id),
            Err(err) => Ok(self.reject("create_table", err)),
        }
    }

    /// Prompts for a new table name and renames it.
    pub fn edit_table(&mut self, id: i64) -> SessionResult {
        if let Some(outcome) = self.refuse_if_read_only("edit_table") {
            return Ok(outcome);
        }
        let current = match self.workbook.current_schema().map(|s| s.table(id)) {
            Some(Some(table)) => table.name.clone(),
            Some(None) => return Ok(self.reject("edit_table", StoreError::TableNotFound(id))),
            None => return Ok(self.reject("edit_table", StoreError::NoSchemaSelected)),
        };
        let Some(name) = self.ask_name("Enter new table name:", &current) else {
            return Ok(Outcome::Cancelled);
        };
        match self.workbook.rename_table(id, &name) {
            Ok(()) => self.commit("edit_table", id),
            Err(err) => Ok(self.reject("edit_table", err)),
        }
    }

    /// Deletes a table after confirmation.
    pub fn delete_table(&mut self, id: i64) -> SessionResult {
        if let Some(outcome) = self.refuse_if_read_only("delete_table") {
            return Ok(outcome);
        }
        match self.workbook.current_schema().map(|s| s.table(id).is_some()) {
            Some(true) => {}
            Some(false) => return Ok(self.reject("delete_table", StoreError::TableNotFound(id))),
            None => return Ok(self.reject("delete_table", StoreError::NoSchemaSelected)),
        }
        if !self
            .console
            .confirm("Are you sure you want to delete this table?")
        {
            return Ok(Outcome::Cancelled);
        }
        match self.workbook.delete_table(id) {
            Ok(_) => self.commit("delete_table", id),
            Err(err) => Ok(self.reject("delete_table", err)),
        }
    }

    /// Loads a table of the open schema into the grid.
    pub fn open_table(&mut self, id: i64) -> SessionResult {
        match self.workbook.select_table(id) {
            Ok(()) => {
                self.refresh();
                Ok(Outcome::Applied)
            }
            Err(err) => Ok(self.reject("open_table", err)),
        }
    }

    // -- grid -----------------------------------------------------------

    /// Appends a blank row to the current table.
    pub fn add_row(&mut self) -> SessionResult {
        if let Some(outcome) = self.refuse_if_read_only("add_row") {
            return Ok(outcome);
        }
        match self.workbook.add_row() {
            Ok(row) => self.commit("add_row", row as i64),
            Err(err) => Ok(self.reject("add_row", err)),
        }
    }

    /// Prompts for a header name and appends the column.
    pub fn add_header(&mut self) -> SessionResult {
        if let Some(outcome) = self.refuse_if_read_only("add_header") {
            return Ok(outcome);
        }
        if self.workbook.current_table().is_none() {
            return Ok(self.reject("add_header", StoreError::NoTableSelected));
        }
        let Some(name) = self.console.prompt("Enter new header name:", None) else {
            return Ok(Outcome::Cancelled);
        };
        if name.trim().is_empty() {
            return Ok(Outcome::Cancelled);
        }
        match self.workbook.add_header(&name) {
            Ok(index) => self.commit("add_header", index as i64),
            Err(err) => Ok(self.reject("add_header", err)),
        }
    }

    /// Asks whether to edit or delete the chosen header, then does so.
    pub fn header_click(&mut self, index: usize) -> SessionResult {
        if let Some(outcome) = self.refuse_if_read_only("header_click") {
            return Ok(outcome);
        }
        let header = match self.header_name(index) {
            Ok(header) => header,
            Err(err) => return Ok(self.reject("header_click", err)),
        };
        let answer = self.console.prompt(
            &format!("Choose an action for \"{header}\"\n1. Edit\n2. Delete"),
            None,
        );
        match HeaderAction::parse(answer.as_deref()) {
            HeaderAction::Edit => self.edit_header(index),
            HeaderAction::Delete => self.delete_header(index),
            HeaderAction::Cancel => Ok(Outcome::Cancelled),
        }
    }

    /// Prompts for a new header name and renames the column.
    pub fn edit_header(&mut self, index: usize) -> SessionResult {
        if let Some(outcome) = self.refuse_if_read_only("edit_header") {
            return Ok(outcome);
        }
        let current = match self.header_name(index) {
            Ok(header) => header,
            Err(err) => return Ok(self.reject("edit_header", err)),
        };
        let Some(name) = self.ask_name("Enter new header name:", &current) else {
            return Ok(Outcome::Cancelled);
        };
        match self.workbook.rename_header(index, &name) {
            Ok(()) => self.commit("edit_header", index as i64),
            Err(err) => Ok(self.reject("edit_header", err)),
        }
    }

    /// Deletes a header and its column after confirmation.
    pub fn delete_header(&mut self, index: usize) -> SessionResult {
        if let Some(outcome) = self.refuse_if_read_only("delete_header") {
            return Ok(outcome);
        }
        let header = match self.header_name(index) {
            Ok(header) => header,
            Err(err) => return Ok(self.reject("delete_header", err)),
        };
        if !self
            .console
            .confirm(&format!("Are you sure you want to delete \"{header}\"?"))
        {
            return Ok(Outcome::Cancelled);
        }
        match self.workbook.delete_header(index) {
            Ok(_) => self.commit("delete_header", index as i64),
            Err(err) => Ok(self.reject("delete_header", err)),
        }
    }

    /// Sorts the current table by a column, alternating direction.
    pub fn sort_table(&mut self, index: usize) -> SessionResult {
        if let Some(outcome) = self.refuse_if_read_only("sort_table") {
            return Ok(outcome);
        }
        match self.workbook.sort_table(index) {
            Ok(direction) => {
                debug!(column = index, %direction, "sorted table");
                self.commit("sort_table", index as i64)
            }
            Err(err) => Ok(self.reject("sort_table", err)),
        }
    }

    /// Writes one cell of a table in the open schema.
    pub fn cell_input(
        &mut self,
        table_id: i64,
        row: usize,
        col: usize,
        value: &str,
    ) -> SessionResult {
        if let Some(outcome) = self.refuse_if_read_only("cell_input") {
            return Ok(outcome);
        }
        match self.workbook.set_cell(table_id, row, col, value) {
            Ok(()) => self.commit("cell_input", table_id),
            Err(err) => Ok(self.reject("cell_input", err)),
        }
    }

    /// Writes the whole collection to storage.
    pub fn save(&mut self) -> SessionResult {
        if let Some(outcome) = self.refuse_if_read_only("save") {
            return Ok(outcome);
        }
        self.storage.save(self.workbook.schemas())?;
        Ok(Outcome::Applied)
    }

    // -- helpers --------------------------------------------------------

    fn commit(&mut self, op: &'static str, target: i64) -> SessionResult {
        debug!(op, target, "applied");
        self.storage.save(self.workbook.schemas())?;
        self.refresh();
        Ok(Outcome::Applied)
    }

    fn refuse_if_read_only(&mut self, op: &'static str) -> Option<Outcome> {
        if self.problems.is_empty() {
            return None;
        }
        debug!(op, "refused on read-only collection");
        self.console.alert(&format!(
            "stored data has {} problem(s); changes are disabled",
            self.problems.len()
        ));
        Some(Outcome::Rejected)
    }

    fn reject(&mut self, op: &'static str, err: StoreError) -> Outcome {
        if err.is_validation() {
            debug!(op, error = %err, "input rejected");
        } else {
            warn!(op, error = %err, "operation refused");
        }
        self.console.alert(&err.to_string());
        Outcome::Rejected
    }

    /// Prompts for a replacement name; `None` for cancel or a blank answer.
    fn ask_name(&mut self, message: &str, current: &str) -> Option<String> {
        self.console
            .prompt(message, Some(current))
            .filter(|name| !name.trim().is_empty())
    }

    fn header_name(&self, index: usize) -> Result<String, StoreError> {
        let table = self
            .workbook
            .current_table()
            .ok_or(StoreError::NoTableSelected)?;
        table
            .headers
            .get(index)
            .cloned()
            .ok_or(StoreError::HeaderOutOfRange {
                index,
                len: table.headers.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ScriptedConsole;
    use crate::render::Frame;
    use sheetbook_core::validate_workbook;
    use sheetbook_db::{KeyValueStore, MemoryStore};

    fn session(console: ScriptedConsole) -> Session<ScriptedConsole> {
        Session::open(Storage::new(Box::new(MemoryStore::new())), console).unwrap()
    }

    fn stored(session: &Session<ScriptedConsole>) -> Vec<sheetbook_core::Schema> {
        session.storage().load().unwrap()
    }

    /// Session with schema "Inventory" open and table "Items" (2 headers).
    fn inventory() -> Session<ScriptedConsole> {
        let mut s = session(ScriptedConsole::new().answer("2"));
        s.create_schema("Inventory").unwrap();
        let id = s.workbook().schemas()[0].id;
        s.open_schema(id).unwrap();
        assert_eq!(s.create_table("Items").unwrap(), Outcome::Applied);
        s
    }

    fn table_id(s: &Session<ScriptedConsole>) -> i64 {
        s.workbook().current_table().unwrap().id
    }

    #[test]
    fn test_open_presents_schema_list() {
        let s = session(ScriptedConsole::new());
        assert_eq!(s.console().frames, vec![Frame::SchemaList(vec![])]);
    }

    #[test]
    fn test_open_recovers_from_corrupted_store() {
        let mut store = MemoryStore::new();
        store.set("schemas", "{{{").unwrap();
        let s = Session::open(Storage::new(Box::new(store)), ScriptedConsole::new()).unwrap();
        assert!(s.workbook().schemas().is_empty());
        assert_eq!(s.console().alerts.len(), 1);
        assert!(s.console().alerts[0].contains("schemas.corrupt"));
    }

    const RAGGED: &str = r#"[{"id":1,"name":"S","tables":[{"id":2,"name":"T","headers":["A","B"],"data":[["x"]]}]}]"#;

    fn ragged(console: ScriptedConsole) -> Session<ScriptedConsole> {
        let mut store = MemoryStore::new();
        store.set("schemas", RAGGED).unwrap();
        Session::open(Storage::new(Box::new(store)), console).unwrap()
    }

    #[test]
    fn test_open_inconsistent_store_is_read_only() {
        let mut s = ragged(ScriptedConsole::new().answer("C"));
        assert!(s.is_read_only());
        assert_eq!(s.problems().len(), 1);
        assert_eq!(s.console().alerts.len(), 1);
        assert!(s.console().alerts[0].contains("has 1 cell(s), expected 2"));

        // Navigation still works.
        assert_eq!(s.open_schema(1).unwrap(), Outcome::Applied);
        assert_eq!(table_id(&s), 2);

        assert_eq!(s.add_header().unwrap(), Outcome::Rejected);
        assert_eq!(s.cell_input(2, 0, 1, "y").unwrap(), Outcome::Rejected);
        assert_eq!(s.add_row().unwrap(), Outcome::Rejected);
        assert_eq!(s.create_schema("New").unwrap(), Outcome::Rejected);
        assert_eq!(s.save().unwrap(), Outcome::Rejected);
        assert!(s.console().prompts.is_empty());
        assert_eq!(s.console().alerts.len(), 6);

        assert_eq!(s.storage().store().get("schemas").unwrap().as_deref(), Some(RAGGED));
        assert_eq!(s.workbook().current_table().unwrap().headers, vec!["A", "B"]);
    }

    #[test]
    fn test_open_consistent_store_is_writable() {
        let s = inventory();
        assert!(!s.is_read_only());
        assert!(s.problems().is_empty());
    }

    #[test]
    fn test_create_schema_persists_and_renders() {
        let mut s = session(ScriptedConsole::new());
        assert_eq!(s.create_schema("Inventory").unwrap(), Outcome::Applied);
        assert_eq!(stored(&s).len(), 1);
        match s.console().last_frame().unwrap() {
            Frame::SchemaList(cards) => assert_eq!(cards[0].name, "Inventory"),
            other => panic!("unexpected frame {other:?}"),
        }
    }

    #[test]
    fn test_create_schema_empty_name_alerts() {
        let mut s = session(ScriptedConsole::new());
        assert_eq!(s.create_schema("").unwrap(), Outcome::Rejected);
        assert_eq!(s.console().alerts, vec!["please enter a schema name"]);
        assert!(s.storage().store().get("schemas").unwrap().is_none());
    }

    #[test]
    fn test_edit_schema_cancel_and_blank_are_noops() {
        let mut s = session(ScriptedConsole::new().cancel().answer("  ").answer("Renamed"));
        s.create_schema("Original").unwrap();
        let id = s.workbook().schemas()[0].id;
        assert_eq!(s.edit_schema(id).unwrap(), Outcome::Cancelled);
        assert_eq!(s.edit_schema(id).unwrap(), Outcome::Cancelled);
        assert_eq!(stored(&s)[0].name, "Original");
        assert_eq!(s.edit_schema(id).unwrap(), Outcome::Applied);
        assert_eq!(stored(&s)[0].name, "Renamed");
        assert!(s.console().alerts.is_empty());
    }

    #[test]
    fn test_delete_schema_requires_confirmation() {
        let mut s = inventory();
        let id = s.workbook().current_schema_id().unwrap();
        s.console_mut().push_confirmation(false);
        assert_eq!(s.delete_schema(id).unwrap(), Outcome::Cancelled);
        assert_eq!(stored(&s).len(), 1);

        s.console_mut().push_confirmation(true);
        assert_eq!(s.delete_schema(id).unwrap(), Outcome::Applied);
        assert!(stored(&s).is_empty());
        assert_eq!(s.workbook().current_schema_id(), None);
        assert!(matches!(s.console().last_frame(), Some(Frame::SchemaList(_))));
        assert!(validate_workbook(s.workbook()).is_empty());
    }

    #[test]
    fn test_inventory_scenario_survives_reopen() {
        let mut s = inventory();
        let table = table_id(&s);
        s.add_row().unwrap();
        s.cell_input(table, 0, 0, "Widget").unwrap();

        let schemas = stored(&s);
        let items = &schemas[0].tables[0];
        assert_eq!(items.headers, vec!["Header 1", "Header 2"]);
        assert_eq!(items.data, vec![vec!["Widget", ""]]);
    }

    #[test]
    fn test_create_table_invalid_count_alerts() {
        let mut s = session(ScriptedConsole::new().answer("many"));
        s.create_schema("S").unwrap();
        let id = s.workbook().schemas()[0].id;
        s.open_schema(id).unwrap();
        assert_eq!(s.create_table("T").unwrap(), Outcome::Rejected);
        assert_eq!(s.console().alerts, vec!["invalid number of headers: 'many'"]);
        assert!(s.workbook().current_schema().unwrap().tables.is_empty());
    }

    #[test]
    fn test_create_table_without_name_does_not_prompt() {
        let mut s = session(ScriptedConsole::new());
        s.create_schema("S").unwrap();
        let id = s.workbook().schemas()[0].id;
        s.open_schema(id).unwrap();
        assert_eq!(s.create_table(" ").unwrap(), Outcome::Rejected);
        assert!(s.console().prompts.is_empty());
    }

    #[test]
    fn test_create_table_cancelled_count() {
        let mut s = session(ScriptedConsole::new().cancel());
        s.create_schema("S").unwrap();
        let id = s.workbook().schemas()[0].id;
        s.open_schema(id).unwrap();
        assert_eq!(s.create_table("T").unwrap(), Outcome::Cancelled);
        assert!(s.console().alerts.is_empty());
    }

    #[test]
    fn test_create_table_without_schema_alerts() {
        let mut s = session(ScriptedConsole::new());
        assert_eq!(s.create_table("T").unwrap(), Outcome::Rejected);
        assert_eq!(s.console().alerts, vec!["no schema selected"]);
    }

    #[test]
    fn test_delete_current_table_loads_next() {
        let mut s = inventory();
        let first = table_id(&s);
        s.console_mut().push_answer("1");
        s.create_table("Second").unwrap();
        let second = table_id(&s);
        assert_ne!(first, second);

        s.console_mut().push_confirmation(true);
        assert_eq!(s.delete_table(second).unwrap(), Outcome::Applied);
        assert_eq!(table_id(&s), first);
        assert_eq!(stored(&s)[0].tables.len(), 1);
    }

    #[test]
    fn test_edit_table_renames() {
        let mut s = inventory();
        let table = table_id(&s);
        s.console_mut().push_answer("Products");
        assert_eq!(s.edit_table(table).unwrap(), Outcome::Applied);
        assert_eq!(stored(&s)[0].tables[0].name, "Products");
        assert_eq!(s.edit_table(table + 1).unwrap(), Outcome::Rejected);
    }

    #[test]
    fn test_add_header_prompts_and_extends_rows() {
        let mut s = inventory();
        s.add_row().unwrap();
        s.console_mut().push_answer("Price");
        assert_eq!(s.add_header().unwrap(), Outcome::Applied);
        let schemas = stored(&s);
        let table = &schemas[0].tables[0];
        assert_eq!(table.headers, vec!["Header 1", "Header 2", "Price"]);
        assert_eq!(table.data, vec![vec!["", "", ""]]);

        // Blank name is a silent no-op.
        s.console_mut().push_answer("");
        assert_eq!(s.add_header().unwrap(), Outcome::Cancelled);
    }

    #[test]
    fn test_header_click_edit() {
        let mut s = inventory();
        s.console_mut().push_answer("1");
        s.console_mut().push_answer("Name");
        assert_eq!(s.header_click(0).unwrap(), Outcome::Applied);
        assert_eq!(stored(&s)[0].tables[0].headers[0], "Name");
        assert!(s.console().prompts.iter().any(|p| p.contains("\"Header 1\"")));
    }

    #[test]
    fn test_header_click_delete() {
        let mut s = inventory();
        let table = table_id(&s);
        s.add_row().unwrap();
        s.cell_input(table, 0, 0, "x").unwrap();
        s.cell_input(table, 0, 1, "y").unwrap();
        s.console_mut().push_answer("2");
        s.console_mut().push_confirmation(true);
        assert_eq!(s.header_click(0).unwrap(), Outcome::Applied);
        let schemas = stored(&s);
        let stored_table = &schemas[0].tables[0];
        assert_eq!(stored_table.headers, vec!["Header 2"]);
        assert_eq!(stored_table.data, vec![vec!["y"]]);
    }

    #[test]
    fn test_header_click_other_answer_cancels() {
        let mut s = inventory();
        s.console_mut().push_answer("3");
        assert_eq!(s.header_click(1).unwrap(), Outcome::Cancelled);
        assert_eq!(s.header_click(9).unwrap(), Outcome::Rejected);
    }

    #[test]
    fn test_sort_persists_order() {
        let mut s = inventory();
        let table = table_id(&s);
        for (i, v) in ["b", "a", "c"].iter().enumerate() {
            s.add_row().unwrap();
            s.cell_input(table, i, 0, v).unwrap();
        }
        s.sort_table(0).unwrap();
        assert_eq!(stored(&s)[0].tables[0].column(0), vec!["a", "b", "c"]);
        s.sort_table(0).unwrap();
        assert_eq!(stored(&s)[0].tables[0].column(0), vec!["c", "b", "a"]);
    }

    #[test]
    fn test_cell_out_of_range_alerts_without_saving() {
        let mut s = inventory();
        let table = table_id(&s);
        let before = s.storage().store().get("schemas").unwrap();
        assert_eq!(s.cell_input(table, 4, 0, "x").unwrap(), Outcome::Rejected);
        assert_eq!(s.storage().store().get("schemas").unwrap(), before);
        assert_eq!(s.console().alerts.len(), 1);
    }

    #[test]
    fn test_grid_operations_need_a_table() {
        let mut s = session(ScriptedConsole::new());
        assert_eq!(s.add_row().unwrap(), Outcome::Rejected);
        assert_eq!(s.add_header().unwrap(), Outcome::Rejected);
        assert_eq!(s.sort_table(0).unwrap(), Outcome::Rejected);
        assert!(s.console().prompts.is_empty());
    }
}
