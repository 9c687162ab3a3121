//! Interactive line-oriented shell over a [`Session`].
//!
//! Each line is one command. Rows, columns and headers are numbered from 1
//! as shown in the grid; schema and table ids are the numbers shown next to
//! their names.

use sheetbook_db::DatabaseError;
use tracing::debug;

use crate::console::Console;
use crate::session::{Outcome, Session};

/// A parsed shell command. Indices are 0-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Schemas,
    NewSchema(String),
    RenameSchema(i64),
    DeleteSchema(i64),
    Open(i64),
    Back,
    NewTable(String),
    Table(i64),
    RenameTable(Option<i64>),
    DeleteTable(Option<i64>),
    AddRow,
    AddHeader,
    Header(usize),
    Sort(usize),
    Set { row: usize, col: usize, value: String },
    Save,
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  schemas                    list schemas
  new-schema <name>          create a schema
  rename-schema <id>         rename a schema
  delete-schema <id>         delete a schema and its tables
  open <id>                  open a schema's tables
  back                       return to the schema list
  new-table <name>           create a table in the open schema
  table <id>                 switch to a table
  rename-table [id]          rename a table (default: current)
  delete-table [id]          delete a table (default: current)
  add-row                    append an empty row
  add-header                 append a column
  header <n>                 edit or delete header n
  sort <n>                   sort by column n (alternates asc/desc)
  set <row> <col> <value>    write a cell
  save                       write everything to storage
  show                       redraw the current page
  help                       show this help
  quit                       leave the shell";

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<ShellCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    let command = match word {
        "schemas" | "ls" => ShellCommand::Schemas,
        "new-schema" => ShellCommand::NewSchema(rest.to_string()),
        "rename-schema" => ShellCommand::RenameSchema(parse_id(rest)?),
        "delete-schema" => ShellCommand::DeleteSchema(parse_id(rest)?),
        "open" => ShellCommand::Open(parse_id(rest)?),
        "back" => ShellCommand::Back,
        "new-table" => ShellCommand::NewTable(rest.to_string()),
        "table" => ShellCommand::Table(parse_id(rest)?),
        "rename-table" => ShellCommand::RenameTable(parse_optional_id(rest)?),
        "delete-table" => ShellCommand::DeleteTable(parse_optional_id(rest)?),
        "add-row" => ShellCommand::AddRow,
        "add-header" => ShellCommand::AddHeader,
        "header" => ShellCommand::Header(parse_position(rest, "header")?),
        "sort" => ShellCommand::Sort(parse_position(rest, "column")?),
        "set" => {
            let mut parts = rest.splitn(3, char::is_whitespace);
            let row = parse_position(parts.next().unwrap_or(""), "row")?;
            let col = parse_position(parts.next().unwrap_or(""), "column")?;
            let value = parts.next().unwrap_or("").trim_start().to_string();
            ShellCommand::Set { row, col, value }
        }
        "save" => ShellCommand::Save,
        "show" => ShellCommand::Show,
        "help" | "?" => ShellCommand::Help,
        "quit" | "exit" => ShellCommand::Quit,
        other => return Err(format!("unknown command '{other}' (try 'help')")),
    };
    Ok(Some(command))
}

fn parse_id(raw: &str) -> Result<i64, String> {
    raw.trim()
        .parse()
        .map_err(|_| format!("expected an id, got '{}'", raw.trim()))
}

fn parse_optional_id(raw: &str) -> Result<Option<i64>, String> {
    if raw.trim().is_empty() {
        Ok(None)
    } else {
        parse_id(raw).map(Some)
    }
}

/// Parses a 1-based position and returns it 0-based.
fn parse_position(raw: &str, what: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(n) if n >= 1 => Ok(n - 1),
        _ => Err(format!(
            "expected a {what} number starting at 1, got '{}'",
            raw.trim()
        )),
    }
}

/// Runs commands read from the session's console until `quit` or end of
/// input.
///
/// # Errors
///
/// Stops at the first storage failure.
pub fn run<C: Console>(session: &mut Session<C>) -> Result<(), DatabaseError> {
    loop {
        let Some(line) = session.console_mut().prompt("sheetbook>", None) else {
            return Ok(());
        };
        let command = match parse_command(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(message) => {
                session.console_mut().alert(&message);
                continue;
            }
        };
        debug!(?command, "shell command");
        if command == ShellCommand::Quit {
            return Ok(());
        }
        dispatch(session, command)?;
    }
}

/// Applies one parsed command to the session.
pub fn dispatch<C: Console>(
    session: &mut Session<C>,
    command: ShellCommand,
) -> Result<(), DatabaseError> {
    match command {
        ShellCommand::Schemas => {
            session.show_schema_page()?;
        }
        ShellCommand::NewSchema(name) => {
            session.create_schema(&name)?;
        }
        ShellCommand::RenameSchema(id) => {
            session.edit_schema(id)?;
        }
        ShellCommand::DeleteSchema(id) => {
            session.delete_schema(id)?;
        }
        ShellCommand::Open(id) => {
            session.open_schema(id)?;
        }
        ShellCommand::Back => {
            session.show_schema_page()?;
        }
        ShellCommand::NewTable(name) => {
            session.create_table(&name)?;
        }
        ShellCommand::Table(id) => {
            session.open_table(id)?;
        }
        ShellCommand::RenameTable(id) => match id.or_else(|| current_table(session)) {
            Some(id) => {
                session.edit_table(id)?;
            }
            None => session.console_mut().alert("no table selected"),
        },
        ShellCommand::DeleteTable(id) => match id.or_else(|| current_table(session)) {
            Some(id) => {
                session.delete_table(id)?;
            }
            None => session.console_mut().alert("no table selected"),
        },
        ShellCommand::AddRow => {
            session.add_row()?;
        }
        ShellCommand::AddHeader => {
            session.add_header()?;
        }
        ShellCommand::Header(index) => {
            session.header_click(index)?;
        }
        ShellCommand::Sort(index) => {
            session.sort_table(index)?;
        }
        ShellCommand::Set { row, col, value } => match current_table(session) {
            Some(table) => {
                session.cell_input(table, row, col, &value)?;
            }
            None => session.console_mut().alert("no table selected"),
        },
        ShellCommand::Save => {
            if session.save()? == Outcome::Applied {
                session.console_mut().notice("saved");
            }
        }
        ShellCommand::Show => session.refresh(),
        ShellCommand::Help => session.console_mut().notice(HELP),
        ShellCommand::Quit => {}
    }
    Ok(())
}

fn current_table<C: Console>(session: &Session<C>) -> Option<i64> {
    session.workbook().current_table().map(|t| t.id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::ScriptedConsole;
    use crate::render::Frame;
    use sheetbook_db::{MemoryStore, Storage};

    fn parse(line: &str) -> ShellCommand {
        parse_command(line).unwrap().unwrap()
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse("schemas"), ShellCommand::Schemas);
        assert_eq!(parse("  add-row  "), ShellCommand::AddRow);
        assert_eq!(parse("quit"), ShellCommand::Quit);
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn test_parse_names_keep_spaces() {
        assert_eq!(
            parse("new-schema  Stock  Room"),
            ShellCommand::NewSchema("Stock  Room".to_string())
        );
        assert_eq!(parse("new-table"), ShellCommand::NewTable(String::new()));
    }

    #[test]
    fn test_parse_positions_are_one_based() {
        assert_eq!(parse("sort 1"), ShellCommand::Sort(0));
        assert_eq!(parse("header 3"), ShellCommand::Header(2));
        assert!(parse_command("sort 0").is_err());
        assert!(parse_command("sort x").is_err());
    }

    #[test]
    fn test_parse_set_keeps_value_text() {
        assert_eq!(
            parse("set 2 1 Blue  widget"),
            ShellCommand::Set {
                row: 1,
                col: 0,
                value: "Blue  widget".to_string()
            }
        );
        assert_eq!(
            parse("set 1 1"),
            ShellCommand::Set {
                row: 0,
                col: 0,
                value: String::new()
            }
        );
        assert!(parse_command("set 1").is_err());
    }

    #[test]
    fn test_parse_optional_ids() {
        assert_eq!(parse("rename-table"), ShellCommand::RenameTable(None));
        assert_eq!(parse("delete-table 42"), ShellCommand::DeleteTable(Some(42)));
        assert!(parse_command("open").is_err());
    }

    #[test]
    fn test_unknown_command() {
        let err = parse_command("frobnicate").unwrap_err();
        assert!(err.contains("frobnicate"));
    }

    fn run_script(console: ScriptedConsole) -> Session<ScriptedConsole> {
        let mut session = Session::open(Storage::new(Box::new(MemoryStore::new())), console).unwrap();
        run(&mut session).unwrap();
        session
    }

    #[test]
    fn test_run_inventory_script() {
        let mut session = run_script(
            ScriptedConsole::new()
                .answer("new-schema Inventory")
                .answer("ls")
                .answer("quit"),
        );
        assert!(session.console().alerts.is_empty());
        let id = session.workbook().schemas()[0].id;

        for line in [
            format!("open {id}"),
            "new-table Items".to_string(),
            "2".to_string(),
            "add-row".to_string(),
            "set 1 1 Widget".to_string(),
        ] {
            session.console_mut().push_answer(&line);
        }
        run(&mut session).unwrap();

        let stored = session.storage().load().unwrap();
        assert_eq!(stored[0].tables[0].data, vec![vec!["Widget", ""]]);
        match session.console().last_frame() {
            Some(Frame::Tables { grid: Some(grid), .. }) => {
                assert_eq!(grid.headers, vec!["Header 1", "Header 2"]);
            }
            other => panic!("unexpected frame {other:?}"),
        }
    }

    #[test]
    fn test_run_stops_at_end_of_input() {
        let session = run_script(ScriptedConsole::new().answer("help"));
        assert_eq!(session.console().notices, vec![HELP]);
        assert!(session.console().alerts.is_empty());
    }

    #[test]
    fn test_save_reports_with_a_notice() {
        let session = run_script(
            ScriptedConsole::new()
                .answer("new-schema Inventory")
                .answer("save")
                .answer("quit"),
        );
        assert_eq!(session.console().notices, vec!["saved"]);
        assert!(session.console().alerts.is_empty());
        assert_eq!(session.storage().load().unwrap().len(), 1);
    }

    #[test]
    fn test_set_without_table_alerts() {
        let session = run_script(ScriptedConsole::new().answer("set 1 1 x").answer("quit"));
        assert_eq!(session.console().alerts, vec!["no table selected"]);
    }
}
