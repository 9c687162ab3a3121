use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use sheetbook_cli::backend::open_storage;
use sheetbook_cli::render::{OutputFormat, format_schema_list, format_table, schema_list};
use sheetbook_cli::{Session, TerminalConsole, shell};
use sheetbook_core::{Workbook, parse_header_count, validate_schemas, validate_workbook};
use sheetbook_db::{AppConfig, Backend, Storage, StorageConfig};
use sheetbook_sqlite::Migration;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// CLI-specific backend enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliBackend {
    File,
    Sqlite,
    Memory,
}

impl From<CliBackend> for Backend {
    fn from(backend: CliBackend) -> Self {
        match backend {
            CliBackend::File => Self::File,
            CliBackend::Sqlite => Self::Sqlite,
            CliBackend::Memory => Self::Memory,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "sheetbook")]
#[command(about = "Manage schemas of spreadsheet-like tables from the terminal")]
#[command(version)]
struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Data file or database path (overrides the configuration).
    #[arg(long, global = true)]
    data: Option<PathBuf>,
    /// Storage backend (overrides the configuration).
    #[arg(long, global = true)]
    backend: Option<CliBackend>,
    /// Key the document is stored under (overrides the configuration).
    #[arg(long, global = true)]
    key: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Start an interactive session.
    Shell,
    /// List, create, rename or delete schemas.
    Schema(SchemaArgs),
    /// List, create, rename or delete tables of a schema.
    Table(TableArgs),
    /// Add rows to a table.
    Row(RowArgs),
    /// Add, rename or delete table headers.
    Header(HeaderArgs),
    /// Write table cells.
    Cell(CellArgs),
    /// Sort a table by a column, alternating ascending and descending.
    Sort(SortArgs),
    /// Print a table.
    Show(ShowArgs),
    /// Check the stored document for structural problems.
    Check,
    /// SQLite backend table lifecycle.
    Migrate(MigrateArgs),
}

/// Selects a schema and, optionally, one of its tables.
#[derive(Debug, Args)]
struct TableTarget {
    /// Schema id.
    #[arg(long)]
    schema: i64,
    /// Table id (default: the schema's first table).
    #[arg(long)]
    table: Option<i64>,
}

#[derive(Debug, Args)]
struct SchemaArgs {
    #[command(subcommand)]
    operation: SchemaOperation,
}

#[derive(Debug, Subcommand)]
enum SchemaOperation {
    /// List all schemas.
    List {
        /// Output format.
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Create a schema.
    Create {
        /// Schema name.
        name: String,
    },
    /// Rename a schema.
    Rename {
        /// Schema id.
        id: i64,
        /// New name.
        name: String,
    },
    /// Delete a schema and all of its tables.
    Delete {
        /// Schema id.
        id: i64,
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
struct TableArgs {
    #[command(subcommand)]
    operation: TableOperation,
}

#[derive(Debug, Subcommand)]
enum TableOperation {
    /// List the tables of a schema.
    List {
        /// Schema id.
        #[arg(long)]
        schema: i64,
    },
    /// Create a table with generated headers.
    Create {
        /// Schema id.
        #[arg(long)]
        schema: i64,
        /// Table name.
        name: String,
        /// Number of headers to generate.
        #[arg(long, default_value = "0")]
        headers: String,
    },
    /// Rename a table.
    Rename {
        /// Schema id.
        #[arg(long)]
        schema: i64,
        /// Table id.
        id: i64,
        /// New name.
        name: String,
    },
    /// Delete a table and its rows.
    Delete {
        /// Schema id.
        #[arg(long)]
        schema: i64,
        /// Table id.
        id: i64,
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
struct RowArgs {
    #[command(subcommand)]
    operation: RowOperation,
}

#[derive(Debug, Subcommand)]
enum RowOperation {
    /// Append empty rows.
    Add {
        #[command(flatten)]
        target: TableTarget,
        /// Number of rows to append.
        #[arg(long, default_value_t = 1)]
        count: usize,
    },
}

#[derive(Debug, Args)]
struct HeaderArgs {
    #[command(subcommand)]
    operation: HeaderOperation,
}

#[derive(Debug, Subcommand)]
enum HeaderOperation {
    /// Append a header; existing rows get an empty cell.
    Add {
        #[command(flatten)]
        target: TableTarget,
        /// Header name.
        name: String,
    },
    /// Rename a header.
    Rename {
        #[command(flatten)]
        target: TableTarget,
        /// Header number, starting at 1.
        index: usize,
        /// New name.
        name: String,
    },
    /// Delete a header and its column.
    Delete {
        #[command(flatten)]
        target: TableTarget,
        /// Header number, starting at 1.
        index: usize,
        /// Confirm the deletion.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Args)]
struct CellArgs {
    #[command(subcommand)]
    operation: CellOperation,
}

#[derive(Debug, Subcommand)]
enum CellOperation {
    /// Write one cell.
    Set {
        #[command(flatten)]
        target: TableTarget,
        /// Row number, starting at 1.
        row: usize,
        /// Column number, starting at 1.
        col: usize,
        /// New cell value.
        value: String,
    },
}

#[derive(Debug, Args)]
struct SortArgs {
    #[command(flatten)]
    target: TableTarget,
    /// Column number, starting at 1.
    column: usize,
}

#[derive(Debug, Args)]
struct ShowArgs {
    #[command(flatten)]
    target: TableTarget,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: OutputFormat,
}

#[derive(Debug, Args)]
struct MigrateArgs {
    #[command(subcommand)]
    operation: MigrateOperation,
}

#[derive(Debug, Subcommand)]
enum MigrateOperation {
    /// Create the key-value table in the database.
    Up,
    /// Drop the key-value table from the database.
    Down {
        /// Confirm dropping all stored data.
        #[arg(long)]
        yes: bool,
    },
    /// Show table status.
    Status,
}

fn main() {
    let cli = Cli::parse();

    let result = resolve_config(&cli).and_then(|config| {
        init_tracing(&config.log.filter);
        run(cli.command, &config.storage)
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(command: Command, storage: &StorageConfig) -> Result<(), String> {
    match command {
        Command::Shell => run_shell(storage),
        Command::Schema(args) => run_schema(args, storage),
        Command::Table(args) => run_table(args, storage),
        Command::Row(args) => run_row(args, storage),
        Command::Header(args) => run_header(args, storage),
        Command::Cell(args) => run_cell(args, storage),
        Command::Sort(args) => run_sort(args, storage),
        Command::Show(args) => run_show(args, storage),
        Command::Check => run_check(storage),
        Command::Migrate(args) => run_migrate(args, storage),
    }
}

/// Loads the configuration file (if any) and applies command-line overrides.
fn resolve_config(cli: &Cli) -> Result<AppConfig, String> {
    let mut config = match &cli.config {
        Some(path) => AppConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?,
        None => AppConfig::default(),
    };
    if let Some(data) = &cli.data {
        config.storage.path = data.clone();
    }
    if let Some(backend) = cli.backend {
        config.storage.backend = backend.into();
    }
    if let Some(key) = &cli.key {
        config.storage.key = key.clone();
    }
    Ok(config)
}

/// Installs a stderr subscriber. `RUST_LOG` takes precedence over the
/// configured filter.
fn init_tracing(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();
    let _ = tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .try_init();
}

// ---------------------------------------------------------------------------
// shell command
// ---------------------------------------------------------------------------

fn run_shell(config: &StorageConfig) -> Result<(), String> {
    let storage = open_storage(config)?;
    let mut session =
        Session::open(storage, TerminalConsole::stdio()).map_err(|e| e.to_string())?;
    println!("Type 'help' for commands.");
    shell::run(&mut session).map_err(|e| format!("Failed to save: {e}"))
}

// ---------------------------------------------------------------------------
// one-shot commands
// ---------------------------------------------------------------------------

/// Loads the stored collection. A malformed document is an error here; the
/// shell is the place to recover from it.
fn load(config: &StorageConfig) -> Result<(Storage, Workbook), String> {
    let storage = open_storage(config)?;
    let schemas = storage
        .load()
        .map_err(|e| format!("Failed to load '{}': {e}", storage.store().describe()))?;
    Ok((storage, Workbook::from_schemas(schemas)))
}

/// Like [`load`], but refuses a document that breaks the structural
/// invariants. Commands that write back go through here.
fn load_for_update(config: &StorageConfig) -> Result<(Storage, Workbook), String> {
    let (storage, workbook) = load(config)?;
    let problems = validate_schemas(workbook.schemas());
    if let Some(first) = problems.first() {
        return Err(format!(
            "'{}' has {} problem(s), first: {first}; run 'sheetbook check' for details",
            storage.store().describe(),
            problems.len()
        ));
    }
    Ok((storage, workbook))
}

fn save(storage: &mut Storage, workbook: &Workbook) -> Result<(), String> {
    storage
        .save(workbook.schemas())
        .map_err(|e| format!("Failed to save: {e}"))
}

/// Selects the target schema and table.
fn select(workbook: &mut Workbook, target: &TableTarget) -> Result<i64, String> {
    workbook
        .select_schema(target.schema)
        .map_err(|e| e.to_string())?;
    if let Some(table) = target.table {
        workbook.select_table(table).map_err(|e| e.to_string())?;
    }
    workbook
        .current_table()
        .map(|t| t.id)
        .ok_or_else(|| format!("schema {} has no tables", target.schema))
}

/// Converts a 1-based position from the command line.
fn position(n: usize, what: &str) -> Result<usize, String> {
    n.checked_sub(1)
        .ok_or_else(|| format!("{what} numbers start at 1"))
}

fn require_yes(yes: bool, what: &str) -> Result<(), String> {
    if yes {
        Ok(())
    } else {
        Err(format!("refusing to delete {what} without --yes"))
    }
}

fn run_schema(args: SchemaArgs, config: &StorageConfig) -> Result<(), String> {
    if let SchemaOperation::List { format } = args.operation {
        let (_, workbook) = load(config)?;
        print!("{}", format_schema_list(&schema_list(&workbook), format)?);
        return Ok(());
    }
    let (mut storage, mut workbook) = load_for_update(config)?;
    match args.operation {
        SchemaOperation::List { .. } => {}
        SchemaOperation::Create { name } => {
            let id = workbook.create_schema(&name).map_err(|e| e.to_string())?;
            save(&mut storage, &workbook)?;
            println!("Created schema '{}' ({id}).", name.trim());
        }
        SchemaOperation::Rename { id, name } => {
            workbook
                .rename_schema(id, &name)
                .map_err(|e| e.to_string())?;
            save(&mut storage, &workbook)?;
            println!("Renamed schema {id} to '{}'.", name.trim());
        }
        SchemaOperation::Delete { id, yes } => {
            require_yes(yes, "a schema")?;
            let removed = workbook.delete_schema(id).map_err(|e| e.to_string())?;
            save(&mut storage, &workbook)?;
            println!(
                "Deleted schema '{}' and {} table(s).",
                removed.name,
                removed.table_count()
            );
        }
    }
    Ok(())
}

fn run_table(args: TableArgs, config: &StorageConfig) -> Result<(), String> {
    if let TableOperation::List { schema } = args.operation {
        let (_, workbook) = load(config)?;
        let schema = workbook
            .schema(schema)
            .ok_or_else(|| format!("schema not found: {schema}"))?;
        for table in &schema.tables {
            println!(
                "{}\t{}\t{} header(s), {} row(s)",
                table.id,
                table.name,
                table.column_count(),
                table.row_count()
            );
        }
        return Ok(());
    }
    let (mut storage, mut workbook) = load_for_update(config)?;
    match args.operation {
        TableOperation::List { .. } => {}
        TableOperation::Create {
            schema,
            name,
            headers,
        } => {
            workbook.select_schema(schema).map_err(|e| e.to_string())?;
            let count = parse_header_count(&headers).map_err(|e| e.to_string())?;
            let id = workbook
                .create_table(&name, count)
                .map_err(|e| e.to_string())?;
            save(&mut storage, &workbook)?;
            println!("Created table '{}' ({id}) with {count} header(s).", name.trim());
        }
        TableOperation::Rename { schema, id, name } => {
            workbook.select_schema(schema).map_err(|e| e.to_string())?;
            workbook
                .rename_table(id, &name)
                .map_err(|e| e.to_string())?;
            save(&mut storage, &workbook)?;
            println!("Renamed table {id} to '{}'.", name.trim());
        }
        TableOperation::Delete { schema, id, yes } => {
            require_yes(yes, "a table")?;
            workbook.select_schema(schema).map_err(|e| e.to_string())?;
            let removed = workbook.delete_table(id).map_err(|e| e.to_string())?;
            save(&mut storage, &workbook)?;
            println!(
                "Deleted table '{}' and {} row(s).",
                removed.name,
                removed.row_count()
            );
        }
    }
    Ok(())
}

fn run_row(args: RowArgs, config: &StorageConfig) -> Result<(), String> {
    let RowOperation::Add { target, count } = args.operation;
    let (mut storage, mut workbook) = load_for_update(config)?;
    select(&mut workbook, &target)?;
    for _ in 0..count {
        workbook.add_row().map_err(|e| e.to_string())?;
    }
    save(&mut storage, &workbook)?;
    println!("Added {count} row(s).");
    Ok(())
}

fn run_header(args: HeaderArgs, config: &StorageConfig) -> Result<(), String> {
    let (mut storage, mut workbook) = load_for_update(config)?;
    match args.operation {
        HeaderOperation::Add { target, name } => {
            select(&mut workbook, &target)?;
            let index = workbook.add_header(&name).map_err(|e| e.to_string())?;
            save(&mut storage, &workbook)?;
            println!("Added header {} '{}'.", index + 1, name.trim());
        }
        HeaderOperation::Rename {
            target,
            index,
            name,
        } => {
            select(&mut workbook, &target)?;
            workbook
                .rename_header(position(index, "header")?, &name)
                .map_err(|e| e.to_string())?;
            save(&mut storage, &workbook)?;
            println!("Renamed header {index} to '{}'.", name.trim());
        }
        HeaderOperation::Delete { target, index, yes } => {
            require_yes(yes, "a header")?;
            select(&mut workbook, &target)?;
            let removed = workbook
                .delete_header(position(index, "header")?)
                .map_err(|e| e.to_string())?;
            save(&mut storage, &workbook)?;
            println!("Deleted header '{removed}'.");
        }
    }
    Ok(())
}

fn run_cell(args: CellArgs, config: &StorageConfig) -> Result<(), String> {
    let CellOperation::Set {
        target,
        row,
        col,
        value,
    } = args.operation;
    let (mut storage, mut workbook) = load_for_update(config)?;
    let table = select(&mut workbook, &target)?;
    workbook
        .set_cell(
            table,
            position(row, "row")?,
            position(col, "column")?,
            value,
        )
        .map_err(|e| e.to_string())?;
    save(&mut storage, &workbook)?;
    println!("Set row {row}, column {col}.");
    Ok(())
}

fn run_sort(args: SortArgs, config: &StorageConfig) -> Result<(), String> {
    let (mut storage, mut workbook) = load_for_update(config)?;
    select(&mut workbook, &args.target)?;
    let direction = workbook
        .sort_table(position(args.column, "column")?)
        .map_err(|e| e.to_string())?;
    save(&mut storage, &workbook)?;
    println!("Sorted by column {} ({direction}).", args.column);
    Ok(())
}

fn run_show(args: ShowArgs, config: &StorageConfig) -> Result<(), String> {
    let (_, mut workbook) = load(config)?;
    select(&mut workbook, &args.target)?;
    let table = workbook
        .current_table()
        .ok_or_else(|| "no table selected".to_string())?;
    print!("{}", format_table(table, args.format)?);
    Ok(())
}

fn run_check(config: &StorageConfig) -> Result<(), String> {
    let (storage, workbook) = load(config)?;
    let problems = validate_workbook(&workbook);
    if problems.is_empty() {
        let tables: usize = workbook.schemas().iter().map(|s| s.table_count()).sum();
        println!(
            "'{}' is consistent: {} schema(s), {tables} table(s).",
            storage.store().describe(),
            workbook.schemas().len()
        );
        return Ok(());
    }
    for problem in &problems {
        eprintln!("  {problem}");
    }
    Err(format!("{} problem(s) found", problems.len()))
}

// ---------------------------------------------------------------------------
// migrate command
// ---------------------------------------------------------------------------

fn run_migrate(args: MigrateArgs, config: &StorageConfig) -> Result<(), String> {
    if config.backend != Backend::Sqlite {
        return Err("migrate requires the sqlite backend (--backend sqlite)".to_string());
    }
    let conn = rusqlite::Connection::open(&config.path)
        .map_err(|e| format!("Failed to open database '{}': {e}", config.path.display()))?;
    let mut migration = Migration::new(conn, config.table_prefix.as_str())
        .map_err(|e| format!("Failed to initialize migration: {e}"))?;

    match args.operation {
        MigrateOperation::Up => {
            migration
                .up()
                .map_err(|e| format!("Migration up failed: {e}"))?;
            println!(
                "Migration up complete. Table created with prefix '{}' in '{}'.",
                config.table_prefix,
                config.path.display()
            );
        }
        MigrateOperation::Down { yes } => {
            require_yes(yes, "the stored data")?;
            migration
                .down()
                .map_err(|e| format!("Migration down failed: {e}"))?;
            println!(
                "Migration down complete. Table with prefix '{}' dropped from '{}'.",
                config.table_prefix,
                config.path.display()
            );
        }
        MigrateOperation::Status => {
            let status = migration
                .status()
                .map_err(|e| format!("Failed to get migration status: {e}"))?;
            println!("Migration Status:");
            println!(
                "  Table exists: {}",
                if status.tables_exist { "yes" } else { "no" }
            );
            println!("  Entry count: {}", status.entry_count);
            println!("  Total bytes: {}", status.total_bytes);
            println!(
                "  Last updated: {}",
                status.last_updated.as_deref().unwrap_or("never")
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_is_one_based() {
        assert_eq!(position(1, "row").unwrap(), 0);
        assert!(position(0, "row").is_err());
    }

    #[test]
    fn test_overrides_apply_to_default_config() {
        let cli = Cli::parse_from([
            "sheetbook",
            "--backend",
            "memory",
            "--key",
            "other",
            "check",
        ]);
        let config = resolve_config(&cli).unwrap();
        assert_eq!(config.storage.backend, Backend::Memory);
        assert_eq!(config.storage.key, "other");
        assert_eq!(config.storage.path, PathBuf::from("sheetbook.json"));
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::parse_from(["sheetbook", "schema", "list", "--data", "x.json"]);
        assert_eq!(cli.data, Some(PathBuf::from("x.json")));
    }

    #[test]
    fn test_missing_config_file_is_an_error() {
        let cli = Cli::parse_from(["sheetbook", "--config", "/nonexistent/sheetbook.yaml", "check"]);
        assert!(resolve_config(&cli).unwrap_err().contains("Failed to load config"));
    }
}
