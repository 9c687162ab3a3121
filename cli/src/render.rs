//! View rendering.
//!
//! Every function here is a pure projection of a [`Workbook`]: view models
//! are rebuilt from scratch after each change and nothing is cached. A
//! [`Frame`] gathers the fragments of the active page and renders them as
//! plain text for the terminal.

use serde::Serialize;
use sheetbook_core::{Page, Table, Workbook};

/// Output formats for printing a table or the schema list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Json,
    Yaml,
    Markdown,
    Table,
}

/// One entry of the schema list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SchemaCard {
    pub id: i64,
    pub name: String,
    pub table_count: usize,
}

/// One option of the table selector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectorOption {
    pub id: i64,
    pub name: String,
    pub selected: bool,
}

/// The editable grid of the current table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridView {
    pub table_id: i64,
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Everything visible for the active page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Schema-list page.
    SchemaList(Vec<SchemaCard>),
    /// Table management page for one schema.
    Tables {
        title: String,
        selector: Vec<SelectorOption>,
        grid: Option<GridView>,
    },
}

/// Cards for every schema, in collection order.
pub fn schema_list(workbook: &Workbook) -> Vec<SchemaCard> {
    workbook
        .schemas()
        .iter()
        .map(|s| SchemaCard {
            id: s.id,
            name: s.name.clone(),
            table_count: s.table_count(),
        })
        .collect()
}

/// Options for the current schema's tables; empty without a schema.
pub fn table_selector(workbook: &Workbook) -> Vec<SelectorOption> {
    let selected = workbook.current_table_id();
    workbook
        .current_schema()
        .map(|schema| {
            schema
                .tables
                .iter()
                .map(|t| SelectorOption {
                    id: t.id,
                    name: t.name.clone(),
                    selected: Some(t.id) == selected,
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Grid for the current table, if one is selected.
pub fn table_grid(workbook: &Workbook) -> Option<GridView> {
    workbook.current_table().map(grid_of)
}

fn grid_of(table: &Table) -> GridView {
    GridView {
        table_id: table.id,
        name: table.name.clone(),
        headers: table.headers.clone(),
        rows: table.data.clone(),
    }
}

/// Builds the frame for the active page.
///
/// The tables page falls back to the schema list when the selected schema
/// no longer resolves.
pub fn render(workbook: &Workbook) -> Frame {
    match (workbook.page(), workbook.current_schema()) {
        (Page::Tables, Some(schema)) => Frame::Tables {
            title: schema.name.clone(),
            selector: table_selector(workbook),
            grid: table_grid(workbook),
        },
        _ => Frame::SchemaList(schema_list(workbook)),
    }
}

impl Frame {
    /// Renders the frame as terminal text.
    pub fn to_text(&self) -> String {
        match self {
            Frame::SchemaList(cards) => schema_list_text(cards),
            Frame::Tables {
                title,
                selector,
                grid,
            } => {
                let mut out = format!("Schema: {title}\n");
                out.push_str(&selector_text(selector));
                match grid {
                    Some(grid) => {
                        out.push('\n');
                        out.push_str(&grid_text(&grid.headers, &grid.rows));
                        out.push_str(CONTROLS);
                    }
                    None => out.push_str("\n(no table selected)\n"),
                }
                out
            }
        }
    }
}

const CONTROLS: &str =
    "\n[add-row] [add-header] [save] [rename-table] [delete-table]  header <n> | sort <n> | set <row> <col> <value>\n";

fn schema_list_text(cards: &[SchemaCard]) -> String {
    let mut out = String::from("Schemas\n");
    if cards.is_empty() {
        out.push_str("  (none yet; create one with: new-schema <name>)\n");
        return out;
    }
    let id_width = cards.iter().map(|c| c.id.to_string().len()).max().unwrap_or(0);
    let name_width = cards.iter().map(|c| width(&c.name)).max().unwrap_or(0);
    for card in cards {
        out.push_str(&format!(
            "  {:>id_width$}  {}  Tables: {}\n",
            card.id,
            pad(&card.name, name_width),
            card.table_count
        ));
    }
    out.push_str("\n[open <id>] [rename-schema <id>] [delete-schema <id>]\n");
    out
}

fn selector_text(options: &[SelectorOption]) -> String {
    if options.is_empty() {
        return "Tables: (none; create one with: new-table <name>)\n".to_string();
    }
    let entries: Vec<String> = options
        .iter()
        .map(|o| {
            let marker = if o.selected { "*" } else { " " };
            format!("{marker}{} ({})", o.name, o.id)
        })
        .collect();
    format!("Tables: {}\n", entries.join("  "))
}

/// Renders headers and rows as an aligned text grid with 1-based row and
/// column numbers.
pub fn grid_text(headers: &[String], rows: &[Vec<String>]) -> String {
    let labels: Vec<String> = headers
        .iter()
        .enumerate()
        .map(|(i, h)| format!("{}:{h}", i + 1))
        .collect();
    let row_width = rows.len().to_string().len().max(1);
    let widths: Vec<usize> = labels
        .iter()
        .enumerate()
        .map(|(col, label)| {
            rows.iter()
                .map(|r| r.get(col).map(|c| width(c)).unwrap_or(0))
                .max()
                .unwrap_or(0)
                .max(width(label))
        })
        .collect();

    let mut out = String::new();
    let header_cells: Vec<String> = labels
        .iter()
        .zip(&widths)
        .map(|(l, w)| pad(l, *w))
        .collect();
    out.push_str(&format!("{:>row_width$} | {}\n", "#", header_cells.join(" | ")));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format!("{}-+-{}\n", "-".repeat(row_width), rule.join("-+-")));
    for (i, row) in rows.iter().enumerate() {
        let cells: Vec<String> = widths
            .iter()
            .enumerate()
            .map(|(col, w)| pad(row.get(col).map(String::as_str).unwrap_or(""), *w))
            .collect();
        out.push_str(&format!("{:>row_width$} | {}\n", i + 1, cells.join(" | ")));
    }
    if rows.is_empty() {
        out.push_str("(no rows)\n");
    }
    out
}

fn width(s: &str) -> usize {
    s.chars().count()
}

fn pad(s: &str, target: usize) -> String {
    let mut out = s.to_string();
    out.extend(std::iter::repeat_n(' ', target.saturating_sub(width(s))));
    out
}

/// Formats a single table in the requested output format.
pub fn format_table(table: &Table, format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(table)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(table).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => Ok(table_to_markdown(table)),
        OutputFormat::Table => Ok(format!(
            "Table: {} ({})\n{}",
            table.name,
            table.id,
            grid_text(&table.headers, &table.data)
        )),
    }
}

/// Formats the schema list in the requested output format.
pub fn format_schema_list(cards: &[SchemaCard], format: OutputFormat) -> Result<String, String> {
    match format {
        OutputFormat::Json => serde_json::to_string_pretty(cards)
            .map_err(|e| format!("JSON serialization failed: {e}")),
        OutputFormat::Yaml => {
            serde_yaml::to_string(cards).map_err(|e| format!("YAML serialization failed: {e}"))
        }
        OutputFormat::Markdown => {
            let mut out = String::from("| Id | Schema | Tables |\n|----|--------|--------|\n");
            for card in cards {
                out.push_str(&format!(
                    "| {} | {} | {} |\n",
                    card.id,
                    escape_markdown(&card.name),
                    card.table_count
                ));
            }
            Ok(out)
        }
        OutputFormat::Table => Ok(schema_list_text(cards)),
    }
}

fn table_to_markdown(table: &Table) -> String {
    let mut out = format!("## {}\n\n", table.name);
    if table.headers.is_empty() {
        out.push_str("_(no columns)_\n");
        return out;
    }
    let headers: Vec<String> = table.headers.iter().map(|h| escape_markdown(h)).collect();
    out.push_str(&format!("| {} |\n", headers.join(" | ")));
    out.push_str(&format!("|{}\n", "---|".repeat(headers.len())));
    for row in &table.data {
        let cells: Vec<String> = row.iter().map(|c| escape_markdown(c)).collect();
        out.push_str(&format!("| {} |\n", cells.join(" | ")));
    }
    out
}

fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inventory() -> Workbook {
        let mut wb = Workbook::new();
        let schema = wb.create_schema("Inventory").unwrap();
        wb.create_schema("Empty").unwrap();
        wb.select_schema(schema).unwrap();
        let table = wb.create_table("Items", 2).unwrap();
        wb.add_row().unwrap();
        wb.set_cell(table, 0, 0, "Widget").unwrap();
        wb
    }

    #[test]
    fn test_schema_list_counts_tables() {
        let wb = inventory();
        let cards = schema_list(&wb);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].name, "Inventory");
        assert_eq!(cards[0].table_count, 1);
        assert_eq!(cards[1].table_count, 0);
    }

    #[test]
    fn test_selector_marks_current_table() {
        let mut wb = inventory();
        let first = wb.current_table_id().unwrap();
        wb.create_table("Second", 1).unwrap();
        wb.select_table(first).unwrap();
        let options = table_selector(&wb);
        assert_eq!(options.len(), 2);
        assert!(options[0].selected);
        assert!(!options[1].selected);
    }

    #[test]
    fn test_render_follows_page() {
        let mut wb = inventory();
        match render(&wb) {
            Frame::Tables { title, grid, .. } => {
                assert_eq!(title, "Inventory");
                assert_eq!(grid.unwrap().rows, vec![vec!["Widget", ""]]);
            }
            other => panic!("expected tables page, got {other:?}"),
        }
        wb.show_schema_list();
        assert!(matches!(render(&wb), Frame::SchemaList(_)));
    }

    #[test]
    fn test_render_after_deleting_selected_schema() {
        let mut wb = inventory();
        let id = wb.current_schema_id().unwrap();
        wb.delete_schema(id).unwrap();
        assert_eq!(
            render(&wb),
            Frame::SchemaList(vec![SchemaCard {
                id: wb.schemas()[0].id,
                name: "Empty".into(),
                table_count: 0
            }])
        );
    }

    #[test]
    fn test_frame_text_contains_grid() {
        let text = render(&inventory()).to_text();
        assert!(text.contains("Schema: Inventory"));
        assert!(text.contains("*Items"));
        assert!(text.contains("1:Header 1"));
        assert!(text.contains("Widget"));
        assert!(text.contains("[add-row]"));
    }

    #[test]
    fn test_grid_text_alignment() {
        let headers = vec!["A".to_string(), "Long".to_string()];
        let rows = vec![vec!["xyz".to_string(), "".to_string()]];
        let text = grid_text(&headers, &rows);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "# | 1:A | 2:Long");
        assert_eq!(lines[1], "--+-----+-------");
        assert_eq!(lines[2], "1 | xyz |       ");
    }

    #[test]
    fn test_empty_grid_notes_no_rows() {
        let text = grid_text(&["A".to_string()], &[]);
        assert!(text.ends_with("(no rows)\n"));
    }

    #[test]
    fn test_markdown_escapes_pipes() {
        let mut table = Table::new(1, "T", 1);
        table.data.push(vec!["a|b".into()]);
        let md = format_table(&table, OutputFormat::Markdown).unwrap();
        assert!(md.contains("| Header 1 |"));
        assert!(md.contains("a\\|b"));
    }

    #[test]
    fn test_json_format_uses_stored_layout() {
        let table = Table::new(1, "T", 1);
        let json = format_table(&table, OutputFormat::Json).unwrap();
        assert!(json.contains("\"sortState\""));
    }
}
