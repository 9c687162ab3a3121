use std::path::Path;

use sheetbook_core::{Workbook, validate_schemas};
use sheetbook_db::{AppConfig, Backend, FileStore, KeyValueStore, LoadOutcome, Storage};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn file_storage(path: &Path) -> Storage {
    Storage::new(Box::new(FileStore::new(path)))
}

fn stored_document(path: &Path) -> serde_json::Value {
    let raw = FileStore::new(path).get("schemas").unwrap().unwrap();
    serde_json::from_str(&raw).unwrap()
}

// ---------------------------------------------------------------------------
// Round trips
// ---------------------------------------------------------------------------

#[test]
fn test_inventory_document_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.json");

    let mut wb = Workbook::new();
    let schema = wb.create_schema("Inventory").unwrap();
    wb.select_schema(schema).unwrap();
    let table = wb.create_table("Items", 2).unwrap();
    wb.add_row().unwrap();
    wb.set_cell(table, 0, 0, "Widget").unwrap();
    wb.sort_table(1).unwrap();

    file_storage(&path).save(wb.schemas()).unwrap();

    let reloaded = file_storage(&path).load().unwrap();
    assert_eq!(reloaded, wb.schemas());
    assert!(validate_schemas(&reloaded).is_empty());

    let items = &reloaded[0].tables[0];
    assert_eq!(items.headers, vec!["Header 1", "Header 2"]);
    assert_eq!(items.data, vec![vec!["Widget", ""]]);
}

#[test]
fn test_document_layout_matches_stored_shape() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.json");

    let mut wb = Workbook::new();
    let schema = wb.create_schema("Inventory").unwrap();
    wb.select_schema(schema).unwrap();
    wb.create_table("Items", 1).unwrap();
    wb.sort_table(0).unwrap();
    file_storage(&path).save(wb.schemas()).unwrap();

    let doc = stored_document(&path);
    let schema = &doc[0];
    assert!(schema["id"].is_i64());
    assert_eq!(schema["name"], "Inventory");
    let table = &schema["tables"][0];
    assert_eq!(table["name"], "Items");
    assert_eq!(table["headers"], serde_json::json!(["Header 1"]));
    assert_eq!(table["data"], serde_json::json!([]));
    assert_eq!(table["sortState"], serde_json::json!({"0": "desc"}));
}

#[test]
fn test_reads_document_with_stored_sort_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.json");
    let raw = r#"[{"id":1700000000000,"name":"Inventory","tables":[{"id":1700000000001,"name":"Items","headers":["Name","Qty"],"data":[["Widget","1"],["Gadget","3"]],"sortState":{"1":"desc"}}]}]"#;
    FileStore::new(&path).set("schemas", raw).unwrap();

    let mut wb = Workbook::from_schemas(file_storage(&path).load().unwrap());
    wb.select_schema(1_700_000_000_000).unwrap();
    assert_eq!(wb.current_table().unwrap().name, "Items");

    // Stored toggle for column 1 is "desc", so the next sort is descending.
    wb.sort_table(1).unwrap();
    assert_eq!(wb.current_table().unwrap().column(1), vec!["3", "1"]);
}

#[test]
fn test_deleted_schema_disappears_from_document() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.json");
    let mut storage = file_storage(&path);

    let mut wb = Workbook::new();
    let keep = wb.create_schema("Keep").unwrap();
    let drop = wb.create_schema("Drop").unwrap();
    wb.select_schema(drop).unwrap();
    wb.create_table("Doomed", 3).unwrap();
    storage.save(wb.schemas()).unwrap();
    assert_eq!(stored_document(&path).as_array().unwrap().len(), 2);

    wb.delete_schema(drop).unwrap();
    storage.save(wb.schemas()).unwrap();

    let doc = stored_document(&path);
    let schemas = doc.as_array().unwrap();
    assert_eq!(schemas.len(), 1);
    assert_eq!(schemas[0]["id"], keep);
    assert!(!doc.to_string().contains("Doomed"));
}

#[test]
fn test_corrupted_file_document_recovers_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.json");
    FileStore::new(&path).set("schemas", "[{]").unwrap();

    let mut storage = file_storage(&path);
    let outcome = storage.load_or_recover().unwrap();
    assert!(matches!(outcome, LoadOutcome::Recovered { .. }));

    storage.save(&outcome.into_schemas()).unwrap();
    let store = FileStore::new(&path);
    assert_eq!(store.get("schemas").unwrap().as_deref(), Some("[]"));
    assert_eq!(store.get("schemas.corrupt").unwrap().as_deref(), Some("[{]"));
}

#[test]
fn test_last_writer_wins() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("book.json");

    let mut first = Workbook::new();
    first.create_schema("From first").unwrap();
    let mut second = Workbook::new();
    second.create_schema("From second").unwrap();

    file_storage(&path).save(first.schemas()).unwrap();
    file_storage(&path).save(second.schemas()).unwrap();

    let loaded = file_storage(&path).load().unwrap();
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].name, "From second");
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn test_default_config_when_file_is_empty_mapping() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sheetbook.yml");
    std::fs::write(&path, "{}\n").unwrap();

    let config = AppConfig::load(&path).unwrap();
    assert_eq!(config, AppConfig::default());
    assert_eq!(config.storage.backend, Backend::File);
}

#[test]
fn test_missing_config_file_is_io_error() {
    let err = AppConfig::load("/nonexistent/sheetbook.yml").unwrap_err();
    assert!(matches!(err, sheetbook_db::DatabaseError::IoError(_)));
}
