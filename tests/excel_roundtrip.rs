#![cfg(feature = "excel")]

use std::io::Cursor;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use rust_xlsxwriter::Workbook;

use event_transforms::config::{config_from_toml_str, FileProcessingConfig};
use event_transforms::handler::{handle_file_event, FileEvent, HandlerOptions, HandlerOutcome};
use event_transforms::ingestion::{load_dataset, FileFormat, XLSX_MEDIA_TYPE};
use event_transforms::storage::MemoryStore;
use event_transforms::types::Value;

const CONFIG: &str = r#"
inbox = "processed"
columns_hash = ["email"]
columns_nonpii = ["id", "email", "zip"]

[column_mapping]
ID = "id"
"E-mail" = "email"
Zip = "zip"

[remove_char_from_column]
zip = 3
"#;

fn people_xlsx() -> Vec<u8> {
    let mut wb = Workbook::new();
    let ws = wb.add_worksheet();
    ws.set_name("Sheet1").unwrap();

    for (col, name) in ["ID", "Name", "E-mail", "Zip"].iter().enumerate() {
        ws.write_string(0, col as u16, *name).unwrap();
    }
    ws.write_number(1, 0, 1.0).unwrap();
    ws.write_string(1, 1, "Ada").unwrap();
    ws.write_string(1, 2, "ada@example.org").unwrap();
    ws.write_string(1, 3, "3511 AB NL").unwrap();
    // Row 2 left blank; it must be skipped on ingest.
    ws.write_number(3, 0, 2.5).unwrap();
    ws.write_string(3, 1, "Grace").unwrap();
    ws.write_string(3, 2, "grace@example.org").unwrap();
    ws.write_string(3, 3, "1012 XY NL").unwrap();

    wb.save_to_buffer().unwrap()
}

#[test]
fn cells_are_read_as_strings() {
    let config: FileProcessingConfig = config_from_toml_str(CONFIG).unwrap();
    let ds = load_dataset(&people_xlsx(), FileFormat::Excel, &config.preprocess).unwrap();

    assert_eq!(ds.columns, vec!["ID", "Name", "E-mail", "Zip"]);
    assert_eq!(ds.row_count(), 2);
    assert_eq!(ds.rows[0][0], Value::from("1"));
    assert_eq!(ds.rows[1][0], Value::from("2.5"));
}

#[test]
fn processed_workbook_has_one_data_sheet_of_strings() {
    let config: FileProcessingConfig = config_from_toml_str(CONFIG).unwrap();
    let store = MemoryStore::new();
    store.insert("landing", "people.xlsx", people_xlsx(), XLSX_MEDIA_TYPE);

    let outcome = handle_file_event(
        &FileEvent::new("landing", "people.xlsx"),
        &config,
        &store,
        &HandlerOptions::default(),
    )
    .unwrap();
    assert!(matches!(outcome, HandlerOutcome::Processed { rows: 2, .. }));

    let written = store.get("processed", "people.xlsx").unwrap();
    assert_eq!(written.content_type, XLSX_MEDIA_TYPE);

    let mut wb = open_workbook_auto_from_rs(Cursor::new(written.bytes)).unwrap();
    assert_eq!(wb.sheet_names(), vec!["data".to_string()]);

    let range = wb.worksheet_range("data").unwrap();
    let rows: Vec<Vec<Data>> = range.rows().map(|r| r.to_vec()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(
        rows[0],
        vec![
            Data::String("id".to_string()),
            Data::String("email".to_string()),
            Data::String("zip".to_string()),
        ]
    );
    assert_eq!(rows[1][0], Data::String("1".to_string()));
    assert_eq!(rows[1][2], Data::String("3511 AB".to_string()));
    assert_eq!(rows[2][2], Data::String("1012 XY".to_string()));
    match &rows[1][1] {
        Data::String(hash) => assert_eq!(hash.len(), 64),
        other => panic!("expected hashed string, got {other:?}"),
    }
}
