//! Loader tests — reading, type hints and fatal schema errors.

mod common;

use common::{csv_text, header, Row};
use crimestat_core::{
    config::ReportConfig,
    error::LoadError,
    loader::Loader,
    table::{Cell, ColumnType},
};
use std::io::Write;

fn load(text: &str) -> Result<crimestat_core::table::Table, LoadError> {
    let config = ReportConfig::default();
    Loader::new(&config.schema).load_reader(text.as_bytes())
}

#[test]
fn text_hints_override_inference() {
    let table = load(&csv_text(&[Row::new("1"), Row::new("2")])).unwrap();
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.columns().len(), 35);

    // Numeric-looking, but hinted.
    assert_eq!(table.column_type("ADDR_PCT_CD"), Some(ColumnType::Text));
    assert_eq!(table.column_type("CMPLNT_NUM"), Some(ColumnType::Text));
    assert_eq!(table.column_type("CMPLNT_FR_DT"), Some(ColumnType::Text));
    // Inferred.
    assert_eq!(table.column_type("KY_CD"), Some(ColumnType::Integer));
    assert_eq!(table.column_type("Latitude"), Some(ColumnType::Float));
    assert_eq!(table.column_type("OFNS_DESC"), Some(ColumnType::Text));

    let idx = table.column_index("ADDR_PCT_CD").unwrap();
    assert_eq!(table.rows()[0][idx], Cell::Text("75".into()));
}

#[test]
fn empty_values_are_missing_cells() {
    let table = load(&csv_text(&[Row::new("1").set("CMPLNT_TO_DT", "")])).unwrap();
    let idx = table.column_index("CMPLNT_TO_DT").unwrap();
    assert!(table.rows()[0][idx].is_missing());
    // Columns with no values at all fall back to text.
    assert_eq!(table.column_type("PARKS_NM"), Some(ColumnType::Text));
}

#[test]
fn mixed_column_is_inferred_as_text() {
    let rows = [Row::new("1").set("KY_CD", "578"), Row::new("2").set("KY_CD", "N/A")];
    let table = load(&csv_text(&rows)).unwrap();
    assert_eq!(table.column_type("KY_CD"), Some(ColumnType::Text));
}

#[test]
fn missing_expected_column_is_fatal() {
    let text = "CMPLNT_NUM,BORO_NM\n1,BRONX\n";
    match load(text) {
        Err(LoadError::MissingColumns { columns }) => {
            assert!(columns.contains(&"ADDR_PCT_CD".to_string()));
            assert!(!columns.contains(&"BORO_NM".to_string()));
        }
        other => panic!("expected MissingColumns, got {other:?}"),
    }
}

#[test]
fn short_row_is_a_column_count_mismatch() {
    let mut text = csv_text(&[Row::new("1")]);
    text.push_str("2,75,BRONX\n");
    match load(&text) {
        Err(LoadError::ColumnCountMismatch { line, expected, found }) => {
            assert_eq!(line, 3);
            assert_eq!(expected, 35);
            assert_eq!(found, 3);
        }
        other => panic!("expected ColumnCountMismatch, got {other:?}"),
    }
}

#[test]
fn empty_input_is_rejected() {
    assert!(matches!(load(""), Err(LoadError::EmptyInput)));
}

#[test]
fn unreadable_path_is_fatal() {
    let config = ReportConfig::default();
    let err = Loader::new(&config.schema)
        .load_path(std::path::Path::new("/definitely/not/here.csv"))
        .unwrap_err();
    assert!(matches!(err, LoadError::Unreadable { .. }));
    assert!(err.to_string().contains("/definitely/not/here.csv"));
}

#[test]
fn loads_from_disk() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(csv_text(&[Row::new("1"), Row::new("2"), Row::new("3")]).as_bytes())
        .unwrap();
    let config = ReportConfig::default();
    let table = Loader::new(&config.schema).load_path(file.path()).unwrap();
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.column_names(), header().iter().map(String::as_str).collect::<Vec<_>>());
}

#[test]
fn extra_columns_are_kept() {
    let mut text = String::new();
    let mut header = header();
    header.push("EXTRA".into());
    text.push_str(&header.join(","));
    text.push('\n');
    text.push_str(&vec!["x"; header.len()].join(","));
    text.push('\n');
    let table = load(&text).unwrap();
    assert!(table.column_index("EXTRA").is_ok());
}
