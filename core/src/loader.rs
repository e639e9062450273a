//! CSV loader.
//!
//! Reads the whole file into a `Table`. Columns listed as text hints are
//! kept as free text; every other column gets a type inferred from its
//! non-empty values (integer, then float, then text).

use crate::{
    config::SchemaConfig,
    error::LoadError,
    table::{Cell, Column, ColumnType, Table},
};
use std::{collections::HashSet, fs::File, io::Read, path::Path};

pub struct Loader<'a> {
    schema: &'a SchemaConfig,
}

impl<'a> Loader<'a> {
    pub fn new(schema: &'a SchemaConfig) -> Self {
        Self { schema }
    }

    pub fn load_path(&self, path: &Path) -> Result<Table, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        let table = self.load_reader(file)?;
        log::info!(
            "loader: read {} rows x {} columns from {}",
            table.row_count(),
            table.columns().len(),
            path.display()
        );
        Ok(table)
    }

    pub fn load_reader<R: Read>(&self, reader: R) -> Result<Table, LoadError> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(reader);

        let header: Vec<String> = rdr.headers()?.iter().map(|h| h.trim().to_string()).collect();
        if header.is_empty() {
            return Err(LoadError::EmptyInput);
        }
        self.check_header(&header)?;

        let mut raw_rows: Vec<Vec<String>> = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| {
                if let csv::ErrorKind::UnequalLengths { pos, expected_len, len } = e.kind() {
                    return LoadError::ColumnCountMismatch {
                        line: pos.as_ref().map(|p| p.line()).unwrap_or(0),
                        expected: *expected_len as usize,
                        found: *len as usize,
                    };
                }
                LoadError::Csv(e)
            })?;
            raw_rows.push(record.iter().map(str::to_string).collect());
        }

        let hints: HashSet<&str> = self.schema.text_columns.iter().map(String::as_str).collect();
        let columns: Vec<Column> = header
            .into_iter()
            .enumerate()
            .map(|(idx, name)| {
                let kind = if hints.contains(name.as_str()) {
                    ColumnType::Text
                } else {
                    infer_type(raw_rows.iter().map(|r| r[idx].as_str()))
                };
                Column { name, kind }
            })
            .collect();

        let rows = raw_rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .zip(&columns)
                    .map(|(value, column)| to_cell(value, column.kind))
                    .collect()
            })
            .collect();

        Ok(Table::new(columns, rows))
    }

    fn check_header(&self, header: &[String]) -> Result<(), LoadError> {
        let present: HashSet<&str> = header.iter().map(String::as_str).collect();
        let missing: Vec<String> = self
            .schema
            .expected_columns
            .iter()
            .filter(|c| !present.contains(c.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            return Err(LoadError::MissingColumns { columns: missing });
        }

        let expected: HashSet<&str> =
            self.schema.expected_columns.iter().map(String::as_str).collect();
        for extra in header.iter().filter(|h| !expected.contains(h.as_str())) {
            log::warn!("loader: unexpected column '{extra}' kept as-is");
        }
        Ok(())
    }
}

/// Narrowest type that every non-empty value fits. An all-empty column
/// is text.
fn infer_type<'v>(values: impl Iterator<Item = &'v str>) -> ColumnType {
    let mut present = values.filter(|v| !v.trim().is_empty()).peekable();
    if present.peek().is_none() {
        return ColumnType::Text;
    }
    let present: Vec<&str> = present.map(str::trim).collect();
    if present.iter().all(|v| v.parse::<i64>().is_ok()) {
        ColumnType::Integer
    } else if present.iter().all(|v| v.parse::<f64>().is_ok()) {
        ColumnType::Float
    } else {
        ColumnType::Text
    }
}

fn to_cell(value: String, kind: ColumnType) -> Cell {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Cell::Missing;
    }
    // Inference guarantees the parses below succeed for typed columns.
    match kind {
        ColumnType::Integer => trimmed
            .parse()
            .map(Cell::Integer)
            .unwrap_or_else(|_| Cell::Text(trimmed.to_string())),
        ColumnType::Float => trimmed
            .parse()
            .map(Cell::Float)
            .unwrap_or_else(|_| Cell::Text(trimmed.to_string())),
        ColumnType::Text => Cell::Text(trimmed.to_string()),
    }
}
