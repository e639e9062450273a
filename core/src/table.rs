//! In-memory table produced by the loader.
//!
//! A table is column-oriented metadata (names and inferred types) over
//! row-oriented cells. It only exists until typed records are built;
//! column pruning and renaming are the only operations applied to it.

use crate::error::{ReportError, ReportResult};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    Text,
    Integer,
    Float,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Missing,
    Text(String),
    Integer(i64),
    Float(f64),
}

impl Cell {
    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    /// The value as text. Numbers are formatted back to their
    /// shortest representation.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Cell::Missing => None,
            Cell::Text(s) => Some(s.clone()),
            Cell::Integer(i) => Some(i.to_string()),
            Cell::Float(f) => Some(f.to_string()),
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Integer(i) => Some(*i),
            Cell::Float(f) if f.fract() == 0.0 => Some(*f as i64),
            Cell::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(i) => Some(*i as f64),
            Cell::Float(f) => Some(*f),
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Missing => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub kind: ColumnType,
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table. Every row must have one cell per column.
    pub fn new(columns: Vec<Column>, rows: Vec<Vec<Cell>>) -> Self {
        debug_assert!(rows.iter().all(|r| r.len() == columns.len()));
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> ReportResult<usize> {
        self.columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| ReportError::ColumnNotFound { name: name.to_string() })
    }

    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.kind)
    }

    /// Share of missing cells in a column, in [0, 1].
    pub fn missing_rate(&self, name: &str) -> ReportResult<f64> {
        let idx = self.column_index(name)?;
        if self.rows.is_empty() {
            return Ok(0.0);
        }
        let missing = self.rows.iter().filter(|r| r[idx].is_missing()).count();
        Ok(missing as f64 / self.rows.len() as f64)
    }

    /// A new table without the named columns. Names that are not
    /// present are ignored. Returns the names actually dropped.
    pub fn drop_columns(self, names: &[String]) -> (Self, Vec<String>) {
        let drop: HashSet<&str> = names.iter().map(String::as_str).collect();
        let keep: Vec<bool> = self
            .columns
            .iter()
            .map(|c| !drop.contains(c.name.as_str()))
            .collect();

        let mut dropped = Vec::new();
        let mut columns = Vec::with_capacity(self.columns.len());
        for (column, kept) in self.columns.into_iter().zip(&keep) {
            if *kept {
                columns.push(column);
            } else {
                dropped.push(column.name);
            }
        }

        let rows = self
            .rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .zip(&keep)
                    .filter_map(|(cell, kept)| kept.then_some(cell))
                    .collect()
            })
            .collect();

        (Self { columns, rows }, dropped)
    }

    /// Rename columns in place. Returns how many columns changed name.
    pub fn rename_columns(&mut self, renames: &HashMap<String, String>) -> usize {
        let mut renamed = 0;
        for column in &mut self.columns {
            if let Some(to) = renames.get(&column.name) {
                column.name = to.clone();
                renamed += 1;
            }
        }
        renamed
    }
}
