use serde::Serialize;
use thiserror::Error;

use crate::types::LineNo;

/// Fatal input errors. Any of these halts the run.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Cannot read {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Input has no header row")]
    EmptyInput,

    #[error("Missing expected columns: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("Line {line}: expected {expected} fields, found {found}")]
    ColumnCountMismatch {
        line: LineNo,
        expected: usize,
        found: usize,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Load error: {0}")]
    Load(#[from] LoadError),

    #[error("Column '{name}' not found in table")]
    ColumnNotFound { name: String },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ReportResult<T> = Result<T, ReportError>;

/// A single value that could not be converted. Never fatal: the field
/// it belongs to is left empty and the row carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[error("Cannot parse '{raw}' in {column} as {expected}")]
pub struct ParseError {
    pub column: String,
    pub raw: String,
    pub expected: String,
}
