//! Error type shared by the ingestion, filtering and binning layers.

use std::path::PathBuf;

/// Errors raised while loading, normalizing or filtering inventory tables.
#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    /// One or more columns an operation depends on are not in the table.
    #[error("missing required columns: {}", .missing.join(", "))]
    Schema { missing: Vec<String> },

    /// A caller-supplied argument is outside its accepted domain.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A cell could not be converted to the column's target type.
    #[error("cannot convert value '{value}' in column '{column}' (row {row}) to {target}")]
    Coercion {
        column: String,
        row: usize,
        value: String,
        target: &'static str,
    },

    #[error("failed to parse {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A record carries more fields than the header declares.
    #[error("{path}: record on line {line} has {found} fields, header has {expected}")]
    RaggedRow {
        path: PathBuf,
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl InventoryError {
    pub fn missing_columns<S: AsRef<str>>(columns: &[S]) -> Self {
        InventoryError::Schema {
            missing: columns.iter().map(|c| c.as_ref().to_string()).collect(),
        }
    }
}

pub type Result<T> = std::result::Result<T, InventoryError>;
