//! CSV parsing for inventory files that may carry a `#` comment preamble.
//!
//! Every column is loaded as nullable text; typed coercion happens later in
//! [`super::normalize`].

use std::path::Path;

use csv::{ReaderBuilder, Trim};
use polars::prelude::*;

use crate::error::{InventoryError, Result};

/// Cell values read as null, in addition to empty cells.
pub const NULL_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>",
    "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn is_null_token(raw: &str) -> bool {
    raw.is_empty() || NULL_TOKENS.contains(&raw)
}

/// Number of consecutive lines at the start of `content` beginning with `#`.
pub fn count_comment_lines(content: &str) -> usize {
    content
        .lines()
        .take_while(|line| line.starts_with('#'))
        .count()
}

/// Parses CSV text with a header row into a frame of nullable text columns.
///
/// Short records are padded with nulls. Fields are trimmed, and empty cells
/// or any of [`NULL_TOKENS`] become null.
///
/// # Errors
///
/// Returns [`InventoryError::Csv`] for malformed CSV and
/// [`InventoryError::RaggedRow`] when a record has more fields than the header.
pub fn parse_frame(content: &str, path: &Path) -> Result<DataFrame> {
    let csv_err = |source: csv::Error| InventoryError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(content.as_bytes());

    let headers = rdr.headers().map_err(csv_err)?.clone();
    let width = headers.len();
    let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); width];

    for record in rdr.records() {
        let record = record.map_err(csv_err)?;
        if record.len() > width {
            return Err(InventoryError::RaggedRow {
                path: path.to_path_buf(),
                line: record.position().map_or(0, |p| p.line()),
                expected: width,
                found: record.len(),
            });
        }
        for (i, column) in values.iter_mut().enumerate() {
            let cell = record.get(i).filter(|raw| !is_null_token(raw));
            column.push(cell.map(str::to_string));
        }
    }

    let columns: Vec<Column> = headers
        .iter()
        .zip(values)
        .map(|(name, cells)| Column::new(name.into(), cells))
        .collect();
    Ok(DataFrame::new(columns)?)
}

fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|source| InventoryError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads a CSV file, skipping any leading `#` comment lines.
pub fn read_csv_with_comments(path: &Path) -> Result<DataFrame> {
    let content = read_to_string(path)?;
    let skip = count_comment_lines(&content);
    let body: String = content.split_inclusive('\n').skip(skip).collect();
    parse_frame(&body, path)
}

/// Reads a CSV file as-is.
pub fn read_csv(path: &Path) -> Result<DataFrame> {
    parse_frame(&read_to_string(path)?, path)
}
