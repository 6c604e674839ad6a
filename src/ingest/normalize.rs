//! Typed coercion of raw text columns.

use polars::prelude::*;
use tracing::warn;

use crate::error::{InventoryError, Result};
use crate::frame::{column, drop_empty_rows, require_columns};

/// Parses a column as nullable floats. Text that polars cannot read as a
/// number is reported with its row.
fn parse_floats(df: &DataFrame, name: &str, target: &'static str) -> Result<Vec<Option<f64>>> {
    let source = column(df, name)?;
    let parsed = source.cast(&DataType::Float64)?;
    let parsed = parsed.f64()?;
    if source.dtype() != &DataType::String {
        return Ok(parsed.into_iter().collect());
    }

    source
        .str()?
        .into_iter()
        .zip(parsed)
        .enumerate()
        .map(|(row, (raw, value))| match (raw, value) {
            (Some(raw), None) => Err(InventoryError::Coercion {
                column: name.to_string(),
                row,
                value: raw.to_string(),
                target,
            }),
            (_, value) => Ok(value),
        })
        .collect()
}

/// Extracts a nullable float column. NaN and infinities become null.
pub fn float_column(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>> {
    Ok(parse_floats(df, name, "float")?
        .into_iter()
        .map(|v| v.filter(|v| v.is_finite()))
        .collect())
}

/// Extracts a nullable integer column. Integral decimal text such as
/// `30100101.0` is accepted and NaN becomes null.
pub fn int_column(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>> {
    let source = column(df, name)?;
    if source.dtype() == &DataType::Int64 {
        return Ok(source.i64()?.into_iter().collect());
    }

    parse_floats(df, name, "integer")?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            None => Ok(None),
            Some(v) if v.is_nan() => Ok(None),
            Some(v) if v.fract() == 0.0 && v.abs() < i64::MAX as f64 => Ok(Some(v as i64)),
            Some(v) => Err(InventoryError::Coercion {
                column: name.to_string(),
                row,
                value: v.to_string(),
                target: "integer",
            }),
        })
        .collect()
}

/// Normalizes a freshly combined record frame: drops all-null rows, then
/// coerces `scc` to nullable `Int64` and `stkhgt` to nullable `Float64`.
///
/// Non-finite stack heights are nulled with a warning.
///
/// # Errors
///
/// Returns [`InventoryError::Schema`] if either column is missing and
/// [`InventoryError::Coercion`] for the first unconvertible cell.
pub fn normalize_records(df: &DataFrame) -> Result<DataFrame> {
    require_columns(df, &["scc", "stkhgt"])?;
    let mut out = drop_empty_rows(df)?;

    let scc = int_column(&out, "scc")?;
    let raw_heights = parse_floats(&out, "stkhgt", "float")?;
    let non_finite = raw_heights
        .iter()
        .filter(|v| v.is_some_and(|v| !v.is_finite()))
        .count();
    if non_finite > 0 {
        warn!(rows = non_finite, "Treating non-finite stack heights as missing");
    }
    let stkhgt: Vec<Option<f64>> = raw_heights
        .into_iter()
        .map(|v| v.filter(|v| v.is_finite()))
        .collect();

    out.with_column(Column::new("scc".into(), scc))?;
    out.with_column(Column::new("stkhgt".into(), stkhgt))?;
    Ok(out)
}
