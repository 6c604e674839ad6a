//! Narrowing of the SCC reference table.

use std::collections::HashSet;

use polars::prelude::*;
use tracing::info;

use super::{SccLevel, Selection};
use crate::error::Result;
use crate::frame::{column, distinct_text, filter_mask, require_columns};
use crate::ingest::normalize::int_column;

const DATA_CATEGORY: &str = "data category";
const STATUS: &str = "status";

/// Filters the reference table to active point-source codes, then, when
/// both `keywords` and `level` are supplied, to rows whose level label
/// contains any keyword (case-insensitive).
///
/// Supplying only one of `keywords` and `level` skips the keyword search.
///
/// # Errors
///
/// * `InventoryError::InvalidArgument` if `level` is not 1 through 4.
/// * `InventoryError::Schema` if a column the filter reads is missing.
pub fn filter_scc_data(
    df: &DataFrame,
    keywords: Option<&Selection>,
    level: Option<u8>,
) -> Result<DataFrame> {
    require_columns(df, &[DATA_CATEGORY, STATUS])?;

    let filtered = df
        .clone()
        .lazy()
        .filter(
            col(DATA_CATEGORY)
                .eq(lit("Point"))
                .and(col(STATUS).eq(lit("Active"))),
        )
        .collect()?;

    let (keywords, level) = match (keywords, level) {
        (Some(k), Some(l)) if !k.is_empty() => (k, SccLevel::try_from(l)?),
        _ => return Ok(filtered),
    };

    let level_column = level.column();
    let labels = column(&filtered, level_column)?.cast(&DataType::String)?;
    let needles: Vec<String> = keywords.values().iter().map(|k| k.to_lowercase()).collect();
    let mask: Vec<bool> = labels
        .str()?
        .into_iter()
        .map(|label| {
            label.is_some_and(|label| {
                let label = label.to_lowercase();
                needles.iter().any(|n| label.contains(n.as_str()))
            })
        })
        .collect();
    let matched = filter_mask(&filtered, &mask)?;

    info!(column = level_column, matched = matched.height(), "Unique values after filtering");
    for (i, value) in distinct_text(&matched, level_column)?.iter().enumerate() {
        info!("{}: {}", i + 1, value);
    }

    Ok(matched)
}

/// Collects the integer codes in the `SCC` column. Null cells are skipped.
pub fn scc_codes(df: &DataFrame) -> Result<HashSet<i64>> {
    Ok(int_column(df, "SCC")?.into_iter().flatten().collect())
}
