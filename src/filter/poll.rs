//! Narrowing of the combined record frame by pollutant and SCC code.

use std::collections::HashSet;

use polars::prelude::*;
use tracing::debug;

use super::Selection;
use crate::error::{InventoryError, Result};
use crate::frame::{column, filter_mask, require_columns};
use crate::ingest::normalize::int_column;

pub const CAPACITY_COLUMNS: [&str; 3] = ["stkhgt", "design_capacity", "design_capacity_units"];

/// Keeps rows whose `poll` is selected, whose `scc` is in `scc_set` and
/// whose `stkhgt` is present. All columns are returned.
///
/// # Errors
///
/// Returns a schema error when `poll`, `scc` or `stkhgt` is missing.
pub fn filter_poll_data(
    df: &DataFrame,
    pollutants: &Selection,
    scc_set: &HashSet<i64>,
) -> Result<DataFrame> {
    require_columns(df, &["poll", "scc", "stkhgt"])?;

    let poll = column(df, "poll")?.cast(&DataType::String)?;
    let codes = int_column(df, "scc")?;
    let has_height = column(df, "stkhgt")?.is_not_null();

    let mask: Vec<bool> = poll
        .str()?
        .into_iter()
        .zip(codes)
        .zip(&has_height)
        .map(|((p, code), height)| {
            p.is_some_and(|p| pollutants.contains(p))
                && code.is_some_and(|c| scc_set.contains(&c))
                && height.unwrap_or(false)
        })
        .collect();
    let filtered = filter_mask(df, &mask)?;

    debug!(
        pollutants = %pollutants,
        scc_codes = scc_set.len(),
        rows = filtered.height(),
        "Filtered pollutant records"
    );
    Ok(filtered)
}

/// Same row predicate as [`filter_poll_data`], projected onto
/// `stkhgt`, `design_capacity` and `design_capacity_units`.
///
/// # Errors
///
/// Returns a schema error naming `design_capacity` and/or
/// `design_capacity_units` when the frame lacks them.
pub fn filter_poll_data_with_capacity(
    df: &DataFrame,
    pollutants: &Selection,
    scc_set: &HashSet<i64>,
) -> Result<DataFrame> {
    let missing: Vec<&str> = CAPACITY_COLUMNS
        .iter()
        .copied()
        .filter(|c| df.get_column_index(c).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(InventoryError::missing_columns(&missing));
    }

    Ok(filter_poll_data(df, pollutants, scc_set)?.select(CAPACITY_COLUMNS)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    fn records() -> DataFrame {
        df!(
            "facility_id" => ["F1", "F2", "F3", "F4", "F5"],
            "scc" => [Some(30100101i64), Some(99999999), Some(30100101), Some(30100101), None],
            "poll" => ["PM25-PRI", "PM25-PRI", "NOX", "PM25-PRI", "PM25-PRI"],
            "stkhgt" => [Some(50.0), Some(30.0), Some(12.0), None, Some(8.0)]
        )
        .unwrap()
    }

    fn capacity_records() -> DataFrame {
        df!(
            "scc" => [1i64, 1, 2],
            "poll" => ["SO2", "SO2", "SO2"],
            "stkhgt" => [40.0, 25.0, 90.0],
            "design_capacity" => [Some("120"), None, Some("300")],
            "design_capacity_units" => [Some("MW"), None, Some("MW")]
        )
        .unwrap()
    }

    #[test]
    fn test_filter_poll_data_scenario() {
        let scc_set = HashSet::from([30100101]);
        let filtered = filter_poll_data(&records(), &Selection::from("PM25-PRI"), &scc_set).unwrap();

        assert_eq!(filtered.shape(), (1, 4));
        let facility = filtered.column("facility_id").unwrap().str().unwrap();
        assert_eq!(facility.get(0), Some("F1"));
        let stkhgt = filtered.column("stkhgt").unwrap().f64().unwrap();
        assert_eq!(stkhgt.get(0), Some(50.0));
    }

    #[test]
    fn test_filter_poll_data_invariants() {
        let scc_set = HashSet::from([30100101, 99999999]);
        let pollutants = Selection::from(vec!["PM25-PRI", "NOX"]);
        let filtered = filter_poll_data(&records(), &pollutants, &scc_set).unwrap();

        assert_eq!(filtered.height(), 3);
        let scc = filtered.column("scc").unwrap().i64().unwrap();
        let poll = filtered.column("poll").unwrap().str().unwrap();
        let stkhgt = filtered.column("stkhgt").unwrap().f64().unwrap();
        for ((code, p), h) in scc.into_iter().zip(poll).zip(stkhgt) {
            assert!(scc_set.contains(&code.unwrap()));
            assert!(pollutants.contains(p.unwrap()));
            assert!(h.is_some());
        }
    }

    #[test]
    fn test_filter_poll_data_is_pure_and_idempotent() {
        let df = records();
        let scc_set = HashSet::from([30100101]);
        let pollutants = Selection::from("PM25-PRI");
        let first = filter_poll_data(&df, &pollutants, &scc_set).unwrap();
        let second = filter_poll_data(&df, &pollutants, &scc_set).unwrap();
        assert!(first.equals_missing(&second));
        assert_eq!(df.height(), 5);
    }

    #[test]
    fn test_capacity_requires_columns() {
        let err = filter_poll_data_with_capacity(
            &records(),
            &Selection::from("PM25-PRI"),
            &HashSet::from([30100101]),
        )
        .unwrap_err();
        match err {
            InventoryError::Schema { missing } => {
                assert_eq!(missing, vec!["design_capacity", "design_capacity_units"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_capacity_names_only_the_missing_column() {
        let df = capacity_records()
            .select(["scc", "poll", "stkhgt", "design_capacity"])
            .unwrap();
        let err = filter_poll_data_with_capacity(&df, &Selection::from("SO2"), &HashSet::from([1]))
            .unwrap_err();
        assert!(matches!(err, InventoryError::Schema { ref missing } if missing == &["design_capacity_units"]));
    }

    #[test]
    fn test_capacity_projects_three_columns() {
        let filtered =
            filter_poll_data_with_capacity(&capacity_records(), &Selection::from("SO2"), &HashSet::from([1]))
                .unwrap();
        let names: Vec<&str> = filtered.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, CAPACITY_COLUMNS);
        assert_eq!(filtered.height(), 2);
        // capacity may still be null on a kept row
        let capacity = filtered.column("design_capacity").unwrap().str().unwrap();
        assert_eq!(capacity.get(1), None);
    }
}
