//! Helpers over polars data frames shared by ingestion and filtering.
//!
//! Every helper returns a new frame; nothing mutates a frame that has
//! already been handed out.

use std::collections::BTreeSet;

use polars::prelude::*;

use crate::error::{InventoryError, Result};

/// Checks that every name is a column of `df`, reporting all missing names at once.
pub fn require_columns(df: &DataFrame, names: &[&str]) -> Result<()> {
    let missing: Vec<&str> = names
        .iter()
        .copied()
        .filter(|n| df.get_column_index(n).is_none())
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(InventoryError::missing_columns(&missing))
    }
}

/// Looks up a column, mapping its absence to a schema error.
pub fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    require_columns(df, &[name])?;
    Ok(df.column(name)?)
}

/// Keeps the rows whose entry in `mask` is true.
pub fn filter_mask(df: &DataFrame, mask: &[bool]) -> Result<DataFrame> {
    let mask = BooleanChunked::from_slice("mask".into(), mask);
    Ok(df.filter(&mask)?)
}

/// Drops rows whose cells are all null.
pub fn drop_empty_rows(df: &DataFrame) -> Result<DataFrame> {
    let mut keep = vec![false; df.height()];
    for column in df.get_columns() {
        let present = column.is_not_null();
        for (k, p) in keep.iter_mut().zip(&present) {
            *k |= p.unwrap_or(false);
        }
    }
    filter_mask(df, &keep)
}

/// Sorted distinct text values of a column, nulls excluded.
pub fn distinct_text(df: &DataFrame, name: &str) -> Result<Vec<String>> {
    let text = column(df, name)?.cast(&DataType::String)?;
    let values: BTreeSet<String> = text.str()?.into_iter().flatten().map(str::to_string).collect();
    Ok(values.into_iter().collect())
}

/// Stacks frames vertically. The result carries the union of all columns
/// in first-seen order; cells missing from a source are null.
pub fn concat_diagonal(frames: Vec<DataFrame>) -> Result<DataFrame> {
    let lazy: Vec<LazyFrame> = frames.into_iter().map(IntoLazy::lazy).collect();
    Ok(concat_lf_diagonal(lazy, UnionArgs::default())?.collect()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn test_concat_unions_columns() {
        let a = df!("scc" => [Some("1")], "poll" => [Some("NOX")]).unwrap();
        let b = df!("poll" => [Some("SO2")], "stkhgt" => [Some("3")]).unwrap();

        let combined = concat_diagonal(vec![a, b]).unwrap();

        let names: Vec<&str> = combined.get_column_names().iter().map(|n| n.as_str()).collect();
        assert_eq!(names, vec!["scc", "poll", "stkhgt"]);
        assert_eq!(combined.height(), 2);
        let scc = combined.column("scc").unwrap().str().unwrap();
        assert_eq!(scc.get(0), Some("1"));
        assert_eq!(scc.get(1), None);
        let stkhgt = combined.column("stkhgt").unwrap().str().unwrap();
        assert_eq!(stkhgt.get(0), None);
        assert_eq!(stkhgt.get(1), Some("3"));
    }

    #[test]
    fn test_drop_empty_rows() {
        let df = df!(
            "a" => [None::<&str>, None],
            "b" => [None, Some("x")]
        )
        .unwrap();

        let cleaned = drop_empty_rows(&df).unwrap();
        assert_eq!(cleaned.height(), 1);
        assert_eq!(df.height(), 2);
    }

    #[test]
    fn test_require_columns_reports_all_missing() {
        let df = df!("stkhgt" => [Some(1.0)]).unwrap();
        let err = require_columns(&df, &["stkhgt", "design_capacity", "design_capacity_units"])
            .unwrap_err();
        match err {
            InventoryError::Schema { missing } => {
                assert_eq!(missing, vec!["design_capacity", "design_capacity_units"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_distinct_text_sorted() {
        let df = df!("level" => [Some("b"), Some("a"), Some("b"), None]).unwrap();
        assert_eq!(distinct_text(&df, "level").unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_filter_mask_keeps_marked_rows() {
        let df = df!("a" => [1i64, 2, 3]).unwrap();
        let kept = filter_mask(&df, &[true, false, true]).unwrap();
        let values: Vec<Option<i64>> = kept.column("a").unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(values, vec![Some(1), Some(3)]);
    }
}
