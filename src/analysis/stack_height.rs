use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use std::path::Path;
use tracing::{info, warn};

use super::types::HeightStatsRecord;
use crate::binning::{BinScheme, stack_height_bins};
use crate::config::AnalysisCategory;
use crate::filter::{filter_poll_data, filter_scc_data, scc_codes};
use crate::ingest::normalize::float_column;
use crate::output::append_records;
use crate::plot::plot_stack_height_analysis;
use crate::stats::SummaryStats;

pub const STATISTICS_FILE: &str = "stack_height_statistics.csv";

/// Outcome of one category's stack-height analysis.
#[derive(Debug, Clone)]
pub struct HeightSummary {
    pub category: String,
    pub heights: Vec<f64>,
    pub records: Vec<HeightStatsRecord>,
}

/// Finite, non-null `stkhgt` values of a filtered record frame.
pub fn stack_heights(df: &DataFrame) -> crate::error::Result<Vec<f64>> {
    Ok(float_column(df, "stkhgt")?.into_iter().flatten().collect())
}

/// Statistics for all heights followed by one row per non-empty bin.
pub fn summarize_stack_heights(
    category: &str,
    heights: &[f64],
    bins: &BinScheme,
) -> Vec<HeightStatsRecord> {
    let Some(all) = SummaryStats::describe(heights) else {
        return Vec::new();
    };

    let mut records = vec![HeightStatsRecord::new(&all, "All", category)];
    records.extend(
        bins.describe_bins(heights, heights)
            .iter()
            .map(|(label, stats)| HeightStatsRecord::new(stats, label, category)),
    );
    records
}

fn log_records(records: &[HeightStatsRecord]) {
    info!("Summary statistics by category");
    for r in records {
        info!(
            bin = %r.height_bin,
            max = r.max,
            min = r.min,
            mean = r.mean,
            median = r.median,
            p25 = r.p25,
            p75 = r.p75,
            stddev = ?r.std,
            "Stack height statistics"
        );
    }
}

/// Filters the reference and record tables for one category, then charts
/// and tabulates the stack heights that remain.
///
/// Returns `Ok(None)` when there is no combined data or no matching rows.
#[tracing::instrument(skip_all, fields(category = %category.name))]
pub fn analyze_stack_heights(
    combined: Option<&DataFrame>,
    scc: &DataFrame,
    category: &AnalysisCategory,
    save_dir: &Path,
) -> Result<Option<HeightSummary>> {
    let filtered_scc = filter_scc_data(scc, Some(&category.keywords), Some(category.scc_level))?;
    let (rows, cols) = filtered_scc.shape();
    info!(rows, cols, "Filtered SCC table");

    let Some(combined) = combined else {
        warn!("No combined data available, skipping category");
        return Ok(None);
    };

    let scc_set = scc_codes(&filtered_scc)?;
    let records = filter_poll_data(combined, &category.pollutant, &scc_set)?;
    let heights = stack_heights(&records)?;
    if heights.is_empty() {
        info!(pollutant = %category.pollutant, "No stack height data found for category");
        return Ok(None);
    }

    let bins = stack_height_bins();
    let chart = save_dir.join(format!("stack_height_analysis_{}.svg", category.name));
    plot_stack_height_analysis(&heights, &bins, &chart)
        .with_context(|| format!("plotting {}", chart.display()))?;

    let summary = summarize_stack_heights(&category.name, &heights, &bins);
    log_records(&summary);
    append_records(&save_dir.join(STATISTICS_FILE), &summary)?;

    Ok(Some(HeightSummary {
        category: category.name.clone(),
        heights,
        records: summary,
    }))
}
