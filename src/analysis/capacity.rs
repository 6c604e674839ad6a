//! Stack heights grouped by design capacity for a single capacity unit.
//!
//! Capacity bin edges are not fixed: they are picked from the largest
//! capacity seen for the target unit (see [`capacity_bins`]).

use anyhow::{Context, Result};
use polars::prelude::{DataFrame, DataType};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{info, warn};

use super::types::{CapacityStatsRecord, CategorizedSample};
use crate::binning::{BinScheme, capacity_bins};
use crate::config::AnalysisCategory;
use crate::filter::{filter_poll_data_with_capacity, filter_scc_data, scc_codes};
use crate::ingest::normalize::float_column;
use crate::output::write_records;
use crate::plot::plot_stack_height_by_capacity;
use crate::frame::column;
use crate::stats::SummaryStats;

/// One row of a capacity-projected record table.
#[derive(Debug, Clone, PartialEq)]
pub struct CapacitySample {
    pub stkhgt: f64,
    pub design_capacity: Option<f64>,
    pub units: Option<String>,
}

/// Stack-height statistics by capacity bin for one unit.
#[derive(Debug, Clone)]
pub struct CapacitySummary {
    pub unit: String,
    pub bins: BinScheme,
    pub records: Vec<CategorizedSample>,
    pub stats: Vec<CapacityStatsRecord>,
}

/// Reads samples from a frame holding `stkhgt`, `design_capacity` and
/// `design_capacity_units`. Rows without a finite stack height are dropped.
pub fn capacity_samples(df: &DataFrame) -> crate::error::Result<Vec<CapacitySample>> {
    let heights = float_column(df, "stkhgt")?;
    let capacities = float_column(df, "design_capacity")?;
    let units = column(df, "design_capacity_units")?.cast(&DataType::String)?;
    let units = units.str()?.into_iter().map(|u| u.map(|u| u.trim().to_string()));

    Ok(heights
        .into_iter()
        .zip(capacities)
        .zip(units)
        .filter_map(|((stkhgt, design_capacity), units)| {
            stkhgt.map(|stkhgt| CapacitySample {
                stkhgt,
                design_capacity,
                units,
            })
        })
        .collect())
}

/// Bins the samples reported in `target_unit` by capacity and describes the
/// stack heights in each bin, preceded by an `All` row.
///
/// Returns `None` when no sample has both a capacity and the target unit.
pub fn summarize_by_capacity(samples: &[CapacitySample], target_unit: &str) -> Option<CapacitySummary> {
    let matching: Vec<(f64, f64)> = samples
        .iter()
        .filter(|s| s.units.as_deref() == Some(target_unit))
        .filter_map(|s| s.design_capacity.map(|c| (c, s.stkhgt)))
        .collect();
    if matching.is_empty() {
        return None;
    }

    let capacities: Vec<f64> = matching.iter().map(|(c, _)| *c).collect();
    let heights: Vec<f64> = matching.iter().map(|(_, h)| *h).collect();
    let max_capacity = capacities.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let bins = capacity_bins(max_capacity);

    let records = matching
        .iter()
        .map(|&(design_capacity, stkhgt)| CategorizedSample {
            stkhgt,
            design_capacity,
            capacity_category: bins.label_of(design_capacity).to_string(),
        })
        .collect();

    let mut stats = Vec::new();
    if let Some(all) = SummaryStats::describe(&heights) {
        stats.push(CapacityStatsRecord::new(&all, "All"));
    }
    stats.extend(
        bins.describe_bins(&capacities, &heights)
            .iter()
            .map(|(label, s)| CapacityStatsRecord::new(s, label)),
    );

    Some(CapacitySummary {
        unit: target_unit.to_string(),
        bins,
        records,
        stats,
    })
}

/// Number of rows per distinct non-null `design_capacity_units`, sorted by unit.
pub fn unit_counts(df: &DataFrame) -> crate::error::Result<Vec<(String, usize)>> {
    let units = column(df, "design_capacity_units")?.cast(&DataType::String)?;
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for unit in units.str()?.into_iter().flatten() {
        *counts.entry(unit.to_string()).or_default() += 1;
    }
    Ok(counts.into_iter().collect())
}

/// Logs the capacity units present in the combined table.
pub fn log_available_units(combined: Option<&DataFrame>) {
    let Some(df) = combined else {
        return;
    };
    match unit_counts(df) {
        Ok(counts) => {
            info!("Available design capacity units");
            for (unit, count) in counts {
                info!(unit = %unit, count, "Design capacity unit");
            }
        }
        Err(_) => info!("No 'design_capacity_units' column found in the data"),
    }
}

/// Runs the capacity analysis for one category and unit, writing a chart
/// and a statistics CSV under `save_dir`.
///
/// Returns `Ok(None)` when nothing matches. Missing capacity columns are an
/// error.
#[tracing::instrument(skip_all, fields(category = %category.name, target_unit = %target_unit))]
pub fn analyze_stack_heights_by_capacity(
    combined: Option<&DataFrame>,
    scc: &DataFrame,
    category: &AnalysisCategory,
    target_unit: &str,
    save_dir: &Path,
) -> Result<Option<CapacitySummary>> {
    let filtered_scc = filter_scc_data(scc, Some(&category.keywords), Some(category.scc_level))?;
    info!(rows = filtered_scc.height(), "Filtered SCC table");
    if filtered_scc.height() == 0 {
        info!("No SCC data found for the given keywords and level");
        return Ok(None);
    }

    let Some(combined) = combined else {
        warn!("No combined data available, skipping category");
        return Ok(None);
    };

    let scc_set = scc_codes(&filtered_scc)?;
    let capacity_data = filter_poll_data_with_capacity(combined, &category.pollutant, &scc_set)
        .context("filtering capacity data")?;
    info!(rows = capacity_data.height(), "Filtered capacity data");
    if capacity_data.height() == 0 {
        info!("No data found for the given pollutant and SCC codes");
        return Ok(None);
    }

    let samples = capacity_samples(&capacity_data)?;
    let Some(summary) = summarize_by_capacity(&samples, target_unit) else {
        info!("No records found with the target design capacity unit");
        return Ok(None);
    };

    let chart = save_dir.join(format!("stack_height_by_capacity_{}.svg", category.name));
    plot_stack_height_by_capacity(&summary, &chart)
        .with_context(|| format!("plotting {}", chart.display()))?;

    for row in &summary.stats {
        info!(
            capacity_bin = %row.category,
            count = row.count,
            min = row.min,
            median = row.median,
            mean = row.mean,
            max = row.max,
            "Stack height by capacity"
        );
    }
    write_records(
        &save_dir.join(format!("capacity_statistics_{}.csv", category.name)),
        &summary.stats,
    )?;

    info!(records = summary.records.len(), "Capacity analysis complete");
    Ok(Some(summary))
}
