//! Rows written to the statistics CSV files.

use serde::Serialize;

use crate::stats::SummaryStats;

/// One row of `stack_height_statistics.csv`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeightStatsRecord {
    #[serde(rename = "Max")]
    pub max: f64,
    #[serde(rename = "Min")]
    pub min: f64,
    #[serde(rename = "Mean")]
    pub mean: f64,
    #[serde(rename = "Median")]
    pub median: f64,
    #[serde(rename = "25%")]
    pub p25: f64,
    #[serde(rename = "75%")]
    pub p75: f64,
    #[serde(rename = "Std")]
    pub std: Option<f64>,
    #[serde(rename = "height bin")]
    pub height_bin: String,
    pub category: String,
}

impl HeightStatsRecord {
    pub fn new(stats: &SummaryStats, height_bin: &str, category: &str) -> Self {
        Self {
            max: stats.max,
            min: stats.min,
            mean: stats.mean,
            median: stats.median,
            p25: stats.p25,
            p75: stats.p75,
            std: stats.std,
            height_bin: height_bin.to_string(),
            category: category.to_string(),
        }
    }
}

/// One row of `capacity_statistics_{category}.csv`. `category` is the
/// capacity bin label, or `All`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CapacityStatsRecord {
    pub category: String,
    pub count: usize,
    pub min: f64,
    #[serde(rename = "25th_percentile")]
    pub p25: f64,
    pub median: f64,
    pub mean: f64,
    #[serde(rename = "75th_percentile")]
    pub p75: f64,
    pub max: f64,
    pub std: Option<f64>,
}

impl CapacityStatsRecord {
    pub fn new(stats: &SummaryStats, category: &str) -> Self {
        Self {
            category: category.to_string(),
            count: stats.count,
            min: stats.min,
            p25: stats.p25,
            median: stats.median,
            mean: stats.mean,
            p75: stats.p75,
            max: stats.max,
            std: stats.std,
        }
    }
}

/// A stack height paired with the capacity bin it fell into.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategorizedSample {
    pub stkhgt: f64,
    pub design_capacity: f64,
    pub capacity_category: String,
}
