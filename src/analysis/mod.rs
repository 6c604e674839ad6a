//! Per-category analysis runs.
//!
//! Each run filters the SCC reference table with the category's keywords,
//! joins the resulting code set against the combined record table, and
//! writes a chart plus statistics rows under the save directory.

pub mod capacity;
pub mod stack_height;
pub mod types;

pub use capacity::{
    CapacitySample, CapacitySummary, analyze_stack_heights_by_capacity, log_available_units,
    summarize_by_capacity, unit_counts,
};
pub use stack_height::{HeightSummary, STATISTICS_FILE, analyze_stack_heights, summarize_stack_heights};
pub use types::{CapacityStatsRecord, CategorizedSample, HeightStatsRecord};
