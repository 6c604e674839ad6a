//! Descriptive statistics over stack-height samples.

use polars::prelude::*;
use serde::Serialize;

/// Count, extremes, mean, quartiles and sample standard deviation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub std: Option<f64>,
}

fn linear_quantile(values: &Float64Chunked, q: f64) -> Option<f64> {
    values.quantile(q, QuantileMethod::Linear).ok().flatten()
}

impl SummaryStats {
    /// Describes the finite entries of `values`. Returns `None` when none
    /// remain. The standard deviation uses N-1 and is `None` below two values.
    pub fn describe(values: &[f64]) -> Option<Self> {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }
        let values = Float64Chunked::from_vec("values".into(), finite);
        let count = values.len();

        Some(SummaryStats {
            count,
            min: values.min()?,
            max: values.max()?,
            mean: values.mean()?,
            p25: linear_quantile(&values, 0.25)?,
            median: values.median()?,
            p75: linear_quantile(&values, 0.75)?,
            std: if count < 2 { None } else { values.std(1) },
        })
    }
}
