//! Interval binning for stack heights and design capacities.
//!
//! A [`BinScheme`] is an ascending list of edges. The first bin is closed on
//! both ends, every later bin is `(lo, hi]`, and an infinite last edge makes
//! the top bin open-ended. Values that land in no interval are assigned to
//! the last bin.
//!
//! Stack-height bins are fixed. Capacity bins are picked from the largest
//! capacity observed, see [`capacity_bins`].

use crate::stats::SummaryStats;

#[derive(Debug, Clone, PartialEq)]
pub struct BinScheme {
    edges: Vec<f64>,
    labels: Vec<String>,
}

fn edge_label(v: f64) -> String {
    format!("{v}")
}

impl BinScheme {
    /// Builds a scheme from at least two ascending edges, deriving labels of
    /// the form `lo-hi` (or `>lo` for an infinite top edge).
    pub fn from_edges(edges: &[f64]) -> Self {
        debug_assert!(edges.len() >= 2);
        debug_assert!(edges.windows(2).all(|w| w[0] < w[1]));
        let labels = edges
            .windows(2)
            .map(|w| {
                if w[1].is_infinite() {
                    format!(">{}", edge_label(w[0]))
                } else {
                    format!("{}-{}", edge_label(w[0]), edge_label(w[1]))
                }
            })
            .collect();
        Self {
            edges: edges.to_vec(),
            labels,
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn edges(&self) -> &[f64] {
        &self.edges
    }

    /// Index of the bin `value` belongs to.
    pub fn index_of(&self, value: f64) -> usize {
        let last = self.labels.len() - 1;
        if value >= self.edges[0] && value <= self.edges[1] {
            return 0;
        }
        (1..=last)
            .find(|&i| value > self.edges[i] && value <= self.edges[i + 1])
            .unwrap_or(last)
    }

    pub fn label_of(&self, value: f64) -> &str {
        &self.labels[self.index_of(value)]
    }

    /// Splits `keys` into one bucket per bin, carrying each key's paired
    /// `value` along. Bucket order matches [`BinScheme::labels`].
    pub fn partition(&self, keys: &[f64], values: &[f64]) -> Vec<Vec<f64>> {
        let mut buckets = vec![Vec::new(); self.labels.len()];
        for (&k, &v) in keys.iter().zip(values) {
            buckets[self.index_of(k)].push(v);
        }
        buckets
    }

    /// Statistics of `values` grouped by the bin of the matching `keys`.
    /// Empty bins are omitted.
    pub fn describe_bins(&self, keys: &[f64], values: &[f64]) -> Vec<(String, SummaryStats)> {
        self.partition(keys, values)
            .iter()
            .zip(&self.labels)
            .filter_map(|(bucket, label)| {
                SummaryStats::describe(bucket).map(|stats| (label.clone(), stats))
            })
            .collect()
    }
}

/// `[0,10]`, `(10,100]`, `(100,∞)` labelled `0-10`, `10-100`, `>100`.
pub fn stack_height_bins() -> BinScheme {
    BinScheme::from_edges(&[0.0, 10.0, 100.0, f64::INFINITY])
}

/// Capacity bins chosen from the largest observed capacity.
pub fn capacity_bins(max_capacity: f64) -> BinScheme {
    let edges: &[f64] = if max_capacity <= 100.0 {
        &[0.0, 10.0, 25.0, 50.0, 100.0]
    } else if max_capacity <= 500.0 {
        &[0.0, 50.0, 100.0, 250.0, 500.0]
    } else if max_capacity <= 1000.0 {
        &[0.0, 100.0, 250.0, 500.0, 1000.0]
    } else {
        &[0.0, 100.0, 500.0, 1000.0, f64::INFINITY]
    };
    BinScheme::from_edges(edges)
}
