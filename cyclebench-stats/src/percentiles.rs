//! Percentile Table
//!
//! Every result reports the same fixed set of percentiles, read from the
//! samples exactly as the caller converted them. Throughput samples are not
//! inverted, so the 0th percentile is always the smallest value.

use crate::statistics::SampleStatistics;

/// Reported quantiles, as fractions of one
pub const REPORTED_QUANTILES: [f64; 9] = [0.0, 0.25, 0.5, 0.75, 0.90, 0.99, 0.999, 0.9999, 1.0];

/// Ordered `(percent, value)` pairs, percent in `[0, 100]`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PercentileTable {
    entries: Vec<(f64, f64)>,
}

impl PercentileTable {
    /// Evaluate [`REPORTED_QUANTILES`] against `stats`
    pub fn from_statistics(stats: &SampleStatistics) -> Self {
        let entries = REPORTED_QUANTILES
            .iter()
            .map(|&q| (q * 100.0, stats.value_at(q)))
            .collect();
        Self { entries }
    }

    /// Entries in ascending percent order
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.entries.iter().copied()
    }

    /// Value at `percent`, if it is one of the reported percentiles
    pub fn get(&self, percent: f64) -> Option<f64> {
        self.entries
            .iter()
            .find(|(p, _)| (p - percent).abs() < 1e-9)
            .map(|&(_, v)| v)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Sort `samples` and compute the reported percentile table
pub fn compute_percentiles(samples: &[f64]) -> PercentileTable {
    PercentileTable::from_statistics(&SampleStatistics::new(samples))
}
