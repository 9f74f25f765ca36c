#![warn(missing_docs)]
//! Cyclebench Statistical Engine
//!
//! Numeric half of result aggregation:
//! - Linear-interpolation quantiles over sorted samples
//! - Mean, two-pass standard deviation and a 95% confidence margin
//! - The fixed percentile table reported for every benchmark
//! - Fixed-precision and significant-digit number formatting

mod format;
mod percentiles;
mod statistics;

pub use format::{NEGLIGIBLE_THRESHOLD, format_fixed, format_significant, is_nan_or_zero};
pub use percentiles::{PercentileTable, REPORTED_QUANTILES, compute_percentiles};
pub use statistics::{CONFIDENCE_Z, SampleStatistics};
