//! Benchmark Results
//!
//! One [`ReportBenchmarkResult`] per successful (benchmark, parameter
//! combination) run. Samples arrive already converted to the configured unit
//! and mode; statistics are computed on them as-is.

use cyclebench_core::{BenchmarkConfiguration, ParamSet, run_id};
use cyclebench_stats::{PercentileTable, SampleStatistics, format_significant, is_nan_or_zero};

/// Summary statistics of one benchmark run
#[derive(Debug, Clone, PartialEq)]
pub struct ReportBenchmarkResult {
    /// Fully qualified benchmark name
    pub benchmark: String,
    /// Parameter values the run used
    pub params: ParamSet,
    /// Effective configuration
    pub config: BenchmarkConfiguration,
    /// Mean of the samples
    pub score: f64,
    /// Half-width of the 95% confidence interval
    pub error: f64,
    /// `(score - error, score + error)`
    pub confidence: (f64, f64),
    /// Fixed percentile table over the samples
    pub percentiles: PercentileTable,
    /// Samples in run order
    pub values: Vec<f64>,
}

impl ReportBenchmarkResult {
    /// Compute statistics over `samples` and build the result
    pub fn create(
        benchmark: impl Into<String>,
        params: ParamSet,
        config: BenchmarkConfiguration,
        samples: &[f64],
    ) -> Self {
        let statistics = SampleStatistics::new(samples);

        Self {
            benchmark: benchmark.into(),
            params,
            config,
            score: statistics.mean(),
            error: statistics.error_margin(),
            confidence: statistics.confidence_interval(),
            percentiles: PercentileTable::from_statistics(&statistics),
            values: samples.to_vec(),
        }
    }

    /// Run identifier, `name` or `name | k=v, ...`
    pub fn run_id(&self) -> String {
        run_id(&self.benchmark, &self.params)
    }

    /// Progress line closing a successful run: `  ~ <score> ±<relative error>%`
    pub fn summary_message(&self) -> String {
        let score = self.config.sample_to_text(self.score);
        if is_nan_or_zero(self.error) {
            format!("  ~ {score}")
        } else {
            let relative = format_significant(self.error / self.score * 100.0, 2);
            format!("  ~ {score} ±{relative}%")
        }
    }
}
