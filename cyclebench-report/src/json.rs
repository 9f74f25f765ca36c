//! JSON Output
//!
//! One record per result, shaped after the JMH result format so existing
//! tooling can read it.

use crate::result::ReportBenchmarkResult;
use cyclebench_core::{AdvancedOptions, ParamSet};
use cyclebench_stats::PercentileTable;
use serde::{Serialize, Serializer};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonRecord<'a> {
    benchmark: &'a str,
    mode: &'static str,
    warmup_iterations: u32,
    warmup_time: String,
    measurement_iterations: u32,
    measurement_time: String,
    #[serde(serialize_with = "ordered_params")]
    params: &'a ParamSet,
    #[serde(serialize_with = "ordered_advanced")]
    advanced: &'a AdvancedOptions,
    primary_metric: PrimaryMetric<'a>,
    secondary_metrics: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrimaryMetric<'a> {
    score: f64,
    score_error: f64,
    score_confidence: [f64; 2],
    #[serde(serialize_with = "percentile_keys")]
    score_percentiles: &'a PercentileTable,
    score_unit: String,
    raw_data: [&'a [f64]; 1],
}

fn ordered_params<S: Serializer>(params: &&ParamSet, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_map(params.iter())
}

fn ordered_advanced<S: Serializer>(
    advanced: &&AdvancedOptions,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(advanced.iter())
}

fn percentile_keys<S: Serializer>(
    table: &&PercentileTable,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(
        table
            .iter()
            .map(|(percent, value)| (format!("{percent:.2}"), value)),
    )
}

impl<'a> From<&'a ReportBenchmarkResult> for JsonRecord<'a> {
    fn from(result: &'a ReportBenchmarkResult) -> Self {
        let config = &result.config;
        Self {
            benchmark: &result.benchmark,
            mode: config.mode.short_text(),
            warmup_iterations: config.warmups,
            warmup_time: config.iteration_time.to_string(),
            measurement_iterations: config.iterations,
            measurement_time: config.iteration_time.to_string(),
            params: &result.params,
            advanced: &config.advanced,
            primary_metric: PrimaryMetric {
                score: result.score,
                score_error: result.error,
                score_confidence: [result.confidence.0, result.confidence.1],
                score_percentiles: &result.percentiles,
                score_unit: config.unit_text(),
                raw_data: [&result.values],
            },
            secondary_metrics: serde_json::Map::new(),
        }
    }
}

/// Generate a prettified JSON report.
pub fn generate_json_report(results: &[ReportBenchmarkResult]) -> Result<String, serde_json::Error> {
    let records: Vec<JsonRecord<'_>> = results.iter().map(JsonRecord::from).collect();
    serde_json::to_string_pretty(&records)
}
