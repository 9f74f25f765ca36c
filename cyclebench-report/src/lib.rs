#![warn(missing_docs)]
//! CycleBench Report - Results and Output Formats
//!
//! Builds per-run results from samples and serializes them:
//! - JSON (JMH-compatible records)
//! - CSV / SCSV (spreadsheet-compatible)
//! - Text (aligned terminal table)

mod csv;
mod json;
mod result;
mod text;

pub use crate::csv::generate_csv_report;
pub use json::generate_json_report;
pub use result::ReportBenchmarkResult;
pub use text::{dense_benchmark_names, generate_text_report};

use thiserror::Error;

/// Report generation errors
#[derive(Debug, Error)]
pub enum ReportError {
    /// Format name not recognized
    #[error("Report format '{0}' is not supported. Accepted values: json, csv, scsv, text.")]
    UnsupportedFormat(String),
    /// JSON serialization failed
    #[error("failed to serialize JSON report: {0}")]
    Json(#[from] serde_json::Error),
    /// CSV serialization failed
    #[error("failed to write CSV report: {0}")]
    Csv(#[from] ::csv::Error),
    /// Serialized output was not UTF-8
    #[error("report is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// Output format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    /// JSON array of records
    #[default]
    Json,
    /// Comma-separated values
    Csv,
    /// Semicolon-separated values
    Scsv,
    /// Aligned text table
    Text,
}

impl ReportFormat {
    /// Serialize `results` in this format
    pub fn format(self, results: &[ReportBenchmarkResult]) -> Result<String, ReportError> {
        match self {
            ReportFormat::Json => Ok(generate_json_report(results)?),
            ReportFormat::Csv => generate_csv_report(results, b','),
            ReportFormat::Scsv => generate_csv_report(results, b';'),
            ReportFormat::Text => Ok(generate_text_report(results)),
        }
    }

    /// Configuration literal of this format
    pub fn as_str(self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Csv => "csv",
            ReportFormat::Scsv => "scsv",
            ReportFormat::Text => "text",
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "csv" => Ok(ReportFormat::Csv),
            "scsv" => Ok(ReportFormat::Scsv),
            "text" => Ok(ReportFormat::Text),
            _ => Err(ReportError::UnsupportedFormat(s.to_string())),
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
