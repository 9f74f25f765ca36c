//! Suite Executor
//!
//! Runs the selected benchmarks and produces the report.
//!
//! ## Pipeline Overview
//!
//! ```text
//! SuiteDescriptor (registered)
//!       │
//!       ▼
//! ┌─────────────┐
//! │   planner   │  include / exclude, registration order
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │  execution  │  one run per parameter combination, progress streamed
//! └──────┬──────┘
//!        │
//!        ▼
//! ┌─────────────┐
//! │   report    │  text summary to the reporter, formatted report to file
//! └─────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`execution`] - In-process execution of every selected run
//! - [`fork`] - Single-step actions for one process per iteration

mod execution;
mod fork;

pub use execution::{BenchmarkRun, SuiteExecutor};
pub use fork::{ForkAction, RunDescriptor};

use cyclebench_core::{ConfigError, ParameterError};
use cyclebench_report::ReportError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole run
#[derive(Debug, Error)]
pub enum ExecutorError {
    /// Invalid runner configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A declared parameter has no values
    #[error(transparent)]
    Parameter(#[from] ParameterError),

    /// Include or exclude pattern is not a valid regex
    #[error("invalid benchmark pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Report could not be produced
    #[error(transparent)]
    Report(#[from] ReportError),

    /// File access failed
    #[error("failed to {action} {}: {source}", path.display())]
    Io {
        /// What was attempted
        action: &'static str,
        /// File involved
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// A fork-protocol file has unexpected contents
    #[error("malformed {kind} file {}: {detail}", path.display())]
    ForkFile {
        /// Which protocol file
        kind: &'static str,
        /// File involved
        path: PathBuf,
        /// What was wrong
        detail: String,
    },

    /// A run descriptor names a benchmark that is not selected
    #[error("Benchmark {0} wasn't found.")]
    UnknownBenchmark(String),
}

pub(crate) fn read_file(path: &std::path::Path) -> Result<String, ExecutorError> {
    std::fs::read_to_string(path).map_err(|source| ExecutorError::Io {
        action: "read",
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn write_file(path: &std::path::Path, contents: &str) -> Result<(), ExecutorError> {
    let io_error = |source: std::io::Error| ExecutorError::Io {
        action: "write",
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_error)?;
    }
    std::fs::write(path, contents).map_err(io_error)
}
