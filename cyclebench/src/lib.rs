#![warn(missing_docs)]
//! # cyclebench
//!
//! Microbenchmark runtime for Rust.
//!
//! - **Suites**: a state factory plus named benchmark functions, optionally
//!   parameterized, with setup and teardown hooks
//! - **Measurement**: cycle estimation against an iteration time budget,
//!   warm-up iterations, then timed measurement iterations
//! - **Failure Isolation**: a panicking benchmark is reported and the rest
//!   of the suite keeps running
//! - **Statistics**: mean, 95% confidence error and a fixed percentile table
//! - **Reports**: JSON, CSV, semicolon CSV and an aligned text table
//! - **Progress**: plain console lines or structured IDE events
//!
//! ## Quick Start
//!
//! ```ignore
//! use cyclebench::{BenchmarkDescriptor, SuiteDescriptor};
//!
//! fn main() -> anyhow::Result<()> {
//!     let suite = SuiteDescriptor::new("demo.Vectors", Vec::<u64>::new)
//!         .with_parameter("size", ["10", "1000"])
//!         .with_parametrize(|v, params| {
//!             let size = params.get("size").and_then(|s| s.parse().ok()).unwrap_or(0);
//!             *v = (0..size).collect();
//!         })
//!         .with_benchmark(BenchmarkDescriptor::new("sum", |v: &mut Vec<u64>| {
//!             v.iter().sum::<u64>()
//!         }));
//!     cyclebench::run(vec![Box::new(suite)])
//! }
//! ```
//!
//! The binary takes the runner configuration file as its first argument.
//!
//! ## Async Benchmarks
//!
//! ```ignore
//! BenchmarkDescriptor::asynchronous("sleep", |_: &mut ()| {
//!     Box::pin(async { tokio::time::sleep(Duration::from_micros(10)).await })
//! })
//! ```

// Re-export the descriptor model and engine
pub use cyclebench_core::{
    AdvancedOptions, BenchFuture, BenchmarkConfiguration, BenchmarkDescriptor, BenchmarkFailure,
    BenchmarkOverrides, Blackhole, ConfigError, IterationTime, Mode, NativeFork, ParamSet,
    ParameterError, ParameterValues, Phase, Suite, SuiteDefaults, SuiteDescriptor, TimeUnit,
    execute, run_id,
};

// Re-export statistics
pub use cyclebench_stats::{PercentileTable, REPORTED_QUANTILES, SampleStatistics};

// Re-export reports
pub use cyclebench_report::{ReportBenchmarkResult, ReportError, ReportFormat};

// Re-export the runner
pub use cyclebench_cli::{
    BenchmarkProgress, Cli, ConsoleProgress, ExecutorError, FinishStatus, ForkAction,
    IntelliJProgress, ProgressState, RunDescriptor, RunnerConfiguration, SuiteExecutor,
    TraceFormat, run, run_with_cli,
};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Blackhole, BenchmarkDescriptor, Mode, ParamSet, SuiteDefaults, SuiteDescriptor, TimeUnit,
    };
}
