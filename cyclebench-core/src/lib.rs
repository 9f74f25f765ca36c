#![warn(missing_docs)]
//! CycleBench Core - Descriptors and Measurement
//!
//! This crate provides the execution side of a benchmark run:
//! - `SuiteDescriptor` / `BenchmarkDescriptor` describing what to measure
//! - `BenchmarkConfiguration` merging runner overrides over suite defaults
//! - The measurement engine (cycle estimation, warm-up, measurement)
//! - Panic capture isolating one failing benchmark from the rest

mod blackhole;
mod config;
mod descriptor;
mod engine;
mod failure;
mod measure;
mod params;
mod suite;
mod units;

pub use blackhole::Blackhole;
pub use config::{
    AdvancedOptions, BenchmarkConfiguration, BenchmarkOverrides, ConfigError, JvmForks,
    NativeFork, SuiteDefaults,
};
pub use descriptor::{
    AsyncBlackholeFn, AsyncFn, BenchFuture, BenchmarkDescriptor, BenchmarkFunction, BenchmarkRef,
    BlackholeFn, PlainFn, SuiteDescriptor,
};
pub use engine::{
    MeasurementEngine, execute, execute_iteration, execute_warmup, run_benchmark, with_session,
};
pub use failure::{BenchmarkFailure, Phase, capture, panic_message};
pub use measure::{Timer, per_operation};
pub use params::{ParamSet, ParameterCombinations, ParameterError, ParameterValues, run_id};
pub use suite::{BenchmarkSession, Suite};
pub use units::{IterationTime, Mode, TimeUnit};
