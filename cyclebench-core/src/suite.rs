//! Type-Erased Suites and Sessions
//!
//! The executor drives suites of unrelated instance types through one
//! object-safe seam. [`Suite`] exposes a suite's metadata and opens a
//! [`BenchmarkSession`], which owns the live instance and the shared sink
//! for one (benchmark, parameter combination) run.
//!
//! ```text
//! Suite::open_session ──► Setup ──► run_cycles × N ──► close (teardown)
//! ```

use crate::blackhole::Blackhole;
use crate::config::SuiteDefaults;
use crate::descriptor::{
    AsyncBlackholeFn, AsyncFn, BenchmarkFunction, BlackholeFn, PlainFn, SuiteDescriptor,
};
use crate::failure::{BenchmarkFailure, Phase, capture};
use crate::measure::Timer;
use crate::params::{ParamSet, ParameterValues};
use tokio::runtime::{Builder, Runtime};

/// A live benchmark instance ready to be timed
pub trait BenchmarkSession {
    /// Run `cycles` invocations back-to-back inside one timed block,
    /// returning the elapsed nanoseconds
    fn run_cycles(&mut self, cycles: u64) -> u64;

    /// Flush the shared sink, returning how many values it swallowed
    fn flush_blackhole(&mut self) -> u64;

    /// Run the teardown hook and flush the sink
    fn close(self: Box<Self>);
}

/// Object-safe view of a [`SuiteDescriptor`]
pub trait Suite {
    /// Suite name
    fn name(&self) -> &str;

    /// Suite-level defaults
    fn defaults(&self) -> &SuiteDefaults;

    /// Declared parameter names, in order
    fn parameters(&self) -> &[String];

    /// Declared default values per parameter
    fn default_parameters(&self) -> &ParameterValues;

    /// Benchmark names (without the suite prefix), in insertion order
    fn benchmark_names(&self) -> Vec<&str>;

    /// Number of benchmarks
    fn benchmark_count(&self) -> usize;

    /// Name of the benchmark at `index`
    fn benchmark_name(&self, index: usize) -> Option<&str>;

    /// Build, parametrize and set up an instance for the benchmark at `index`
    fn open_session(
        &self,
        index: usize,
        params: &ParamSet,
    ) -> Result<Box<dyn BenchmarkSession + '_>, BenchmarkFailure>;
}

enum Driver<'a, T> {
    Plain(&'a PlainFn<T>),
    WithBlackhole(&'a BlackholeFn<T>),
    Async(&'a AsyncFn<T>, Runtime),
    AsyncWithBlackhole(&'a AsyncBlackholeFn<T>, Runtime),
}

struct Session<'a, T> {
    suite: &'a SuiteDescriptor<T>,
    instance: T,
    blackhole: Blackhole,
    driver: Driver<'a, T>,
}

fn current_thread_runtime() -> Result<Runtime, BenchmarkFailure> {
    Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| BenchmarkFailure::new(Phase::Setup, format!("failed to start async runtime: {e}")))
}

impl<T> BenchmarkSession for Session<'_, T> {
    fn run_cycles(&mut self, cycles: u64) -> u64 {
        let Session {
            instance,
            blackhole,
            driver,
            ..
        } = self;

        match driver {
            Driver::Plain(f) => {
                let timer = Timer::start();
                for _ in 0..cycles {
                    f(&mut *instance);
                }
                timer.stop()
            }
            Driver::WithBlackhole(f) => {
                let timer = Timer::start();
                for _ in 0..cycles {
                    f(&mut *instance, &mut *blackhole);
                }
                timer.stop()
            }
            Driver::Async(f, runtime) => {
                let timer = Timer::start();
                for _ in 0..cycles {
                    runtime.block_on(f(&mut *instance));
                }
                timer.stop()
            }
            Driver::AsyncWithBlackhole(f, runtime) => {
                let timer = Timer::start();
                for _ in 0..cycles {
                    runtime.block_on(f(&mut *instance, &mut *blackhole));
                }
                timer.stop()
            }
        }
    }

    fn flush_blackhole(&mut self) -> u64 {
        self.blackhole.flush()
    }

    fn close(mut self: Box<Self>) {
        self.suite.teardown_instance(&mut self.instance);
        self.blackhole.flush();
    }
}

impl<T: 'static> Suite for SuiteDescriptor<T> {
    fn name(&self) -> &str {
        SuiteDescriptor::name(self)
    }

    fn defaults(&self) -> &SuiteDefaults {
        SuiteDescriptor::defaults(self)
    }

    fn parameters(&self) -> &[String] {
        SuiteDescriptor::parameters(self)
    }

    fn default_parameters(&self) -> &ParameterValues {
        SuiteDescriptor::default_parameters(self)
    }

    fn benchmark_names(&self) -> Vec<&str> {
        self.benchmarks().map(|b| b.benchmark.name()).collect()
    }

    fn benchmark_count(&self) -> usize {
        self.len()
    }

    fn benchmark_name(&self, index: usize) -> Option<&str> {
        self.benchmark(index).map(|b| b.benchmark.name())
    }

    fn open_session(
        &self,
        index: usize,
        params: &ParamSet,
    ) -> Result<Box<dyn BenchmarkSession + '_>, BenchmarkFailure> {
        let benchmark = self.benchmark(index).ok_or_else(|| {
            BenchmarkFailure::new(
                Phase::Setup,
                format!("suite '{}' has no benchmark #{index}", SuiteDescriptor::name(self)),
            )
        })?;

        let driver = match benchmark.benchmark.function() {
            BenchmarkFunction::Plain(f) => Driver::Plain(f.as_ref()),
            BenchmarkFunction::WithBlackhole(f) => Driver::WithBlackhole(f.as_ref()),
            BenchmarkFunction::Async(f) => Driver::Async(f.as_ref(), current_thread_runtime()?),
            BenchmarkFunction::AsyncWithBlackhole(f) => {
                Driver::AsyncWithBlackhole(f.as_ref(), current_thread_runtime()?)
            }
        };

        let instance = capture(Phase::Setup, || self.prepare_instance(params))?;

        Ok(Box::new(Session {
            suite: self,
            instance,
            blackhole: Blackhole::new(),
            driver,
        }))
    }
}
