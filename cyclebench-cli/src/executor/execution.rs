//! Benchmark Execution
//!
//! In-process execution of every selected (benchmark, parameter combination)
//! run. Runs execute one at a time, in plan order; a failing run is reported
//! and skipped, the rest of the suite continues.
//!
//! ## Data Flow
//!
//! ```text
//! RunnerConfiguration + registered suites
//!        │
//!        ▼
//!   BenchmarkRun (benchmark, params, effective configuration)
//!        │
//!        ▼
//! ┌──────────────────┐
//! │ measurement      │  Setup → Cycles → Warm-up → Measurement → Teardown
//! │ engine           │
//! └────────┬─────────┘
//!          │
//!          ▼
//!  ReportBenchmarkResult (score, error, percentiles, samples)
//! ```

use super::{ExecutorError, write_file};
use crate::config::RunnerConfiguration;
use crate::planner::{PlannedBenchmark, build_plan, compile_patterns};
use crate::progress::{self, BenchmarkProgress, FinishStatus};
use cyclebench_core::{
    BenchmarkConfiguration, BenchmarkFailure, ParamSet, ParameterCombinations, Suite,
    SuiteDescriptor, execute, run_id,
};
use cyclebench_report::{ReportBenchmarkResult, generate_text_report};

/// One (benchmark, parameter combination) to execute
#[derive(Debug, Clone)]
pub struct BenchmarkRun<'s> {
    /// Selected benchmark
    pub benchmark: PlannedBenchmark<'s>,
    /// Resolved parameter values
    pub params: ParamSet,
    /// Effective configuration
    pub config: BenchmarkConfiguration,
}

impl BenchmarkRun<'_> {
    /// Run identifier used for progress and result correlation
    pub fn id(&self) -> String {
        run_id(&self.benchmark.qualified_name(), &self.params)
    }
}

/// Select benchmarks and expand each into its parameter combinations
pub(super) fn select_runs<'s>(
    suites: &'s [Box<dyn Suite>],
    config: &RunnerConfiguration,
) -> Result<Vec<BenchmarkRun<'s>>, ExecutorError> {
    let include = compile_patterns(&config.include)?;
    let exclude = compile_patterns(&config.exclude)?;
    let plan = build_plan(
        suites.iter().map(|s| s.as_ref() as &dyn Suite),
        &include,
        &exclude,
    );

    let mut runs = Vec::new();
    for benchmark in plan.benchmarks {
        let suite = benchmark.suite;
        let effective = config.resolve(suite.defaults());
        let combinations = ParameterCombinations::new(
            suite.parameters(),
            &config.params,
            suite.default_parameters(),
        )?;
        runs.extend(combinations.map(|params| BenchmarkRun {
            benchmark,
            params,
            config: effective.clone(),
        }));
    }
    Ok(runs)
}

/// Build the result of a completed run and report it
pub(super) fn report_success(
    reporter: &mut dyn BenchmarkProgress,
    execution_name: &str,
    run: &BenchmarkRun<'_>,
    samples: &[f64],
) -> ReportBenchmarkResult {
    let result = ReportBenchmarkResult::create(
        run.benchmark.qualified_name(),
        run.params.clone(),
        run.config.clone(),
        samples,
    );
    reporter.end_benchmark(
        execution_name,
        &run.id(),
        FinishStatus::Success,
        &result.summary_message(),
    );
    result
}

/// Report an aborted run
pub(super) fn report_failure(
    reporter: &mut dyn BenchmarkProgress,
    execution_name: &str,
    id: &str,
    failure: &BenchmarkFailure,
) {
    tracing::warn!(
        benchmark = %id,
        phase = %failure.phase,
        "benchmark failed: {}",
        failure.message
    );
    reporter.end_benchmark_exception(execution_name, id, &failure.message, &failure.stacktrace);
}

fn execute_run(
    reporter: &mut dyn BenchmarkProgress,
    execution_name: &str,
    run: &BenchmarkRun<'_>,
) -> Option<ReportBenchmarkResult> {
    let id = run.id();
    tracing::debug!(benchmark = %id, config = %run.config, "running benchmark");
    reporter.start_benchmark(execution_name, &id);

    let outcome = execute(
        run.benchmark.suite,
        run.benchmark.index,
        &run.params,
        &run.config,
        &mut |line: &str| reporter.output(execution_name, &id, line),
    );

    match outcome {
        Ok(samples) => Some(report_success(reporter, execution_name, run, &samples)),
        Err(failure) => {
            report_failure(reporter, execution_name, &id, &failure);
            None
        }
    }
}

/// Runs registered suites under one runner configuration
pub struct SuiteExecutor {
    pub(super) execution_name: String,
    pub(super) config: RunnerConfiguration,
    pub(super) reporter: Box<dyn BenchmarkProgress>,
    pub(super) suites: Vec<Box<dyn Suite>>,
    pub(super) results: Vec<ReportBenchmarkResult>,
}

impl SuiteExecutor {
    /// Executor reporting progress to standard output
    pub fn new(execution_name: impl Into<String>, config: RunnerConfiguration) -> Self {
        let reporter = progress::create(config.trace_format, Box::new(std::io::stdout()));
        Self::with_reporter(execution_name, config, reporter)
    }

    /// Executor reporting progress to `reporter`
    pub fn with_reporter(
        execution_name: impl Into<String>,
        config: RunnerConfiguration,
        reporter: Box<dyn BenchmarkProgress>,
    ) -> Self {
        Self {
            execution_name: execution_name.into(),
            config,
            reporter,
            suites: Vec::new(),
            results: Vec::new(),
        }
    }

    /// Register a suite
    pub fn suite<T: 'static>(&mut self, descriptor: SuiteDescriptor<T>) -> &mut Self {
        self.add_suite(Box::new(descriptor))
    }

    /// Register an already type-erased suite
    pub fn add_suite(&mut self, suite: Box<dyn Suite>) -> &mut Self {
        self.suites.push(suite);
        self
    }

    /// Name of this execution
    pub fn execution_name(&self) -> &str {
        &self.execution_name
    }

    /// Runner configuration in effect
    pub fn config(&self) -> &RunnerConfiguration {
        &self.config
    }

    /// Results collected so far
    pub fn results(&self) -> &[ReportBenchmarkResult] {
        &self.results
    }

    /// Run every selected benchmark, then report and write the report file
    pub fn run(&mut self) -> Result<(), ExecutorError> {
        let runs = select_runs(&self.suites, &self.config)?;
        self.results.clear();
        tracing::info!(
            execution = %self.execution_name,
            runs = runs.len(),
            "starting benchmark suite"
        );

        self.reporter.start_suite(&self.execution_name);
        for run in &runs {
            if let Some(result) = execute_run(self.reporter.as_mut(), &self.execution_name, run) {
                self.results.push(result);
            }
        }

        self.complete()
    }

    /// Summarize collected results and write the report file
    pub(super) fn complete(&mut self) -> Result<(), ExecutorError> {
        let summary = generate_text_report(&self.results);
        self.reporter.end_suite(&self.execution_name, &summary);

        let report = self.config.report_format.format(&self.results)?;
        write_file(&self.config.report_file, &report)?;
        tracing::info!(
            results = self.results.len(),
            path = %self.config.report_file.display(),
            format = %self.config.report_format,
            "benchmark suite finished"
        );
        Ok(())
    }
}
