//! Forked Iteration Protocol
//!
//! With `nativeFork=perIteration` every warm-up and measurement iteration
//! runs in a fresh process. The driver re-invokes the executor once per
//! step; state travels between invocations through small files:
//!
//! ```text
//! --list           → <dir>/<suite>_<benchmark>_<n>.json   (run descriptors)
//! --warmup k       → cycles file            ("<cycles>" or "null")
//! --iteration i    → sample file            ("<sample>" or "null")
//! --end-run        ← "s1, s2, ..."          emits end of benchmark
//! --benchmark      → "s1, s2, ..."          whole run in one process
//! --store-results  ← "<run-file>: s1, s2"   per line, writes the report
//! ```
//!
//! The progress file carries the structured reporter's cursor between
//! invocations so class groups open and close exactly once.

use super::execution::{BenchmarkRun, report_failure, report_success, select_runs};
use super::{ExecutorError, SuiteExecutor, read_file, write_file};
use crate::config::RunnerConfiguration;
use crate::planner::{PlannedBenchmark, build_plan, compile_patterns};
use crate::progress::ProgressState;
use cyclebench_core::{
    BenchmarkConfiguration, ParamSet, Suite, execute, execute_iteration, execute_warmup,
};
use cyclebench_report::ReportBenchmarkResult;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One step of the forked protocol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForkAction {
    /// Start the suite and write one run descriptor per run into `dir`
    List {
        /// Persisted reporter state
        progress_file: PathBuf,
        /// Output directory for run descriptors
        dir: PathBuf,
    },
    /// Estimate cycles and run warm-up iteration `iteration`
    Warmup {
        /// Persisted reporter state
        progress_file: PathBuf,
        /// Run descriptor
        run_file: PathBuf,
        /// Warm-up index
        iteration: u32,
        /// Receives the cycle count
        result_file: PathBuf,
    },
    /// Run measurement iteration `iteration` with a known cycle count
    Iteration {
        /// Persisted reporter state
        progress_file: PathBuf,
        /// Run descriptor
        run_file: PathBuf,
        /// Measurement index
        iteration: u32,
        /// Cycle count written by the warm-up step
        cycles_file: PathBuf,
        /// Receives the sample
        result_file: PathBuf,
    },
    /// Run a whole benchmark in this process
    Benchmark {
        /// Persisted reporter state
        progress_file: PathBuf,
        /// Run descriptor
        run_file: PathBuf,
        /// Receives the samples
        result_file: PathBuf,
    },
    /// Finish a forked benchmark from its collected samples
    EndRun {
        /// Persisted reporter state
        progress_file: PathBuf,
        /// Run descriptor
        run_file: PathBuf,
        /// Collected samples
        samples_file: PathBuf,
    },
    /// Rebuild all results and write the report
    StoreResults {
        /// Persisted reporter state
        progress_file: PathBuf,
        /// One `<run-file>: <samples>` line per run
        results_file: PathBuf,
    },
}

impl ForkAction {
    /// Progress file shared by every step
    pub fn progress_file(&self) -> &Path {
        match self {
            ForkAction::List { progress_file, .. }
            | ForkAction::Warmup { progress_file, .. }
            | ForkAction::Iteration { progress_file, .. }
            | ForkAction::Benchmark { progress_file, .. }
            | ForkAction::EndRun { progress_file, .. }
            | ForkAction::StoreResults { progress_file, .. } => progress_file,
        }
    }

    /// Command-line flag selecting this action
    pub fn keyword(&self) -> &'static str {
        match self {
            ForkAction::List { .. } => "--list",
            ForkAction::Warmup { .. } => "--warmup",
            ForkAction::Iteration { .. } => "--iteration",
            ForkAction::Benchmark { .. } => "--benchmark",
            ForkAction::EndRun { .. } => "--end-run",
            ForkAction::StoreResults { .. } => "--store-results",
        }
    }
}

/// Persisted description of one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunDescriptor {
    /// Fully qualified benchmark name
    pub benchmark: String,
    /// Effective configuration
    pub configuration: BenchmarkConfiguration,
    /// Resolved parameter values
    pub parameters: ParamSet,
}

impl RunDescriptor {
    /// Read a descriptor written by `--list`
    pub fn load(path: &Path) -> Result<Self, ExecutorError> {
        let text = read_file(path)?;
        serde_json::from_str(&text).map_err(|e| ExecutorError::ForkFile {
            kind: "run descriptor",
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    fn save(&self, path: &Path) -> Result<(), ExecutorError> {
        let text = serde_json::to_string_pretty(self).map_err(|e| ExecutorError::ForkFile {
            kind: "run descriptor",
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        write_file(path, &text)
    }
}

fn find_benchmark<'s>(
    suites: &'s [Box<dyn Suite>],
    config: &RunnerConfiguration,
    name: &str,
) -> Result<PlannedBenchmark<'s>, ExecutorError> {
    let include = compile_patterns(&config.include)?;
    let exclude = compile_patterns(&config.exclude)?;
    build_plan(
        suites.iter().map(|s| s.as_ref() as &dyn Suite),
        &include,
        &exclude,
    )
    .benchmarks
    .into_iter()
    .find(|b| b.qualified_name() == name)
    .ok_or_else(|| ExecutorError::UnknownBenchmark(name.to_string()))
}

fn load_run<'s>(
    suites: &'s [Box<dyn Suite>],
    config: &RunnerConfiguration,
    run_file: &Path,
) -> Result<BenchmarkRun<'s>, ExecutorError> {
    let descriptor = RunDescriptor::load(run_file)?;
    Ok(BenchmarkRun {
        benchmark: find_benchmark(suites, config, &descriptor.benchmark)?,
        params: descriptor.parameters,
        config: descriptor.configuration,
    })
}

fn parse_samples(kind: &'static str, path: &Path, text: &str) -> Result<Vec<f64>, ExecutorError> {
    let malformed = |detail: String| ExecutorError::ForkFile {
        kind,
        path: path.to_path_buf(),
        detail,
    };
    let text = text.trim();
    if text.is_empty() {
        return Err(malformed("no samples".to_string()));
    }
    text.split(',')
        .map(|sample| {
            let sample = sample.trim();
            sample
                .parse::<f64>()
                .map_err(|_| malformed(format!("'{sample}' is not a sample")))
        })
        .collect()
}

fn read_cycles(path: &Path) -> Result<u64, ExecutorError> {
    if !path.exists() {
        return Ok(1);
    }
    let text = read_file(path)?;
    match text.trim() {
        "" | "null" => Ok(1),
        count => count.parse().map_err(|_| ExecutorError::ForkFile {
            kind: "cycles",
            path: path.to_path_buf(),
            detail: format!("'{count}' is not a cycle count"),
        }),
    }
}

fn join_samples(samples: &[f64]) -> String {
    samples
        .iter()
        .map(f64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl SuiteExecutor {
    /// Perform one step of the forked protocol
    pub fn run_action(&mut self, action: &ForkAction) -> Result<(), ExecutorError> {
        let progress_file = action.progress_file();
        if progress_file.exists() {
            let state = ProgressState::decode(&read_file(progress_file)?);
            self.reporter.restore(state);
        }

        match action {
            ForkAction::List { dir, .. } => self.list_runs(dir)?,
            ForkAction::Warmup {
                run_file,
                iteration,
                result_file,
                ..
            } => self.warmup_step(run_file, *iteration, result_file)?,
            ForkAction::Iteration {
                run_file,
                iteration,
                cycles_file,
                result_file,
                ..
            } => self.iteration_step(run_file, *iteration, cycles_file, result_file)?,
            ForkAction::Benchmark {
                run_file,
                result_file,
                ..
            } => self.benchmark_step(run_file, result_file)?,
            ForkAction::EndRun {
                run_file,
                samples_file,
                ..
            } => self.end_run(run_file, samples_file)?,
            ForkAction::StoreResults { results_file, .. } => self.store_results(results_file)?,
        }

        if let Some(state) = self.reporter.state() {
            write_file(progress_file, &state.encode())?;
        }
        Ok(())
    }

    fn list_runs(&mut self, dir: &Path) -> Result<(), ExecutorError> {
        let runs = select_runs(&self.suites, &self.config)?;
        self.reporter.start_suite(&self.execution_name);

        let mut previous = String::new();
        let mut n = 0;
        for run in &runs {
            let name = run.benchmark.qualified_name();
            if name != previous {
                n = 0;
                previous.clone_from(&name);
            }
            let file = dir.join(format!(
                "{}_{}_{n}.json",
                run.benchmark.suite.name(),
                run.benchmark.name()
            ));
            RunDescriptor {
                benchmark: name,
                configuration: run.config.clone(),
                parameters: run.params.clone(),
            }
            .save(&file)?;
            n += 1;
        }

        tracing::info!(runs = runs.len(), dir = %dir.display(), "wrote run descriptors");
        Ok(())
    }

    fn warmup_step(
        &mut self,
        run_file: &Path,
        k: u32,
        result_file: &Path,
    ) -> Result<(), ExecutorError> {
        let run = load_run(&self.suites, &self.config, run_file)?;
        let id = run.id();
        let name = &self.execution_name;
        let reporter = self.reporter.as_mut();

        if k == 0 {
            reporter.start_benchmark(name, &id);
        }
        let outcome = execute_warmup(
            run.benchmark.suite,
            run.benchmark.index,
            &run.params,
            &run.config,
            k,
            &mut |line: &str| reporter.output(name, &id, line),
        );

        match outcome {
            Ok(cycles) => write_file(result_file, &cycles.to_string()),
            Err(failure) => {
                report_failure(reporter, name, &id, &failure);
                write_file(result_file, "null")
            }
        }
    }

    fn iteration_step(
        &mut self,
        run_file: &Path,
        i: u32,
        cycles_file: &Path,
        result_file: &Path,
    ) -> Result<(), ExecutorError> {
        let run = load_run(&self.suites, &self.config, run_file)?;
        let cycles = read_cycles(cycles_file)?;
        let id = run.id();
        let name = &self.execution_name;
        let reporter = self.reporter.as_mut();

        let outcome = execute_iteration(
            run.benchmark.suite,
            run.benchmark.index,
            &run.params,
            &run.config,
            i,
            cycles,
            &mut |line: &str| reporter.output(name, &id, line),
        );

        match outcome {
            Ok(sample) => write_file(result_file, &sample.to_string()),
            Err(failure) => {
                report_failure(reporter, name, &id, &failure);
                write_file(result_file, "null")
            }
        }
    }

    fn benchmark_step(&mut self, run_file: &Path, result_file: &Path) -> Result<(), ExecutorError> {
        let run = load_run(&self.suites, &self.config, run_file)?;
        let id = run.id();
        let name = &self.execution_name;
        let reporter = self.reporter.as_mut();

        reporter.start_benchmark(name, &id);
        let outcome = execute(
            run.benchmark.suite,
            run.benchmark.index,
            &run.params,
            &run.config,
            &mut |line: &str| reporter.output(name, &id, line),
        );

        match outcome {
            Ok(samples) => {
                write_file(result_file, &join_samples(&samples))?;
                report_success(reporter, name, &run, &samples);
            }
            Err(failure) => report_failure(reporter, name, &id, &failure),
        }
        Ok(())
    }

    fn end_run(&mut self, run_file: &Path, samples_file: &Path) -> Result<(), ExecutorError> {
        let samples = parse_samples("samples", samples_file, &read_file(samples_file)?)?;
        let run = load_run(&self.suites, &self.config, run_file)?;
        report_success(self.reporter.as_mut(), &self.execution_name, &run, &samples);
        Ok(())
    }

    fn store_results(&mut self, results_file: &Path) -> Result<(), ExecutorError> {
        let text = read_file(results_file)?;
        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            let (run_file, samples) =
                line.rsplit_once(": ").ok_or_else(|| ExecutorError::ForkFile {
                    kind: "results",
                    path: results_file.to_path_buf(),
                    detail: format!("expected '<run-file>: <samples>', found '{line}'"),
                })?;
            let samples = parse_samples("results", results_file, samples)?;
            let run = load_run(&self.suites, &self.config, Path::new(run_file))?;
            self.results.push(ReportBenchmarkResult::create(
                run.benchmark.qualified_name(),
                run.params,
                run.config,
                &samples,
            ));
        }
        self.complete()
    }
}
