#![warn(missing_docs)]
//! cyclebench CLI Library
//!
//! Process entry point for benchmark binaries: reads the runner
//! configuration, executes the registered suites and writes the report.
//! Use `cyclebench::run()` (or `cyclebench_cli::run()`) in your main
//! function.
//!
//! # Example
//!
//! ```ignore
//! use cyclebench::{BenchmarkDescriptor, SuiteDescriptor};
//!
//! fn main() -> anyhow::Result<()> {
//!     let suite = SuiteDescriptor::new("demo.Strings", String::new)
//!         .with_benchmark(BenchmarkDescriptor::new("push", |s: &mut String| s.push('x')));
//!     cyclebench_cli::run(vec![Box::new(suite)])
//! }
//! ```
//!
//! The first argument is always the runner configuration file. When the
//! driver forks one process per iteration it appends one of the actions
//! described in [`ForkAction`].

mod config;
mod executor;
mod planner;
mod progress;

pub use config::{RunnerConfiguration, TraceFormat};
pub use executor::{BenchmarkRun, ExecutorError, ForkAction, RunDescriptor, SuiteExecutor};
pub use planner::{ExecutionPlan, PlannedBenchmark, build_plan, compile_patterns};
pub use progress::{
    BenchmarkProgress, ConsoleProgress, FinishStatus, IntelliJProgress, ProgressState,
};

use anyhow::Context;
use clap::{ArgGroup, Parser};
use cyclebench_core::{NativeFork, Suite};
use std::path::PathBuf;

/// cyclebench CLI arguments
#[derive(Parser, Debug)]
#[command(name = "cyclebench")]
#[command(version, about = "cyclebench - microbenchmark runner")]
#[command(group(ArgGroup::new("action").multiple(false)))]
pub struct Cli {
    /// Runner configuration file
    pub config: PathBuf,

    /// Start the suite and write run descriptors into DIR
    #[arg(long, num_args = 2, value_names = ["PROGRESS_FILE", "DIR"], group = "action")]
    pub list: Option<Vec<String>>,

    /// Run warm-up iteration K of one run and write its cycle count
    #[arg(
        long,
        num_args = 4,
        value_names = ["PROGRESS_FILE", "RUN_FILE", "K", "RESULT_FILE"],
        group = "action"
    )]
    pub warmup: Option<Vec<String>>,

    /// Run measurement iteration I of one run and write its sample
    #[arg(
        long,
        num_args = 5,
        value_names = ["PROGRESS_FILE", "RUN_FILE", "I", "CYCLES_FILE", "RESULT_FILE"],
        group = "action"
    )]
    pub iteration: Option<Vec<String>>,

    /// Run one whole benchmark and write its samples
    #[arg(
        long,
        num_args = 3,
        value_names = ["PROGRESS_FILE", "RUN_FILE", "RESULT_FILE"],
        group = "action"
    )]
    pub benchmark: Option<Vec<String>>,

    /// Finish one run from its collected samples
    #[arg(
        long,
        num_args = 3,
        value_names = ["PROGRESS_FILE", "RUN_FILE", "SAMPLES_FILE"],
        group = "action"
    )]
    pub end_run: Option<Vec<String>>,

    /// Rebuild all results and write the report
    #[arg(
        long,
        num_args = 2,
        value_names = ["PROGRESS_FILE", "RESULTS_FILE"],
        group = "action"
    )]
    pub store_results: Option<Vec<String>>,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Fork action selected on the command line, if any
    pub fn action(&self) -> anyhow::Result<Option<ForkAction>> {
        let path = |values: &[String], i: usize| PathBuf::from(&values[i]);
        let index = |values: &[String], i: usize, what: &str| -> anyhow::Result<u32> {
            values[i]
                .parse()
                .with_context(|| format!("invalid {what} index '{}'", values[i]))
        };

        let action = if let Some(v) = &self.list {
            ForkAction::List {
                progress_file: path(v, 0),
                dir: path(v, 1),
            }
        } else if let Some(v) = &self.warmup {
            ForkAction::Warmup {
                progress_file: path(v, 0),
                run_file: path(v, 1),
                iteration: index(v, 2, "warm-up")?,
                result_file: path(v, 3),
            }
        } else if let Some(v) = &self.iteration {
            ForkAction::Iteration {
                progress_file: path(v, 0),
                run_file: path(v, 1),
                iteration: index(v, 2, "iteration")?,
                cycles_file: path(v, 3),
                result_file: path(v, 4),
            }
        } else if let Some(v) = &self.benchmark {
            ForkAction::Benchmark {
                progress_file: path(v, 0),
                run_file: path(v, 1),
                result_file: path(v, 2),
            }
        } else if let Some(v) = &self.end_run {
            ForkAction::EndRun {
                progress_file: path(v, 0),
                run_file: path(v, 1),
                samples_file: path(v, 2),
            }
        } else if let Some(v) = &self.store_results {
            ForkAction::StoreResults {
                progress_file: path(v, 0),
                results_file: path(v, 1),
            }
        } else {
            return Ok(None);
        };
        Ok(Some(action))
    }
}

/// Run the registered suites using the process arguments.
/// This is the main entry point for benchmark binaries.
pub fn run(suites: Vec<Box<dyn Suite>>) -> anyhow::Result<()> {
    run_with_cli(Cli::parse(), suites)
}

/// Run the registered suites with pre-parsed arguments.
pub fn run_with_cli(cli: Cli, suites: Vec<Box<dyn Suite>>) -> anyhow::Result<()> {
    init_logging(cli.verbose);

    let config = RunnerConfiguration::load(&cli.config)?;
    let action = cli.action()?;
    let fork = config.advanced.native_fork();

    let mut executor = SuiteExecutor::new(config.name.clone(), config);
    for suite in suites {
        executor.add_suite(suite);
    }

    match action {
        Some(action) => executor
            .run_action(&action)
            .with_context(|| format!("{} failed", action.keyword()))?,
        None => {
            if fork == NativeFork::PerIteration {
                tracing::debug!("nativeFork=perIteration requested without a fork action, running in-process");
            }
            executor
                .run()
                .with_context(|| format!("benchmark run '{}' failed", executor.execution_name()))?;
        }
    }
    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "cyclebench=debug"
    } else {
        "cyclebench=info"
    };
    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
    // A host binary may have installed its own subscriber already.
    if let Err(e) = installed {
        tracing::debug!(error = %e, "keeping the existing tracing subscriber");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("bench").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_plain_run_has_no_action() {
        let cli = parse(&["run.cfg"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("run.cfg"));
        assert!(!cli.verbose);
        assert_eq!(cli.action().unwrap(), None);
    }

    #[test]
    fn test_warmup_action() {
        let cli = parse(&["run.cfg", "--warmup", "progress", "run.json", "2", "cycles"]).unwrap();
        assert_eq!(
            cli.action().unwrap(),
            Some(ForkAction::Warmup {
                progress_file: "progress".into(),
                run_file: "run.json".into(),
                iteration: 2,
                result_file: "cycles".into(),
            })
        );
    }

    #[test]
    fn test_iteration_action() {
        let cli = parse(&[
            "-v", "run.cfg", "--iteration", "progress", "run.json", "0", "cycles", "sample",
        ])
        .unwrap();
        assert!(cli.verbose);
        let action = cli.action().unwrap().unwrap();
        assert_eq!(action.keyword(), "--iteration");
        assert_eq!(action.progress_file(), std::path::Path::new("progress"));
    }

    #[test]
    fn test_store_results_action() {
        let cli = parse(&["run.cfg", "--store-results", "progress", "results"]).unwrap();
        assert!(matches!(
            cli.action().unwrap(),
            Some(ForkAction::StoreResults { results_file, .. }) if results_file == PathBuf::from("results")
        ));
    }

    #[test]
    fn test_actions_are_exclusive() {
        let err = parse(&["run.cfg", "--list", "progress", "dir", "--store-results", "p", "r"])
            .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_wrong_argument_count() {
        assert!(parse(&["run.cfg", "--benchmark", "progress", "run.json"]).is_err());
    }

    #[test]
    fn test_bad_iteration_index() {
        let cli = parse(&["run.cfg", "--warmup", "progress", "run.json", "first", "cycles"]).unwrap();
        let err = cli.action().unwrap_err();
        assert!(err.to_string().contains("invalid warm-up index 'first'"));
    }

    #[test]
    fn test_run_with_cli_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let report = dir.path().join("report.txt");
        let config = dir.path().join("run.cfg");
        std::fs::write(
            &config,
            format!(
                "name:cli\nreportFile:{}\nreportFormat:text\ntraceFormat:text\n\
                 iterations:1\nwarmups:0\niterationTime:1\niterationTimeUnit:ms\n",
                report.display()
            ),
        )
        .unwrap();

        let suite = cyclebench_core::SuiteDescriptor::new("cli.Sum", || 0_u64).with_benchmark(
            cyclebench_core::BenchmarkDescriptor::new("add", |n: &mut u64| {
                *n += 1;
                *n
            }),
        );
        let cli = parse(&[config.to_str().unwrap()]).unwrap();
        run_with_cli(cli, vec![Box::new(suite)]).unwrap();

        assert!(std::fs::read_to_string(&report).unwrap().contains("Sum.add"));
    }

    #[test]
    fn test_logging_tolerates_existing_subscriber() {
        init_logging(false);
        init_logging(true);
        tracing::debug!("still logging after a second init");
    }

    #[test]
    fn test_missing_config_file() {
        let cli = parse(&["/nonexistent/run.cfg"]).unwrap();
        assert!(run_with_cli(cli, Vec::new()).is_err());
    }
}
