//! Integration tests for cyclebench
//!
//! These tests drive whole runs through the public API: configuration text
//! in, progress stream and report file out.

use cyclebench::{
    BenchmarkDescriptor, Blackhole, ConsoleProgress, ForkAction, IntelliJProgress, ParamSet,
    RunnerConfiguration, SuiteExecutor, SuiteDescriptor,
};
use std::cell::RefCell;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

/// Progress writer whose contents remain readable after boxing
#[derive(Clone, Default)]
struct Captured(Rc<RefCell<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn config(report: &Path, trace: &str, extra: &str) -> RunnerConfiguration {
    RunnerConfiguration::parse(&format!(
        "name:integration\nreportFile:{}\ntraceFormat:{trace}\n\
         iterations:3\nwarmups:1\niterationTime:2\niterationTimeUnit:ms\n{extra}",
        report.display()
    ))
    .unwrap()
}

fn console_executor(config: RunnerConfiguration) -> (SuiteExecutor, Captured) {
    let out = Captured::default();
    let reporter = Box::new(ConsoleProgress::new(Box::new(out.clone())));
    (SuiteExecutor::with_reporter("integration", config, reporter), out)
}

fn xml_executor(config: RunnerConfiguration) -> (SuiteExecutor, Captured) {
    let out = Captured::default();
    let reporter = Box::new(IntelliJProgress::new(Box::new(out.clone())));
    (SuiteExecutor::with_reporter("integration", config, reporter), out)
}

fn sorting_suite() -> SuiteDescriptor<Vec<u32>> {
    SuiteDescriptor::new("demo.Sorting", Vec::new)
        .with_parameter("size", ["16", "256"])
        .with_parametrize(|data: &mut Vec<u32>, params: &ParamSet| {
            let size: u32 = params.get("size").and_then(|s| s.parse().ok()).unwrap_or(0);
            *data = (0..size).rev().collect();
        })
        .with_benchmark(BenchmarkDescriptor::new("sort", |data: &mut Vec<u32>| {
            let mut copy = data.clone();
            copy.sort_unstable();
            copy.len()
        }))
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

/// A parameterized suite produces one JSON record per combination
#[test]
fn test_end_to_end_json_report() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("out").join("report.json");
    let (mut executor, out) =
        console_executor(config(&report, "text", "mode:avgt\noutputTimeUnit:us\n"));
    executor.suite(sorting_suite());

    executor.run().unwrap();

    let json = read_json(&report);
    let records = json.as_array().unwrap();
    assert_eq!(records.len(), 2);

    let first = &records[0];
    assert_eq!(first["benchmark"], "demo.Sorting.sort");
    assert_eq!(first["mode"], "avgt");
    assert_eq!(first["params"]["size"], "16");
    assert_eq!(first["measurementIterations"], 3);
    assert_eq!(first["primaryMetric"]["scoreUnit"], "us/op");
    let raw = first["primaryMetric"]["rawData"][0].as_array().unwrap();
    assert_eq!(raw.len(), 3);
    assert!(raw.iter().all(|v| v.as_f64().unwrap() > 0.0));
    assert_eq!(records[1]["params"]["size"], "256");

    let progress = out.text();
    assert!(progress.contains("\u{2026} demo.Sorting.sort | size=16"));
    assert!(progress.contains("Warm-up #0: "));
    assert!(progress.contains("Iteration #2: "));
    assert_eq!(progress.matches("  Success: ").count(), 2);
}

/// Failures in one suite are reported once and do not stop the others
#[test]
fn test_failure_isolation_across_suites() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("report.csv");
    let (mut executor, out) = console_executor(config(&report, "text", "reportFormat:csv\n"));
    executor
        .suite(
            SuiteDescriptor::new("demo.Broken", || 0_u8)
                .with_setup(|_: &mut u8| panic!("setup exploded"))
                .with_benchmark(BenchmarkDescriptor::new("never", |n: &mut u8| *n)),
        )
        .suite(sorting_suite());

    executor.run().unwrap();

    let progress = out.text();
    assert_eq!(progress.matches("EXCEPTION: setup exploded").count(), 1);
    assert_eq!(executor.results().len(), 2);

    let csv = std::fs::read_to_string(&report).unwrap();
    assert!(!csv.contains("demo.Broken"));
    assert_eq!(csv.lines().count(), 3);
}

/// Async benchmarks run on a runtime owned by the engine
#[test]
fn test_async_benchmark() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("report.json");
    let (mut executor, _) = console_executor(config(&report, "text", "mode:avgt\noutputTimeUnit:us\n"));
    executor.suite(
        SuiteDescriptor::new("demo.Async", || ()).with_benchmark(BenchmarkDescriptor::asynchronous(
            "sleep",
            |_: &mut ()| {
                Box::pin(async {
                    tokio::time::sleep(Duration::from_micros(200)).await;
                })
            },
        )),
    );

    executor.run().unwrap();

    let result = &executor.results()[0];
    assert_eq!(result.benchmark, "demo.Async.sleep");
    // A sleep of 200us can never complete faster than requested
    assert!(result.score >= 200.0, "score {}", result.score);
}

/// Benchmarks receiving the blackhole keep their results alive
#[test]
fn test_blackhole_benchmark() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("report.json");
    let (mut executor, _) = console_executor(config(
        &report,
        "text",
        "advanced:nativeGCAfterIteration=true\n",
    ));
    executor.suite(
        SuiteDescriptor::new("demo.Sink", || 7_u64).with_benchmark(
            BenchmarkDescriptor::with_blackhole("consume", |n: &mut u64, bh: &mut Blackhole| {
                bh.consume(*n * 3);
                *n
            }),
        ),
    );

    executor.run().unwrap();

    let json = read_json(&report);
    assert_eq!(json[0]["advanced"]["nativeGCAfterIteration"], "true");
    assert!(executor.results()[0].score > 0.0);
}

/// Structured progress is one self-contained event per line
#[test]
fn test_structured_progress_stream() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("report.txt");
    let (mut executor, out) = xml_executor(config(&report, "xml", "reportFormat:text\n"));
    executor.suite(sorting_suite());

    executor.run().unwrap();

    let text = out.text();
    let lines: Vec<&str> = text.lines().collect();
    assert!(lines.iter().all(|l| l.starts_with("<ijLog>") && l.ends_with("</ijLog>")));
    assert!(lines[0].contains("type='beforeSuite'") && lines[0].contains("id='[root]'"));
    let last = lines[lines.len() - 1];
    assert!(last.contains("type='afterSuite'") && last.contains("id='[root]'"));
    assert_eq!(text.matches("type='beforeTest'").count(), 2);
    assert_eq!(text.matches("resultType='SUCCESS'").count(), 5);

    let table = std::fs::read_to_string(&report).unwrap();
    assert!(table.contains("Benchmark"));
    assert!(table.contains("size"));
}

/// The forked protocol reproduces an in-process run step by step
#[test]
fn test_fork_protocol_whole_benchmark() {
    let dir = tempfile::tempdir().unwrap();
    let path = |name: &str| -> PathBuf { dir.path().join(name) };
    let report = path("report.json");
    let progress = path("progress");

    let step = |action: ForkAction| -> String {
        let (mut executor, out) = xml_executor(config(&report, "xml", "include:Sorting\n"));
        executor.suite(sorting_suite());
        executor.run_action(&action).unwrap();
        out.text()
    };

    step(ForkAction::List {
        progress_file: progress.clone(),
        dir: path("runs"),
    });

    let mut results = String::new();
    for n in 0..2 {
        let run_file = path("runs").join(format!("demo.Sorting_sort_{n}.json"));
        let samples = path(&format!("samples_{n}"));
        let events = step(ForkAction::Benchmark {
            progress_file: progress.clone(),
            run_file: run_file.clone(),
            result_file: samples.clone(),
        });
        assert!(events.contains("type='beforeTest'"));
        let line = std::fs::read_to_string(&samples).unwrap();
        assert_eq!(line.split(", ").count(), 3);
        results.push_str(&format!("{}: {line}\n", run_file.display()));
    }

    let results_file = path("results");
    std::fs::write(&results_file, results).unwrap();
    let events = step(ForkAction::StoreResults {
        progress_file: progress.clone(),
        results_file,
    });
    assert!(events.contains("type='afterSuite'"));

    let json = read_json(&report);
    assert_eq!(json.as_array().unwrap().len(), 2);
    assert_eq!(json[1]["params"]["size"], "256");
}
