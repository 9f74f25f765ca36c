//! Library Benchmarks: a maintainer's suite
//!
//! Suites declare their own defaults; the runner configuration overrides
//! them per run. Setup prepares the fixture outside timing, teardown checks
//! it afterwards.
//!
//! Run with: cargo run --example library_bench -p cyclebench-demos --release -- demos/configs/ide.cfg

use cyclebench::prelude::*;
use cyclebench::IterationTime;
use cyclebench_demos::{param_or, shuffled};

#[derive(Default)]
struct Index {
    keys: Vec<u32>,
    lookups: Vec<u32>,
}

fn main() -> anyhow::Result<()> {
    let defaults = SuiteDefaults {
        iterations: 5,
        warmups: 2,
        iteration_time: IterationTime::new(200, TimeUnit::Milliseconds),
        output_time_unit: TimeUnit::Microseconds,
        mode: Mode::AverageTime,
    };

    let suite = SuiteDescriptor::new("demos.Index", Index::default)
        .with_defaults(defaults)
        .with_parameter("keys", ["1000", "100000"])
        .with_parametrize(|index: &mut Index, params: &ParamSet| {
            let n = param_or(params, "keys", 1000);
            index.keys = (0..n).map(|k| k * 2).collect();
            index.lookups = shuffled(n);
        })
        .with_setup(|index: &mut Index| index.keys.sort_unstable())
        .with_teardown(|index: &mut Index| {
            assert!(index.keys.windows(2).all(|w| w[0] <= w[1]), "index lost its order");
        })
        .with_benchmark(BenchmarkDescriptor::new("binarySearch", |index: &mut Index| {
            index
                .lookups
                .iter()
                .filter(|p| index.keys.binary_search(p).is_ok())
                .count()
        }))
        .with_benchmark(BenchmarkDescriptor::new("linearSearch", |index: &mut Index| {
            index.lookups[..16.min(index.lookups.len())]
                .iter()
                .filter(|p| index.keys.contains(p))
                .count()
        }));

    cyclebench::run(vec![Box::new(suite)])
}
