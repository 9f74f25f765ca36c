//! Failure Isolation
//!
//! A panic in setup, in the benchmark body or in teardown aborts only the
//! run it belongs to. The failure is reported with its stack trace and the
//! remaining runs continue; the report contains only completed runs.
//!
//! Run with: cargo run --example feature_panic -p cyclebench-demos --release -- demos/configs/quick.cfg
//!
//! Expected output:
//!   - `demos.Panics.afterWarmup` and `demos.BrokenSetup.never` are reported as EXCEPTION
//!   - `demos.Panics.stable` completes normally

use cyclebench::prelude::*;
use std::cell::Cell;

fn main() -> anyhow::Result<()> {
    let panics = SuiteDescriptor::new("demos.Panics", || Cell::new(0_u32))
        .with_benchmark(BenchmarkDescriptor::new("stable", |_: &mut Cell<u32>| {
            42_u64.wrapping_mul(17)
        }))
        .with_benchmark(BenchmarkDescriptor::new("afterWarmup", |calls: &mut Cell<u32>| {
            calls.set(calls.get() + 1);
            if calls.get() > 10_000 {
                panic!("gave up after {} calls", calls.get());
            }
        }));

    let broken_setup = SuiteDescriptor::new("demos.BrokenSetup", Vec::<u8>::new)
        .with_setup(|_: &mut Vec<u8>| panic!("fixture unavailable"))
        .with_benchmark(BenchmarkDescriptor::new("never", |v: &mut Vec<u8>| v.len()));

    cyclebench::run(vec![Box::new(panics), Box::new(broken_setup)])
}
