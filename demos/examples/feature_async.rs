//! Async Benchmarks
//!
//! A benchmark may return a future. The engine drives it to completion on a
//! current-thread runtime it owns for the duration of the run, with the timer
//! driver enabled.
//!
//! Run with: cargo run --example feature_async -p cyclebench-demos --release -- demos/configs/quick.cfg

use cyclebench::{BenchmarkDescriptor, Blackhole, SuiteDescriptor};
use std::time::Duration;

fn main() -> anyhow::Result<()> {
    let suite = SuiteDescriptor::new("demos.Async", || 0_u64)
        .with_benchmark(BenchmarkDescriptor::asynchronous("yieldNow", |_: &mut u64| {
            Box::pin(async {
                tokio::task::yield_now().await;
            })
        }))
        .with_benchmark(BenchmarkDescriptor::asynchronous("sleep", |_: &mut u64| {
            Box::pin(async {
                tokio::time::sleep(Duration::from_millis(1)).await;
            })
        }))
        .with_benchmark(BenchmarkDescriptor::asynchronous_with_blackhole(
            "interleavedSteps",
            |steps: &mut u64, bh: &mut Blackhole| {
                Box::pin(async move {
                    for i in 0..16_u64 {
                        tokio::task::yield_now().await;
                        bh.consume(i);
                    }
                    *steps += 16;
                })
            },
        ));

    cyclebench::run(vec![Box::new(suite)])
}
