//! Blackhole: keeping intermediate results alive
//!
//! Return values are consumed automatically. Benchmarks producing several
//! values per call take a `&mut Blackhole` and consume each one, so the
//! optimizer cannot drop the work that produced them.
//!
//! With `advanced:nativeGCAfterIteration=true` the sink is flushed after
//! every iteration.
//!
//! Run with: cargo run --example feature_blackhole -p cyclebench-demos --release -- demos/configs/quick.cfg

use cyclebench::prelude::*;

fn main() -> anyhow::Result<()> {
    let suite = SuiteDescriptor::new("demos.Sink", || (1..=64).collect::<Vec<u64>>())
        .with_benchmark(BenchmarkDescriptor::new("sumReturned", |v: &mut Vec<u64>| {
            v.iter().sum::<u64>()
        }))
        .with_benchmark(BenchmarkDescriptor::with_blackhole(
            "squaresConsumed",
            |v: &mut Vec<u64>, bh: &mut Blackhole| {
                for x in v.iter() {
                    bh.consume(x * x);
                }
            },
        ));

    cyclebench::run(vec![Box::new(suite)])
}
