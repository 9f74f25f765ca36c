//! Parameterized Suites: scaling tests with `with_parameter`
//!
//! Each declared parameter lists default values; `param:<name>=<value>`
//! lines in the runner configuration replace them. One run is executed per
//! combination, the first declared parameter varying fastest.
//!
//! Run with: cargo run --example feature_params -p cyclebench-demos --release -- demos/configs/quick.cfg

use cyclebench::prelude::*;
use cyclebench_demos::{param_or, shuffled};
use std::collections::HashMap;

struct Scaling {
    data: Vec<u32>,
    target: u32,
}

fn scaling() -> SuiteDescriptor<Scaling> {
    SuiteDescriptor::new("demos.Scaling", || Scaling {
        data: Vec::new(),
        target: 0,
    })
    .with_parameter("size", ["100", "10000"])
    .with_parameter("order", ["sorted", "shuffled"])
    .with_parametrize(|s: &mut Scaling, params: &ParamSet| {
        let size = param_or(params, "size", 100);
        s.data = match params.get("order") {
            Some("shuffled") => shuffled(size),
            _ => (0..size).collect(),
        };
        s.target = size.saturating_sub(1);
    })
    .with_benchmark(BenchmarkDescriptor::new("linearScan", |s: &mut Scaling| {
        s.data.iter().position(|&x| x == s.target)
    }))
    .with_benchmark(BenchmarkDescriptor::new("sort", |s: &mut Scaling| {
        let mut copy = s.data.clone();
        copy.sort_unstable();
        copy
    }))
}

fn hashing() -> SuiteDescriptor<u32> {
    SuiteDescriptor::new("demos.Hashing", || 0)
        .with_parameter("entries", ["100", "1000"])
        .with_parametrize(|n: &mut u32, params: &ParamSet| *n = param_or(params, "entries", 100))
        .with_benchmark(BenchmarkDescriptor::new("insert", |n: &mut u32| {
            let mut map = HashMap::new();
            for i in 0..*n {
                map.insert(i, i.wrapping_mul(2_654_435_761));
            }
            map.len()
        }))
}

fn main() -> anyhow::Result<()> {
    cyclebench::run(vec![Box::new(scaling()), Box::new(hashing())])
}
