//! cyclebench Demos
//!
//! Runnable demonstration suites. This crate is not published; it exists
//! solely to host example binaries that depend on `cyclebench`.
//!
//! Every example takes a runner configuration file as its first argument:
//! ```sh
//! cargo run --example <name> -p cyclebench-demos --release -- demos/configs/quick.cfg
//! ```
//!
//! | Example | Feature |
//! |---------|---------|
//! | `feature_params` | Parameterized suites and the cartesian run expansion |
//! | `feature_async` | Benchmarks returning futures |
//! | `feature_blackhole` | Consuming intermediate results |
//! | `feature_panic` | Failure isolation in setup and body |
//! | `library_bench` | A library maintainer's suite with setup and teardown |
//!
//! `configs/ide.cfg` selects the structured progress stream.

use rand::seq::SliceRandom;

/// `0..n` in random order
pub fn shuffled(n: u32) -> Vec<u32> {
    let mut values: Vec<u32> = (0..n).collect();
    values.shuffle(&mut rand::thread_rng());
    values
}

/// Parse the `name` parameter, falling back to `default`
pub fn param_or<T: std::str::FromStr>(params: &cyclebench::ParamSet, name: &str, default: T) -> T {
    params
        .get(name)
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shuffled_is_permutation() {
        let mut values = shuffled(100);
        values.sort_unstable();
        assert_eq!(values, (0..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_param_or() {
        let params: cyclebench::ParamSet = [("size", "12")].into_iter().collect();
        assert_eq!(param_or(&params, "size", 0_u32), 12);
        assert_eq!(param_or(&params, "missing", 5_u32), 5);
    }
}
