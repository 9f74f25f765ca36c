//! Measurement Engine
//!
//! Drives one (benchmark, parameter combination) run through its lifecycle:
//!
//! ```text
//! Setup → CycleEstimation → Warmup(0..warmups) → Measurement(0..iterations) → Teardown
//! ```
//!
//! The cycle count is estimated once per run and reused by every warm-up and
//! measurement iteration. Each iteration times `cycles` back-to-back
//! invocations in one block and divides by `cycles`.
//!
//! Every phase runs under [`capture`], so a panicking benchmark aborts only
//! its own run. Teardown runs whenever setup succeeded.

use crate::config::BenchmarkConfiguration;
use crate::failure::{BenchmarkFailure, Phase, capture};
use crate::measure::per_operation;
use crate::params::ParamSet;
use crate::suite::{BenchmarkSession, Suite};

/// Per-iteration engine for one effective configuration
#[derive(Debug, Clone, Copy)]
pub struct MeasurementEngine<'c> {
    config: &'c BenchmarkConfiguration,
}

impl<'c> MeasurementEngine<'c> {
    /// Create an engine for `config`
    pub fn new(config: &'c BenchmarkConfiguration) -> Self {
        Self { config }
    }

    /// Count how many single invocations fill one iteration budget
    ///
    /// Invokes the benchmark once at a time and sums the time each call
    /// reports until the sum reaches the budget. Wall-clock time spent
    /// between calls is not counted. A call reporting zero elapsed time is
    /// counted as one nanosecond, so the loop ends after at most
    /// budget-in-nanoseconds calls. Always returns at least 1.
    pub fn estimate_cycles(&self, session: &mut dyn BenchmarkSession) -> u64 {
        let budget = self.config.iteration_time.as_nanos();

        let mut elapsed = 0_u64;
        let mut cycles = 0_u64;
        while elapsed < budget {
            elapsed = elapsed.saturating_add(session.run_cycles(1).max(1));
            cycles += 1;
        }

        let cycles = cycles.max(1);
        tracing::debug!(cycles, budget_ns = budget, "estimated cycles per iteration");
        cycles
    }

    /// Run warm-up iteration `k`, returning per-operation nanoseconds
    pub fn warmup_iteration(
        &self,
        session: &mut dyn BenchmarkSession,
        cycles: u64,
        k: u32,
        output: &mut dyn FnMut(&str),
    ) -> f64 {
        let nanos = self.timed_iteration(session, cycles);
        output(&format!("Warm-up #{k}: {}", self.config.nanos_to_text(nanos)));
        nanos
    }

    /// Run measurement iteration `i`, returning per-operation nanoseconds
    pub fn measurement_iteration(
        &self,
        session: &mut dyn BenchmarkSession,
        cycles: u64,
        i: u32,
        output: &mut dyn FnMut(&str),
    ) -> f64 {
        let nanos = self.timed_iteration(session, cycles);
        output(&format!("Iteration #{i}: {}", self.config.nanos_to_text(nanos)));
        nanos
    }

    fn timed_iteration(&self, session: &mut dyn BenchmarkSession, cycles: u64) -> f64 {
        let nanos = per_operation(session.run_cycles(cycles), cycles);
        if self.config.advanced.gc_after_iteration() {
            let released = session.flush_blackhole();
            tracing::debug!(released, "released consumed values after iteration");
        }
        nanos
    }
}

/// Run cycle estimation, warm-ups and measurements on an open session
///
/// Returns one sample per measurement iteration, converted to the
/// configured unit and mode, in run order.
pub fn run_benchmark(
    session: &mut dyn BenchmarkSession,
    config: &BenchmarkConfiguration,
    output: &mut dyn FnMut(&str),
) -> Result<Vec<f64>, BenchmarkFailure> {
    let engine = MeasurementEngine::new(config);

    let cycles = capture(Phase::CycleEstimation, || engine.estimate_cycles(session))?;

    for k in 0..config.warmups {
        capture(Phase::Warmup(k), || {
            engine.warmup_iteration(session, cycles, k, output)
        })?;
    }

    let mut samples = Vec::with_capacity(config.iterations.min(1024) as usize);
    for i in 0..config.iterations {
        let nanos = capture(Phase::Measurement(i), || {
            engine.measurement_iteration(session, cycles, i, output)
        })?;
        samples.push(config.nanos_to_sample(nanos));
    }

    Ok(samples)
}

/// Open a session, run `body` on it, and always close it afterwards
///
/// A failure from `body` takes precedence over a teardown failure.
pub fn with_session<R>(
    suite: &dyn Suite,
    index: usize,
    params: &ParamSet,
    body: impl FnOnce(&mut dyn BenchmarkSession) -> Result<R, BenchmarkFailure>,
) -> Result<R, BenchmarkFailure> {
    let mut session = suite.open_session(index, params)?;
    let outcome = body(session.as_mut());
    let closed = capture(Phase::Teardown, move || session.close());

    let value = outcome?;
    closed?;
    Ok(value)
}

/// Run a whole benchmark in-process
pub fn execute(
    suite: &dyn Suite,
    index: usize,
    params: &ParamSet,
    config: &BenchmarkConfiguration,
    output: &mut dyn FnMut(&str),
) -> Result<Vec<f64>, BenchmarkFailure> {
    with_session(suite, index, params, |session| {
        run_benchmark(session, config, output)
    })
}

/// Run warm-up iteration `k` in a fresh session, returning the cycle count
pub fn execute_warmup(
    suite: &dyn Suite,
    index: usize,
    params: &ParamSet,
    config: &BenchmarkConfiguration,
    k: u32,
    output: &mut dyn FnMut(&str),
) -> Result<u64, BenchmarkFailure> {
    with_session(suite, index, params, |session| {
        let engine = MeasurementEngine::new(config);
        let cycles = capture(Phase::CycleEstimation, || engine.estimate_cycles(session))?;
        capture(Phase::Warmup(k), || {
            engine.warmup_iteration(session, cycles, k, output)
        })?;
        Ok(cycles)
    })
}

/// Run measurement iteration `i` with a known cycle count in a fresh
/// session, returning the converted sample
pub fn execute_iteration(
    suite: &dyn Suite,
    index: usize,
    params: &ParamSet,
    config: &BenchmarkConfiguration,
    i: u32,
    cycles: u64,
    output: &mut dyn FnMut(&str),
) -> Result<f64, BenchmarkFailure> {
    with_session(suite, index, params, |session| {
        let engine = MeasurementEngine::new(config);
        let nanos = capture(Phase::Measurement(i), || {
            engine.measurement_iteration(session, cycles.max(1), i, output)
        })?;
        Ok(config.nanos_to_sample(nanos))
    })
}
