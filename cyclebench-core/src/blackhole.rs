//! Result Sink
//!
//! A [`Blackhole`] swallows benchmark results so the optimizer cannot prove
//! them dead. One instance is shared by every cycle of a benchmark run.

use std::hint::black_box;

/// Sink for values the benchmark computes but never uses
#[derive(Debug, Default)]
pub struct Blackhole {
    consumed: u64,
}

impl Blackhole {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Consume `value` opaquely
    #[inline]
    pub fn consume<V>(&mut self, value: V) {
        black_box(value);
        self.consumed = self.consumed.wrapping_add(1);
    }

    /// Values consumed since the last flush
    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    /// Reset the sink, returning how many values it swallowed
    pub fn flush(&mut self) -> u64 {
        let consumed = std::mem::take(&mut self.consumed);
        tracing::trace!(consumed, "blackhole flushed");
        consumed
    }
}
