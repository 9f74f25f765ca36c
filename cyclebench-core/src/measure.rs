//! Monotonic Timing
//!
//! Wraps `std::time::Instant`, which is backed by the platform's monotonic
//! clock. Reading the timer is the only work done inside a timed block
//! besides the benchmark itself.

use std::time::Instant;

/// Timer for one timed block
#[derive(Debug, Clone, Copy)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    /// Start a new timer
    #[inline(always)]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Elapsed nanoseconds since [`Timer::start`], saturating at `u64::MAX`
    #[inline(always)]
    pub fn stop(&self) -> u64 {
        u64::try_from(self.start.elapsed().as_nanos()).unwrap_or(u64::MAX)
    }
}

/// Per-operation nanoseconds for a block of `cycles` invocations
#[inline]
pub fn per_operation(elapsed_nanos: u64, cycles: u64) -> f64 {
    elapsed_nanos as f64 / cycles.max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_timer() {
        let timer = Timer::start();
        std::thread::sleep(Duration::from_millis(10));
        let nanos = timer.stop();

        // Should be at least 5ms in nanos
        assert!(nanos >= 5_000_000);
    }

    #[test]
    fn test_timer_monotonic() {
        let timer = Timer::start();
        let a = timer.stop();
        let b = timer.stop();
        assert!(b >= a, "timer must be monotonic");
    }

    #[test]
    fn test_per_operation() {
        assert!((per_operation(1_000, 4) - 250.0).abs() < f64::EPSILON);
        assert!((per_operation(1_000, 0) - 1_000.0).abs() < f64::EPSILON);
    }
}
