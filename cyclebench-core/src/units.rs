//! Time Units and Measurement Modes
//!
//! Converts per-operation nanosecond timings into the configured display
//! representation: operations per unit (throughput) or units per operation
//! (average time).

use crate::config::ConfigError;
use cyclebench_stats::format_significant;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Significant digits used when rendering samples for progress output
const SAMPLE_DIGITS: u32 = 6;

/// Time unit for iteration budgets and reported values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeUnit {
    /// Nanoseconds
    Nanoseconds,
    /// Microseconds
    Microseconds,
    /// Milliseconds
    Milliseconds,
    /// Seconds
    Seconds,
    /// Minutes
    Minutes,
}

impl TimeUnit {
    /// Literals accepted by [`FromStr`]
    pub const ACCEPTED: &'static [&'static str] = &[
        "NANOSECONDS",
        "ns",
        "nanos",
        "MICROSECONDS",
        "us",
        "micros",
        "MILLISECONDS",
        "ms",
        "millis",
        "SECONDS",
        "s",
        "sec",
        "MINUTES",
        "m",
        "min",
    ];

    /// Short display form used in unit columns
    pub fn short_text(self) -> &'static str {
        match self {
            TimeUnit::Nanoseconds => "ns",
            TimeUnit::Microseconds => "us",
            TimeUnit::Milliseconds => "ms",
            TimeUnit::Seconds => "sec",
            TimeUnit::Minutes => "min",
        }
    }

    /// Nanoseconds in one unit
    pub fn nanos_multiplier(self) -> f64 {
        match self {
            TimeUnit::Nanoseconds => 1.0,
            TimeUnit::Microseconds => 1_000.0,
            TimeUnit::Milliseconds => 1_000_000.0,
            TimeUnit::Seconds => 1_000_000_000.0,
            TimeUnit::Minutes => 60_000_000_000.0,
        }
    }

    /// Convert `amount` of this unit to whole nanoseconds, saturating
    pub fn to_nanos(self, amount: u64) -> u64 {
        let per_unit = match self {
            TimeUnit::Nanoseconds => 1,
            TimeUnit::Microseconds => 1_000,
            TimeUnit::Milliseconds => 1_000_000,
            TimeUnit::Seconds => 1_000_000_000,
            TimeUnit::Minutes => 60_000_000_000,
        };
        amount.saturating_mul(per_unit)
    }
}

impl FromStr for TimeUnit {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NANOSECONDS" | "ns" | "nanos" => Ok(TimeUnit::Nanoseconds),
            "MICROSECONDS" | "us" | "micros" => Ok(TimeUnit::Microseconds),
            "MILLISECONDS" | "ms" | "millis" => Ok(TimeUnit::Milliseconds),
            "SECONDS" | "s" | "sec" => Ok(TimeUnit::Seconds),
            "MINUTES" | "m" | "min" => Ok(TimeUnit::Minutes),
            other => Err(ConfigError::unsupported("time unit", other, Self::ACCEPTED)),
        }
    }
}

impl fmt::Display for TimeUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_text())
    }
}

/// What a reported sample measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    /// Operations per time unit, higher is better
    Throughput,
    /// Time units per operation, lower is better
    AverageTime,
}

impl Mode {
    /// Literals accepted by [`FromStr`]
    pub const ACCEPTED: &'static [&'static str] = &["thrpt", "Throughput", "avgt", "AverageTime"];

    /// Short display form
    pub fn short_text(self) -> &'static str {
        match self {
            Mode::Throughput => "thrpt",
            Mode::AverageTime => "avgt",
        }
    }

    /// Convert a per-operation nanosecond timing into a sample in `unit`
    pub fn nanos_to_sample(self, nanos: f64, unit: TimeUnit) -> f64 {
        let multiplier = unit.nanos_multiplier();
        match self {
            Mode::Throughput => multiplier / nanos,
            Mode::AverageTime => nanos / multiplier,
        }
    }

    /// Unit label for samples of this mode, e.g. `ops/ms` or `ms/op`
    pub fn unit_text(self, unit: TimeUnit) -> String {
        match self {
            Mode::Throughput => format!("ops/{}", unit.short_text()),
            Mode::AverageTime => format!("{}/op", unit.short_text()),
        }
    }

    /// Render an already converted sample with its unit label
    pub fn sample_to_text(self, sample: f64, unit: TimeUnit) -> String {
        format!(
            "{} {}",
            format_significant(sample, SAMPLE_DIGITS),
            self.unit_text(unit)
        )
    }

    /// Convert and render a per-operation nanosecond timing
    pub fn nanos_to_text(self, nanos: f64, unit: TimeUnit) -> String {
        self.sample_to_text(self.nanos_to_sample(nanos, unit), unit)
    }
}

impl FromStr for Mode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "thrpt" | "Throughput" => Ok(Mode::Throughput),
            "avgt" | "AverageTime" => Ok(Mode::AverageTime),
            other => Err(ConfigError::unsupported("mode", other, Self::ACCEPTED)),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_text())
    }
}

/// An amount of time in a given unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IterationTime {
    /// Amount of `unit`
    pub value: u64,
    /// Unit of `value`
    pub unit: TimeUnit,
}

impl IterationTime {
    /// Create a new iteration time
    pub const fn new(value: u64, unit: TimeUnit) -> Self {
        Self { value, unit }
    }

    /// Budget in nanoseconds
    pub fn as_nanos(&self) -> u64 {
        self.unit.to_nanos(self.value)
    }
}

impl fmt::Display for IterationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.unit.short_text())
    }
}
