//! Benchmark Configuration
//!
//! The effective settings one benchmark runs with. Runner-supplied overrides
//! win over the suite's declared defaults, field by field:
//!
//! ```text
//! BenchmarkOverrides (runner file)  ──┐
//!                                     ├──► BenchmarkConfiguration::resolve
//! SuiteDefaults (suite descriptor)  ──┘
//! ```

use crate::units::{IterationTime, Mode, TimeUnit};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Configuration parsing and validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A required single-valued key is absent
    #[error("Parameter `{0}` is required.")]
    MissingParameter(String),

    /// A single-valued key appears more than once
    #[error("Parameter `{key}` must be specified once, found {count} values.")]
    DuplicateParameter {
        /// Offending key
        key: String,
        /// Number of values found
        count: usize,
    },

    /// An enumerated value is not recognized
    #[error("Invalid {kind}: '{value}'. Accepted values: {accepted}.")]
    UnsupportedValue {
        /// What was being parsed
        kind: String,
        /// Literal that failed to parse
        value: String,
        /// Comma-separated accepted literals
        accepted: String,
    },

    /// A numeric value does not parse
    #[error("Invalid {key}: '{value}'. Expected a number.")]
    InvalidNumber {
        /// Offending key
        key: String,
        /// Literal that failed to parse
        value: String,
    },

    /// A numeric value parses but is out of range
    #[error("Invalid {key}: '{value}'. Expected {expected}.")]
    OutOfRange {
        /// Offending key
        key: String,
        /// Value as written
        value: String,
        /// Description of the accepted range
        expected: &'static str,
    },

    /// A `name=value` entry lacks the `=`
    #[error("Parameter name and value format is required for {key}: '{entry}'.")]
    MalformedEntry {
        /// Key of the entry
        key: String,
        /// Entry as written
        entry: String,
    },

    /// An include or exclude pattern is blank
    #[error("Invalid {kind} pattern: '{pattern}'. Pattern must not be blank.")]
    BlankPattern {
        /// `include` or `exclude`
        kind: &'static str,
        /// Pattern as written
        pattern: String,
    },

    /// A parameter override has a blank name
    #[error("Invalid param name: '{0}'. It must not be blank.")]
    BlankParameterName(String),

    /// An advanced option has an unknown name or an invalid value
    #[error("{0}")]
    InvalidAdvancedOption(String),
}

impl ConfigError {
    /// Build an [`ConfigError::UnsupportedValue`] listing `accepted`
    pub fn unsupported(kind: &str, value: &str, accepted: &[&str]) -> Self {
        ConfigError::UnsupportedValue {
            kind: kind.to_string(),
            value: value.to_string(),
            accepted: accepted.join(", "),
        }
    }
}

/// Per-suite defaults used when the runner does not override a setting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuiteDefaults {
    /// Measurement iterations
    pub iterations: u32,
    /// Warm-up iterations
    pub warmups: u32,
    /// Budget for one iteration
    pub iteration_time: IterationTime,
    /// Unit for reported values
    pub output_time_unit: TimeUnit,
    /// Reported measure
    pub mode: Mode,
}

impl Default for SuiteDefaults {
    fn default() -> Self {
        Self {
            iterations: 3,
            warmups: 3,
            iteration_time: IterationTime::new(1, TimeUnit::Seconds),
            output_time_unit: TimeUnit::Milliseconds,
            mode: Mode::Throughput,
        }
    }
}

/// Runner-supplied overrides; `None` falls back to the suite default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BenchmarkOverrides {
    /// Measurement iterations
    pub iterations: Option<u32>,
    /// Warm-up iterations
    pub warmups: Option<u32>,
    /// Iteration budget amount
    pub iteration_time: Option<u64>,
    /// Iteration budget unit
    pub iteration_time_unit: Option<TimeUnit>,
    /// Unit for reported values
    pub output_time_unit: Option<TimeUnit>,
    /// Reported measure
    pub mode: Option<Mode>,
}

/// Forking strategy for the native executor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NativeFork {
    /// All iterations of a benchmark run in one process
    #[default]
    PerBenchmark,
    /// Every warm-up and measurement iteration runs in a fresh process
    PerIteration,
}

impl FromStr for NativeFork {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "perBenchmark" => Ok(NativeFork::PerBenchmark),
            "perIteration" => Ok(NativeFork::PerIteration),
            other => Err(ConfigError::InvalidAdvancedOption(format!(
                "Invalid value for '{}': '{other}'. Accepted values: perBenchmark, perIteration.",
                AdvancedOptions::NATIVE_FORK
            ))),
        }
    }
}

/// JVM fork count, kept for configuration compatibility
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JvmForks {
    /// Fixed number of forks
    Count(u32),
    /// Leave the decision to the JVM harness
    DefinedByJmh,
}

/// Validated `advanced:name=value` options, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdvancedOptions {
    entries: Vec<(String, String)>,
}

impl AdvancedOptions {
    /// Forking strategy key
    pub const NATIVE_FORK: &'static str = "nativeFork";
    /// Per-iteration cleanup key
    pub const GC_AFTER_ITERATION: &'static str = "nativeGCAfterIteration";
    /// JVM fork count key
    pub const JVM_FORKS: &'static str = "jvmForks";
    /// JS bridge key
    pub const JS_USE_BRIDGE: &'static str = "jsUseBridge";

    /// Create an empty option set
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store an option, replacing an earlier value for `name`
    pub fn insert(&mut self, name: &str, value: &str) -> Result<(), ConfigError> {
        validate_advanced(name, value)?;
        match self.entries.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.entries.push((name.to_string(), value.to_string())),
        }
        Ok(())
    }

    /// Raw value of `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Options in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of options
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no options were given
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forking strategy, `perBenchmark` when unset
    pub fn native_fork(&self) -> NativeFork {
        self.get(Self::NATIVE_FORK)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default()
    }

    /// Whether retained state is released after every iteration
    pub fn gc_after_iteration(&self) -> bool {
        self.get(Self::GC_AFTER_ITERATION) == Some("true")
    }

    /// JVM fork count, if configured
    pub fn jvm_forks(&self) -> Option<JvmForks> {
        match self.get(Self::JVM_FORKS)? {
            "definedByJmh" => Some(JvmForks::DefinedByJmh),
            count => count.parse().ok().map(JvmForks::Count),
        }
    }

    /// JS bridge flag, if configured
    pub fn js_use_bridge(&self) -> Option<bool> {
        self.get(Self::JS_USE_BRIDGE).and_then(|v| v.parse().ok())
    }
}

fn validate_advanced(name: &str, value: &str) -> Result<(), ConfigError> {
    let invalid = |message: String| Err(ConfigError::InvalidAdvancedOption(message));

    if name.trim().is_empty() {
        return invalid(format!(
            "Invalid advanced option name: '{name}'. It must not be blank."
        ));
    }
    if value.trim().is_empty() {
        return invalid(format!(
            "Invalid value for advanced option '{name}': '{value}'. Value should not be blank."
        ));
    }

    match name {
        AdvancedOptions::NATIVE_FORK => value.parse::<NativeFork>().map(|_| ()),
        AdvancedOptions::GC_AFTER_ITERATION | AdvancedOptions::JS_USE_BRIDGE => {
            match value {
                "true" | "false" => Ok(()),
                _ => invalid(format!(
                    "Invalid value for '{name}': '{value}'. Expected a Boolean value."
                )),
            }
        }
        AdvancedOptions::JVM_FORKS => {
            if value == "definedByJmh" || value.parse::<u32>().is_ok() {
                Ok(())
            } else {
                invalid(format!(
                    "Invalid value for '{name}': '{value}'. Expected a non-negative integer or \"definedByJmh\"."
                ))
            }
        }
        _ => invalid(format!(
            "Invalid advanced option name: '{name}'. Accepted options: \"nativeFork\", \"nativeGCAfterIteration\", \"jvmForks\", \"jsUseBridge\"."
        )),
    }
}

/// Effective settings for one benchmark run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BenchmarkConfiguration {
    /// Measurement iterations
    pub iterations: u32,
    /// Warm-up iterations
    pub warmups: u32,
    /// Budget for one iteration; drives cycle estimation
    pub iteration_time: IterationTime,
    /// Unit for reported values
    pub output_time_unit: TimeUnit,
    /// Reported measure
    pub mode: Mode,
    /// Advanced options in effect
    #[serde(default)]
    pub advanced: AdvancedOptions,
}

impl BenchmarkConfiguration {
    /// Merge runner overrides over suite defaults
    pub fn resolve(
        overrides: &BenchmarkOverrides,
        defaults: &SuiteDefaults,
        advanced: &AdvancedOptions,
    ) -> Self {
        Self {
            iterations: overrides.iterations.unwrap_or(defaults.iterations),
            warmups: overrides.warmups.unwrap_or(defaults.warmups),
            iteration_time: IterationTime::new(
                overrides
                    .iteration_time
                    .unwrap_or(defaults.iteration_time.value),
                overrides
                    .iteration_time_unit
                    .unwrap_or(defaults.iteration_time.unit),
            ),
            output_time_unit: overrides
                .output_time_unit
                .unwrap_or(defaults.output_time_unit),
            mode: overrides.mode.unwrap_or(defaults.mode),
            advanced: advanced.clone(),
        }
    }

    /// Convert a per-operation nanosecond timing into a reported sample
    pub fn nanos_to_sample(&self, nanos: f64) -> f64 {
        self.mode.nanos_to_sample(nanos, self.output_time_unit)
    }

    /// Render a per-operation nanosecond timing for progress output
    pub fn nanos_to_text(&self, nanos: f64) -> String {
        self.mode.nanos_to_text(nanos, self.output_time_unit)
    }

    /// Render a reported sample with its unit label
    pub fn sample_to_text(&self, sample: f64) -> String {
        self.mode.sample_to_text(sample, self.output_time_unit)
    }

    /// Unit label of reported samples
    pub fn unit_text(&self) -> String {
        self.mode.unit_text(self.output_time_unit)
    }
}

impl Default for BenchmarkConfiguration {
    fn default() -> Self {
        Self::resolve(
            &BenchmarkOverrides::default(),
            &SuiteDefaults::default(),
            &AdvancedOptions::default(),
        )
    }
}

impl fmt::Display for BenchmarkConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "iterations={}, warmups={}, iterationTime={}, iterationTimeUnit={}, outputTimeUnit={}, mode={}",
            self.iterations,
            self.warmups,
            self.iteration_time.value,
            self.iteration_time.unit,
            self.output_time_unit,
            self.mode
        )?;
        for (name, value) in self.advanced.iter() {
            write!(f, ", {name}={value}")?;
        }
        Ok(())
    }
}
