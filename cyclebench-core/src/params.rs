//! Benchmark Parameters
//!
//! Parametrized benchmarks run once per element of the cartesian product of
//! their parameters' value lists. The product is walked as a mixed-radix
//! odometer: the first declared parameter turns fastest.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Parameter resolution errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterError {
    /// Neither the runner nor the suite supplies values for a declared parameter
    #[error("No value specified for parameter '{0}'")]
    MissingValues(String),
}

/// Resolved `name=value` pairs for one run, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamSet(Vec<(String, String)>);

impl ParamSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a pair
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Value bound to `name`
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Pairs in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Number of pairs
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the benchmark is unparametrized
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ParamSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl fmt::Display for ParamSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (name, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name}={value}")?;
        }
        Ok(())
    }
}

/// Ordered `name -> [values]` mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterValues(Vec<(String, Vec<String>)>);

impl ParameterValues {
    /// Create an empty mapping
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `value` to the list for `name`, creating it if needed
    pub fn push(&mut self, name: &str, value: impl Into<String>) {
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some((_, values)) => values.push(value.into()),
            None => self.0.push((name.to_string(), vec![value.into()])),
        }
    }

    /// Replace the list for `name`
    pub fn set<I, S>(&mut self, name: &str, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        match self.0.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = values,
            None => self.0.push((name.to_string(), values)),
        }
    }

    /// Values for `name`
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.0
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_slice())
    }

    /// Entries in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_slice()))
    }

    /// Whether no parameter has values
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Identifier of one benchmark run: `name` or `name | k=v, k=v`
pub fn run_id(name: &str, params: &ParamSet) -> String {
    if params.is_empty() {
        name.to_string()
    } else {
        format!("{name} | {params}")
    }
}

/// Odometer over the cartesian product of parameter values
#[derive(Debug, Clone)]
pub struct ParameterCombinations {
    names: Vec<String>,
    values: Vec<Vec<String>>,
    indices: Vec<usize>,
    exhausted: bool,
}

impl ParameterCombinations {
    /// Resolve each declared parameter's values: runner overrides first,
    /// suite defaults otherwise
    pub fn new(
        names: &[String],
        overrides: &ParameterValues,
        defaults: &ParameterValues,
    ) -> Result<Self, ParameterError> {
        let values = names
            .iter()
            .map(|name| {
                overrides
                    .get(name)
                    .filter(|v| !v.is_empty())
                    .or_else(|| defaults.get(name))
                    .filter(|v| !v.is_empty())
                    .map(<[String]>::to_vec)
                    .ok_or_else(|| ParameterError::MissingValues(name.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            names: names.to_vec(),
            indices: vec![0; values.len()],
            values,
            exhausted: false,
        })
    }

    /// Total number of combinations
    pub fn count_total(&self) -> usize {
        self.values.iter().map(Vec::len).product()
    }
}

impl Iterator for ParameterCombinations {
    type Item = ParamSet;

    fn next(&mut self) -> Option<ParamSet> {
        if self.exhausted {
            return None;
        }

        let current = self
            .names
            .iter()
            .zip(&self.values)
            .zip(&self.indices)
            .map(|((name, values), &i)| (name.clone(), values[i].clone()))
            .collect();

        let mut digit = 0;
        loop {
            if digit == self.indices.len() {
                self.exhausted = true;
                break;
            }
            self.indices[digit] += 1;
            if self.indices[digit] < self.values[digit].len() {
                break;
            }
            self.indices[digit] = 0;
            digit += 1;
        }

        Some(current)
    }
}
