//! Runner Configuration
//!
//! The build layer hands the executor a plain-text file with one `key:value`
//! entry per line. Only the first `:` separates key from value, and a key may
//! repeat to form a list:
//!
//! ```text
//! name:jvmBenchmarks
//! reportFile:build/reports/main.json
//! traceFormat:text
//! param:size=10
//! param:size=1000
//! include:Sorting
//! iterations:5
//! advanced:nativeFork=perIteration
//! ```

use anyhow::Context;
use cyclebench_core::{
    AdvancedOptions, BenchmarkConfiguration, BenchmarkOverrides, ConfigError, Mode,
    ParameterValues, SuiteDefaults, TimeUnit,
};
use cyclebench_report::ReportFormat;
use std::fmt;
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Presentation of progress events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceFormat {
    /// Plain console lines
    Text,
    /// Structured `<ijLog>` events for an IDE host
    Xml,
}

impl TraceFormat {
    const ACCEPTED: &'static [&'static str] = &["text", "xml"];
}

impl FromStr for TraceFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(TraceFormat::Text),
            "xml" => Ok(TraceFormat::Xml),
            other => Err(ConfigError::unsupported("traceFormat", other, Self::ACCEPTED)),
        }
    }
}

impl fmt::Display for TraceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TraceFormat::Text => f.write_str("text"),
            TraceFormat::Xml => f.write_str("xml"),
        }
    }
}

/// Parsed and validated runner configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerConfiguration {
    /// Execution name, used as the suite node in progress output
    pub name: String,
    /// Where the report is written
    pub report_file: PathBuf,
    /// Progress presentation
    pub trace_format: TraceFormat,
    /// Report serialization
    pub report_format: ReportFormat,
    /// Parameter value overrides, `param:name=value` once per value
    pub params: ParameterValues,
    /// Include patterns; empty selects everything
    pub include: Vec<String>,
    /// Exclude patterns
    pub exclude: Vec<String>,
    /// Overrides for the suite defaults
    pub overrides: BenchmarkOverrides,
    /// Validated advanced options
    pub advanced: AdvancedOptions,
}

/// Raw entries grouped by key, in first-seen key order
struct Entries<'a> {
    groups: Vec<(&'a str, Vec<&'a str>)>,
}

impl<'a> Entries<'a> {
    fn new(text: &'a str) -> Self {
        let mut groups: Vec<(&str, Vec<&str>)> = Vec::new();
        for line in text.lines().filter(|l| !l.is_empty()) {
            let (key, value) = line.split_once(':').unwrap_or((line, ""));
            match groups.iter_mut().find(|(k, _)| *k == key) {
                Some((_, values)) => values.push(value),
                None => groups.push((key, vec![value])),
            }
        }
        Self { groups }
    }

    fn list(&self, key: &str) -> &[&'a str] {
        self.groups
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_slice())
            .unwrap_or(&[])
    }

    fn single_or_none(&self, key: &str) -> Result<Option<&'a str>, ConfigError> {
        match self.list(key) {
            [] => Ok(None),
            [value] => Ok(Some(*value)),
            values => Err(ConfigError::DuplicateParameter {
                key: key.to_string(),
                count: values.len(),
            }),
        }
    }

    fn single(&self, key: &str) -> Result<&'a str, ConfigError> {
        self.single_or_none(key)?
            .ok_or_else(|| ConfigError::MissingParameter(key.to_string()))
    }

    fn parsed<T: FromStr<Err = ConfigError>>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        self.single_or_none(key)?.map(str::parse::<T>).transpose()
    }

    fn number(
        &self,
        key: &str,
        range: RangeInclusive<i64>,
        expected: &'static str,
    ) -> Result<Option<i64>, ConfigError> {
        let Some(text) = self.single_or_none(key)? else {
            return Ok(None);
        };
        let value: i64 = text.trim().parse().map_err(|_| ConfigError::InvalidNumber {
            key: key.to_string(),
            value: text.to_string(),
        })?;
        if !range.contains(&value) {
            return Err(ConfigError::OutOfRange {
                key: key.to_string(),
                value: text.to_string(),
                expected,
            });
        }
        Ok(Some(value))
    }

    /// Iteration counts are bounded like a signed 32-bit integer
    fn count(&self, key: &str, min: u32, expected: &'static str) -> Result<Option<u32>, ConfigError> {
        let range = i64::from(min)..=i64::from(i32::MAX);
        Ok(self
            .number(key, range, expected)?
            .and_then(|v| u32::try_from(v).ok()))
    }

    fn pairs(&self, key: &str) -> Result<Vec<(&'a str, &'a str)>, ConfigError> {
        self.list(key)
            .iter()
            .map(|entry| {
                entry.split_once('=').ok_or_else(|| ConfigError::MalformedEntry {
                    key: key.to_string(),
                    entry: entry.to_string(),
                })
            })
            .collect()
    }
}

fn patterns(entries: &Entries<'_>, kind: &'static str) -> Result<Vec<String>, ConfigError> {
    entries
        .list(kind)
        .iter()
        .map(|pattern| {
            if pattern.trim().is_empty() {
                Err(ConfigError::BlankPattern {
                    kind,
                    pattern: pattern.to_string(),
                })
            } else {
                Ok(pattern.to_string())
            }
        })
        .collect()
}

impl RunnerConfiguration {
    /// Parse and validate configuration text
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let entries = Entries::new(text);

        let name = entries.single("name")?.to_string();
        let report_file = PathBuf::from(entries.single("reportFile")?);
        let trace_format = entries.single("traceFormat")?.parse::<TraceFormat>()?;

        let report_format_text = entries.single_or_none("reportFormat")?.unwrap_or("json");
        let report_format = report_format_text.parse::<ReportFormat>().map_err(|_| {
            ConfigError::unsupported(
                "reportFormat",
                report_format_text,
                &["json", "csv", "scsv", "text"],
            )
        })?;

        let mut params = ParameterValues::new();
        for (param, value) in entries.pairs("param")? {
            if param.trim().is_empty() {
                return Err(ConfigError::BlankParameterName(param.to_string()));
            }
            params.push(param, value);
        }

        let mut advanced = AdvancedOptions::new();
        for (option, value) in entries.pairs("advanced")? {
            advanced.insert(option, value)?;
        }

        let overrides = BenchmarkOverrides {
            iterations: entries.count("iterations", 1, "a positive integer")?,
            warmups: entries.count("warmups", 0, "a non-negative integer")?,
            iteration_time: entries
                .number("iterationTime", 1..=i64::MAX, "a positive integer")?
                .map(|v| v.unsigned_abs()),
            iteration_time_unit: entries.parsed::<TimeUnit>("iterationTimeUnit")?,
            output_time_unit: entries.parsed::<TimeUnit>("outputTimeUnit")?,
            mode: entries.parsed::<Mode>("mode")?,
        };

        Ok(Self {
            name,
            report_file,
            trace_format,
            report_format,
            params,
            include: patterns(&entries, "include")?,
            exclude: patterns(&entries, "exclude")?,
            overrides,
            advanced,
        })
    }

    /// Read and parse a configuration file
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runner configuration {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("invalid runner configuration {}", path.display()))?;
        Ok(config)
    }

    /// Effective configuration for a suite with `defaults`
    pub fn resolve(&self, defaults: &SuiteDefaults) -> BenchmarkConfiguration {
        BenchmarkConfiguration::resolve(&self.overrides, defaults, &self.advanced)
    }
}

fn optional<T: fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map_or_else(|| "null".to_string(), ToString::to_string)
}

impl fmt::Display for RunnerConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} -> {} ({}, {})",
            self.name,
            self.report_file.display(),
            self.trace_format,
            self.report_format
        )?;
        let params = self
            .params
            .iter()
            .map(|(name, values)| format!("{name}: [{}]", values.join(", ")))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "params: {{{params}}}")?;
        writeln!(f, "include: [{}]", self.include.join(", "))?;
        writeln!(f, "exclude: [{}]", self.exclude.join(", "))?;
        writeln!(f, "iterations: {}", optional(&self.overrides.iterations))?;
        writeln!(f, "warmups: {}", optional(&self.overrides.warmups))?;
        writeln!(f, "iterationTime: {}", optional(&self.overrides.iteration_time))?;
        writeln!(
            f,
            "iterationTimeUnit: {}",
            optional(&self.overrides.iteration_time_unit)
        )?;
        writeln!(f, "outputTimeUnit: {}", optional(&self.overrides.output_time_unit))?;
        writeln!(f, "mode: {}", optional(&self.overrides.mode))?;
        let advanced = self
            .advanced
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(f, "advanced: {{{advanced}}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyclebench_core::IterationTime;

    const MINIMAL: &str = "name:main\nreportFile:out/main.json\ntraceFormat:text\n";

    fn parse_with(extra: &str) -> Result<RunnerConfiguration, ConfigError> {
        RunnerConfiguration::parse(&format!("{MINIMAL}{extra}"))
    }

    #[test]
    fn test_minimal_config() {
        let config = parse_with("").unwrap();
        assert_eq!(config.name, "main");
        assert_eq!(config.report_file, PathBuf::from("out/main.json"));
        assert_eq!(config.trace_format, TraceFormat::Text);
        assert_eq!(config.report_format, ReportFormat::Json);
        assert!(config.include.is_empty());
        assert!(config.params.is_empty());
        assert_eq!(config.overrides, BenchmarkOverrides::default());
    }

    #[test]
    fn test_full_config() {
        let config = parse_with(
            "reportFormat:csv\n\
             param:size=10\n\
             param:size=1000\n\
             param:kind=fast\n\
             include:Sorting\n\
             include:Hashing\n\
             exclude:slow\n\
             iterations:5\n\
             warmups:0\n\
             iterationTime:300\n\
             iterationTimeUnit:ms\n\
             outputTimeUnit:MICROSECONDS\n\
             mode:avgt\n\
             advanced:nativeFork=perIteration\n\
             advanced:nativeGCAfterIteration=true\n",
        )
        .unwrap();

        assert_eq!(config.report_format, ReportFormat::Csv);
        assert_eq!(
            config.params.get("size"),
            Some(&["10".to_string(), "1000".to_string()][..])
        );
        assert_eq!(config.params.get("kind"), Some(&["fast".to_string()][..]));
        assert_eq!(config.include, vec!["Sorting", "Hashing"]);
        assert_eq!(config.exclude, vec!["slow"]);
        assert_eq!(config.overrides.iterations, Some(5));
        assert_eq!(config.overrides.warmups, Some(0));
        assert_eq!(config.overrides.iteration_time, Some(300));
        assert_eq!(config.overrides.iteration_time_unit, Some(TimeUnit::Milliseconds));
        assert_eq!(config.overrides.output_time_unit, Some(TimeUnit::Microseconds));
        assert_eq!(config.overrides.mode, Some(Mode::AverageTime));
        assert!(config.advanced.gc_after_iteration());
        assert_eq!(config.advanced.len(), 2);
    }

    #[test]
    fn test_only_first_colon_splits() {
        let config = parse_with("include:^pkg\\.A:run$\nparam:url=http://host:80\n").unwrap();
        assert_eq!(config.include, vec!["^pkg\\.A:run$"]);
        assert_eq!(config.params.get("url"), Some(&["http://host:80".to_string()][..]));
    }

    #[test]
    fn test_only_first_equals_splits() {
        let config = parse_with("param:expr=a=b\n").unwrap();
        assert_eq!(config.params.get("expr"), Some(&["a=b".to_string()][..]));
    }

    #[test]
    fn test_missing_required_keys() {
        let err = RunnerConfiguration::parse("name:main\ntraceFormat:text\n").unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("reportFile".into()));
        assert_eq!(err.to_string(), "Parameter `reportFile` is required.");

        let err = RunnerConfiguration::parse("reportFile:a\ntraceFormat:text\n").unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("name".into()));

        let err = RunnerConfiguration::parse("name:main\nreportFile:a\n").unwrap_err();
        assert_eq!(err, ConfigError::MissingParameter("traceFormat".into()));
    }

    #[test]
    fn test_duplicate_single_key() {
        let err = parse_with("iterations:1\niterations:2\n").unwrap_err();
        assert_eq!(
            err,
            ConfigError::DuplicateParameter {
                key: "iterations".into(),
                count: 2
            }
        );
    }

    #[test]
    fn test_unsupported_enumerations() {
        let err = RunnerConfiguration::parse("name:a\nreportFile:b\ntraceFormat:html\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid traceFormat: 'html'. Accepted values: text, xml."
        );

        let err = parse_with("reportFormat:xml\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid reportFormat: 'xml'. Accepted values: json, csv, scsv, text."
        );

        assert!(matches!(
            parse_with("mode:fast\n"),
            Err(ConfigError::UnsupportedValue { .. })
        ));
        assert!(matches!(
            parse_with("outputTimeUnit:hours\n"),
            Err(ConfigError::UnsupportedValue { .. })
        ));
    }

    #[test]
    fn test_report_format_is_case_insensitive() {
        assert_eq!(parse_with("reportFormat:SCSV\n").unwrap().report_format, ReportFormat::Scsv);
    }

    #[test]
    fn test_numeric_validation() {
        assert!(matches!(
            parse_with("iterations:0\n"),
            Err(ConfigError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse_with("warmups:-1\n"),
            Err(ConfigError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse_with("iterationTime:0\n"),
            Err(ConfigError::OutOfRange { .. })
        ));
        assert!(matches!(
            parse_with("iterations:many\n"),
            Err(ConfigError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_counts_beyond_int_range_rejected() {
        for entry in ["iterations:99999999999\n", "warmups:2147483648\n"] {
            assert!(
                matches!(parse_with(entry), Err(ConfigError::OutOfRange { .. })),
                "{entry:?}"
            );
        }
        let err = parse_with("iterations:4294967296\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid iterations: '4294967296'. Expected a positive integer."
        );

        let largest = parse_with("iterations:2147483647\n").unwrap();
        assert_eq!(largest.overrides.iterations, Some(2_147_483_647));
    }

    #[test]
    fn test_blank_values_rejected() {
        assert!(matches!(
            parse_with("include: \n"),
            Err(ConfigError::BlankPattern { kind: "include", .. })
        ));
        assert!(matches!(
            parse_with("exclude:\n"),
            Err(ConfigError::BlankPattern { kind: "exclude", .. })
        ));
        assert!(matches!(
            parse_with("param:=10\n"),
            Err(ConfigError::BlankParameterName(_))
        ));
        assert!(matches!(
            parse_with("param:size\n"),
            Err(ConfigError::MalformedEntry { .. })
        ));
    }

    #[test]
    fn test_advanced_validation() {
        let err = parse_with("advanced:nativeFork=always\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid value for 'nativeFork': 'always'. Accepted values: perBenchmark, perIteration."
        );
        assert!(matches!(
            parse_with("advanced:colour=blue\n"),
            Err(ConfigError::InvalidAdvancedOption(_))
        ));
        assert!(matches!(
            parse_with("advanced:nativeFork\n"),
            Err(ConfigError::MalformedEntry { .. })
        ));
    }

    #[test]
    fn test_runner_values_win_over_suite_defaults() {
        let defaults = SuiteDefaults {
            iterations: 5,
            ..SuiteDefaults::default()
        };

        let config = parse_with("iterations:2\n").unwrap().resolve(&defaults);
        assert_eq!(config.iterations, 2);

        let config = parse_with("").unwrap().resolve(&defaults);
        assert_eq!(config.iterations, 5);
    }

    #[test]
    fn test_iteration_time_merges_per_field() {
        let defaults = SuiteDefaults::default();
        let config = parse_with("iterationTimeUnit:ms\n").unwrap().resolve(&defaults);
        assert_eq!(config.iteration_time, IterationTime::new(1, TimeUnit::Milliseconds));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("runner.conf");
        std::fs::write(&path, MINIMAL).unwrap();
        assert_eq!(RunnerConfiguration::load(&path).unwrap().name, "main");

        let missing = RunnerConfiguration::load(dir.path().join("absent.conf"));
        assert!(missing.is_err());
    }

    #[test]
    fn test_display_lists_fields() {
        let text = parse_with("iterations:4\n").unwrap().to_string();
        assert!(text.starts_with("main -> out/main.json (text, json)"));
        assert!(text.contains("iterations: 4"));
        assert!(text.contains("warmups: null"));
    }
}
