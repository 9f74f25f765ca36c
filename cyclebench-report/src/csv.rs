//! CSV Output
//!
//! Spreadsheet-compatible export. The same layout serves both `csv` (comma)
//! and `scsv` (semicolon) formats.

use crate::ReportError;
use crate::result::ReportBenchmarkResult;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use cyclebench_stats::format_fixed;

const FIXED_COLUMNS: [&str; 7] = [
    "Benchmark",
    "Mode",
    "Threads",
    "Samples",
    "Score",
    "Score Error (99.9%)",
    "Unit",
];

/// Parameter names in first-seen order across all results
pub(crate) fn parameter_names(results: &[ReportBenchmarkResult]) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for (name, _) in results.iter().flat_map(|r| r.params.iter()) {
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Text cells are always quoted, even when they look numeric
fn quoted(text: &str) -> String {
    format!("\"{}\"", text.replace('"', "\"\""))
}

/// Generate a CSV report using `delimiter` between fields
pub fn generate_csv_report(
    results: &[ReportBenchmarkResult],
    delimiter: u8,
) -> Result<String, ReportError> {
    let params = parameter_names(results);

    let mut writer = WriterBuilder::new()
        .delimiter(delimiter)
        .terminator(Terminator::CRLF)
        .quote_style(QuoteStyle::Never)
        .from_writer(Vec::new());

    let header = FIXED_COLUMNS
        .iter()
        .map(|c| quoted(c))
        .chain(params.iter().map(|p| quoted(&format!("Param: {p}"))));
    writer.write_record(header)?;

    for result in results {
        let mut row = vec![
            quoted(&result.benchmark),
            quoted(result.config.mode.short_text()),
            "1".to_string(),
            result.values.len().to_string(),
            format_fixed(result.score, 6, false),
            format_fixed(result.error, 6, false),
            quoted(&result.config.unit_text()),
        ];
        row.extend(
            params
                .iter()
                .map(|p| quoted(result.params.get(p).unwrap_or_default())),
        );
        writer.write_record(&row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyclebench_core::{BenchmarkConfiguration, ParamSet};

    fn result(name: &str, params: &[(&str, &str)], samples: &[f64]) -> ReportBenchmarkResult {
        ReportBenchmarkResult::create(
            name,
            params.iter().copied().collect::<ParamSet>(),
            BenchmarkConfiguration::default(),
            samples,
        )
    }

    #[test]
    fn test_csv_layout() {
        let results = vec![
            result("pkg.A.run", &[("size", "10")], &[1.5, 2.5]),
            result("pkg.A.other", &[("mode", "fast")], &[4.0]),
        ];

        let csv = generate_csv_report(&results, b',').unwrap();
        let lines: Vec<&str> = csv.split("\r\n").collect();

        assert_eq!(
            lines[0],
            "\"Benchmark\",\"Mode\",\"Threads\",\"Samples\",\"Score\",\"Score Error (99.9%)\",\"Unit\",\"Param: size\",\"Param: mode\""
        );
        assert!(lines[1].starts_with("\"pkg.A.run\",\"thrpt\",1,2,2.000000,"));
        assert!(lines[1].contains("\"ops/ms\""));
        assert!(lines[2].starts_with("\"pkg.A.other\",\"thrpt\",1,1,4.000000,0.000000,\"ops/ms\""));
        assert!(lines[2].ends_with("\"fast\""));
        assert_eq!(lines[3], "");
    }

    #[test]
    fn test_semicolon_delimiter() {
        let csv = generate_csv_report(&[result("pkg.A.run", &[], &[1.0])], b';').unwrap();
        let header = csv.lines().next().unwrap();
        assert_eq!(header.split(';').count(), 7);
        assert!(!header.contains(','));
    }

    #[test]
    fn test_quotes_are_escaped() {
        let csv = generate_csv_report(&[result("pkg.\"A\".run", &[], &[1.0])], b',').unwrap();
        assert!(csv.contains("\"pkg.\"\"A\"\".run\""));
    }

    #[test]
    fn test_numeric_parameter_values_are_quoted() {
        let results = vec![
            result("pkg.A.run", &[("size", "5")], &[2.0]),
            result("pkg.A.run", &[("size", "-1.5e3")], &[2.0]),
        ];
        let csv = generate_csv_report(&results, b';').unwrap();
        let lines: Vec<&str> = csv.split("\r\n").collect();

        assert_eq!(lines[1], "\"pkg.A.run\";\"thrpt\";1;1;2.000000;0.000000;\"ops/ms\";\"5\"");
        assert!(lines[2].ends_with(";\"-1.5e3\""));
    }

    #[test]
    fn test_missing_parameter_is_empty_quoted() {
        let results = vec![
            result("a", &[("x", "1")], &[1.0]),
            result("b", &[], &[1.0]),
        ];
        let csv = generate_csv_report(&results, b',').unwrap();
        assert!(csv.lines().nth(2).unwrap().ends_with(",\"\""));
    }

    #[test]
    fn test_parameter_names_first_seen() {
        let results = vec![
            result("a", &[("x", "1"), ("y", "2")], &[1.0]),
            result("b", &[("z", "3"), ("x", "4")], &[1.0]),
        ];
        assert_eq!(parameter_names(&results), vec!["x", "y", "z"]);
    }
}
