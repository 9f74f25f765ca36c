//! Text Table Output
//!
//! Fixed-width table for terminals and plain-text reports. Each column is as
//! wide as its header or its longest value, plus padding. Numeric columns are
//! right-aligned; benchmark names are left-aligned and densified by dropping
//! or abbreviating the package prefix they share.

use crate::csv::parameter_names;
use crate::result::ReportBenchmarkResult;
use cyclebench_stats::{format_fixed, is_nan_or_zero};
use std::collections::HashMap;

const PADDING: usize = 2;

fn column_width<F>(header: &str, results: &[ReportBenchmarkResult], cell: F) -> usize
where
    F: Fn(&ReportBenchmarkResult) -> String,
{
    results
        .iter()
        .map(|r| cell(r).chars().count())
        .fold(header.chars().count(), usize::max)
}

fn pad_before(out: &mut String, value: &str, width: usize) {
    let fill = width.saturating_sub(value.chars().count());
    out.extend(std::iter::repeat(' ').take(fill));
    out.push_str(value);
}

fn pad_after(out: &mut String, value: &str, width: usize) {
    let fill = width.saturating_sub(value.chars().count());
    out.push_str(value);
    out.extend(std::iter::repeat(' ').take(fill));
}

fn is_package_segment(segment: &str) -> bool {
    segment.to_lowercase() == segment
}

/// Shorten fully qualified names by their shared package prefix
///
/// When every name starts with the same lowercase segments they are
/// dropped. When the names diverge inside the package part, the shared
/// segments are abbreviated to their first character instead.
pub fn dense_benchmark_names<'a>(names: &[&'a str]) -> HashMap<&'a str, String> {
    let Some(first) = names.first() else {
        return HashMap::new();
    };

    let mut prefix: Vec<&str> = first
        .split('.')
        .take_while(|s| is_package_segment(s))
        .collect();
    let mut prefix_cut = false;

    for name in &names[1..] {
        let common = prefix
            .iter()
            .zip(name.split('.'))
            .take_while(|(p, n)| *p == n && is_package_segment(n))
            .count();
        if common != prefix.len() {
            prefix_cut = true;
        }
        prefix.truncate(common);
    }

    let shortened: Vec<String> = prefix
        .iter()
        .map(|segment| {
            if prefix_cut {
                segment.chars().next().map(String::from).unwrap_or_default()
            } else {
                String::new()
            }
        })
        .collect();

    names
        .iter()
        .map(|&name| {
            let segments = shortened
                .iter()
                .map(String::as_str)
                .chain(name.split('.').skip(prefix.len()))
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>();
            (name, segments.join("."))
        })
        .collect()
}

/// Generate the aligned text table
pub fn generate_text_report(results: &[ReportBenchmarkResult]) -> String {
    let names: Vec<&str> = results.iter().map(|r| r.benchmark.as_str()).collect();
    let short = dense_benchmark_names(&names);
    let short_name = |r: &ReportBenchmarkResult| {
        short
            .get(r.benchmark.as_str())
            .cloned()
            .unwrap_or_else(|| r.benchmark.clone())
    };
    let score_text = |r: &ReportBenchmarkResult| format_fixed(r.score, 3, false);
    let error_text = |r: &ReportBenchmarkResult| format_fixed(r.error, 3, false);
    let count_text = |r: &ReportBenchmarkResult| {
        if r.values.len() > 1 {
            r.values.len().to_string()
        } else {
            " ".to_string()
        }
    };

    let params = parameter_names(results);
    let param_widths: Vec<usize> = params
        .iter()
        .map(|p| {
            let longest = results
                .iter()
                .filter_map(|r| r.params.get(p))
                .map(|v| v.chars().count())
                .max()
                .unwrap_or(0);
            (p.chars().count() + 2).max(longest) + PADDING
        })
        .collect();

    let name_width = column_width("Benchmark", results, short_name);
    let mode_width = column_width("Mode", results, |r| r.config.mode.short_text().to_string()) + PADDING;
    let count_width = column_width("Cnt", results, |r| r.values.len().to_string()) + PADDING;
    let score_width = column_width("Score", results, score_text) + PADDING;
    let error_width = column_width("Error", results, error_text) + PADDING - 1;
    let units_width = column_width("Units", results, |r| r.config.unit_text()) + PADDING;

    let mut out = String::new();
    pad_after(&mut out, "Benchmark", name_width);
    for (p, &width) in params.iter().zip(&param_widths) {
        pad_before(&mut out, &format!("({p})"), width);
    }
    pad_before(&mut out, "Mode", mode_width);
    pad_before(&mut out, "Cnt", count_width);
    pad_before(&mut out, "Score", score_width);
    out.push_str("  ");
    pad_before(&mut out, "Error", error_width);
    pad_before(&mut out, "Units", units_width);
    out.push('\n');

    for result in results {
        pad_after(&mut out, &short_name(result), name_width);
        for (p, &width) in params.iter().zip(&param_widths) {
            pad_before(&mut out, result.params.get(p).unwrap_or("N/A"), width);
        }
        pad_before(&mut out, result.config.mode.short_text(), mode_width);
        pad_before(&mut out, &count_text(result), count_width);
        pad_before(&mut out, &score_text(result), score_width);
        if is_nan_or_zero(result.error) {
            out.push_str("  ");
            pad_before(&mut out, "", error_width);
        } else {
            out.push_str(" \u{00B1}");
            pad_before(&mut out, &error_text(result), error_width);
        }
        pad_before(&mut out, &result.config.unit_text(), units_width);
        out.push('\n');
    }

    out
}
