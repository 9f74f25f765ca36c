//! Number Formatting
//!
//! Fixed-precision and significant-digit rendering used by progress lines,
//! text tables and CSV rows.

/// Values whose magnitude falls below this are treated as zero
pub const NEGLIGIBLE_THRESHOLD: f64 = 1.0 / 1_000.0 / 2.0;

/// Upper bound on decimals produced by [`format_significant`]
const MAX_DECIMALS: f64 = 20.0;

/// Whether `value` is NaN or negligibly close to zero
pub fn is_nan_or_zero(value: f64) -> bool {
    value.is_nan() || value.abs() < NEGLIGIBLE_THRESHOLD
}

/// Render `value` with exactly `precision` decimals
///
/// With `use_grouping` the integer part gets `,` thousands separators.
///
/// ```
/// # use cyclebench_stats::format_fixed;
/// assert_eq!(format_fixed(1200.0, 4, true), "1,200.0000");
/// assert_eq!(format_fixed(1200.0, 1, false), "1200.0");
/// ```
pub fn format_fixed(value: f64, precision: usize, use_grouping: bool) -> String {
    let text = format!("{value:.precision$}");
    if !use_grouping || !value.is_finite() {
        return text;
    }
    group_thousands(&text)
}

/// Render `value` with roughly `precision` significant digits
///
/// The decimal count is `precision - ceil(log10(|value|))`, never negative.
/// Integer digits are never dropped, so large values keep all of them.
pub fn format_significant(value: f64, precision: u32) -> String {
    let magnitude = value.abs().log10().ceil();
    let decimals = if magnitude.is_finite() {
        (f64::from(precision) - magnitude).clamp(0.0, MAX_DECIMALS) as usize
    } else {
        precision as usize
    };
    format_fixed(value, decimals, true)
}

fn group_thousands(text: &str) -> String {
    let (sign, unsigned) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (integer, fraction) = match unsigned.find('.') {
        Some(dot) => unsigned.split_at(dot),
        None => (unsigned, ""),
    };

    let mut grouped = String::with_capacity(text.len() + integer.len() / 3);
    grouped.push_str(sign);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped.push_str(fraction);
    grouped
}
