// Utility helpers for ratios, sums, dates and console formatting.
//
// Every "divide, then clean up" rule in the pipeline goes through the two
// ratio helpers here so the Validator, Deriver and Aggregator cannot drift
// apart on edge cases.
use chrono::{NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};

/// Ratio used for reporting: any undefined result becomes exactly `0.0`.
///
/// - A zero denominator yields `0.0`, not infinity.
/// - NaN or infinite results (e.g. from non-finite inputs) yield `0.0`.
/// - Negative results yield `0.0`, so derived ratios are never below zero.
pub fn safe_ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let r = numerator / denominator;
    if r.is_finite() && r >= 0.0 {
        r
    } else {
        0.0
    }
}

/// Ratio used for diagnostics: a zero denominator is a missing value.
///
/// Unlike [`safe_ratio`] the result is not clamped, so anomalies such as a
/// CTR above 1 stay visible.
pub fn ratio_or_missing(numerator: f64, denominator: f64) -> Option<f64> {
    if denominator == 0.0 {
        return None;
    }
    Some(numerator / denominator)
}

/// Sum that does not depend on the order of its inputs.
///
/// Floating-point addition is not associative, so the values are sorted with
/// `total_cmp` before summing. Callers grouping shuffled rows get
/// bit-identical totals.
pub fn stable_sum(mut v: Vec<f64>) -> f64 {
    v.sort_by(|a, b| a.total_cmp(b));
    v.into_iter().sum()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    // Dates are `YYYY-MM-DD`; exports that carry a midnight timestamp are
    // accepted too and the time part is dropped.
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                .ok()
                .map(|dt| dt.date())
        })
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Fixed decimals plus thousands separators, e.g. `1,234,567.89`.
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_ratio_zero_denominator_is_zero() {
        assert_eq!(safe_ratio(5.0, 0.0), 0.0);
        assert_eq!(safe_ratio(0.0, 0.0), 0.0);
    }

    #[test]
    fn safe_ratio_replaces_non_finite_and_negative() {
        assert_eq!(safe_ratio(f64::NAN, 2.0), 0.0);
        assert_eq!(safe_ratio(f64::INFINITY, 2.0), 0.0);
        assert_eq!(safe_ratio(-5.0, 10.0), 0.0);
        assert_eq!(safe_ratio(1.0, 4.0), 0.25);
    }

    #[test]
    fn ratio_or_missing_keeps_anomalies() {
        assert_eq!(ratio_or_missing(3.0, 0.0), None);
        assert_eq!(ratio_or_missing(30.0, 10.0), Some(3.0));
    }

    #[test]
    fn stable_sum_ignores_order() {
        let a = stable_sum(vec![0.1, 0.2, 0.3, 1e16, -1e16]);
        let b = stable_sum(vec![-1e16, 0.3, 1e16, 0.1, 0.2]);
        assert_eq!(a.to_bits(), b.to_bits());
    }

    #[test]
    fn parse_date_accepts_plain_and_timestamped() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(parse_date("2024-01-01"), Some(d));
        assert_eq!(parse_date(" 2024-01-01 00:00:00 "), Some(d));
        assert_eq!(parse_date("01/01/2024"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn format_number_groups_thousands() {
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-12.5, 1), "-12.5");
        assert_eq!(format_number(42.0, 0), "42");
        assert_eq!(format_int(9855_i64), "9,855");
    }
}
