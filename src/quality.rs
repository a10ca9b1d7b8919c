// Advisory quality checks over the combined ad records.
//
// Nothing here can fail a run: anomalies become `QualityWarning`s that are
// printed and logged, and the records flow on to the Deriver untouched.
use crate::types::AdRecord;
use crate::util::ratio_or_missing;
use std::fmt;

/// Raw numeric fields checked for negative values, in report order.
pub const CHECKED_FIELDS: [&str; 5] = ["impressions", "clicks", "spend", "conversions", "revenue"];

#[derive(Debug, Clone, PartialEq)]
pub enum QualityWarning {
    NegativeValues { field: &'static str },
    /// `rows` counts how many records had a click-through rate above 1.
    CtrAboveOne { rows: usize },
}

impl fmt::Display for QualityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityWarning::NegativeValues { field } => {
                write!(f, "Negative values found in {}.", field)
            }
            QualityWarning::CtrAboveOne { .. } => f.write_str("CTR > 100% detected."),
        }
    }
}

/// Diagnostic ratios for one record. `None` marks a zero denominator.
///
/// These are for inspection only; the Deriver recomputes the final columns
/// with its own zero-substitution policy.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct InterimMetrics {
    pub ctr: Option<f64>,
    pub cpc: Option<f64>,
    pub cpa: Option<f64>,
}

#[derive(Debug, Clone, Default)]
pub struct QualityReport {
    pub warnings: Vec<QualityWarning>,
    /// One entry per input record, in input order.
    pub interim: Vec<InterimMetrics>,
}

impl QualityReport {
    pub fn passed(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn print(&self) {
        if self.passed() {
            println!("Quality checks passed.");
        } else {
            println!("QUALITY WARNINGS:");
            for w in &self.warnings {
                println!(" - {}", w);
            }
        }
    }
}

fn field_value(r: &AdRecord, field: &str) -> f64 {
    match field {
        "impressions" => r.impressions as f64,
        "clicks" => r.clicks as f64,
        "spend" => r.spend,
        "conversions" => r.conversions as f64,
        _ => r.revenue,
    }
}

pub fn check_quality(records: &[AdRecord]) -> QualityReport {
    let mut warnings = Vec::new();
    for field in CHECKED_FIELDS {
        if records.iter().any(|r| field_value(r, field) < 0.0) {
            warnings.push(QualityWarning::NegativeValues { field });
        }
    }

    let interim: Vec<InterimMetrics> = records
        .iter()
        .map(|r| InterimMetrics {
            ctr: ratio_or_missing(r.clicks as f64, r.impressions as f64),
            cpc: ratio_or_missing(r.spend, r.clicks as f64),
            cpa: ratio_or_missing(r.spend, r.conversions as f64),
        })
        .collect();

    let over = interim
        .iter()
        .filter(|m| m.ctr.is_some_and(|ctr| ctr > 1.0))
        .count();
    if over > 0 {
        warnings.push(QualityWarning::CtrAboveOne { rows: over });
    }

    for w in &warnings {
        tracing::warn!(warning = %w, "quality check");
    }
    tracing::debug!(rows = records.len(), warnings = warnings.len(), "quality checks done");
    QualityReport { warnings, interim }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Source;
    use chrono::NaiveDate;

    fn rec(impressions: i64, clicks: i64, spend: f64, conversions: i64, revenue: f64) -> AdRecord {
        AdRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            source: Source::GoogleAds,
            impressions,
            clicks,
            spend,
            conversions,
            revenue,
        }
    }

    #[test]
    fn clean_records_pass() {
        let report = check_quality(&[rec(1000, 50, 100.0, 5, 500.0)]);
        assert!(report.passed());
        assert_eq!(report.interim[0].ctr, Some(0.05));
        assert_eq!(report.interim[0].cpc, Some(2.0));
        assert_eq!(report.interim[0].cpa, Some(20.0));
    }

    #[test]
    fn negative_spend_warns_by_name() {
        let report = check_quality(&[rec(10, 1, -5.0, 0, 0.0)]);
        assert_eq!(report.warnings, vec![QualityWarning::NegativeValues { field: "spend" }]);
        assert!(report.warnings[0].to_string().contains("spend"));
    }

    #[test]
    fn each_negative_field_warns_once() {
        let report = check_quality(&[rec(-1, -1, 0.0, 0, -2.0), rec(-3, 0, 0.0, 0, 0.0)]);
        let fields: Vec<String> = report.warnings.iter().map(|w| w.to_string()).collect();
        assert_eq!(
            fields,
            vec![
                "Negative values found in impressions.",
                "Negative values found in clicks.",
                "Negative values found in revenue.",
            ]
        );
    }

    #[test]
    fn ctr_above_one_warns() {
        let report = check_quality(&[rec(10, 20, 1.0, 1, 1.0), rec(10, 1, 1.0, 1, 1.0)]);
        assert_eq!(report.warnings, vec![QualityWarning::CtrAboveOne { rows: 1 }]);
        assert_eq!(report.warnings[0].to_string(), "CTR > 100% detected.");
    }

    #[test]
    fn zero_denominators_are_missing_not_infinite() {
        let report = check_quality(&[rec(0, 5, 10.0, 0, 0.0)]);
        assert_eq!(report.interim[0], InterimMetrics { ctr: None, cpc: Some(2.0), cpa: None });
        assert!(report.passed());
    }
}
