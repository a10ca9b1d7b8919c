use crate::types::{AdRecord, DerivedAdRecord};
use crate::util::safe_ratio;

/// Final per-row ratios. Undefined values come out as `0.0`.
pub fn derive_metrics(records: Vec<AdRecord>) -> Vec<DerivedAdRecord> {
    records.into_iter().map(derive_one).collect()
}

pub fn derive_one(record: AdRecord) -> DerivedAdRecord {
    let ctr = safe_ratio(record.clicks as f64, record.impressions as f64);
    let cpc = safe_ratio(record.spend, record.clicks as f64);
    let cpa = safe_ratio(record.spend, record.conversions as f64);
    let roas = safe_ratio(record.revenue, record.spend);
    DerivedAdRecord {
        record,
        ctr,
        cpc,
        cpa,
        roas,
    }
}
