use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use tabled::Tabled;

/// Ad platform a record came from.
///
/// Variants are declared in wire-name order so the derived `Ord` sorts
/// `facebook_ads` before `google_ads`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    FacebookAds,
    GoogleAds,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::FacebookAds => "facebook_ads",
            Source::GoogleAds => "google_ads",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw row of `google_ads.csv` / `facebook_ads.csv`. The date stays a string
/// so the loader can report the exact value it failed to parse.
#[derive(Debug, Deserialize)]
pub struct RawAdRow {
    pub date: String,
    pub impressions: i64,
    pub clicks: i64,
    pub spend: f64,
    pub conversions: i64,
    pub revenue: f64,
}

/// Raw row of `web_analytics.csv`.
#[derive(Debug, Deserialize)]
pub struct RawWebRow {
    pub date: String,
    pub channel: String,
    pub sessions: i64,
    pub users: i64,
    pub transactions: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdRecord {
    pub date: NaiveDate,
    pub source: Source,
    pub impressions: i64,
    pub clicks: i64,
    pub spend: f64,
    pub conversions: i64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WebRecord {
    pub date: NaiveDate,
    pub channel: String,
    pub sessions: i64,
    pub users: i64,
    pub transactions: i64,
    pub revenue: f64,
}

/// An ad record with its final per-row ratios attached.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedAdRecord {
    pub record: AdRecord,
    pub ctr: f64,
    pub cpc: f64,
    pub cpa: f64,
    pub roas: f64,
}

/// `ads_daily` output row.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct DailyAdAggregate {
    pub date: NaiveDate,
    pub source: Source,
    pub impressions: i64,
    pub clicks: i64,
    pub spend: f64,
    pub conversions: i64,
    pub revenue: f64,
    pub ctr: f64,
    pub cpc: f64,
    pub cpa: f64,
    pub roas: f64,
}

/// `web_daily` output row: the web input with `channel` renamed to `source`.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct WebDailyRow {
    pub date: NaiveDate,
    pub source: String,
    pub sessions: i64,
    pub users: i64,
    pub transactions: i64,
    pub revenue: f64,
}

/// `consolidated` output row.
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct ConsolidatedRecord {
    pub date: NaiveDate,
    pub source: Source,
    pub impressions: i64,
    pub clicks: i64,
    pub spend: f64,
    pub conversions: i64,
    pub revenue_ads: f64,
    pub ctr: f64,
    pub cpc: f64,
    pub cpa: f64,
    pub roas: f64,
    pub sessions: i64,
    pub users: i64,
    pub transactions: i64,
    pub revenue_web: f64,
}
