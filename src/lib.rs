//! Daily ad-spend and web-analytics reporting.
//!
//! Reads Google Ads, Facebook Ads and web-analytics CSV snapshots, checks
//! them, derives CTR/CPC/CPA/ROAS, rolls ads up to one row per day and
//! source, and left-joins the web numbers onto that spend-anchored grain.
//! The resulting `ads_daily`, `web_daily` and `consolidated` tables are
//! written as CSV and can be pushed to a Google Spreadsheet.

pub mod config;
pub mod error;
pub mod loader;
pub mod metrics;
pub mod output;
pub mod pipeline;
pub mod quality;
pub mod reports;
pub mod sheets;
pub mod types;
pub mod util;

pub use config::{RunConfig, SheetsConfig};
pub use error::{PipelineError, PublishError};
pub use pipeline::{run, transform, Reports, RunSummary};
