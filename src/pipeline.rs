//! One batch pass: load, validate, derive, aggregate, reconcile, write,
//! and optionally publish.
//!
//! [`transform`] is pure over in-memory records so it can be exercised
//! without files or environment; [`run`] wires it to the loader and sinks.

use crate::config::RunConfig;
use crate::error::Result;
use crate::loader::{self, Inputs};
use crate::metrics::derive_metrics;
use crate::output::{preview_table, CsvSink, TableSink};
use crate::quality::{check_quality, QualityReport};
use crate::reports::{aggregate_daily, build_web_daily, consolidate};
use crate::sheets::{publish_reports, SheetsPublisher};
use crate::types::{AdRecord, ConsolidatedRecord, DailyAdAggregate, WebDailyRow, WebRecord};
use crate::util::{format_int, format_number};
use std::path::PathBuf;

pub const ADS_DAILY_TABLE: &str = "ads_daily";
pub const WEB_DAILY_TABLE: &str = "web_daily";
pub const CONSOLIDATED_TABLE: &str = "consolidated";

/// The three output tables plus the advisory quality findings.
#[derive(Debug, Clone)]
pub struct Reports {
    pub quality: QualityReport,
    pub ads_daily: Vec<DailyAdAggregate>,
    pub web_daily: Vec<WebDailyRow>,
    pub consolidated: Vec<ConsolidatedRecord>,
}

/// Outcome of a full run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub reports: Reports,
    pub written: Vec<PathBuf>,
    /// `None` when publishing is not configured, otherwise whether it succeeded.
    pub published: Option<bool>,
}

/// Core transform over combined ad records (already tagged with their
/// source) and the web table.
pub fn transform(ads: Vec<AdRecord>, web: &[WebRecord]) -> Reports {
    let quality = check_quality(&ads);
    let derived = derive_metrics(ads);
    let ads_daily = aggregate_daily(&derived);
    let web_daily = build_web_daily(web);
    let consolidated = consolidate(&ads_daily, &web_daily);
    debug_assert_eq!(consolidated.len(), ads_daily.len());

    tracing::info!(
        ad_rows = derived.len(),
        ads_daily = ads_daily.len(),
        web_daily = web_daily.len(),
        consolidated = consolidated.len(),
        "transform complete"
    );
    Reports {
        quality,
        ads_daily,
        web_daily,
        consolidated,
    }
}

/// Write all three tables. Stops at the first table that cannot be written.
pub fn write_reports<S: TableSink>(sink: &S, reports: &Reports) -> Result<Vec<PathBuf>> {
    Ok(vec![
        sink.write_table(CONSOLIDATED_TABLE, &reports.consolidated)?,
        sink.write_table(ADS_DAILY_TABLE, &reports.ads_daily)?,
        sink.write_table(WEB_DAILY_TABLE, &reports.web_daily)?,
    ])
}

pub fn run(config: &RunConfig) -> Result<RunSummary> {
    let Inputs { ads, web, report } = loader::load_inputs(&config.data_dir)?;
    println!(
        "Processing dataset... ({} google_ads rows, {} facebook_ads rows, {} web_analytics rows)",
        format_int(report.google_rows),
        format_int(report.facebook_rows),
        format_int(report.web_rows)
    );

    let reports = transform(ads, &web);
    reports.quality.print();

    let sink = CsvSink::new(&config.output_dir);
    let written = write_reports(&sink, &reports)?;
    println!(
        "Wrote {}.csv, {}.csv, {}.csv in {}.\n",
        CONSOLIDATED_TABLE,
        ADS_DAILY_TABLE,
        WEB_DAILY_TABLE,
        sink.dir().display()
    );

    if config.preview_rows > 0 {
        preview_table(CONSOLIDATED_TABLE, &reports.consolidated, config.preview_rows);
        preview_table(ADS_DAILY_TABLE, &reports.ads_daily, config.preview_rows);
        preview_table(WEB_DAILY_TABLE, &reports.web_daily, config.preview_rows);
    }
    print_totals(&reports);

    let published = publish_if_configured(config, &reports);
    Ok(RunSummary {
        reports,
        written,
        published,
    })
}

/// Push `ads_daily` and `web_daily` when a spreadsheet is configured. Never
/// fails the run.
pub fn publish_if_configured(config: &RunConfig, reports: &Reports) -> Option<bool> {
    let sheets = config.sheets.as_ref()?;
    match SheetsPublisher::new(sheets) {
        Ok(publisher) => Some(publish_reports(&publisher, &reports.ads_daily, &reports.web_daily)),
        Err(e) => {
            tracing::warn!(error = %e, "spreadsheet publisher unavailable");
            println!("Sheets push failed: {}", e);
            println!("Continuing without push...");
            Some(false)
        }
    }
}

fn print_totals(reports: &Reports) {
    let spend: f64 = reports.ads_daily.iter().map(|a| a.spend).sum();
    let revenue_ads: f64 = reports.ads_daily.iter().map(|a| a.revenue).sum();
    let revenue_web: f64 = reports.consolidated.iter().map(|c| c.revenue_web).sum();
    println!(
        "Totals: spend {}, ad revenue {}, matched web revenue {} across {} day/source rows.\n",
        format_number(spend, 2),
        format_number(revenue_ads, 2),
        format_number(revenue_web, 2),
        format_int(reports.consolidated.len())
    );
}
