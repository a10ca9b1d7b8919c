// Entry point: parse flags, resolve configuration once, run one batch pass.
//
// The spreadsheet push is configured from `SHEET_ID` and
// `GOOGLE_SERVICE_ACCOUNT_JSON` (a `.env` file is honoured) and only runs
// when both are set.
use ads_report::{RunConfig, SheetsConfig};
use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ads_report",
    about = "Consolidate ad spend and web analytics into daily reporting tables"
)]
struct Cli {
    /// Directory holding google_ads.csv, facebook_ads.csv and web_analytics.csv.
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// Where to write the output tables. Defaults to the data directory.
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Rows of each table echoed to the console (0 disables previews).
    #[arg(long, default_value_t = 5)]
    preview_rows: usize,

    /// Skip the spreadsheet push even when it is configured.
    #[arg(long, default_value_t = false)]
    no_publish: bool,

    /// Timeout for each spreadsheet API request, in seconds.
    #[arg(long, default_value_t = 30)]
    publish_timeout_secs: u64,
}

impl Cli {
    fn into_config(self) -> RunConfig {
        let sheets = if self.no_publish {
            None
        } else {
            SheetsConfig::from_env()
                .map(|s| s.with_timeout(Duration::from_secs(self.publish_timeout_secs)))
        };
        RunConfig {
            output_dir: self.output_dir.unwrap_or_else(|| self.data_dir.clone()),
            data_dir: self.data_dir,
            preview_rows: self.preview_rows,
            sheets,
        }
    }
}

fn main() -> Result<()> {
    // A missing .env file is normal.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let config = Cli::parse().into_config();
    tracing::debug!(?config, "resolved configuration");

    let summary = ads_report::run(&config)
        .with_context(|| format!("report run over {} failed", config.data_dir.display()))?;
    tracing::info!(
        files = summary.written.len(),
        published = ?summary.published,
        "run finished"
    );
    Ok(())
}
