use crate::error::{PipelineError, Result};
use crate::types::{AdRecord, RawAdRow, RawWebRow, Source, WebRecord};
use crate::util::parse_date;
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::de::DeserializeOwned;
use std::fs::File;
use std::path::{Path, PathBuf};

pub const GOOGLE_ADS_FILE: &str = "google_ads.csv";
pub const FACEBOOK_ADS_FILE: &str = "facebook_ads.csv";
pub const WEB_ANALYTICS_FILE: &str = "web_analytics.csv";

pub const AD_COLUMNS: [&str; 6] = ["date", "impressions", "clicks", "spend", "conversions", "revenue"];
pub const WEB_COLUMNS: [&str; 6] = ["date", "channel", "sessions", "users", "transactions", "revenue"];

/// The three input tables of one run.
#[derive(Debug, Clone)]
pub struct Inputs {
    /// Google rows followed by Facebook rows, each tagged with its source.
    pub ads: Vec<AdRecord>,
    pub web: Vec<WebRecord>,
    pub report: LoadReport,
}

#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub google_rows: usize,
    pub facebook_rows: usize,
    pub web_rows: usize,
}

/// Load `google_ads.csv`, `facebook_ads.csv` and `web_analytics.csv` from
/// `data_dir`. Any missing file, missing column or bad date aborts the load.
pub fn load_inputs(data_dir: &Path) -> Result<Inputs> {
    let mut ads = load_ads(&data_dir.join(GOOGLE_ADS_FILE), Source::GoogleAds)?;
    let google_rows = ads.len();
    ads.extend(load_ads(&data_dir.join(FACEBOOK_ADS_FILE), Source::FacebookAds)?);
    let facebook_rows = ads.len() - google_rows;
    let web = load_web(&data_dir.join(WEB_ANALYTICS_FILE))?;

    let report = LoadReport {
        google_rows,
        facebook_rows,
        web_rows: web.len(),
    };
    tracing::info!(
        google_rows,
        facebook_rows,
        web_rows = report.web_rows,
        dir = %data_dir.display(),
        "loaded input tables"
    );
    Ok(Inputs { ads, web, report })
}

pub fn load_ads(path: &Path, source: Source) -> Result<Vec<AdRecord>> {
    read_rows::<RawAdRow>(path, &AD_COLUMNS)?
        .into_iter()
        .map(|(line, row)| -> Result<_> {
            Ok(AdRecord {
                date: date_field(path, line, &row.date)?,
                source,
                impressions: row.impressions,
                clicks: row.clicks,
                spend: row.spend,
                conversions: row.conversions,
                revenue: row.revenue,
            })
        })
        .collect()
}

pub fn load_web(path: &Path) -> Result<Vec<WebRecord>> {
    read_rows::<RawWebRow>(path, &WEB_COLUMNS)?
        .into_iter()
        .map(|(line, row)| -> Result<_> {
            Ok(WebRecord {
                date: date_field(path, line, &row.date)?,
                channel: row.channel,
                sessions: row.sessions,
                users: row.users,
                transactions: row.transactions,
                revenue: row.revenue,
            })
        })
        .collect()
}

/// Read every row of `path`, paired with its 1-based file line.
fn read_rows<T: DeserializeOwned>(path: &Path, columns: &[&str]) -> Result<Vec<(u64, T)>> {
    let file = File::open(path).map_err(|source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut rdr = ReaderBuilder::new().trim(Trim::All).from_reader(file);
    let headers = rdr.headers().map_err(|e| csv_error(path, e))?.clone();
    check_columns(path, &headers, columns)?;

    let mut rows = Vec::new();
    for result in rdr.deserialize::<T>() {
        let row = result.map_err(|e| csv_error(path, e))?;
        // Header is line 1; the first record follows it.
        rows.push((rows.len() as u64 + 2, row));
    }
    Ok(rows)
}

fn check_columns(path: &Path, headers: &StringRecord, columns: &[&str]) -> Result<()> {
    match columns.iter().find(|c| !headers.iter().any(|h| h == **c)) {
        Some(missing) => Err(PipelineError::MissingColumn {
            path: path.to_path_buf(),
            column: (*missing).to_string(),
        }),
        None => Ok(()),
    }
}

fn date_field(path: &Path, line: u64, value: &str) -> Result<chrono::NaiveDate> {
    parse_date(value).ok_or_else(|| PipelineError::InvalidDate {
        path: path.to_path_buf(),
        line,
        value: value.to_string(),
    })
}

fn csv_error(path: &Path, source: csv::Error) -> PipelineError {
    PipelineError::Csv {
        path: PathBuf::from(path),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn loads_ads_and_tags_source() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "google_ads.csv",
            "date,impressions,clicks,spend,conversions,revenue\n2024-01-01,1000,50,100.0,5,500.0\n",
        );
        let rows = load_ads(&path, Source::GoogleAds).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].source, Source::GoogleAds);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(rows[0].clicks, 50);
    }

    #[test]
    fn negative_values_load_for_validation() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "fb.csv",
            "date,impressions,clicks,spend,conversions,revenue\n2024-01-01,10,1,-5,0,0\n",
        );
        let rows = load_ads(&path, Source::FacebookAds).unwrap();
        assert_eq!(rows[0].spend, -5.0);
    }

    #[test]
    fn column_order_and_extra_columns_do_not_matter() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "web.csv",
            "channel,date,note,sessions,users,transactions,revenue\ngoogle_ads,2024-01-01,x,300,250,8,400\n",
        );
        let rows = load_web(&path).unwrap();
        assert_eq!(rows[0].channel, "google_ads");
        assert_eq!(rows[0].sessions, 300);
    }

    #[test]
    fn missing_column_is_fatal() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "g.csv", "date,impressions,clicks,spend,revenue\n");
        match load_ads(&path, Source::GoogleAds) {
            Err(PipelineError::MissingColumn { column, .. }) => assert_eq!(column, "conversions"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn bad_date_reports_line_and_value() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "g.csv",
            "date,impressions,clicks,spend,conversions,revenue\n2024-01-01,1,1,1,1,1\nyesterday,1,1,1,1,1\n",
        );
        match load_ads(&path, Source::GoogleAds) {
            Err(PipelineError::InvalidDate { line, value, .. }) => {
                assert_eq!(line, 3);
                assert_eq!(value, "yesterday");
            }
            other => panic!("expected InvalidDate, got {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = load_inputs(dir.path()).unwrap_err();
        assert!(matches!(err, PipelineError::Io { .. }));
        assert!(err.to_string().contains(GOOGLE_ADS_FILE));
    }
}
