//! Spreadsheet push behaviour with stand-in publishers.

use ads_report::sheets::{publish_reports, publish_table, Publisher, ADS_DAILY_SHEET, WEB_DAILY_SHEET};
use ads_report::types::{AdRecord, Source, WebRecord};
use ads_report::{transform, PublishError, Reports};
use chrono::NaiveDate;
use std::cell::RefCell;

#[derive(Default)]
struct Recording {
    tables: RefCell<Vec<(String, Vec<String>, Vec<Vec<String>>)>>,
}

impl Publisher for Recording {
    fn publish(&self, table_name: &str, header: &[String], rows: &[Vec<String>]) -> Result<(), PublishError> {
        self.tables
            .borrow_mut()
            .push((table_name.to_string(), header.to_vec(), rows.to_vec()));
        Ok(())
    }
}

struct QuotaExceeded;

impl Publisher for QuotaExceeded {
    fn publish(&self, _: &str, _: &[String], _: &[Vec<String>]) -> Result<(), PublishError> {
        Err(PublishError::Api {
            status: 429,
            body: "quota exceeded".into(),
        })
    }
}

fn sample_reports() -> Reports {
    let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let ads = vec![AdRecord {
        date,
        source: Source::GoogleAds,
        impressions: 1000,
        clicks: 50,
        spend: 100.0,
        conversions: 5,
        revenue: 500.0,
    }];
    let web = vec![WebRecord {
        date,
        channel: "google_ads".into(),
        sessions: 300,
        users: 250,
        transactions: 8,
        revenue: 400.0,
    }];
    transform(ads, &web)
}

#[test]
fn pushes_ads_then_web_with_headers() {
    let reports = sample_reports();
    let publisher = Recording::default();
    assert!(publish_reports(&publisher, &reports.ads_daily, &reports.web_daily));

    let tables = publisher.tables.borrow();
    assert_eq!(tables.len(), 2);
    assert_eq!(tables[0].0, ADS_DAILY_SHEET);
    assert_eq!(tables[1].0, WEB_DAILY_SHEET);
    assert_eq!(tables[0].1[0], "date");
    assert_eq!(tables[0].1.len(), 11);
    assert_eq!(tables[0].2[0][0], "2024-01-01");
    assert_eq!(tables[0].2[0][1], "google_ads");
    assert_eq!(tables[1].1, ["date", "source", "sessions", "users", "transactions", "revenue"]);
    assert_eq!(tables[1].2[0][2], "300");
}

#[test]
fn failure_is_swallowed() {
    let reports = sample_reports();
    assert!(!publish_reports(&QuotaExceeded, &reports.ads_daily, &reports.web_daily));
}

#[test]
fn publish_table_reports_error_to_caller() {
    let reports = sample_reports();
    let err = publish_table(&QuotaExceeded, ADS_DAILY_SHEET, &reports.ads_daily).unwrap_err();
    assert!(err.to_string().contains("429"));
}
