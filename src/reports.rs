use crate::types::{
    ConsolidatedRecord, DailyAdAggregate, DerivedAdRecord, Source, WebDailyRow, WebRecord,
};
use crate::util::{safe_ratio, stable_sum};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

/// Group derived ad records by `(date, source)` and recompute the ratios from
/// the summed totals. Row-level ratios are ignored on purpose: averaging them
/// would weight a 10-impression row like a 10,000-impression one.
///
/// Output is sorted by date, then source.
pub fn aggregate_daily(records: &[DerivedAdRecord]) -> Vec<DailyAdAggregate> {
    #[derive(Default)]
    struct Acc {
        impressions: i64,
        clicks: i64,
        conversions: i64,
        spend: Vec<f64>,
        revenue: Vec<f64>,
    }

    let mut map: BTreeMap<(NaiveDate, Source), Acc> = BTreeMap::new();
    for d in records {
        let r = &d.record;
        let e = map.entry((r.date, r.source)).or_default();
        e.impressions += r.impressions;
        e.clicks += r.clicks;
        e.conversions += r.conversions;
        e.spend.push(r.spend);
        e.revenue.push(r.revenue);
    }

    map.into_iter()
        .map(|((date, source), acc)| {
            let spend = stable_sum(acc.spend);
            let revenue = stable_sum(acc.revenue);
            DailyAdAggregate {
                date,
                source,
                impressions: acc.impressions,
                clicks: acc.clicks,
                spend,
                conversions: acc.conversions,
                revenue,
                ctr: safe_ratio(acc.clicks as f64, acc.impressions as f64),
                cpc: safe_ratio(spend, acc.clicks as f64),
                cpa: safe_ratio(spend, acc.conversions as f64),
                roas: safe_ratio(revenue, spend),
            }
        })
        .collect()
}

/// The web table as published: input order, `channel` renamed to `source`.
pub fn build_web_daily(web: &[WebRecord]) -> Vec<WebDailyRow> {
    web.iter()
        .map(|w| WebDailyRow {
            date: w.date,
            source: w.channel.clone(),
            sessions: w.sessions,
            users: w.users,
            transactions: w.transactions,
            revenue: w.revenue,
        })
        .collect()
}

/// Left join of the ad aggregates with the web table on `(date, source)`.
///
/// Every aggregate row yields exactly one output row. Web rows without
/// matching spend are dropped; aggregates without web data get zeroed web
/// fields. Duplicate web rows for one key are summed first so they cannot
/// multiply the left side.
pub fn consolidate(ads_daily: &[DailyAdAggregate], web_daily: &[WebDailyRow]) -> Vec<ConsolidatedRecord> {
    #[derive(Default)]
    struct WebTotals {
        sessions: i64,
        users: i64,
        transactions: i64,
        revenue: Vec<f64>,
    }

    let mut by_key: HashMap<(NaiveDate, &str), WebTotals> = HashMap::new();
    for w in web_daily {
        let e = by_key.entry((w.date, w.source.as_str())).or_default();
        e.sessions += w.sessions;
        e.users += w.users;
        e.transactions += w.transactions;
        e.revenue.push(w.revenue);
    }

    let mut unmatched = 0usize;
    let rows: Vec<ConsolidatedRecord> = ads_daily
        .iter()
        .map(|a| {
            let (sessions, users, transactions, revenue_web) =
                match by_key.remove(&(a.date, a.source.as_str())) {
                    Some(w) => (w.sessions, w.users, w.transactions, stable_sum(w.revenue)),
                    None => {
                        unmatched += 1;
                        (0, 0, 0, 0.0)
                    }
                };
            ConsolidatedRecord {
                date: a.date,
                source: a.source,
                impressions: a.impressions,
                clicks: a.clicks,
                spend: a.spend,
                conversions: a.conversions,
                revenue_ads: a.revenue,
                ctr: a.ctr,
                cpc: a.cpc,
                cpa: a.cpa,
                roas: a.roas,
                sessions,
                users,
                transactions,
                revenue_web,
            }
        })
        .collect();

    tracing::debug!(
        rows = rows.len(),
        unmatched,
        dropped_web_keys = by_key.len(),
        "consolidated ads with web data"
    );
    rows
}
