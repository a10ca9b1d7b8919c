// Optional push of report tables to a Google Spreadsheet.
//
// Each table lands in a worksheet of the same name. The worksheet is deleted
// and re-added on every push so stale rows never survive, then filled with a
// header row and stringified values.
use crate::config::SheetsConfig;
use crate::error::PublishError;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::blocking::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::borrow::Cow;
use std::cell::RefCell;
use tabled::Tabled;

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

pub const ADS_DAILY_SHEET: &str = "ads_daily";
pub const WEB_DAILY_SHEET: &str = "web_daily";

/// An external surface that accepts named tables of strings.
pub trait Publisher {
    fn publish(&self, table_name: &str, header: &[String], rows: &[Vec<String>]) -> Result<(), PublishError>;
}

/// Stringify a typed table and hand it to `publisher`.
pub fn publish_table<P, T>(publisher: &P, table_name: &str, rows: &[T]) -> Result<(), PublishError>
where
    P: Publisher + ?Sized,
    T: Tabled,
{
    let header: Vec<String> = T::headers().into_iter().map(Cow::into_owned).collect();
    let values: Vec<Vec<String>> = rows
        .iter()
        .map(|r| r.fields().into_iter().map(Cow::into_owned).collect())
        .collect();
    publisher.publish(table_name, &header, &values)
}

/// Push `ads_daily` and `web_daily`. A failure is reported and swallowed;
/// the return value only says whether the push went through.
pub fn publish_reports<P, A, W>(publisher: &P, ads_daily: &[A], web_daily: &[W]) -> bool
where
    P: Publisher + ?Sized,
    A: Tabled,
    W: Tabled,
{
    let result = publish_table(publisher, ADS_DAILY_SHEET, ads_daily)
        .and_then(|_| publish_table(publisher, WEB_DAILY_SHEET, web_daily));
    match result {
        Ok(()) => {
            tracing::info!("pushed reports to spreadsheet");
            println!("Pushed data to Google Sheets.");
            true
        }
        Err(e) => {
            tracing::warn!(error = %e, "spreadsheet push failed");
            println!("Sheets push failed: {}", e);
            println!("Continuing without push...");
            false
        }
    }
}

#[derive(Debug, Deserialize)]
struct ServiceAccountKey {
    client_email: String,
    private_key: String,
    token_uri: Option<String>,
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// [`Publisher`] backed by the Sheets v4 REST API.
pub struct SheetsPublisher {
    sheet_id: String,
    key: ServiceAccountKey,
    client: Client,
    token: RefCell<Option<String>>,
}

impl SheetsPublisher {
    pub fn new(config: &SheetsConfig) -> Result<Self, PublishError> {
        let key: ServiceAccountKey = serde_json::from_str(&config.service_account_json)
            .map_err(|e| PublishError::Credentials(e.to_string()))?;
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            sheet_id: config.sheet_id.clone(),
            key,
            client,
            token: RefCell::new(None),
        })
    }

    fn token_uri(&self) -> &str {
        self.key.token_uri.as_deref().unwrap_or(DEFAULT_TOKEN_URI)
    }

    fn assertion(&self) -> Result<String, PublishError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            iss: &self.key.client_email,
            scope: SHEETS_SCOPE,
            aud: self.token_uri(),
            iat: now,
            exp: now + 3600,
        };
        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &key)?)
    }

    /// Bearer token, fetched on first use and reused for the rest of the run.
    fn access_token(&self) -> Result<String, PublishError> {
        if let Some(token) = self.token.borrow().as_ref() {
            return Ok(token.clone());
        }
        let assertion = self.assertion()?;
        let resp = self
            .client
            .post(self.token_uri())
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().unwrap_or_default();
            return Err(PublishError::Auth(format!("{} - {}", status, body)));
        }
        let token = resp.json::<TokenResponse>()?.access_token;
        *self.token.borrow_mut() = Some(token.clone());
        Ok(token)
    }

    fn find_sheet(&self, token: &str, title: &str) -> Result<Option<i64>, PublishError> {
        let resp = self
            .client
            .get(format!("{}/{}", SHEETS_API, self.sheet_id))
            .bearer_auth(token)
            .query(&[("fields", "sheets.properties")])
            .send()?;
        let body: Value = check(resp)?.json()?;
        Ok(sheet_id_by_title(&body, title))
    }

    fn batch_update(&self, token: &str, request: Value) -> Result<Value, PublishError> {
        let resp = self
            .client
            .post(format!("{}/{}:batchUpdate", SHEETS_API, self.sheet_id))
            .bearer_auth(token)
            .json(&json!({ "requests": [request] }))
            .send()?;
        Ok(check(resp)?.json()?)
    }

    fn write_values(&self, token: &str, title: &str, values: Value) -> Result<(), PublishError> {
        let range = format!("{}!A1", title);
        let resp = self
            .client
            .put(format!(
                "{}/{}/values/{}",
                SHEETS_API,
                self.sheet_id,
                urlencoding::encode(&range)
            ))
            .bearer_auth(token)
            .query(&[("valueInputOption", "RAW")])
            .json(&json!({ "range": range, "majorDimension": "ROWS", "values": values }))
            .send()?;
        check(resp)?;
        Ok(())
    }
}

impl Publisher for SheetsPublisher {
    fn publish(&self, table_name: &str, header: &[String], rows: &[Vec<String>]) -> Result<(), PublishError> {
        let token = self.access_token()?;

        if let Some(existing) = self.find_sheet(&token, table_name)? {
            self.batch_update(&token, json!({ "deleteSheet": { "sheetId": existing } }))?;
        }
        let (row_count, column_count) = grid_size(header.len(), rows.len());
        self.batch_update(
            &token,
            json!({
                "addSheet": {
                    "properties": {
                        "title": table_name,
                        "gridProperties": { "rowCount": row_count, "columnCount": column_count }
                    }
                }
            }),
        )?;
        self.write_values(&token, table_name, values_payload(header, rows))?;

        tracing::info!(sheet = table_name, rows = rows.len(), "published worksheet");
        Ok(())
    }
}

fn check(resp: Response) -> Result<Response, PublishError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(PublishError::Api {
            status: status.as_u16(),
            body: resp.text().unwrap_or_default(),
        })
    }
}

fn sheet_id_by_title(spreadsheet: &Value, title: &str) -> Option<i64> {
    spreadsheet["sheets"]
        .as_array()?
        .iter()
        .find(|s| s["properties"]["title"].as_str() == Some(title))
        .and_then(|s| s["properties"]["sheetId"].as_i64())
}

/// Worksheet size: data rows plus 10 spare rows, columns plus 5 spare.
fn grid_size(columns: usize, rows: usize) -> (usize, usize) {
    (rows + 10, columns + 5)
}

fn values_payload(header: &[String], rows: &[Vec<String>]) -> Value {
    let mut values = Vec::with_capacity(rows.len() + 1);
    values.push(json!(header));
    values.extend(rows.iter().map(|r| json!(r)));
    Value::Array(values)
}
