use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

pub const SHEET_ID_VAR: &str = "SHEET_ID";
pub const SERVICE_ACCOUNT_VAR: &str = "GOOGLE_SERVICE_ACCOUNT_JSON";
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(30);

/// Everything one run needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub preview_rows: usize,
    /// `None` disables the spreadsheet push.
    pub sheets: Option<SheetsConfig>,
}

/// Spreadsheet target and the service account allowed to write to it.
#[derive(Clone, PartialEq)]
pub struct SheetsConfig {
    pub sheet_id: String,
    pub service_account_json: String,
    pub timeout: Duration,
}

impl SheetsConfig {
    /// Read the publish settings from the process environment.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the settings from any key lookup. Both values must be present
    /// and non-blank, otherwise publishing stays off.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Some(Self {
            sheet_id: non_empty(SHEET_ID_VAR)?.trim().to_string(),
            service_account_json: non_empty(SERVICE_ACCOUNT_VAR)?,
            timeout: DEFAULT_PUBLISH_TIMEOUT,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for SheetsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SheetsConfig")
            .field("sheet_id", &self.sheet_id)
            .field("service_account_json", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}
