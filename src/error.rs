use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors of the batch run. Every variant names the file involved.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("{} is missing required column `{column}`", path.display())]
    MissingColumn { path: PathBuf, column: String },
    #[error("{} line {line}: cannot parse date `{value}`", path.display())]
    InvalidDate {
        path: PathBuf,
        line: u64,
        value: String,
    },
}

/// Failures of the optional spreadsheet push. Never fatal to a run.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("invalid service account credentials: {0}")]
    Credentials(String),
    #[error("failed to sign token assertion: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("spreadsheet API returned {status}: {body}")]
    Api { status: u16, body: String },
}

pub type Result<T> = std::result::Result<T, PipelineError>;
