use thiserror::Error;

use crate::kind::EntityKind;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("HTTP status {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("{kind} page {url} is missing {field}")]
    MissingField {
        url: String,
        kind: EntityKind,
        field: &'static str,
    },

    #[error("Parse error: {0}")]
    ParseError(String),
}

impl ScanError {
    /// True when the page was fetched but did not yield a usable record.
    pub fn is_extraction_failure(&self) -> bool {
        matches!(self, ScanError::MissingField { .. } | ScanError::ParseError(_))
    }
}

pub type Result<T> = std::result::Result<T, ScanError>;
