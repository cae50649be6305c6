//! Error types for the report crate.
//!
//! The aggregation engine itself never fails; these cover the edges that
//! touch files or parse user-supplied selectors.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Unknown trend window '{0}' (expected 7D, 30D, 6M or YTD)")]
    UnknownWindow(String),

    #[error("Invalid reference instant '{0}' (expected RFC 3339)")]
    InvalidReference(String),
}

pub type Result<T> = std::result::Result<T, ReportError>;
