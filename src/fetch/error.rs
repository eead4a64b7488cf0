use crate::report::error::ReportError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("No report published for '{0}'")]
    NotFound(String),

    #[error("Network request failed for {0}")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to read report file '{0}'")]
    FileRead(PathBuf, #[source] std::io::Error),

    #[error(transparent)]
    Malformed(#[from] ReportError),
}
