//! Retrieval of raw report text.

pub mod error;
pub mod file;
pub mod noaa;

use crate::fetch::error::FetchError;
use crate::report::raw_report::RawReport;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which product to retrieve for a location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportKind {
    /// Current conditions.
    Metar,
    /// Terminal aerodrome forecast.
    Taf,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Metar => "metar",
            ReportKind::Taf => "taf",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source of raw METAR and TAF text.
///
/// Implementations return the report exactly as published: an update timestamp line
/// followed by the encoded body.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// # Errors
    ///
    /// Returns [`FetchError::NotFound`] when the source has no report for `location_id`,
    /// a transport error when retrieval fails, or [`FetchError::Malformed`] when the
    /// text is not a report.
    async fn fetch(&self, location_id: &str, kind: ReportKind) -> Result<RawReport, FetchError>;
}
