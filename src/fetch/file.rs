use crate::fetch::error::FetchError;
use crate::fetch::{Fetcher, ReportKind};
use crate::report::raw_report::RawReport;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};

/// Reads reports from a local directory laid out as `<root>/metar/<ID>.TXT` and
/// `<root>/taf/<ID>.TXT`.
#[derive(Debug, Clone)]
pub struct FileFetcher {
    root: PathBuf,
}

impl FileFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileFetcher { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn report_path(&self, location_id: &str, kind: ReportKind) -> PathBuf {
        self.root
            .join(kind.as_str())
            .join(format!("{location_id}.TXT"))
    }
}

#[async_trait]
impl Fetcher for FileFetcher {
    async fn fetch(&self, location_id: &str, kind: ReportKind) -> Result<RawReport, FetchError> {
        let path = self.report_path(location_id, kind);
        let text = match tokio::fs::read_to_string(&path).await {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(FetchError::NotFound(location_id.to_string()));
            }
            Err(e) => return Err(FetchError::FileRead(path, e)),
        };
        Ok(RawReport::new(&text)?)
    }
}
