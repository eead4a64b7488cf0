use crate::fetch::error::FetchError;
use crate::fetch::{Fetcher, ReportKind};
use crate::report::raw_report::RawReport;
use async_trait::async_trait;
use bon::bon;
use log::debug;
use reqwest::{Client, StatusCode};

const BASE_URL: &str = "https://tgftp.nws.noaa.gov/data";

/// Fetches reports from the NOAA text product server.
///
/// Observations live under `observations/metar/stations/<ID>.TXT`, forecasts under
/// `forecasts/taf/stations/<ID>.TXT`.
///
/// # Examples
///
/// ```no_run
/// use metar_weather::{Fetcher, NoaaFetcher, ReportKind};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), metar_weather::FetchError> {
/// let fetcher = NoaaFetcher::builder().build();
/// let raw = fetcher.fetch("KJFK", ReportKind::Metar).await?;
/// println!("{}", raw.body());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct NoaaFetcher {
    client: Client,
    base_url: String,
}

#[bon]
impl NoaaFetcher {
    #[builder]
    pub fn new(client: Option<Client>, base_url: Option<String>) -> Self {
        NoaaFetcher {
            client: client.unwrap_or_default(),
            base_url: base_url
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|| BASE_URL.to_string()),
        }
    }

    pub fn report_url(&self, location_id: &str, kind: ReportKind) -> String {
        let product = match kind {
            ReportKind::Metar => "observations/metar/stations",
            ReportKind::Taf => "forecasts/taf/stations",
        };
        format!("{}/{product}/{location_id}.TXT", self.base_url)
    }
}

impl Default for NoaaFetcher {
    fn default() -> Self {
        NoaaFetcher::builder().build()
    }
}

#[async_trait]
impl Fetcher for NoaaFetcher {
    async fn fetch(&self, location_id: &str, kind: ReportKind) -> Result<RawReport, FetchError> {
        let url = self.report_url(location_id, kind);
        debug!("Fetching {kind} from {url}");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::NetworkRequest(url.clone(), e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(location_id.to_string()));
        }
        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                return Err(match e.status() {
                    Some(status) => FetchError::HttpStatus {
                        url,
                        status,
                        source: e,
                    },
                    None => FetchError::NetworkRequest(url, e),
                });
            }
        };
        let text = response
            .text()
            .await
            .map_err(|e| FetchError::NetworkRequest(url.clone(), e))?;
        Ok(RawReport::new(&text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_product_urls() {
        let fetcher = NoaaFetcher::default();
        assert_eq!(
            fetcher.report_url("KJFK", ReportKind::Metar),
            "https://tgftp.nws.noaa.gov/data/observations/metar/stations/KJFK.TXT"
        );
        assert_eq!(
            fetcher.report_url("EGLL", ReportKind::Taf),
            "https://tgftp.nws.noaa.gov/data/forecasts/taf/stations/EGLL.TXT"
        );
    }

    #[test]
    fn custom_base_url_drops_trailing_slash() {
        let fetcher = NoaaFetcher::builder()
            .base_url("http://localhost:8080/data/".to_string())
            .build();
        assert_eq!(
            fetcher.report_url("KJFK", ReportKind::Taf),
            "http://localhost:8080/data/forecasts/taf/stations/KJFK.TXT"
        );
    }
}
