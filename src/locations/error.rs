use reqwest::StatusCode;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Failures while loading the airport station list or its cache file.
#[derive(Debug, Error)]
pub enum LocateAirportError {
    #[error("No cache directory available for the airport list")]
    CacheDirResolution(#[source] io::Error),

    #[error("Failed to create airport cache directory '{0}'")]
    CacheDirCreation(PathBuf, #[source] io::Error),

    #[error("Failed to read airport cache '{0}'")]
    CacheRead(PathBuf, #[source] io::Error),

    #[error("Failed to write airport cache '{0}'")]
    CacheWrite(PathBuf, #[source] io::Error),

    #[error("Airport cache '{0}' does not hold an airport list")]
    CacheDecode(PathBuf, #[source] Box<bincode::error::DecodeError>),

    #[error("Failed to encode the airport list for caching")]
    CacheEncode(#[source] Box<bincode::error::EncodeError>),

    #[error("Station list download from {url} failed{}", status_suffix(.status))]
    Download {
        url: String,
        status: Option<StatusCode>,
        #[source]
        source: reqwest::Error,
    },

    #[error("Station list stream from {url} could not be read")]
    StationListRead {
        url: String,
        #[source]
        source: io::Error,
    },

    #[error("Station list from {0} contains no airports")]
    EmptyStationList(String),

    #[error("Failed to parse airport JSON")]
    AirportJson(#[from] serde_json::Error),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}

fn status_suffix(status: &Option<StatusCode>) -> String {
    status.map_or_else(String::new, |s| format!(" with status {s}"))
}
