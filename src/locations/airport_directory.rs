use crate::locations::error::LocateAirportError;
use crate::locations::nsd::parse_station_list;
use crate::locations::store::InMemoryLocationStore;
use crate::locations::LocationStore;
use crate::types::airport::AirportLocation;
use crate::utils::{ensure_cache_dir_exists, get_cache_dir};
use async_compression::tokio::bufread::GzipDecoder;
use bincode::config::{Configuration, Fixint, LittleEndian};
use futures_util::TryStreamExt;
use log::{debug, info};
use reqwest::Client;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};
use tokio_util::io::StreamReader;

const STATION_LIST_URL: &str = "https://tgftp.nws.noaa.gov/data/nsd_cccc.txt";
const BINCODE_CACHE_FILE_NAME: &str = "nsd_airports.bin";
const BINCODE_CONFIG: Configuration<LittleEndian, Fixint> =
    bincode::config::standard().with_fixed_int_encoding();

/// The NOAA airport station list, downloaded once and kept as a bincode cache file.
///
/// # Examples
///
/// ```no_run
/// use metar_weather::{AirportDirectory, LocationStore};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), metar_weather::LocateAirportError> {
/// let directory = AirportDirectory::open_default().await?;
/// let jfk = directory.by_id("KJFK");
/// println!("{jfk:?}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AirportDirectory {
    store: InMemoryLocationStore,
}

impl AirportDirectory {
    /// Loads the directory from the default cache folder, downloading the station list
    /// on first use.
    ///
    /// # Errors
    ///
    /// Returns [`LocateAirportError::CacheDirResolution`] or
    /// [`LocateAirportError::CacheDirCreation`] when the cache folder is unusable, and
    /// the download or cache variants when loading fails.
    pub async fn open_default() -> Result<Self, LocateAirportError> {
        let cache_dir = get_cache_dir().map_err(LocateAirportError::CacheDirResolution)?;
        ensure_cache_dir_exists(&cache_dir)
            .await
            .map_err(|e| LocateAirportError::CacheDirCreation(cache_dir.clone(), e))?;
        Self::new(&cache_dir).await
    }

    pub async fn new(cache_dir: &Path) -> Result<Self, LocateAirportError> {
        Self::with_source(cache_dir, STATION_LIST_URL).await
    }

    /// Like [`AirportDirectory::new`], downloading from `url` when there is no cache
    /// file yet. A `url` ending in `.gz` is decompressed while streaming.
    pub async fn with_source(cache_dir: &Path, url: &str) -> Result<Self, LocateAirportError> {
        let cache_file = Self::cache_file(cache_dir);

        let airports = if cache_file.exists() {
            let path = cache_file.clone();
            tokio::task::spawn_blocking(move || Self::read_cache(&path)).await??
        } else {
            info!("Airport cache not found. Fetching station list from {url}");
            let airports = Self::download(url).await?;
            Self::write_cache(airports.clone(), &cache_file).await?;
            airports
        };

        Ok(Self::from_airports(airports))
    }

    pub fn from_airports(airports: Vec<AirportLocation>) -> Self {
        AirportDirectory {
            store: InMemoryLocationStore::new(airports),
        }
    }

    pub fn cache_file(cache_dir: &Path) -> PathBuf {
        cache_dir.join(BINCODE_CACHE_FILE_NAME)
    }

    fn read_cache(cache_path: &Path) -> Result<Vec<AirportLocation>, LocateAirportError> {
        let bytes = std::fs::read(cache_path)
            .map_err(|e| LocateAirportError::CacheRead(cache_path.to_path_buf(), e))?;
        let (airports, _) =
            bincode::serde::decode_from_slice::<Vec<AirportLocation>, _>(&bytes, BINCODE_CONFIG)
                .map_err(|e| {
                    LocateAirportError::CacheDecode(cache_path.to_path_buf(), Box::new(e))
                })?;
        debug!(
            "Loaded {} airports from {}",
            airports.len(),
            cache_path.display()
        );
        Ok(airports)
    }

    async fn download(url: &str) -> Result<Vec<AirportLocation>, LocateAirportError> {
        let download_error = |e: reqwest::Error| LocateAirportError::Download {
            url: url.to_string(),
            status: e.status(),
            source: e,
        };
        let response = Client::new()
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(download_error)?;

        let stream = response.bytes_stream().map_err(io::Error::other);
        let reader = BufReader::new(StreamReader::new(stream));
        let bytes = if url.ends_with(".gz") {
            read_all(GzipDecoder::new(reader)).await
        } else {
            read_all(reader).await
        }
        .map_err(|e| LocateAirportError::StationListRead {
            url: url.to_string(),
            source: e,
        })?;

        Self::parse_downloaded(url, bytes).await
    }

    async fn parse_downloaded(
        url: &str,
        bytes: Vec<u8>,
    ) -> Result<Vec<AirportLocation>, LocateAirportError> {
        let parse_start = Instant::now();
        let airports = tokio::task::spawn_blocking(move || {
            parse_station_list(&String::from_utf8_lossy(&bytes))
        })
        .await?;
        if airports.is_empty() {
            return Err(LocateAirportError::EmptyStationList(url.to_string()));
        }
        info!(
            "Parsed {} airports from the station list in {:?}",
            airports.len(),
            parse_start.elapsed()
        );
        Ok(airports)
    }

    async fn write_cache(
        airports: Vec<AirportLocation>,
        cache_path: &Path,
    ) -> Result<(), LocateAirportError> {
        let data = tokio::task::spawn_blocking(move || {
            bincode::serde::encode_to_vec(airports, BINCODE_CONFIG)
                .map_err(|e| LocateAirportError::CacheEncode(Box::new(e)))
        })
        .await??;
        tokio::fs::write(cache_path, &data)
            .await
            .map_err(|e| LocateAirportError::CacheWrite(cache_path.to_path_buf(), e))?;
        info!(
            "Wrote airport cache ({} bytes) to {}",
            data.len(),
            cache_path.display()
        );
        Ok(())
    }
}

async fn read_all<R: AsyncRead + Unpin>(reader: R) -> io::Result<Vec<u8>> {
    let mut bytes = Vec::with_capacity(1_000_000);
    BufReader::new(reader).read_to_end(&mut bytes).await?;
    Ok(bytes)
}

impl LocationStore for AirportDirectory {
    fn by_id(&self, id: &str) -> Option<AirportLocation> {
        self.store.by_id(id)
    }

    fn search_by_name(
        &self,
        name: &str,
        state: Option<&str>,
        country: Option<&str>,
    ) -> Vec<AirportLocation> {
        self.store.search_by_name(name, state, country)
    }

    fn all_airports(&self) -> &[AirportLocation] {
        self.store.all_airports()
    }

    fn nearest(&self, latitude: f64, longitude: f64, limit: usize) -> Vec<AirportLocation> {
        self.store.nearest(latitude, longitude, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const LIST: &str = "\
KJFK;74;486;New York/John F. Kennedy Intl;NY;United States;4;40-38N;073-46-45W;;;9;;
EGLL;03;772;London / Heathrow Airport;;United Kingdom;6;51-29N;000-27W;;;24;;
";

    #[tokio::test]
    async fn loads_from_existing_cache_file() {
        let dir = tempdir().unwrap();
        let cache_file = AirportDirectory::cache_file(dir.path());
        AirportDirectory::write_cache(parse_station_list(LIST), &cache_file)
            .await
            .unwrap();

        // The URL is never contacted because the cache file exists.
        let directory = AirportDirectory::with_source(dir.path(), "http://127.0.0.1:9/unused.txt")
            .await
            .unwrap();
        assert_eq!(directory.all_airports().len(), 2);
        assert_eq!(directory.by_id("EGLL").unwrap().country, "United Kingdom");
        assert_eq!(directory.nearest(51.0, 0.0, 1)[0].id, "EGLL");
    }

    #[tokio::test]
    async fn corrupt_cache_file_is_a_decode_error() {
        let dir = tempdir().unwrap();
        std::fs::write(AirportDirectory::cache_file(dir.path()), b"\x01").unwrap();
        let err = AirportDirectory::with_source(dir.path(), "http://127.0.0.1:9/unused.txt")
            .await
            .unwrap_err();
        assert!(matches!(err, LocateAirportError::CacheDecode(..)));
    }

    #[tokio::test]
    async fn station_list_without_airports_is_rejected() {
        let err = AirportDirectory::parse_downloaded("http://host/nsd.txt", b"<html></html>".to_vec())
            .await
            .unwrap_err();
        assert!(matches!(err, LocateAirportError::EmptyStationList(url) if url == "http://host/nsd.txt"));

        let airports = AirportDirectory::parse_downloaded("http://host/nsd.txt", LIST.as_bytes().to_vec())
            .await
            .unwrap();
        assert_eq!(airports.len(), 2);
    }
}
