//! The client tying fetching, decoding, caching and unit projection together.

use crate::cache::{Cache, CacheKey, CacheKind, CachedRecord};
use crate::error::WeatherError;
use crate::fetch::{Fetcher, ReportKind};
use crate::locations::LocationStore;
use crate::report::metar::MetarDecoder;
use crate::report::taf::TafDecoder;
use crate::types::airport::{AirportLocation, LatLon};
use crate::types::forecast_record::ForecastRecord;
use crate::types::weather_record::WeatherRecord;
use crate::units::format::{Units, UnitsFormat};
use crate::units::project::project;
use bon::bon;
use haversine::{distance, Location as HaversineLocation, Units as HaversineUnits};
use log::debug;
use serde::Serialize;

/// An airport returned by [`Weather::nearest_airports`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NearestAirport {
    pub airport: AirportLocation,
    /// Great-circle distance from the query point.
    pub distance_km: f64,
}

/// Uppercases a location id and checks it looks like an ICAO code.
fn normalize_id(location: &str) -> Result<String, WeatherError> {
    let id = location.trim().to_ascii_uppercase();
    let mut chars = id.chars();
    let valid = id.len() == 4
        && chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric());
    if valid {
        Ok(id)
    } else {
        Err(WeatherError::InvalidLocation(location.to_string()))
    }
}

/// Weather client for airport observations (METAR) and forecasts (TAF).
///
/// Decoded records are cached in canonical units and projected into the requested
/// [`UnitsFormat`] on every call.
///
/// # Examples
///
/// ```no_run
/// use metar_weather::{AirportDirectory, NoaaFetcher, UnitsFormat, Weather, WeatherError};
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), WeatherError> {
/// let weather = Weather::builder()
///     .fetcher(NoaaFetcher::default())
///     .locations(AirportDirectory::open_default().await?)
///     .units_format(UnitsFormat::Metric)
///     .build();
///
/// let current = weather.current_conditions().location("EHAM").call().await?;
/// println!("{}: {:?} °C", current.station, current.conditions.temperature);
/// # Ok(())
/// # }
/// ```
pub struct Weather<F: Fetcher, L: LocationStore> {
    fetcher: F,
    locations: L,
    cache: Option<Box<dyn Cache>>,
    units_format: UnitsFormat,
}

#[bon]
impl<F: Fetcher, L: LocationStore> Weather<F, L> {
    /// Creates a client.
    ///
    /// # Arguments
    ///
    /// * `.fetcher(F)`: **Required.** Source of raw report text.
    /// * `.locations(L)`: **Required.** Airport metadata used for display names and searches.
    /// * `.cache(Box<dyn Cache>)`: Optional. Without one, every call fetches.
    /// * `.units_format(UnitsFormat)`: Optional. Defaults to [`UnitsFormat::Standard`].
    #[builder]
    pub fn new(
        fetcher: F,
        locations: L,
        cache: Option<Box<dyn Cache>>,
        #[builder(default)] units_format: UnitsFormat,
    ) -> Self {
        Weather {
            fetcher,
            locations,
            cache,
            units_format,
        }
    }

    pub fn units_format(&self) -> UnitsFormat {
        self.units_format
    }

    pub fn set_units_format(&mut self, units_format: UnitsFormat) {
        self.units_format = units_format;
    }

    /// The unit set for `format`, or for the client's default format.
    pub fn units(&self, format: Option<UnitsFormat>) -> Units {
        format.unwrap_or(self.units_format).units()
    }

    fn cached(&self, key: &CacheKey) -> Option<CachedRecord> {
        self.cache.as_ref()?.get(key)
    }

    fn store(&self, key: CacheKey, record: CachedRecord) {
        if let Some(cache) = &self.cache {
            let ttl = key.kind.ttl();
            cache.put(key, record, ttl);
        }
    }

    /// Looks up an airport by ICAO id.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherError::InvalidLocation`] for ids that are not four characters
    /// starting with a letter, and [`WeatherError::NotFoundLocation`] for unknown ids.
    pub fn location(&self, id: &str) -> Result<AirportLocation, WeatherError> {
        let id = normalize_id(id)?;
        let key = CacheKey {
            location: id.clone(),
            kind: CacheKind::Location,
            units: String::new(),
            days: None,
        };
        if let Some(CachedRecord::Location(location)) = self.cached(&key) {
            return Ok(location);
        }
        let location = self
            .locations
            .by_id(&id)
            .ok_or_else(|| WeatherError::NotFoundLocation(id.clone()))?;
        self.store(key, CachedRecord::Location(location.clone()));
        Ok(location)
    }

    /// Searches airports by a fragment of their name.
    ///
    /// # Arguments
    ///
    /// * `.name(&str)`: **Required.** Case-insensitive name fragment.
    /// * `.state(&str)`: Optional. Exact state or province code.
    /// * `.country(&str)`: Optional. Exact country name.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherError::NotFoundLocation`] when nothing matches.
    #[builder]
    pub fn search_locations(
        &self,
        name: &str,
        state: Option<&str>,
        country: Option<&str>,
    ) -> Result<Vec<AirportLocation>, WeatherError> {
        let found = self.locations.search_by_name(name, state, country);
        if found.is_empty() {
            return Err(WeatherError::NotFoundLocation(name.to_string()));
        }
        Ok(found)
    }

    /// Finds the airports closest to a point, closest first.
    ///
    /// # Arguments
    ///
    /// * `.location(LatLon)`: **Required.** Point to search around.
    /// * `.limit(usize)`: Optional. Number of airports to return. Defaults to `1`.
    #[builder]
    pub fn nearest_airports(&self, location: LatLon, limit: Option<usize>) -> Vec<NearestAirport> {
        let LatLon(latitude, longitude) = location;
        self.locations
            .nearest(latitude, longitude, limit.unwrap_or(1))
            .into_iter()
            .map(|airport| {
                let distance_km = distance(
                    HaversineLocation {
                        latitude,
                        longitude,
                    },
                    HaversineLocation {
                        latitude: airport.latitude,
                        longitude: airport.longitude,
                    },
                    HaversineUnits::Kilometers,
                );
                NearestAirport {
                    airport,
                    distance_km,
                }
            })
            .collect()
    }

    /// Current conditions at an airport.
    ///
    /// # Arguments
    ///
    /// * `.location(&str)`: **Required.** ICAO id, case-insensitive.
    /// * `.units_format(UnitsFormat)`: Optional. Overrides the client's format for this call.
    ///
    /// # Errors
    ///
    /// Returns [`WeatherError::InvalidLocation`] for malformed ids,
    /// [`WeatherError::NotFoundLocation`] when no report is published,
    /// [`WeatherError::MalformedSource`] when the fetched text is not a report, and
    /// [`WeatherError::Fetch`] for transport failures.
    #[builder]
    pub async fn current_conditions(
        &self,
        location: &str,
        units_format: Option<UnitsFormat>,
    ) -> Result<WeatherRecord, WeatherError> {
        let id = normalize_id(location)?;
        let format = units_format.unwrap_or(self.units_format);
        let key = CacheKey {
            location: id.clone(),
            kind: CacheKind::Weather,
            units: format.label(),
            days: None,
        };

        let record = match self.cached(&key) {
            Some(CachedRecord::Weather(record)) => {
                debug!("Using cached observation for {id}");
                record
            }
            _ => {
                let raw = self.fetcher.fetch(&id, ReportKind::Metar).await?;
                let record = MetarDecoder.decode(&raw);
                self.store(key, CachedRecord::Weather(record.clone()));
                record
            }
        };

        let display = self.location(&id).ok();
        Ok(project(&record, format.units(), display.as_ref()))
    }

    /// The terminal aerodrome forecast for an airport.
    ///
    /// # Arguments
    ///
    /// * `.location(&str)`: **Required.** ICAO id, case-insensitive.
    /// * `.days(u8)`: Optional. Requested forecast days.
    /// * `.units_format(UnitsFormat)`: Optional. Overrides the client's format for this call.
    ///
    /// # Errors
    ///
    /// Same as [`Weather::current_conditions`].
    #[builder]
    pub async fn forecast(
        &self,
        location: &str,
        days: Option<u8>,
        units_format: Option<UnitsFormat>,
    ) -> Result<ForecastRecord, WeatherError> {
        let id = normalize_id(location)?;
        let format = units_format.unwrap_or(self.units_format);
        let key = CacheKey {
            location: id.clone(),
            kind: CacheKind::Forecast,
            units: format.label(),
            days,
        };

        let record = match self.cached(&key) {
            Some(CachedRecord::Forecast(record)) => {
                debug!("Using cached forecast for {id}");
                record
            }
            _ => {
                let raw = self.fetcher.fetch(&id, ReportKind::Taf).await?;
                let record = TafDecoder.decode(&raw);
                self.store(key, CachedRecord::Forecast(record.clone()));
                record
            }
        };

        let display = self.location(&id).ok();
        Ok(project(&record, format.units(), display.as_ref()))
    }
}
