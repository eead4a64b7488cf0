//! Aviation weather for airports: fetch METAR observations and TAF forecasts, decode
//! them into typed records and convert them into the units you want.

mod cache;
mod error;
pub mod fetch;
mod geo;
pub mod locations;
mod report;
mod types;
mod units;
mod utils;
mod weather;

pub use error::WeatherError;
pub use weather::*;

pub use cache::{Cache, CacheKey, CacheKind, CachedRecord, MemoryCache};

pub use fetch::error::FetchError;
pub use fetch::file::FileFetcher;
pub use fetch::noaa::NoaaFetcher;
pub use fetch::{Fetcher, ReportKind};

pub use locations::airport_directory::AirportDirectory;
pub use locations::error::LocateAirportError;
pub use locations::store::InMemoryLocationStore;
pub use locations::LocationStore;

pub use geo::{nearest, polar_to_cartesian, GeoIndex, GeoPoint, Neighbor, Pruning, EARTH_RADIUS_KM};

pub use report::error::ReportError;
pub use report::forecast_view::{ForecastRow, ForecastView};
pub use report::metar::MetarDecoder;
pub use report::raw_report::RawReport;
pub use report::taf::TafDecoder;
pub use report::tokenizer::{tokenize, Token};

pub use types::airport::{AirportLocation, LatLon, PLACEHOLDER_ID};
pub use types::forecast_record::*;
pub use types::weather_record::*;

pub use units::convert::{
    convert_distance, convert_pressure, convert_speed, convert_temperature, relative_humidity,
    wind_chill, DistanceUnit, PressureUnit, SpeedUnit, TemperatureUnit,
};
pub use units::error::UnitError;
pub use units::format::{Units, UnitsFormat};
pub use units::project::{project, Project, UnitProjector};
