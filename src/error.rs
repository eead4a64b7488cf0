use crate::fetch::error::FetchError;
use crate::locations::error::LocateAirportError;
use crate::report::error::ReportError;
use crate::units::error::UnitError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Invalid location id '{0}'")]
    InvalidLocation(String),

    #[error("No location found for '{0}'")]
    NotFoundLocation(String),

    #[error(transparent)]
    MalformedSource(#[from] ReportError),

    #[error(transparent)]
    InvalidUnit(#[from] UnitError),

    #[error(transparent)]
    Fetch(FetchError),

    #[error(transparent)]
    LocateAirport(#[from] LocateAirportError),
}

impl From<FetchError> for WeatherError {
    fn from(error: FetchError) -> Self {
        match error {
            FetchError::NotFound(id) => WeatherError::NotFoundLocation(id),
            FetchError::Malformed(e) => WeatherError::MalformedSource(e),
            other => WeatherError::Fetch(other),
        }
    }
}
