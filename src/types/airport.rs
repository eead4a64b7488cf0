//! Airport metadata as stored by a [`crate::LocationStore`].

use serde::{Deserialize, Serialize};

/// An airport reporting station.
///
/// Identifiers are ICAO codes (e.g. `"KJFK"`); stations without one carry the
/// placeholder `"----"` and sort after real codes in name searches.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AirportLocation {
    /// The ICAO identifier, or `"----"`.
    pub id: String,
    /// Station name as published (e.g. "New York/John F. Kennedy Intl").
    pub name: String,
    /// State or province code, when the country has one.
    pub state: Option<String>,
    pub country: String,
    /// Latitude in decimal degrees (positive for North, negative for South).
    pub latitude: f64,
    /// Longitude in decimal degrees (positive for East, negative for West).
    pub longitude: f64,
    /// Elevation above sea level in meters, if available.
    pub elevation: Option<i32>,
    /// Precomputed `[x, y, z]` from [`crate::polar_to_cartesian`], in km.
    #[serde(default)]
    pub cartesian: Option<[f64; 3]>,
}

pub const PLACEHOLDER_ID: &str = "----";

impl AirportLocation {
    pub fn has_icao_id(&self) -> bool {
        self.id != PLACEHOLDER_ID
    }

    /// Cartesian position, computing it when it was not stored.
    pub fn position(&self) -> [f64; 3] {
        self.cartesian
            .unwrap_or_else(|| crate::geo::polar_to_cartesian(self.latitude, self.longitude))
    }
}

/// Represents a geographical coordinate using latitude and longitude.
///
/// # Examples
///
/// ```
/// use metar_weather::LatLon;
///
/// let jfk = LatLon(40.6398, -73.7789);
/// assert_eq!(jfk.0, 40.6398); // Latitude
/// assert_eq!(jfk.1, -73.7789); // Longitude
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub f64, pub f64);
