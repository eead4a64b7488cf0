//! Decoded METAR observations.
//!
//! Records leave the decoder in canonical units (°C, knots, km visibility, ft
//! heights, inHg pressure, inches of precipitation) and are converted for display by
//! [`crate::project`].

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a visibility value relates to the reported figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VisibilityQualifier {
    #[default]
    At,
    Below,
    Beyond,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wind {
    /// Compass point (`"SW"`), `"Variable"` or `"Calm"`.
    pub direction: String,
    pub degrees: Option<u16>,
    pub speed: f64,
    pub gust: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindVariability {
    pub from: u16,
    pub to: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Visibility {
    pub value: f64,
    pub qualifier: VisibilityQualifier,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloudLayer {
    pub amount: String,
    pub height: Option<f64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Runway visual range, heights in feet when canonical.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunwayVisualRange {
    pub runway: String,
    pub range: Visibility,
    pub variable_to: Option<Visibility>,
    pub tendency: Option<String>,
}

/// Body fields shared by the main report and its trends.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conditions {
    pub wind: Option<Wind>,
    pub wind_variability: Option<WindVariability>,
    pub visibility: Option<Visibility>,
    pub runway: Vec<RunwayVisualRange>,
    pub condition: Option<String>,
    pub clouds: Vec<CloudLayer>,
    pub temperature: Option<f64>,
    pub dew_point: Option<f64>,
    pub humidity: Option<f64>,
    pub felt_temperature: Option<f64>,
    pub pressure: Option<f64>,
}

impl Conditions {
    pub fn is_empty(&self) -> bool {
        *self == Conditions::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrecipitationAmount {
    Trace,
    Indeterminable,
    Amount(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Precipitation {
    /// Accumulation period: 1, 3, 6 or 24 hours.
    pub hours: u8,
    pub amount: PrecipitationAmount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AutoStation {
    /// `AO1`
    WithoutPrecipitationDiscriminator,
    /// `AO2`
    WithPrecipitationDiscriminator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PressureChange {
    RisingRapidly,
    FallingRapidly,
}

/// WMO low/middle/high cloud type codes from an `8/lmh` group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CloudTypes {
    pub low: Option<u8>,
    pub middle: Option<u8>,
    pub high: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PressureTendency {
    /// WMO code table 0200 characteristic, 0 to 8.
    pub characteristic: u8,
    pub change: f64,
}

/// Typed remarks, one slot per remark kind.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Remarks {
    pub no_speci: bool,
    pub auto_station: Option<AutoStation>,
    pub pressure_change: Option<PressureChange>,
    pub sea_pressure: Option<f64>,
    pub snow_depth: Option<f64>,
    pub snow_equivalent: Option<f64>,
    pub cloud_types: Option<CloudTypes>,
    pub sunshine_minutes: Option<u32>,
    pub hourly_temperature: Option<f64>,
    pub hourly_dew_point: Option<f64>,
    pub max_temperature_6h: Option<f64>,
    pub min_temperature_6h: Option<f64>,
    pub max_temperature_24h: Option<f64>,
    pub min_temperature_24h: Option<f64>,
    pub pressure_tendency: Option<PressureTendency>,
    pub sensors: Vec<String>,
    pub maintenance_needed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TrendKind {
    Nosig,
    Tempo,
    Becmg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub kind: TrendKind,
    /// `hh:mm`
    pub from: Option<String>,
    pub to: Option<String>,
    pub at: Option<String>,
    #[serde(flatten)]
    pub conditions: Conditions,
}

/// A decoded METAR or SPECI.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherRecord {
    pub station: String,
    /// `METAR` or `SPECI`
    pub report: Option<String>,
    pub update: Option<NaiveDateTime>,
    pub observed: Option<DateTime<Utc>>,
    /// `AUTO` or `COR`
    pub modifier: Option<String>,
    #[serde(flatten)]
    pub conditions: Conditions,
    pub precipitation: Vec<Precipitation>,
    pub remarks: Remarks,
    pub trends: Vec<Trend>,
    pub unparsed: Vec<String>,
}
