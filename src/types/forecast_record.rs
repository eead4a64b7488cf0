use crate::types::weather_record::{CloudLayer, Visibility, Wind};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Low-level wind shear from a `WShhh/dddssKT` group.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WindShear {
    pub height: f64,
    pub degrees: u16,
    pub speed: f64,
}

/// Forecast maximum or minimum temperature (`TX`/`TN` groups).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureExtreme {
    pub value: f64,
    pub day: Option<u32>,
    pub hour: u32,
}

/// Fields a forecast period or change group may state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastConditions {
    pub wind: Option<Wind>,
    pub visibility: Option<Visibility>,
    pub condition: Option<String>,
    pub clouds: Vec<CloudLayer>,
    pub wind_shear: Option<WindShear>,
}

impl ForecastConditions {
    pub fn is_empty(&self) -> bool {
        *self == ForecastConditions::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeKind {
    Prob,
    Tempo,
    Becmg,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeGroup {
    pub kind: ChangeKind,
    pub probability: Option<u8>,
    /// `hh:mm`; unset groups apply to their whole period.
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(flatten)]
    pub conditions: ForecastConditions,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPeriod {
    /// `hh:mm` start of the period.
    pub time: String,
    #[serde(flatten)]
    pub conditions: ForecastConditions,
    pub changes: Vec<ChangeGroup>,
}

/// A decoded TAF bulletin.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRecord {
    pub station: String,
    pub update: Option<NaiveDateTime>,
    pub issued: Option<DateTime<Utc>>,
    /// `AMD` or `COR`
    pub modifier: Option<String>,
    pub valid_raw: Option<String>,
    pub valid_from: Option<DateTime<Utc>>,
    pub valid_to: Option<DateTime<Utc>>,
    pub temperature_high: Option<TemperatureExtreme>,
    pub temperature_low: Option<TemperatureExtreme>,
    pub periods: Vec<ForecastPeriod>,
    pub unparsed: Vec<String>,
}
