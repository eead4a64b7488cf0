use crate::units::convert::{DistanceUnit, PressureUnit, SpeedUnit, TemperatureUnit};
use crate::units::error::UnitError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// The unit set a record is expressed in.
///
/// `height` covers cloud bases, wind shear and runway visual range; `rain` covers
/// precipitation and snow amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Units {
    pub temperature: TemperatureUnit,
    pub wind: SpeedUnit,
    pub visibility: DistanceUnit,
    pub height: DistanceUnit,
    pub pressure: PressureUnit,
    pub rain: PressureUnit,
}

impl Units {
    /// Units the decoders produce and the cache stores.
    pub const CANONICAL: Units = Units {
        temperature: TemperatureUnit::Celsius,
        wind: SpeedUnit::Knots,
        visibility: DistanceUnit::Kilometers,
        height: DistanceUnit::Feet,
        pressure: PressureUnit::Inches,
        rain: PressureUnit::Inches,
    };

    pub const STANDARD: Units = Units {
        temperature: TemperatureUnit::Fahrenheit,
        wind: SpeedUnit::Mph,
        visibility: DistanceUnit::StatuteMiles,
        height: DistanceUnit::Feet,
        pressure: PressureUnit::Inches,
        rain: PressureUnit::Inches,
    };

    pub const METRIC: Units = Units {
        temperature: TemperatureUnit::Celsius,
        wind: SpeedUnit::Kmh,
        visibility: DistanceUnit::Kilometers,
        height: DistanceUnit::Meters,
        pressure: PressureUnit::Millibar,
        rain: PressureUnit::Millimeter,
    };

    /// Builds a unit set from unit strings, e.g. `("c", "kt", "km", "ft", "hpa", "mm")`.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::InvalidUnit`] for the first unit string that is not recognised.
    pub fn from_strs(
        temperature: &str,
        wind: &str,
        visibility: &str,
        height: &str,
        pressure: &str,
        rain: &str,
    ) -> Result<Self, UnitError> {
        Ok(Units {
            temperature: temperature.parse()?,
            wind: wind.parse()?,
            visibility: visibility.parse()?,
            height: height.parse()?,
            pressure: pressure.parse()?,
            rain: rain.parse()?,
        })
    }
}

/// Selects the units a client hands records back in.
///
/// # Examples
///
/// ```
/// use metar_weather::{Units, UnitsFormat};
///
/// let format: UnitsFormat = "metric".parse().unwrap();
/// assert_eq!(format, UnitsFormat::Metric);
/// assert_eq!(format.units(), Units::METRIC);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnitsFormat {
    #[default]
    Standard,
    Metric,
    Custom(Units),
}

impl UnitsFormat {
    pub fn units(&self) -> Units {
        match self {
            UnitsFormat::Standard => Units::STANDARD,
            UnitsFormat::Metric => Units::METRIC,
            UnitsFormat::Custom(units) => *units,
        }
    }

    /// Short label used in cache keys.
    pub fn label(&self) -> String {
        match self {
            UnitsFormat::Standard => "s".to_string(),
            UnitsFormat::Metric => "m".to_string(),
            UnitsFormat::Custom(u) => format!(
                "c:{}:{}:{}:{}:{}:{}",
                u.temperature, u.wind, u.visibility, u.height, u.pressure, u.rain
            ),
        }
    }
}

impl FromStr for UnitsFormat {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('s') => Ok(UnitsFormat::Standard),
            Some('m') => Ok(UnitsFormat::Metric),
            _ => Err(UnitError::invalid("format", s)),
        }
    }
}
