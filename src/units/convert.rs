//! Unit conversion tables and derived meteorological values.
//!
//! Every conversion is rounded to two decimals. Unit strings are parsed
//! case-insensitively through [`FromStr`], so callers holding user input can use
//! the `convert_*` functions directly and get an [`UnitError`] back for unknown
//! units.

use crate::units::error::UnitError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Temperature scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    /// Converts `value` from `self` into `to`, rounded to two decimals.
    ///
    /// ```
    /// use metar_weather::TemperatureUnit;
    ///
    /// let f = TemperatureUnit::Celsius.convert(20.0, TemperatureUnit::Fahrenheit);
    /// assert_eq!(f, 68.0);
    /// ```
    pub fn convert(self, value: f64, to: TemperatureUnit) -> f64 {
        let converted = match (self, to) {
            (TemperatureUnit::Fahrenheit, TemperatureUnit::Celsius) => (value - 32.0) / 1.8,
            (TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit) => 1.8 * value + 32.0,
            _ => value,
        };
        round_to(converted, 2)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "C",
            TemperatureUnit::Fahrenheit => "F",
        }
    }
}

impl FromStr for TemperatureUnit {
    type Err = UnitError;

    /// Only the first letter is significant, so `"c"`, `"C"` and `"celsius"` all parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('c') => Ok(TemperatureUnit::Celsius),
            Some('f') => Ok(TemperatureUnit::Fahrenheit),
            _ => Err(UnitError::invalid("temperature", s)),
        }
    }
}

/// Speed units used for wind, gusts and wind shear.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SpeedUnit {
    Mph,
    Kmh,
    Knots,
    Mps,
    Fps,
}

// Rows are the source unit, columns the target, both in declaration order.
const SPEED_FACTORS: [[f64; 5]; 5] = [
    [1.0, 1.609344, 0.8689762, 0.44704, 1.4666667],
    [0.6213712, 1.0, 0.5399568, 0.2777778, 0.9113444],
    [1.1507794, 1.852, 1.0, 0.5144444, 1.6878099],
    [2.2369363, 3.6, 1.9438445, 1.0, 3.2808399],
    [0.6818182, 1.09728, 0.5924838, 0.3048, 1.0],
];

impl SpeedUnit {
    fn index(self) -> usize {
        match self {
            SpeedUnit::Mph => 0,
            SpeedUnit::Kmh => 1,
            SpeedUnit::Knots => 2,
            SpeedUnit::Mps => 3,
            SpeedUnit::Fps => 4,
        }
    }

    pub fn factor(self, to: SpeedUnit) -> f64 {
        SPEED_FACTORS[self.index()][to.index()]
    }

    pub fn convert(self, value: f64, to: SpeedUnit) -> f64 {
        round_to(value * self.factor(to), 2)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            SpeedUnit::Mph => "mph",
            SpeedUnit::Kmh => "km/h",
            SpeedUnit::Knots => "kt",
            SpeedUnit::Mps => "m/s",
            SpeedUnit::Fps => "ft/s",
        }
    }
}

impl FromStr for SpeedUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '/')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "mph" => Ok(SpeedUnit::Mph),
            "kmh" | "kph" => Ok(SpeedUnit::Kmh),
            "kt" | "kts" => Ok(SpeedUnit::Knots),
            "mps" | "ms" => Ok(SpeedUnit::Mps),
            "fps" | "fts" => Ok(SpeedUnit::Fps),
            _ => Err(UnitError::invalid("speed", s)),
        }
    }
}

/// Pressure units. Also used for precipitation and snow amounts (`Inches`, `Millimeter`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PressureUnit {
    Inches,
    Hectopascal,
    Millibar,
    Millimeter,
    Atmosphere,
}

const PRESSURE_FACTORS: [[f64; 5]; 5] = [
    [1.0, 33.863887, 33.863887, 25.4, 0.0334213],
    [0.02953, 1.0, 1.0, 0.7500616, 0.0009869],
    [0.02953, 1.0, 1.0, 0.7500616, 0.0009869],
    [0.0393701, 1.3332239, 1.3332239, 1.0, 0.0013158],
    [29.921258, 1013.2501, 1013.2501, 759.999952, 1.0],
];

impl PressureUnit {
    fn index(self) -> usize {
        match self {
            PressureUnit::Inches => 0,
            PressureUnit::Hectopascal => 1,
            PressureUnit::Millibar => 2,
            PressureUnit::Millimeter => 3,
            PressureUnit::Atmosphere => 4,
        }
    }

    pub fn factor(self, to: PressureUnit) -> f64 {
        PRESSURE_FACTORS[self.index()][to.index()]
    }

    pub fn convert(self, value: f64, to: PressureUnit) -> f64 {
        round_to(value * self.factor(to), 2)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            PressureUnit::Inches => "in",
            PressureUnit::Hectopascal => "hPa",
            PressureUnit::Millibar => "mb",
            PressureUnit::Millimeter => "mm",
            PressureUnit::Atmosphere => "atm",
        }
    }
}

impl FromStr for PressureUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "in" | "inhg" => Ok(PressureUnit::Inches),
            "hpa" => Ok(PressureUnit::Hectopascal),
            "mb" | "mbar" => Ok(PressureUnit::Millibar),
            "mm" | "mmhg" => Ok(PressureUnit::Millimeter),
            "atm" => Ok(PressureUnit::Atmosphere),
            _ => Err(UnitError::invalid("pressure", s)),
        }
    }
}

/// Distance units for visibility and heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DistanceUnit {
    Kilometers,
    Feet,
    StatuteMiles,
    Meters,
}

const DISTANCE_FACTORS: [[f64; 4]; 4] = [
    [1.0, 3280.839895, 0.6213699, 1000.0],
    [0.0003048, 1.0, 0.0001894, 0.3048],
    [1.6093472, 5280.0106, 1.0, 1609.3472],
    [0.001, 3.2808399, 0.0006214, 1.0],
];

impl DistanceUnit {
    fn index(self) -> usize {
        match self {
            DistanceUnit::Kilometers => 0,
            DistanceUnit::Feet => 1,
            DistanceUnit::StatuteMiles => 2,
            DistanceUnit::Meters => 3,
        }
    }

    pub fn factor(self, to: DistanceUnit) -> f64 {
        DISTANCE_FACTORS[self.index()][to.index()]
    }

    pub fn convert(self, value: f64, to: DistanceUnit) -> f64 {
        round_to(value * self.factor(to), 2)
    }

    pub fn symbol(self) -> &'static str {
        match self {
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Feet => "ft",
            DistanceUnit::StatuteMiles => "sm",
            DistanceUnit::Meters => "m",
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = UnitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "km" => Ok(DistanceUnit::Kilometers),
            "ft" => Ok(DistanceUnit::Feet),
            "sm" | "mi" => Ok(DistanceUnit::StatuteMiles),
            "m" => Ok(DistanceUnit::Meters),
            _ => Err(UnitError::invalid("distance", s)),
        }
    }
}

macro_rules! impl_display_symbol {
    ($($unit:ty),*) => {
        $(impl fmt::Display for $unit {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.symbol())
            }
        })*
    };
}

impl_display_symbol!(TemperatureUnit, SpeedUnit, PressureUnit, DistanceUnit);

/// Converts a temperature between two unit strings.
///
/// # Errors
///
/// Returns [`UnitError::InvalidUnit`] if either unit is unknown.
///
/// # Examples
///
/// ```
/// use metar_weather::convert_temperature;
///
/// assert_eq!(convert_temperature(-40.0, "f", "c").unwrap(), -40.0);
/// assert!(convert_temperature(1.0, "k", "c").is_err());
/// ```
pub fn convert_temperature(value: f64, from: &str, to: &str) -> Result<f64, UnitError> {
    Ok(from
        .parse::<TemperatureUnit>()?
        .convert(value, to.parse()?))
}

/// Converts a speed between two unit strings (`mph`, `kmh`, `kt`, `mps`, `fps`).
pub fn convert_speed(value: f64, from: &str, to: &str) -> Result<f64, UnitError> {
    Ok(from.parse::<SpeedUnit>()?.convert(value, to.parse()?))
}

/// Converts a pressure between two unit strings (`in`, `hpa`, `mb`, `mm`, `atm`).
pub fn convert_pressure(value: f64, from: &str, to: &str) -> Result<f64, UnitError> {
    Ok(from.parse::<PressureUnit>()?.convert(value, to.parse()?))
}

/// Converts a distance between two unit strings (`km`, `ft`, `sm`, `m`).
pub fn convert_distance(value: f64, from: &str, to: &str) -> Result<f64, UnitError> {
    Ok(from.parse::<DistanceUnit>()?.convert(value, to.parse()?))
}

/// Wind chill in °F for a temperature in °F and a wind speed in mph. Not rounded.
pub fn wind_chill(temperature_f: f64, speed_mph: f64) -> f64 {
    let v = speed_mph.powf(0.16);
    35.74 + 0.6215 * temperature_f - 35.75 * v + 0.4275 * temperature_f * v
}

fn vapour_pressure(temperature_c: f64) -> f64 {
    6.11 * 10f64.powf(7.5 * temperature_c / (237.7 + temperature_c))
}

/// Relative humidity in percent from temperature and dew point in °C, rounded to one decimal.
///
/// ```
/// use metar_weather::relative_humidity;
///
/// assert_eq!(relative_humidity(15.0, 15.0), 100.0);
/// ```
pub fn relative_humidity(temperature_c: f64, dew_point_c: f64) -> f64 {
    round_to(
        100.0 * vapour_pressure(dew_point_c) / vapour_pressure(temperature_c),
        1,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLES: [f64; 5] = [0.0, 1.0, 12.5, 29.92, -7.3];

    fn round_trip_tolerance(back_factor: f64, value: f64) -> f64 {
        // Each leg rounds to 0.005; the first leg's error is magnified by the way back.
        0.005 * back_factor.max(1.0) + 0.005 + 1e-4 * value.abs() + 1e-9
    }

    #[test]
    fn temperature_round_trips() {
        let units = [TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit];
        for from in units {
            for to in units {
                for value in SAMPLES {
                    let back = to.convert(from.convert(value, to), from);
                    let tolerance = round_trip_tolerance(1.8, value);
                    assert!((back - value).abs() <= tolerance, "{from}->{to} {value} gave {back}");
                }
            }
        }
    }

    #[test]
    fn speed_round_trips() {
        let units = [
            SpeedUnit::Mph,
            SpeedUnit::Kmh,
            SpeedUnit::Knots,
            SpeedUnit::Mps,
            SpeedUnit::Fps,
        ];
        for from in units {
            for to in units {
                for value in SAMPLES {
                    let back = to.convert(from.convert(value, to), from);
                    let tolerance = round_trip_tolerance(to.factor(from), value);
                    assert!((back - value).abs() <= tolerance, "{from}->{to} {value} gave {back}");
                }
            }
        }
    }

    #[test]
    fn pressure_round_trips() {
        let units = [
            PressureUnit::Inches,
            PressureUnit::Hectopascal,
            PressureUnit::Millibar,
            PressureUnit::Millimeter,
            PressureUnit::Atmosphere,
        ];
        for from in units {
            for to in units {
                for value in SAMPLES {
                    let back = to.convert(from.convert(value, to), from);
                    let tolerance = round_trip_tolerance(to.factor(from), value);
                    assert!((back - value).abs() <= tolerance, "{from}->{to} {value} gave {back}");
                }
            }
        }
    }

    #[test]
    fn distance_round_trips() {
        let units = [
            DistanceUnit::Kilometers,
            DistanceUnit::Feet,
            DistanceUnit::StatuteMiles,
            DistanceUnit::Meters,
        ];
        for from in units {
            for to in units {
                for value in SAMPLES {
                    let back = to.convert(from.convert(value, to), from);
                    let tolerance = round_trip_tolerance(to.factor(from), value);
                    assert!((back - value).abs() <= tolerance, "{from}->{to} {value} gave {back}");
                }
            }
        }
    }

    #[test]
    fn unit_strings_are_case_insensitive() {
        assert_eq!("KT".parse::<SpeedUnit>().unwrap(), SpeedUnit::Knots);
        assert_eq!("km/h".parse::<SpeedUnit>().unwrap(), SpeedUnit::Kmh);
        assert_eq!("Kts".parse::<SpeedUnit>().unwrap(), SpeedUnit::Knots);
        assert_eq!("HPA".parse::<PressureUnit>().unwrap(), PressureUnit::Hectopascal);
        assert_eq!("Fahrenheit".parse::<TemperatureUnit>().unwrap(), TemperatureUnit::Fahrenheit);
        assert_eq!("SM".parse::<DistanceUnit>().unwrap(), DistanceUnit::StatuteMiles);
    }

    #[test]
    fn unknown_unit_is_rejected() {
        let err = convert_speed(10.0, "furlongs", "kt").unwrap_err();
        assert_eq!(err, UnitError::invalid("speed", "furlongs"));
        assert!(err.to_string().contains("furlongs"));
        assert!(convert_pressure(1.0, "in", "psi").is_err());
        assert!(convert_distance(1.0, "", "km").is_err());
    }

    #[test]
    fn string_conversions_use_the_tables() {
        assert_eq!(convert_speed(10.0, "kt", "mph").unwrap(), 11.51);
        assert_eq!(convert_pressure(1013.0, "hpa", "in").unwrap(), 29.91);
        assert_eq!(convert_distance(1.0, "sm", "km").unwrap(), 1.61);
        assert_eq!(convert_temperature(100.0, "C", "F").unwrap(), 212.0);
    }

    #[test]
    fn wind_chill_matches_formula() {
        assert!((wind_chill(30.0, 10.0) - 21.2483).abs() < 1e-3);
        assert!((wind_chill(0.0, 20.0) - (-21.9952)).abs() < 1e-3);
    }

    #[test]
    fn humidity_from_dew_point() {
        assert_eq!(relative_humidity(-5.0, -10.0), 67.9);
        assert_eq!(relative_humidity(20.0, 10.0), 52.6);
    }
}
