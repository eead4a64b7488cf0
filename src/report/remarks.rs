//! The `RMK` sub-grammar of a METAR.
//!
//! Remark groups are matched one token at a time against [`REMARK_RULES`] and always
//! land on the top-level record, whatever trend the body cursor was in.

use crate::report::grammar::signed_tenths;
use crate::report::lookup;
use crate::report::rules::{Consumption, GrammarRule};
use crate::types::weather_record::{
    AutoStation, CloudTypes, Precipitation, PrecipitationAmount, PressureChange,
    PressureTendency, Remarks,
};
use crate::units::convert::PressureUnit;
use regex::Regex;
use std::sync::LazyLock;

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($re).expect("static pattern compiles"));
    };
}

pattern!(SEA_PRESSURE, r"^SLP(\d{3}|NO)$");
pattern!(PRECIPITATION, r"^([P67])(\d{4}|////)$");
pattern!(SNOW_DEPTH, r"^4/(\d{3})$");
pattern!(SNOW_EQUIVALENT, r"^933(\d{3})$");
pattern!(CLOUD_TYPES, r"^8/([\d/])([\d/])([\d/])$");
pattern!(SUNSHINE, r"^98(\d{3})$");
pattern!(HOURLY_TEMPERATURE, r"^T([01])(\d{3})(?:([01])(\d{3}))?$");
pattern!(MAX_TEMPERATURE_6H, r"^1([01])(\d{3})$");
pattern!(MIN_TEMPERATURE_6H, r"^2([01])(\d{3})$");
pattern!(TEMPERATURE_24H, r"^4([01])(\d{3})([01])(\d{3})$");
pattern!(PRESSURE_TENDENCY, r"^5([0-8])(\d{3})$");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RemarkRule {
    NoSpeci,
    AutoStation,
    PressureChange,
    SeaPressure,
    Precipitation,
    SnowDepth,
    SnowEquivalent,
    CloudTypes,
    Sunshine,
    HourlyTemperature,
    MaxTemperature6h,
    MinTemperature6h,
    Temperature24h,
    PressureTendency,
    Sensor,
    Maintenance,
}

impl GrammarRule for RemarkRule {
    fn consumption(self) -> Consumption {
        match self {
            RemarkRule::Precipitation | RemarkRule::Sensor => Consumption::Repeat,
            _ => Consumption::Once,
        }
    }
}

pub(crate) static REMARK_RULES: [RemarkRule; 16] = [
    RemarkRule::NoSpeci,
    RemarkRule::AutoStation,
    RemarkRule::PressureChange,
    RemarkRule::SeaPressure,
    RemarkRule::Precipitation,
    RemarkRule::SnowDepth,
    RemarkRule::SnowEquivalent,
    RemarkRule::CloudTypes,
    RemarkRule::Sunshine,
    RemarkRule::HourlyTemperature,
    RemarkRule::MaxTemperature6h,
    RemarkRule::MinTemperature6h,
    RemarkRule::Temperature24h,
    RemarkRule::PressureTendency,
    RemarkRule::Sensor,
    RemarkRule::Maintenance,
];

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum RemarkGroup {
    NoSpeci,
    AutoStation(AutoStation),
    PressureChange(PressureChange),
    /// `None` for `SLPNO`.
    SeaPressure(Option<f64>),
    Precipitation {
        kind: char,
        amount: PrecipitationAmount,
    },
    SnowDepth(f64),
    SnowEquivalent(f64),
    CloudTypes(CloudTypes),
    Sunshine(u32),
    HourlyTemperature(f64, Option<f64>),
    MaxTemperature6h(f64),
    MinTemperature6h(f64),
    Temperature24h { max: f64, min: f64 },
    PressureTendency(PressureTendency),
    Sensor(String),
    Maintenance,
}

/// Sea-level pressure in hPa from the three digits of an `SLPppp` group.
///
/// Values above 500 are placed in the 900s, everything else is offset from 1000.
pub(crate) fn sea_level_hpa(value: f64) -> f64 {
    if value > 500.0 {
        900.0 + value / 100.0
    } else {
        1000.0 + value
    }
}

fn cloud_code(c: &str) -> Option<u8> {
    c.parse().ok()
}

pub(crate) fn match_remark(rule: RemarkRule, text: &str) -> Option<RemarkGroup> {
    match rule {
        RemarkRule::NoSpeci => (text == "NOSPECI").then_some(RemarkGroup::NoSpeci),
        RemarkRule::AutoStation => match text {
            "AO1" => Some(RemarkGroup::AutoStation(
                AutoStation::WithoutPrecipitationDiscriminator,
            )),
            "AO2" => Some(RemarkGroup::AutoStation(
                AutoStation::WithPrecipitationDiscriminator,
            )),
            _ => None,
        },
        RemarkRule::PressureChange => match text {
            "PRESRR" => Some(RemarkGroup::PressureChange(PressureChange::RisingRapidly)),
            "PRESFR" => Some(RemarkGroup::PressureChange(PressureChange::FallingRapidly)),
            _ => None,
        },
        RemarkRule::SeaPressure => {
            let caps = SEA_PRESSURE.captures(text)?;
            let value = caps.get(1)?.as_str();
            if value == "NO" {
                return Some(RemarkGroup::SeaPressure(None));
            }
            let hpa = sea_level_hpa(value.parse().ok()?);
            Some(RemarkGroup::SeaPressure(Some(
                PressureUnit::Hectopascal.convert(hpa, PressureUnit::Inches),
            )))
        }
        RemarkRule::Precipitation => {
            let caps = PRECIPITATION.captures(text)?;
            let kind = caps.get(1)?.as_str().chars().next()?;
            let amount = match caps.get(2)?.as_str() {
                "0000" => PrecipitationAmount::Trace,
                "////" => PrecipitationAmount::Indeterminable,
                hundredths => PrecipitationAmount::Amount(hundredths.parse::<f64>().ok()? / 100.0),
            };
            Some(RemarkGroup::Precipitation { kind, amount })
        }
        RemarkRule::SnowDepth => {
            let caps = SNOW_DEPTH.captures(text)?;
            Some(RemarkGroup::SnowDepth(caps.get(1)?.as_str().parse().ok()?))
        }
        RemarkRule::SnowEquivalent => {
            let caps = SNOW_EQUIVALENT.captures(text)?;
            let tenths: f64 = caps.get(1)?.as_str().parse().ok()?;
            Some(RemarkGroup::SnowEquivalent(tenths / 10.0))
        }
        RemarkRule::CloudTypes => {
            let caps = CLOUD_TYPES.captures(text)?;
            Some(RemarkGroup::CloudTypes(CloudTypes {
                low: cloud_code(caps.get(1)?.as_str()),
                middle: cloud_code(caps.get(2)?.as_str()),
                high: cloud_code(caps.get(3)?.as_str()),
            }))
        }
        RemarkRule::Sunshine => {
            let caps = SUNSHINE.captures(text)?;
            Some(RemarkGroup::Sunshine(caps.get(1)?.as_str().parse().ok()?))
        }
        RemarkRule::HourlyTemperature => {
            let caps = HOURLY_TEMPERATURE.captures(text)?;
            let temperature = signed_tenths(caps.get(1)?.as_str(), caps.get(2)?.as_str())?;
            let dew_point = match (caps.get(3), caps.get(4)) {
                (Some(sign), Some(digits)) => signed_tenths(sign.as_str(), digits.as_str()),
                _ => None,
            };
            Some(RemarkGroup::HourlyTemperature(temperature, dew_point))
        }
        RemarkRule::MaxTemperature6h => {
            let caps = MAX_TEMPERATURE_6H.captures(text)?;
            Some(RemarkGroup::MaxTemperature6h(signed_tenths(
                caps.get(1)?.as_str(),
                caps.get(2)?.as_str(),
            )?))
        }
        RemarkRule::MinTemperature6h => {
            let caps = MIN_TEMPERATURE_6H.captures(text)?;
            Some(RemarkGroup::MinTemperature6h(signed_tenths(
                caps.get(1)?.as_str(),
                caps.get(2)?.as_str(),
            )?))
        }
        RemarkRule::Temperature24h => {
            let caps = TEMPERATURE_24H.captures(text)?;
            Some(RemarkGroup::Temperature24h {
                max: signed_tenths(caps.get(1)?.as_str(), caps.get(2)?.as_str())?,
                min: signed_tenths(caps.get(3)?.as_str(), caps.get(4)?.as_str())?,
            })
        }
        RemarkRule::PressureTendency => {
            let caps = PRESSURE_TENDENCY.captures(text)?;
            let tenths: f64 = caps.get(2)?.as_str().parse().ok()?;
            Some(RemarkGroup::PressureTendency(PressureTendency {
                characteristic: caps.get(1)?.as_str().parse().ok()?,
                change: PressureUnit::Hectopascal.convert(tenths / 10.0, PressureUnit::Inches),
            }))
        }
        RemarkRule::Sensor => {
            lookup::sensor_outage(text).map(|s| RemarkGroup::Sensor(s.to_string()))
        }
        RemarkRule::Maintenance => (text == "$").then_some(RemarkGroup::Maintenance),
    }
}

/// Accumulation period of a `6` group: 3 h at the intermediate synoptic hours, else 6 h.
pub(crate) fn six_group_hours(observation_hour: Option<u32>) -> u8 {
    match observation_hour {
        Some(3 | 9 | 15 | 21) => 3,
        _ => 6,
    }
}

pub(crate) fn apply_remark(
    group: RemarkGroup,
    remarks: &mut Remarks,
    precipitation: &mut Vec<Precipitation>,
    observation_hour: Option<u32>,
) {
    match group {
        RemarkGroup::NoSpeci => remarks.no_speci = true,
        RemarkGroup::AutoStation(kind) => remarks.auto_station = Some(kind),
        RemarkGroup::PressureChange(change) => remarks.pressure_change = Some(change),
        RemarkGroup::SeaPressure(value) => remarks.sea_pressure = value,
        RemarkGroup::Precipitation { kind, amount } => {
            let hours = match kind {
                'P' => 1,
                '6' => six_group_hours(observation_hour),
                _ => 24,
            };
            precipitation.push(Precipitation { hours, amount });
        }
        RemarkGroup::SnowDepth(inches) => remarks.snow_depth = Some(inches),
        RemarkGroup::SnowEquivalent(inches) => remarks.snow_equivalent = Some(inches),
        RemarkGroup::CloudTypes(types) => remarks.cloud_types = Some(types),
        RemarkGroup::Sunshine(minutes) => remarks.sunshine_minutes = Some(minutes),
        RemarkGroup::HourlyTemperature(temperature, dew_point) => {
            remarks.hourly_temperature = Some(temperature);
            remarks.hourly_dew_point = dew_point;
        }
        RemarkGroup::MaxTemperature6h(value) => remarks.max_temperature_6h = Some(value),
        RemarkGroup::MinTemperature6h(value) => remarks.min_temperature_6h = Some(value),
        RemarkGroup::Temperature24h { max, min } => {
            remarks.max_temperature_24h = Some(max);
            remarks.min_temperature_24h = Some(min);
        }
        RemarkGroup::PressureTendency(tendency) => remarks.pressure_tendency = Some(tendency),
        RemarkGroup::Sensor(sensor) => remarks.sensors.push(sensor),
        RemarkGroup::Maintenance => remarks.maintenance_needed = true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_match(text: &str) -> Option<RemarkGroup> {
        REMARK_RULES.iter().find_map(|rule| match_remark(*rule, text))
    }

    #[test]
    fn sea_level_pressure_heuristic() {
        assert_eq!(sea_level_hpa(132.0), 1132.0);
        assert!((sea_level_hpa(982.0) - 909.82).abs() < 1e-9);
        assert_eq!(first_match("SLP132"), Some(RemarkGroup::SeaPressure(Some(33.43))));
        assert_eq!(first_match("SLPNO"), Some(RemarkGroup::SeaPressure(None)));
    }

    #[test]
    fn precipitation_amounts() {
        assert_eq!(
            first_match("P0000"),
            Some(RemarkGroup::Precipitation {
                kind: 'P',
                amount: PrecipitationAmount::Trace
            })
        );
        assert_eq!(
            first_match("6////"),
            Some(RemarkGroup::Precipitation {
                kind: '6',
                amount: PrecipitationAmount::Indeterminable
            })
        );
        assert_eq!(
            first_match("70125"),
            Some(RemarkGroup::Precipitation {
                kind: '7',
                amount: PrecipitationAmount::Amount(1.25)
            })
        );
    }

    #[test]
    fn six_hour_group_period_depends_on_hour() {
        assert_eq!(six_group_hours(Some(9)), 3);
        assert_eq!(six_group_hours(Some(12)), 6);
        assert_eq!(six_group_hours(None), 6);

        let mut remarks = Remarks::default();
        let mut precipitation = Vec::new();
        let group = first_match("60012").unwrap();
        apply_remark(group, &mut remarks, &mut precipitation, Some(21));
        assert_eq!(
            precipitation,
            [Precipitation {
                hours: 3,
                amount: PrecipitationAmount::Amount(0.12)
            }]
        );
    }

    #[test]
    fn temperature_groups_in_tenths() {
        assert_eq!(
            first_match("T01221017"),
            Some(RemarkGroup::HourlyTemperature(12.2, Some(-1.7)))
        );
        assert_eq!(first_match("10142"), Some(RemarkGroup::MaxTemperature6h(14.2)));
        assert_eq!(first_match("21001"), Some(RemarkGroup::MinTemperature6h(-0.1)));
        assert_eq!(
            first_match("401001015"),
            Some(RemarkGroup::Temperature24h {
                max: 10.0,
                min: -1.5
            })
        );
    }

    #[test]
    fn snow_clouds_sunshine_and_tendency() {
        assert_eq!(first_match("4/012"), Some(RemarkGroup::SnowDepth(12.0)));
        assert_eq!(first_match("933036"), Some(RemarkGroup::SnowEquivalent(3.6)));
        assert_eq!(
            first_match("8/6/3"),
            Some(RemarkGroup::CloudTypes(CloudTypes {
                low: Some(6),
                middle: None,
                high: Some(3)
            }))
        );
        assert_eq!(first_match("98096"), Some(RemarkGroup::Sunshine(96)));
        assert_eq!(
            first_match("52032"),
            Some(RemarkGroup::PressureTendency(PressureTendency {
                characteristic: 2,
                change: 0.09
            }))
        );
    }

    #[test]
    fn flags_and_sensors() {
        assert_eq!(first_match("NOSPECI"), Some(RemarkGroup::NoSpeci));
        assert_eq!(first_match("$"), Some(RemarkGroup::Maintenance));
        assert_eq!(
            first_match("PWINO"),
            Some(RemarkGroup::Sensor(
                "Present Weather Identifier offline".to_string()
            ))
        );
        assert_eq!(first_match("TSB04"), None);
    }
}
