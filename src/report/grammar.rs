//! Patterns and group decoders shared by the METAR and TAF grammars.
//!
//! Every decoder takes raw token text and returns canonical units, or `None` when
//! the token is not that kind of group.

use crate::report::lookup;
use crate::report::tokenizer::Token;
use crate::types::weather_record::{CloudLayer, RunwayVisualRange, Visibility, VisibilityQualifier, Wind};
use crate::units::convert::{DistanceUnit, SpeedUnit};
use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;
use std::sync::LazyLock;

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        pub(crate) static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($re).expect("static pattern compiles"));
    };
}

pattern!(STATION, r"^[A-Z][A-Z0-9]{3}$");
pattern!(DAY_TIME, r"^(\d{2})?(\d{2})(\d{2})Z$");
pattern!(
    WIND,
    r"^(\d{3}|VRB|VAR)(\d{2,3})(?:G(\d{2,3}))?(KT|KTS|MPS|KMH|KPH|MPH|FPS)$"
);
pattern!(WIND_VARIABILITY, r"^(\d{3})V(\d{3})$");
pattern!(VISIBILITY_METERS, r"^(\d{4})(?:NDV)?$");
pattern!(VISIBILITY_UNITS, r"^(M|P)?(?:(\d{1,2})|(\d{1,2})/(\d{1,2}))(SM|KM)$");
pattern!(VISIBILITY_WHOLE, r"^\d$");
pattern!(VISIBILITY_FRACTION, r"^(\d{1,2})/(\d{1,2})(SM|KM)$");
pattern!(
    RUNWAY,
    r"^R(\d{2}[LCR]?)/(P|M)?(\d{4})(?:V(P|M)?(\d{4}))?(FT)?(?:/?([UDN]))?$"
);
pattern!(
    CONDITION,
    r"^(\+|-|VC|RE)?((?:MI|BC|PR|TS|BL|SH|DR|FZ)*)((?:DZ|RA|SN|SG|IC|PE|PL|GR|GS|UP){0,3})((?:BR|FG|FU|VA|SA|HZ|PY|DU)*)((?:SQ|SS|DS|PO|FC)*)$"
);
pattern!(
    CLOUDS,
    r"^(?:(SKC|CLR|NSC|NCD)|(FEW|SCT|BKN|OVC|VV)(\d{3}|///)(TCU|CB|///)?)$"
);
pattern!(TEMPERATURE, r"^(M)?(\d{2})/(?:(M)?(\d{2})|XX|//)?$");
pattern!(PRESSURE, r"^(?:A(\d{4})|Q(\d{4}))$");

pub(crate) const CAVOK_CLOUD_BASE_FT: f64 = 5000.0;

fn number<T: std::str::FromStr>(text: Option<regex::Match<'_>>) -> Option<T> {
    text.and_then(|m| m.as_str().parse().ok())
}

pub(crate) fn signed(negative: bool, value: f64) -> f64 {
    if negative && value != 0.0 {
        -value
    } else {
        value
    }
}

pub(crate) fn is_station(text: &str) -> bool {
    STATION.is_match(text)
}

/// `ddhhmmZ` or `hhmmZ` as `(day, hour, minute)`.
pub(crate) fn decode_day_time(text: &str) -> Option<(Option<u32>, u32, u32)> {
    let caps = DAY_TIME.captures(text)?;
    let day = number(caps.get(1));
    let hour: u32 = number(caps.get(2))?;
    let minute: u32 = number(caps.get(3))?;
    (hour <= 24 && minute < 60 && day.is_none_or(|d| (1..=31).contains(&d)))
        .then_some((day, hour, minute))
}

/// Places a day-of-month in the month of `reference`, or the month before when the day lies
/// after the reference day.
pub(crate) fn resolve_day(reference: NaiveDate, day: u32) -> Option<NaiveDate> {
    if day > reference.day() {
        let previous = reference.checked_sub_months(Months::new(1))?;
        NaiveDate::from_ymd_opt(previous.year(), previous.month(), day)
    } else {
        NaiveDate::from_ymd_opt(reference.year(), reference.month(), day)
    }
}

pub(crate) fn resolve_day_time(
    reference: NaiveDateTime,
    day: Option<u32>,
    hour: u32,
    minute: u32,
) -> Option<DateTime<Utc>> {
    let date = match day {
        Some(day) => resolve_day(reference.date(), day)?,
        None => reference.date(),
    };
    at_hour(date, hour, minute)
}

/// `hour` 24 is midnight of the following day.
pub(crate) fn at_hour(date: NaiveDate, hour: u32, minute: u32) -> Option<DateTime<Utc>> {
    if hour == 24 {
        date.succ_opt()?.and_hms_opt(0, minute, 0)
    } else {
        date.and_hms_opt(hour, minute, 0)
    }
    .map(|dt| dt.and_utc())
}

/// Degrees are reported to the nearest ten; the compass point uses the stated bearing.
pub(crate) fn decode_wind(text: &str) -> Option<Wind> {
    let caps = WIND.captures(text)?;
    let unit: SpeedUnit = caps.get(4)?.as_str().parse().ok()?;
    let raw_speed: f64 = number(caps.get(2))?;
    let speed = unit.convert(raw_speed, SpeedUnit::Knots);
    let gust = number::<f64>(caps.get(3)).map(|g| unit.convert(g, SpeedUnit::Knots));
    let (direction, degrees) = match caps.get(1)?.as_str() {
        "VRB" | "VAR" => ("Variable".to_string(), None),
        _ => {
            let reported: u16 = number(caps.get(1))?;
            let degrees = (reported + 5) / 10 * 10;
            if degrees == 0 && raw_speed == 0.0 {
                ("Calm".to_string(), Some(0))
            } else {
                (lookup::compass_point(reported).to_string(), Some(degrees))
            }
        }
    };
    Some(Wind {
        direction,
        degrees,
        speed,
        gust,
    })
}

pub(crate) fn decode_wind_variability(text: &str) -> Option<(u16, u16)> {
    let caps = WIND_VARIABILITY.captures(text)?;
    Some((number(caps.get(1))?, number(caps.get(2))?))
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum VisibilityGroup {
    Value(Visibility),
    Cavok,
}

fn qualifier(code: Option<regex::Match<'_>>) -> VisibilityQualifier {
    match code.map(|m| m.as_str()) {
        Some("M") => VisibilityQualifier::Below,
        Some("P") => VisibilityQualifier::Beyond,
        _ => VisibilityQualifier::At,
    }
}

fn to_km(value: f64, unit: &str) -> f64 {
    let unit = if unit == "SM" {
        DistanceUnit::StatuteMiles
    } else {
        DistanceUnit::Kilometers
    };
    unit.convert(value, DistanceUnit::Kilometers)
}

fn fraction(numerator: Option<regex::Match<'_>>, denominator: Option<regex::Match<'_>>) -> Option<f64> {
    let numerator: f64 = number(numerator)?;
    let denominator: f64 = number(denominator)?;
    (denominator != 0.0).then(|| numerator / denominator)
}

/// Decodes a visibility group starting at `index`, returning how many tokens it spans.
///
/// A lone single digit only counts when the next token is a fraction (`1 1/2SM`).
pub(crate) fn decode_visibility(tokens: &[Token<'_>], index: usize) -> Option<(VisibilityGroup, usize)> {
    let text = tokens.get(index)?.text;
    if text == "CAVOK" {
        return Some((VisibilityGroup::Cavok, 1));
    }
    if VISIBILITY_WHOLE.is_match(text) {
        let next = tokens.get(index + 1)?.text;
        let caps = VISIBILITY_FRACTION.captures(next)?;
        let whole: f64 = text.parse().ok()?;
        let value = whole + fraction(caps.get(1), caps.get(2))?;
        let visibility = Visibility {
            value: to_km(value, caps.get(3)?.as_str()),
            qualifier: VisibilityQualifier::At,
        };
        return Some((VisibilityGroup::Value(visibility), 2));
    }
    if let Some(caps) = VISIBILITY_METERS.captures(text) {
        let meters: f64 = number(caps.get(1))?;
        let visibility = match meters as u32 {
            9999 => Visibility {
                value: 10.0,
                qualifier: VisibilityQualifier::Beyond,
            },
            0 => Visibility {
                value: 0.05,
                qualifier: VisibilityQualifier::Below,
            },
            _ => Visibility {
                value: DistanceUnit::Meters.convert(meters, DistanceUnit::Kilometers),
                qualifier: VisibilityQualifier::At,
            },
        };
        return Some((VisibilityGroup::Value(visibility), 1));
    }
    let caps = VISIBILITY_UNITS.captures(text)?;
    let value = match caps.get(2) {
        Some(whole) => whole.as_str().parse().ok()?,
        None => fraction(caps.get(3), caps.get(4))?,
    };
    let visibility = Visibility {
        value: to_km(value, caps.get(5)?.as_str()),
        qualifier: qualifier(caps.get(1)),
    };
    Some((VisibilityGroup::Value(visibility), 1))
}

pub(crate) fn cavok_clouds() -> Vec<CloudLayer> {
    vec![CloudLayer {
        amount: "Clear below".to_string(),
        height: Some(CAVOK_CLOUD_BASE_FT),
        kind: None,
    }]
}

pub(crate) fn decode_runway(text: &str) -> Option<RunwayVisualRange> {
    let caps = RUNWAY.captures(text)?;
    let in_feet = caps.get(6).is_some();
    let height = |value: f64| {
        if in_feet {
            value
        } else {
            DistanceUnit::Meters.convert(value, DistanceUnit::Feet)
        }
    };
    let range = Visibility {
        value: height(number(caps.get(3))?),
        qualifier: qualifier(caps.get(2)),
    };
    let variable_to = number::<f64>(caps.get(5)).map(|v| Visibility {
        value: height(v),
        qualifier: qualifier(caps.get(4)),
    });
    Some(RunwayVisualRange {
        runway: caps.get(1)?.as_str().to_string(),
        range,
        variable_to,
        tendency: caps
            .get(7)
            .and_then(|m| lookup::runway_tendency(m.as_str()))
            .map(str::to_string),
    })
}

fn chunks(group: &str) -> impl Iterator<Item = &str> {
    (0..group.len() / 2).map(move |i| &group[i * 2..i * 2 + 2])
}

/// Decodes a present-weather group into a phrase, e.g. `+TSRA` → "heavy thunderstorm rain".
pub(crate) fn decode_condition(text: &str) -> Option<String> {
    if text == "NSW" {
        return lookup::condition_phrase(text).map(str::to_string);
    }
    let caps = CONDITION.captures(text)?;
    let intensity = caps.get(1).map(|m| m.as_str());
    let mut codes: Vec<&str> = Vec::new();
    for group in 2..=5 {
        for code in chunks(caps.get(group).map_or("", |m| m.as_str())) {
            if !codes.contains(&code) {
                codes.push(code);
            }
        }
    }
    if codes.is_empty() {
        return None;
    }

    let mut phrases: Vec<&str> = Vec::with_capacity(codes.len() + 1);
    let tornado = intensity == Some("+") && codes.contains(&"FC");
    if let Some(intensity) = intensity.filter(|_| !tornado) {
        phrases.push(lookup::condition_phrase(intensity)?);
    }
    for code in codes {
        let phrase = if tornado && code == "FC" {
            lookup::condition_phrase("+FC")?
        } else {
            lookup::condition_phrase(code)?
        };
        phrases.push(phrase);
    }
    Some(phrases.join(" "))
}

pub(crate) fn decode_clouds(text: &str) -> Option<CloudLayer> {
    let caps = CLOUDS.captures(text)?;
    if let Some(clear) = caps.get(1) {
        return Some(CloudLayer {
            amount: lookup::cloud_amount(clear.as_str())?.to_string(),
            height: None,
            kind: None,
        });
    }
    Some(CloudLayer {
        amount: lookup::cloud_amount(caps.get(2)?.as_str())?.to_string(),
        height: number::<f64>(caps.get(3)).map(|h| h * 100.0),
        kind: caps
            .get(4)
            .and_then(|m| lookup::cloud_type(m.as_str()))
            .map(str::to_string),
    })
}

/// `[M]tt/[M]dd` as °C temperature and optional dew point.
pub(crate) fn decode_temperature(text: &str) -> Option<(f64, Option<f64>)> {
    let caps = TEMPERATURE.captures(text)?;
    let temperature = signed(caps.get(1).is_some(), number(caps.get(2))?);
    let dew_point = number::<f64>(caps.get(4)).map(|d| signed(caps.get(3).is_some(), d));
    Some((temperature, dew_point))
}

/// Pressure in inHg; `Qnnnn` is converted from hPa.
pub(crate) fn decode_pressure(text: &str) -> Option<f64> {
    use crate::units::convert::PressureUnit;
    let caps = PRESSURE.captures(text)?;
    if let Some(hundredths) = number::<f64>(caps.get(1)) {
        return Some(hundredths / 100.0);
    }
    let hpa: f64 = number(caps.get(2))?;
    Some(PressureUnit::Hectopascal.convert(hpa, PressureUnit::Inches))
}

/// Tenths of a degree with a leading sign digit, `1` meaning negative (`1023` → -2.3).
pub(crate) fn signed_tenths(sign: &str, digits: &str) -> Option<f64> {
    let tenths: f64 = digits.parse().ok()?;
    Some(signed(sign == "1", tenths / 10.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::tokenizer::tokenize;

    fn visibility(body: &str) -> Option<(VisibilityGroup, usize)> {
        decode_visibility(&tokenize(body), 0)
    }

    fn value(group: VisibilityGroup) -> Visibility {
        match group {
            VisibilityGroup::Value(v) => v,
            VisibilityGroup::Cavok => panic!("expected a value"),
        }
    }

    #[test]
    fn wind_with_direction_and_gust() {
        let wind = decode_wind("221015KT").unwrap();
        assert_eq!(wind.degrees, Some(220));
        assert_eq!(wind.direction, "SW");
        assert_eq!(wind.speed, 15.0);
        assert_eq!(wind.gust, None);

        let wind = decode_wind("23610KT").unwrap();
        assert_eq!(wind.degrees, Some(240));
        assert_eq!(wind.direction, "SW");

        let wind = decode_wind("22010G25MPS").unwrap();
        assert_eq!(wind.speed, 19.44);
        assert_eq!(wind.gust, Some(48.6));
    }

    #[test]
    fn variable_and_calm_wind() {
        let wind = decode_wind("VRB03KT").unwrap();
        assert_eq!(wind.direction, "Variable");
        assert_eq!(wind.degrees, None);
        assert_eq!(wind.speed, 3.0);

        let wind = decode_wind("00000KT").unwrap();
        assert_eq!(wind.direction, "Calm");
        assert_eq!(wind.speed, 0.0);
        assert!(decode_wind("2210KT").is_none());
    }

    #[test]
    fn fractional_visibility() {
        let (group, consumed) = visibility("3/4SM").unwrap();
        assert_eq!(consumed, 1);
        let v = value(group);
        assert!((v.value - 1.2).abs() < 0.02);
        assert_eq!(v.qualifier, VisibilityQualifier::At);

        let (group, consumed) = visibility("1 1/2SM BKN008").unwrap();
        assert_eq!(consumed, 2);
        assert_eq!(value(group).value, 2.41);

        assert!(visibility("1 BKN008").is_none());
    }

    #[test]
    fn qualified_visibility() {
        let (group, _) = visibility("M1/4SM").unwrap();
        assert_eq!(value(group).qualifier, VisibilityQualifier::Below);
        let (group, _) = visibility("P6SM").unwrap();
        assert_eq!(value(group).qualifier, VisibilityQualifier::Beyond);
        assert_eq!(value(group).value, 9.66);
        let (group, _) = visibility("9999").unwrap();
        assert_eq!(
            value(group),
            Visibility {
                value: 10.0,
                qualifier: VisibilityQualifier::Beyond
            }
        );
        let (group, _) = visibility("0000").unwrap();
        assert_eq!(value(group).value, 0.05);
        assert_eq!(value(group).qualifier, VisibilityQualifier::Below);
        let (group, _) = visibility("0800").unwrap();
        assert_eq!(value(group).value, 0.8);
        assert_eq!(visibility("CAVOK"), Some((VisibilityGroup::Cavok, 1)));
    }

    #[test]
    fn runway_visual_range_in_meters_and_feet() {
        let rvr = decode_runway("R28L/2600FT").unwrap();
        assert_eq!(rvr.runway, "28L");
        assert_eq!(rvr.range.value, 2600.0);
        assert!(rvr.variable_to.is_none());

        let rvr = decode_runway("R06/M0600V1000U").unwrap();
        assert_eq!(rvr.range.qualifier, VisibilityQualifier::Below);
        assert_eq!(rvr.range.value, 1968.5);
        assert_eq!(rvr.variable_to.unwrap().value, 3280.84);
        assert_eq!(rvr.tendency.as_deref(), Some("increasing"));
    }

    #[test]
    fn conditions_are_phrased() {
        assert_eq!(decode_condition("+TSRA").unwrap(), "heavy thunderstorm rain");
        assert_eq!(decode_condition("-SN").unwrap(), "light snow");
        assert_eq!(decode_condition("VCSH").unwrap(), "vicinity showers");
        assert_eq!(decode_condition("BR").unwrap(), "mist");
        assert_eq!(decode_condition("RARA").unwrap(), "rain");
        assert_eq!(decode_condition("+FC").unwrap(), "tornado/waterspout");
        assert_eq!(decode_condition("NSW").unwrap(), "no significant weather");
        assert!(decode_condition("+").is_none());
        assert!(decode_condition("RMK").is_none());
    }

    #[test]
    fn cloud_layers() {
        let layer = decode_clouds("BKN025CB").unwrap();
        assert_eq!(layer.amount, "broken");
        assert_eq!(layer.height, Some(2500.0));
        assert_eq!(layer.kind.as_deref(), Some("Cumulonimbus"));

        let layer = decode_clouds("OVC///").unwrap();
        assert_eq!(layer.height, None);
        assert_eq!(decode_clouds("SKC").unwrap().amount, "sky clear");
        assert!(decode_clouds("BKN25").is_none());
    }

    #[test]
    fn temperatures_below_zero() {
        assert_eq!(decode_temperature("M05/M10"), Some((-5.0, Some(-10.0))));
        assert_eq!(decode_temperature("12/"), Some((12.0, None)));
        assert_eq!(decode_temperature("12/XX"), Some((12.0, None)));
        assert_eq!(decode_temperature("M00/M01"), Some((0.0, Some(-1.0))));
    }

    #[test]
    fn pressure_in_inches() {
        assert_eq!(decode_pressure("A2992"), Some(29.92));
        assert_eq!(decode_pressure("Q1013"), Some(29.91));
        assert!(decode_pressure("A299").is_none());
    }

    #[test]
    fn day_rolls_back_a_month() {
        let reference = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        assert_eq!(
            resolve_day(reference, 29),
            NaiveDate::from_ymd_opt(2024, 2, 29)
        );
        assert_eq!(resolve_day(reference, 1), Some(reference));
    }
}
