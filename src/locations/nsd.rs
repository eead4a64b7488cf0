//! Parser for the NOAA station list (`nsd_cccc.txt`).
//!
//! One station per line, `;`-separated: ICAO id, WMO block, WMO station, name, state,
//! country, WMO region, latitude, longitude, upper-air latitude, upper-air longitude,
//! elevation, upper-air elevation, RBSN flag.

use crate::geo::polar_to_cartesian;
use crate::types::airport::{AirportLocation, PLACEHOLDER_ID};
use crate::units::convert::round_to;
use log::warn;
use regex::Regex;
use std::sync::LazyLock;

static COORDINATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{1,3})-(\d{1,2})(?:-(\d{1,2}))?([NSEW])$").expect("static pattern compiles")
});

/// Parses `ddd-mm[-ss]H` into signed decimal degrees, rounded to 4 places.
///
/// ```
/// use metar_weather::locations::nsd::parse_coordinate;
///
/// assert_eq!(parse_coordinate("40-38N"), Some(40.6333));
/// assert_eq!(parse_coordinate("073-46-45W"), Some(-73.7792));
/// assert_eq!(parse_coordinate("north"), None);
/// ```
pub fn parse_coordinate(text: &str) -> Option<f64> {
    let caps = COORDINATE.captures(text.trim())?;
    let degrees: f64 = caps[1].parse().ok()?;
    let minutes: f64 = caps[2].parse().ok()?;
    let seconds: f64 = match caps.get(3) {
        Some(s) => s.as_str().parse().ok()?,
        None => 0.0,
    };
    let value = degrees + minutes / 60.0 + seconds / 3600.0;
    let signed = if matches!(&caps[4], "S" | "W") {
        -value
    } else {
        value
    };
    Some(round_to(signed, 4))
}

fn non_empty(field: Option<&str>) -> Option<String> {
    field
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
}

pub fn parse_station_line(line: &str) -> Option<AirportLocation> {
    let fields: Vec<&str> = line.split(';').collect();
    if fields.len() < 9 {
        return None;
    }
    let latitude = parse_coordinate(fields[7])?;
    let longitude = parse_coordinate(fields[8])?;
    Some(AirportLocation {
        id: non_empty(Some(fields[0])).unwrap_or_else(|| PLACEHOLDER_ID.to_string()),
        name: non_empty(Some(fields[3]))?,
        state: non_empty(Some(fields[4])),
        country: non_empty(Some(fields[5])).unwrap_or_default(),
        latitude,
        longitude,
        elevation: fields.get(11).and_then(|e| e.trim().parse().ok()),
        cartesian: Some(polar_to_cartesian(latitude, longitude)),
    })
}

/// Parses every line of a station list, skipping blank lines and logging invalid ones.
pub fn parse_station_list(text: &str) -> Vec<AirportLocation> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(n, line)| {
            let airport = parse_station_line(line);
            if airport.is_none() {
                warn!("Invalid station list line {}: {}", n + 1, line);
            }
            airport
        })
        .collect()
}
