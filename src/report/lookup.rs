//! Static code tables shared by the METAR and TAF decoders.

pub(crate) const COMPASS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// Compass point for a direction in degrees.
pub(crate) fn compass_point(degrees: u16) -> &'static str {
    let index = (f64::from(degrees) / 22.5).round() as usize % 16;
    COMPASS[index]
}

pub(crate) fn cloud_amount(code: &str) -> Option<&'static str> {
    Some(match code {
        "SKC" => "sky clear",
        "CLR" => "clear below 12,000 ft",
        "NSC" => "no significant cloud",
        "NCD" => "no cloud detected",
        "FEW" => "few",
        "SCT" => "scattered",
        "BKN" => "broken",
        "OVC" => "overcast",
        "VV" => "vertical visibility",
        _ => return None,
    })
}

pub(crate) fn cloud_type(code: &str) -> Option<&'static str> {
    Some(match code {
        "TCU" => "Towering Cumulus",
        "CB" => "Cumulonimbus",
        _ => return None,
    })
}

/// Phrase for a single weather sub-code (`+`, `VC`, `TS`, `RA`, ...).
pub(crate) fn condition_phrase(code: &str) -> Option<&'static str> {
    Some(match code {
        "+" => "heavy",
        "-" => "light",
        "VC" => "vicinity",
        "RE" => "recent",
        "NSW" => "no significant weather",
        "MI" => "shallow",
        "BC" => "patches",
        "PR" => "partial",
        "TS" => "thunderstorm",
        "BL" => "blowing",
        "SH" => "showers",
        "DR" => "low drifting",
        "FZ" => "freezing",
        "DZ" => "drizzle",
        "RA" => "rain",
        "SN" => "snow",
        "SG" => "snow grains",
        "IC" => "ice crystals",
        "PE" | "PL" => "ice pellets",
        "GR" => "hail",
        "GS" => "small hail/snow pellets",
        "UP" => "unknown precipitation",
        "BR" => "mist",
        "FG" => "fog",
        "FU" => "smoke",
        "VA" => "volcanic ash",
        "SA" => "sand",
        "HZ" => "haze",
        "PY" => "spray",
        "DU" => "widespread dust",
        "SQ" => "squall",
        "SS" => "sandstorm",
        "DS" => "duststorm",
        "PO" => "well developed dust/sand whirls",
        "FC" => "funnel cloud",
        "+FC" => "tornado/waterspout",
        _ => return None,
    })
}

pub(crate) fn sensor_outage(code: &str) -> Option<&'static str> {
    Some(match code {
        "RVRNO" => "Runway Visual Range Detector offline",
        "PWINO" => "Present Weather Identifier offline",
        "PNO" => "Tipping Bucket Rain Gauge offline",
        "FZRANO" => "Freezing Rain Sensor offline",
        "TSNO" => "Lightning Detection System offline",
        "VISNO" => "2nd Visibility Sensor offline",
        "CHINO" => "2nd Ceiling Height Indicator offline",
        _ => return None,
    })
}

pub(crate) fn runway_tendency(code: &str) -> Option<&'static str> {
    Some(match code {
        "U" => "increasing",
        "D" => "decreasing",
        "N" => "no change",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compass_rounds_to_nearest_point() {
        assert_eq!(compass_point(0), "N");
        assert_eq!(compass_point(220), "SW");
        assert_eq!(compass_point(11), "N");
        assert_eq!(compass_point(12), "NNE");
        assert_eq!(compass_point(355), "N");
        assert_eq!(compass_point(360), "N");
    }
}
