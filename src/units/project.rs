//! Rewriting decoded records into display units.

use crate::types::airport::AirportLocation;
use crate::types::forecast_record::{
    ChangeGroup, ForecastConditions, ForecastPeriod, ForecastRecord, TemperatureExtreme,
    WindShear,
};
use crate::types::weather_record::{
    CloudLayer, Conditions, Precipitation, PrecipitationAmount, PressureTendency, Remarks,
    RunwayVisualRange, Trend, Visibility, WeatherRecord, Wind,
};
use crate::units::format::Units;

/// Converts individual values between two unit sets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitProjector {
    from: Units,
    to: Units,
}

impl UnitProjector {
    pub fn new(from: Units, to: Units) -> Self {
        UnitProjector { from, to }
    }

    /// Projector for records straight out of a decoder.
    pub fn from_canonical(to: Units) -> Self {
        Self::new(Units::CANONICAL, to)
    }

    pub fn target(&self) -> Units {
        self.to
    }

    pub fn temperature(&self, value: f64) -> f64 {
        self.from.temperature.convert(value, self.to.temperature)
    }

    pub fn speed(&self, value: f64) -> f64 {
        self.from.wind.convert(value, self.to.wind)
    }

    pub fn visibility(&self, value: f64) -> f64 {
        self.from.visibility.convert(value, self.to.visibility)
    }

    pub fn height(&self, value: f64) -> f64 {
        self.from.height.convert(value, self.to.height)
    }

    pub fn pressure(&self, value: f64) -> f64 {
        self.from.pressure.convert(value, self.to.pressure)
    }

    pub fn rain(&self, value: f64) -> f64 {
        self.from.rain.convert(value, self.to.rain)
    }

    fn wind(&self, wind: &Wind) -> Wind {
        Wind {
            speed: self.speed(wind.speed),
            gust: wind.gust.map(|g| self.speed(g)),
            ..wind.clone()
        }
    }

    fn cloud(&self, layer: &CloudLayer) -> CloudLayer {
        CloudLayer {
            height: layer.height.map(|h| self.height(h)),
            ..layer.clone()
        }
    }

    fn clouds(&self, layers: &[CloudLayer]) -> Vec<CloudLayer> {
        layers.iter().map(|layer| self.cloud(layer)).collect()
    }

    fn visibility_of(&self, visibility: Visibility) -> Visibility {
        Visibility {
            value: self.visibility(visibility.value),
            ..visibility
        }
    }

    fn runway_range(&self, range: Visibility) -> Visibility {
        Visibility {
            value: self.height(range.value),
            ..range
        }
    }
}

/// A record whose unit-bearing fields can be rewritten by a [`UnitProjector`].
pub trait Project: Sized {
    /// A copy of `self` with every unit-bearing field converted.
    fn project_with(&self, projector: &UnitProjector) -> Self;

    /// Replaces the station label shown to users. Records without one ignore it.
    fn rename_station(&mut self, _name: &str) {}
}

impl Project for Conditions {
    fn project_with(&self, p: &UnitProjector) -> Self {
        Conditions {
            wind: self.wind.as_ref().map(|w| p.wind(w)),
            wind_variability: self.wind_variability,
            visibility: self.visibility.map(|v| p.visibility_of(v)),
            runway: self
                .runway
                .iter()
                .map(|rvr| RunwayVisualRange {
                    range: p.runway_range(rvr.range),
                    variable_to: rvr.variable_to.map(|v| p.runway_range(v)),
                    ..rvr.clone()
                })
                .collect(),
            condition: self.condition.clone(),
            clouds: p.clouds(&self.clouds),
            temperature: self.temperature.map(|t| p.temperature(t)),
            dew_point: self.dew_point.map(|t| p.temperature(t)),
            humidity: self.humidity,
            felt_temperature: self.felt_temperature.map(|t| p.temperature(t)),
            pressure: self.pressure.map(|v| p.pressure(v)),
        }
    }
}

impl Project for Precipitation {
    fn project_with(&self, p: &UnitProjector) -> Self {
        let amount = match self.amount {
            PrecipitationAmount::Amount(value) => PrecipitationAmount::Amount(p.rain(value)),
            other => other,
        };
        Precipitation { amount, ..*self }
    }
}

impl Project for Remarks {
    fn project_with(&self, p: &UnitProjector) -> Self {
        let temperature = |value: Option<f64>| value.map(|t| p.temperature(t));
        Remarks {
            sea_pressure: self.sea_pressure.map(|v| p.pressure(v)),
            snow_depth: self.snow_depth.map(|v| p.rain(v)),
            snow_equivalent: self.snow_equivalent.map(|v| p.rain(v)),
            hourly_temperature: temperature(self.hourly_temperature),
            hourly_dew_point: temperature(self.hourly_dew_point),
            max_temperature_6h: temperature(self.max_temperature_6h),
            min_temperature_6h: temperature(self.min_temperature_6h),
            max_temperature_24h: temperature(self.max_temperature_24h),
            min_temperature_24h: temperature(self.min_temperature_24h),
            pressure_tendency: self.pressure_tendency.map(|t| PressureTendency {
                change: p.pressure(t.change),
                ..t
            }),
            ..self.clone()
        }
    }
}

impl Project for Trend {
    fn project_with(&self, p: &UnitProjector) -> Self {
        Trend {
            conditions: self.conditions.project_with(p),
            ..self.clone()
        }
    }
}

impl Project for WeatherRecord {
    fn project_with(&self, p: &UnitProjector) -> Self {
        WeatherRecord {
            conditions: self.conditions.project_with(p),
            precipitation: self.precipitation.iter().map(|x| x.project_with(p)).collect(),
            remarks: self.remarks.project_with(p),
            trends: self.trends.iter().map(|t| t.project_with(p)).collect(),
            ..self.clone()
        }
    }

    fn rename_station(&mut self, name: &str) {
        self.station = name.to_string();
    }
}

impl Project for ForecastConditions {
    fn project_with(&self, p: &UnitProjector) -> Self {
        ForecastConditions {
            wind: self.wind.as_ref().map(|w| p.wind(w)),
            visibility: self.visibility.map(|v| p.visibility_of(v)),
            condition: self.condition.clone(),
            clouds: p.clouds(&self.clouds),
            wind_shear: self.wind_shear.map(|shear| WindShear {
                height: p.height(shear.height),
                degrees: shear.degrees,
                speed: p.speed(shear.speed),
            }),
        }
    }
}

impl Project for ChangeGroup {
    fn project_with(&self, p: &UnitProjector) -> Self {
        ChangeGroup {
            conditions: self.conditions.project_with(p),
            ..self.clone()
        }
    }
}

impl Project for ForecastPeriod {
    fn project_with(&self, p: &UnitProjector) -> Self {
        ForecastPeriod {
            time: self.time.clone(),
            conditions: self.conditions.project_with(p),
            changes: self.changes.iter().map(|c| c.project_with(p)).collect(),
        }
    }
}

impl Project for ForecastRecord {
    fn project_with(&self, p: &UnitProjector) -> Self {
        let extreme = |e: Option<TemperatureExtreme>| {
            e.map(|e| TemperatureExtreme {
                value: p.temperature(e.value),
                ..e
            })
        };
        ForecastRecord {
            temperature_high: extreme(self.temperature_high),
            temperature_low: extreme(self.temperature_low),
            periods: self.periods.iter().map(|period| period.project_with(p)).collect(),
            ..self.clone()
        }
    }

    fn rename_station(&mut self, name: &str) {
        self.station = name.to_string();
    }
}

/// Converts a canonical record into `units`, leaving `record` untouched.
///
/// When `display_location` is given, its name replaces the station identifier.
///
/// # Examples
///
/// ```
/// use metar_weather::{project, MetarDecoder, Units};
///
/// let record = MetarDecoder
///     .decode_text("2024/03/27 14:51\nMETAR KJFK 271451Z 22010KT 10SM FEW050 20/10 A3012")
///     .unwrap();
/// let metric = project(&record, Units::METRIC, None);
///
/// assert_eq!(metric.conditions.wind.unwrap().speed, 18.52);
/// assert_eq!(metric.conditions.pressure, Some(1019.98));
/// // Canonical values stay as decoded.
/// assert_eq!(record.conditions.temperature, Some(20.0));
/// ```
pub fn project<R: Project>(
    record: &R,
    units: Units,
    display_location: Option<&AirportLocation>,
) -> R {
    let mut projected = record.project_with(&UnitProjector::from_canonical(units));
    if let Some(location) = display_location {
        projected.rename_station(&location.name);
    }
    projected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::metar::MetarDecoder;
    use crate::report::taf::TafDecoder;

    const METAR: &str = "2024/03/27 14:51
METAR KJFK 271451Z 22015G25KT 3/4SM R04R/2600FT -RA BR BKN008 OVC015 12/11 A2992 RMK AO2 SLP132 P0012 T01220111";

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 0.1
    }

    #[test]
    fn round_trip_through_display_units() {
        let canonical = MetarDecoder.decode_text(METAR).unwrap();
        let standard = canonical.project_with(&UnitProjector::from_canonical(Units::STANDARD));
        let metric = standard.project_with(&UnitProjector::new(Units::STANDARD, Units::METRIC));
        let back = metric.project_with(&UnitProjector::new(Units::METRIC, Units::CANONICAL));

        let (c, b) = (&canonical.conditions, &back.conditions);
        let wind = (c.wind.as_ref().unwrap(), b.wind.as_ref().unwrap());
        assert!(close(wind.0.speed, wind.1.speed));
        assert!(close(wind.0.gust.unwrap(), wind.1.gust.unwrap()));
        assert!(close(c.visibility.unwrap().value, b.visibility.unwrap().value));
        assert!(close(c.temperature.unwrap(), b.temperature.unwrap()));
        assert!(close(c.pressure.unwrap(), b.pressure.unwrap()));
        assert!(close(
            canonical.remarks.sea_pressure.unwrap(),
            back.remarks.sea_pressure.unwrap()
        ));
        for (x, y) in c.clouds.iter().zip(&b.clouds) {
            assert!((x.height.unwrap() - y.height.unwrap()).abs() <= 1.0);
        }
    }

    #[test]
    fn standard_units_convert_fields() {
        let record = MetarDecoder.decode_text(METAR).unwrap();
        let standard = project(&record, Units::STANDARD, None);
        let conditions = &standard.conditions;

        assert_eq!(conditions.temperature, Some(53.6));
        assert_eq!(conditions.wind.as_ref().unwrap().speed, 17.26);
        assert_eq!(conditions.clouds[0].height, Some(800.0));
        assert_eq!(conditions.runway[0].range.value, 2600.0);
        assert_eq!(conditions.humidity, record.conditions.humidity);
        assert_eq!(
            standard.precipitation[0].amount,
            PrecipitationAmount::Amount(0.12)
        );
    }

    #[test]
    fn display_location_renames_station() {
        let record = MetarDecoder.decode_text(METAR).unwrap();
        let location = AirportLocation {
            id: "KJFK".to_string(),
            name: "New York/John F. Kennedy Intl".to_string(),
            state: Some("NY".to_string()),
            country: "United States".to_string(),
            latitude: 40.64,
            longitude: -73.76,
            elevation: Some(9),
            cartesian: None,
        };
        let projected = project(&record, Units::CANONICAL, Some(&location));
        assert_eq!(projected.station, "New York/John F. Kennedy Intl");
        assert_eq!(record.station, "KJFK");
    }

    #[test]
    fn forecast_periods_and_changes_are_projected() {
        let forecast = TafDecoder
            .decode_text("2024/03/27 11:00\nTAF EGLL 271100Z 271212 24010KT 9999 SCT030 WS020/24045KT TX18/2714Z TEMPO 1518 20020KT 4000 SHRA")
            .unwrap();
        let metric = project(&forecast, Units::METRIC, None);

        let period = &metric.periods[0];
        assert_eq!(period.conditions.wind.as_ref().unwrap().speed, 18.52);
        assert_eq!(period.conditions.clouds[0].height, Some(914.4));
        assert_eq!(period.conditions.wind_shear.unwrap().height, 609.6);
        assert_eq!(period.changes[0].conditions.wind.as_ref().unwrap().speed, 37.04);
        assert_eq!(metric.temperature_high.unwrap().value, 18.0);
    }
}
