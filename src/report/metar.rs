//! METAR / SPECI decoding.
//!
//! The decoder walks the token stream once. Each token is offered to the active rules
//! in priority order; the first rule that matches consumes one or more tokens and
//! writes into the record at the current cursor. Single-shot rules retire after a
//! match, so the same group kind is not picked up twice for one target.
//!
//! A trend marker (`NOSIG`, `TEMPO`, `BECMG`) opens a trend sub-record and re-arms the
//! body rules for it. Trends are never closed: any later body group, even one that
//! would normally belong to the main report, is written into the last opened trend.
//! `RMK` switches to the remarks grammar for the rest of the report.

use crate::report::error::ReportError;
use crate::report::grammar::{self, VisibilityGroup};
use crate::report::raw_report::RawReport;
use crate::report::remarks::{apply_remark, match_remark, REMARK_RULES};
use crate::report::rules::{ActiveRules, Consumption, GrammarRule};
use crate::report::tokenizer::{tokenize, Token};
use crate::types::weather_record::{
    CloudLayer, Conditions, RunwayVisualRange, Trend, TrendKind, Visibility,
    VisibilityQualifier, WeatherRecord, Wind, WindVariability,
};
use crate::units::convert::{relative_humidity, wind_chill, SpeedUnit, TemperatureUnit};
use chrono::NaiveDateTime;
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

static TREND_TIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(FM|TL|AT)(\d{2})(\d{2})$").expect("static pattern compiles"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MetarRule {
    Report,
    Station,
    Update,
    Modifier,
    Wind,
    WindVariability,
    Visibility,
    Runway,
    Condition,
    Clouds,
    Temperature,
    Pressure,
    Trend,
    Remarks,
}

impl GrammarRule for MetarRule {
    fn consumption(self) -> Consumption {
        match self {
            MetarRule::Runway | MetarRule::Condition | MetarRule::Clouds => Consumption::Repeat,
            MetarRule::Trend => Consumption::OpenTrend,
            MetarRule::Remarks => Consumption::EnterRemarks,
            _ => Consumption::Once,
        }
    }
}

static BODY_RULES: [MetarRule; 14] = [
    MetarRule::Report,
    MetarRule::Station,
    MetarRule::Update,
    MetarRule::Modifier,
    MetarRule::Wind,
    MetarRule::WindVariability,
    MetarRule::Visibility,
    MetarRule::Runway,
    MetarRule::Condition,
    MetarRule::Clouds,
    MetarRule::Temperature,
    MetarRule::Pressure,
    MetarRule::Trend,
    MetarRule::Remarks,
];

// Rules a trend may state again.
const TREND_FIELDS: [MetarRule; 8] = [
    MetarRule::Wind,
    MetarRule::WindVariability,
    MetarRule::Visibility,
    MetarRule::Runway,
    MetarRule::Condition,
    MetarRule::Clouds,
    MetarRule::Temperature,
    MetarRule::Pressure,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Section {
    Body,
    Remarks,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Main,
    Trend(usize),
}

#[derive(Debug, Clone, Copy)]
struct Cursor {
    section: Section,
    target: Target,
}

#[derive(Debug, Clone, PartialEq)]
enum MetarGroup {
    Report(String),
    Station(String),
    Update {
        day: Option<u32>,
        hour: u32,
        minute: u32,
    },
    Modifier(String),
    Wind(Wind),
    WindVariability(WindVariability),
    Visibility(VisibilityGroup),
    Runway(RunwayVisualRange),
    Condition(String),
    Clouds(CloudLayer),
    Temperature(f64, Option<f64>),
    Pressure(f64),
    Trend(Trend),
    Remarks,
}

fn trend_kind(text: &str) -> Option<TrendKind> {
    match text {
        "NOSIG" => Some(TrendKind::Nosig),
        "TEMPO" => Some(TrendKind::Tempo),
        "BECMG" => Some(TrendKind::Becmg),
        _ => None,
    }
}

/// Opens a trend and greedily takes the `FM|TL|AT hhmm` groups that follow it.
fn match_trend(tokens: &[Token<'_>], index: usize) -> Option<(MetarGroup, usize)> {
    let kind = trend_kind(tokens.get(index)?.text)?;
    let mut trend = Trend {
        kind,
        from: None,
        to: None,
        at: None,
        conditions: Conditions::default(),
    };
    let mut consumed = 1;
    while let Some(caps) = tokens
        .get(index + consumed)
        .and_then(|t| TREND_TIME.captures(t.text))
    {
        let time = format!("{}:{}", &caps[2], &caps[3]);
        match &caps[1] {
            "FM" => trend.from = Some(time),
            "TL" => trend.to = Some(time),
            _ => trend.at = Some(time),
        }
        consumed += 1;
    }
    Some((MetarGroup::Trend(trend), consumed))
}

fn match_body(rule: MetarRule, tokens: &[Token<'_>], index: usize) -> Option<(MetarGroup, usize)> {
    let text = tokens.get(index)?.text;
    let single = |group: Option<MetarGroup>| group.map(|g| (g, 1));
    match rule {
        MetarRule::Report => single(
            matches!(text, "METAR" | "SPECI").then(|| MetarGroup::Report(text.to_string())),
        ),
        MetarRule::Station => {
            single(grammar::is_station(text).then(|| MetarGroup::Station(text.to_string())))
        }
        MetarRule::Update => single(
            grammar::decode_day_time(text)
                .map(|(day, hour, minute)| MetarGroup::Update { day, hour, minute }),
        ),
        MetarRule::Modifier => single(
            matches!(text, "AUTO" | "COR").then(|| MetarGroup::Modifier(text.to_string())),
        ),
        MetarRule::Wind => single(grammar::decode_wind(text).map(MetarGroup::Wind)),
        MetarRule::WindVariability => single(
            grammar::decode_wind_variability(text)
                .map(|(from, to)| MetarGroup::WindVariability(WindVariability { from, to })),
        ),
        MetarRule::Visibility => grammar::decode_visibility(tokens, index)
            .map(|(group, consumed)| (MetarGroup::Visibility(group), consumed)),
        MetarRule::Runway => single(grammar::decode_runway(text).map(MetarGroup::Runway)),
        MetarRule::Condition => single(grammar::decode_condition(text).map(MetarGroup::Condition)),
        MetarRule::Clouds => single(grammar::decode_clouds(text).map(MetarGroup::Clouds)),
        MetarRule::Temperature => single(
            grammar::decode_temperature(text).map(|(t, d)| MetarGroup::Temperature(t, d)),
        ),
        MetarRule::Pressure => single(grammar::decode_pressure(text).map(MetarGroup::Pressure)),
        MetarRule::Trend => match_trend(tokens, index),
        MetarRule::Remarks => single((text == "RMK").then_some(MetarGroup::Remarks)),
    }
}

fn felt_temperature(temperature_c: f64, wind_kt: f64) -> f64 {
    let chill = wind_chill(
        TemperatureUnit::Celsius.convert(temperature_c, TemperatureUnit::Fahrenheit),
        SpeedUnit::Knots.convert(wind_kt, SpeedUnit::Mph),
    );
    TemperatureUnit::Fahrenheit.convert(chill, TemperatureUnit::Celsius)
}

struct MetarState {
    record: WeatherRecord,
    cursor: Cursor,
    reference: Option<NaiveDateTime>,
    observation_hour: Option<u32>,
}

impl MetarState {
    fn new(reference: Option<NaiveDateTime>) -> Self {
        MetarState {
            record: WeatherRecord {
                update: reference,
                ..WeatherRecord::default()
            },
            cursor: Cursor {
                section: Section::Body,
                target: Target::Main,
            },
            reference,
            observation_hour: None,
        }
    }

    fn target(&mut self) -> &mut Conditions {
        match self.cursor.target {
            Target::Trend(i) if i < self.record.trends.len() => &mut self.record.trends[i].conditions,
            _ => &mut self.record.conditions,
        }
    }

    fn unparsed(&mut self, token: &Token<'_>) {
        debug!("Unparsed METAR group '{}' at {}", token.text, token.position);
        self.record.unparsed.push(token.text.to_string());
    }

    fn apply(&mut self, group: MetarGroup, rules: &mut ActiveRules<MetarRule>) {
        match group {
            MetarGroup::Report(kind) => self.record.report = Some(kind),
            MetarGroup::Station(station) => self.record.station = station,
            MetarGroup::Update { day, hour, minute } => {
                // Observations on the hour's second half are reported against the next hour.
                self.observation_hour = Some((hour * 60 + minute + 30) / 60 % 24);
                self.record.observed = self
                    .reference
                    .and_then(|r| grammar::resolve_day_time(r, day, hour, minute));
            }
            MetarGroup::Modifier(modifier) => self.record.modifier = Some(modifier),
            MetarGroup::Wind(wind) => self.target().wind = Some(wind),
            MetarGroup::WindVariability(variability) => {
                self.target().wind_variability = Some(variability)
            }
            MetarGroup::Visibility(VisibilityGroup::Value(visibility)) => {
                self.target().visibility = Some(visibility)
            }
            MetarGroup::Visibility(VisibilityGroup::Cavok) => {
                let target = self.target();
                target.visibility = Some(Visibility {
                    value: 10.0,
                    qualifier: VisibilityQualifier::Beyond,
                });
                target.clouds = grammar::cavok_clouds();
                target.condition = Some("no significant weather".to_string());
            }
            MetarGroup::Runway(range) => self.target().runway.push(range),
            MetarGroup::Condition(phrase) => {
                let target = self.target();
                target.condition = Some(match target.condition.take() {
                    Some(existing) => format!("{existing}, {phrase}"),
                    None => phrase,
                });
            }
            MetarGroup::Clouds(layer) => self.target().clouds.push(layer),
            MetarGroup::Temperature(temperature, dew_point) => {
                let target = self.target();
                target.temperature = Some(temperature);
                target.dew_point = dew_point;
                target.humidity = dew_point.map(|d| relative_humidity(temperature, d));
                target.felt_temperature = target
                    .wind
                    .as_ref()
                    .map(|wind| felt_temperature(temperature, wind.speed));
            }
            MetarGroup::Pressure(pressure) => self.target().pressure = Some(pressure),
            MetarGroup::Trend(trend) => {
                self.record.trends.push(trend);
                self.cursor.target = Target::Trend(self.record.trends.len() - 1);
                rules.rearm(&TREND_FIELDS);
            }
            MetarGroup::Remarks => self.cursor.section = Section::Remarks,
        }
    }
}

/// Decodes METAR and SPECI reports into [`WeatherRecord`]s in canonical units.
///
/// The decoder holds no state between calls and can be shared freely.
///
/// # Examples
///
/// ```
/// use metar_weather::{MetarDecoder, RawReport};
///
/// let raw = RawReport::new("2024/03/12 18:51\nKJFK 121851Z 22015KT 10SM FEW250 M05/M10 A2992").unwrap();
/// let record = MetarDecoder.decode(&raw);
///
/// assert_eq!(record.station, "KJFK");
/// let wind = record.conditions.wind.unwrap();
/// assert_eq!((wind.direction.as_str(), wind.speed), ("SW", 15.0));
/// assert_eq!(record.conditions.temperature, Some(-5.0));
/// assert!(record.conditions.humidity.is_some());
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct MetarDecoder;

impl MetarDecoder {
    pub fn decode(&self, raw: &RawReport) -> WeatherRecord {
        self.decode_body(&raw.body(), raw.updated())
    }

    /// Decodes report text with its update line.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::MalformedSource`] when the text has fewer than two non-empty lines.
    pub fn decode_text(&self, text: &str) -> Result<WeatherRecord, ReportError> {
        Ok(self.decode(&RawReport::new(text)?))
    }

    /// Decodes a bare report body. `reference` anchors the day-of-month in the body to a date.
    pub fn decode_body(&self, body: &str, reference: Option<NaiveDateTime>) -> WeatherRecord {
        let tokens = tokenize(body);
        let mut state = MetarState::new(reference);
        let mut body_rules = ActiveRules::new(&BODY_RULES);
        let mut remark_rules = ActiveRules::new(&REMARK_RULES);

        let mut index = 0;
        while index < tokens.len() {
            let consumed = match state.cursor.section {
                Section::Body => {
                    let matched = body_rules.iter().find_map(|rule| {
                        match_body(rule, &tokens, index).map(|(group, n)| (rule, group, n))
                    });
                    match matched {
                        Some((rule, group, consumed)) => {
                            body_rules.matched(rule);
                            state.apply(group, &mut body_rules);
                            consumed
                        }
                        None => {
                            state.unparsed(&tokens[index]);
                            1
                        }
                    }
                }
                Section::Remarks => {
                    let token = tokens[index];
                    let matched = remark_rules
                        .iter()
                        .find_map(|rule| match_remark(rule, token.text).map(|group| (rule, group)));
                    match matched {
                        Some((rule, group)) => {
                            remark_rules.matched(rule);
                            let record = &mut state.record;
                            apply_remark(
                                group,
                                &mut record.remarks,
                                &mut record.precipitation,
                                state.observation_hour,
                            );
                        }
                        None => state.unparsed(&token),
                    }
                    1
                }
            };
            index += consumed;
        }
        state.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::weather_record::{AutoStation, Precipitation, PrecipitationAmount};
    use chrono::{TimeZone, Utc};

    fn decode(body: &str) -> WeatherRecord {
        MetarDecoder
            .decode_text(&format!("2024/03/12 19:00\n{body}"))
            .unwrap()
    }

    #[test]
    fn decodes_full_report() {
        let record = decode(
            "METAR KJFK 121851Z 22015G25KT 180V250 3/4SM R04R/2600FT -RA BR BKN008 OVC015 M05/M10 A2992 RMK AO2 SLP132 P0012 T10501100",
        );
        assert_eq!(record.report.as_deref(), Some("METAR"));
        assert_eq!(record.station, "KJFK");
        assert_eq!(
            record.observed,
            Some(Utc.with_ymd_and_hms(2024, 3, 12, 18, 51, 0).unwrap())
        );

        let c = &record.conditions;
        let wind = c.wind.as_ref().unwrap();
        assert_eq!(wind.degrees, Some(220));
        assert_eq!(wind.direction, "SW");
        assert_eq!(wind.speed, 15.0);
        assert_eq!(wind.gust, Some(25.0));
        assert_eq!(c.wind_variability, Some(WindVariability { from: 180, to: 250 }));
        assert!((c.visibility.unwrap().value - 1.2).abs() < 0.02);
        assert_eq!(c.runway[0].runway, "04R");
        assert_eq!(c.condition.as_deref(), Some("light rain, mist"));
        assert_eq!(c.clouds.len(), 2);
        assert_eq!(c.clouds[1].amount, "overcast");
        assert_eq!(c.temperature, Some(-5.0));
        assert_eq!(c.dew_point, Some(-10.0));
        assert_eq!(c.humidity, Some(relative_humidity(-5.0, -10.0)));
        assert_eq!(c.felt_temperature, Some(felt_temperature(-5.0, 15.0)));
        assert!(c.felt_temperature.unwrap() < -5.0);
        assert_eq!(c.pressure, Some(29.92));

        assert_eq!(
            record.remarks.auto_station,
            Some(AutoStation::WithPrecipitationDiscriminator)
        );
        assert_eq!(record.remarks.sea_pressure, Some(33.43));
        assert_eq!(record.remarks.hourly_temperature, Some(-5.0));
        assert_eq!(record.remarks.hourly_dew_point, Some(-10.0));
        assert_eq!(
            record.precipitation,
            [Precipitation {
                hours: 1,
                amount: PrecipitationAmount::Amount(0.12)
            }]
        );
        assert!(record.unparsed.is_empty(), "{:?}", record.unparsed);
    }

    #[test]
    fn cavok_sets_clouds_and_condition() {
        let record = decode("EGLL 121850Z 24010KT CAVOK 15/08 Q1018");
        let c = &record.conditions;
        assert_eq!(
            c.visibility,
            Some(Visibility {
                value: 10.0,
                qualifier: VisibilityQualifier::Beyond
            })
        );
        assert_eq!(
            c.clouds,
            [CloudLayer {
                amount: "Clear below".to_string(),
                height: Some(5000.0),
                kind: None
            }]
        );
        assert_eq!(c.condition.as_deref(), Some("no significant weather"));
        assert_eq!(c.pressure, Some(30.06));
    }

    #[test]
    fn speci_with_calm_wind_and_auto() {
        let record = decode("SPECI KBOS 121905Z AUTO 00000KT 1 1/2SM BR OVC004 02/01 A2990");
        assert_eq!(record.report.as_deref(), Some("SPECI"));
        assert_eq!(record.modifier.as_deref(), Some("AUTO"));
        assert_eq!(record.conditions.wind.as_ref().unwrap().direction, "Calm");
        assert_eq!(record.conditions.visibility.unwrap().value, 2.41);
        assert!(record.unparsed.is_empty(), "{:?}", record.unparsed);
    }

    #[test]
    fn trends_are_never_closed() {
        let record = decode(
            "EGLL 121850Z 24010KT 9999 FEW030 15/08 Q1018 TEMPO 4000 SHRA BECMG FM1930 27015KT Q1020",
        );
        assert_eq!(record.conditions.pressure, Some(30.06));
        assert_eq!(record.trends.len(), 2);

        let tempo = &record.trends[0];
        assert_eq!(tempo.kind, TrendKind::Tempo);
        assert_eq!(tempo.conditions.visibility.unwrap().value, 4.0);
        assert_eq!(tempo.conditions.condition.as_deref(), Some("showers rain"));

        let becmg = &record.trends[1];
        assert_eq!(becmg.kind, TrendKind::Becmg);
        assert_eq!(becmg.from.as_deref(), Some("19:30"));
        assert_eq!(becmg.conditions.wind.as_ref().unwrap().degrees, Some(270));
        // The pressure group after the trend lands in the trend, not the main report.
        assert_eq!(becmg.conditions.pressure, Some(30.12));
    }

    #[test]
    fn remarks_after_trend_go_to_record() {
        let record = decode("EGLL 121850Z 24010KT 9999 15/08 Q1018 NOSIG RMK AO1 SLPNO PNO $");
        assert_eq!(record.trends.len(), 1);
        assert_eq!(record.trends[0].kind, TrendKind::Nosig);
        assert!(record.trends[0].conditions.is_empty());
        assert_eq!(
            record.remarks.auto_station,
            Some(AutoStation::WithoutPrecipitationDiscriminator)
        );
        assert_eq!(record.remarks.sea_pressure, None);
        assert_eq!(record.remarks.sensors, ["Tipping Bucket Rain Gauge offline"]);
        assert!(record.remarks.maintenance_needed);
    }

    #[test]
    fn unknown_groups_are_kept() {
        let record = decode("KJFK 121851Z 19005KT 10SM FOO12 CLR 12/M03 A3012 RMK TSB04");
        assert_eq!(record.unparsed, ["FOO12", "TSB04"]);
        assert_eq!(record.conditions.clouds[0].amount, "clear below 12,000 ft");
    }

    #[test]
    fn felt_temperature_needs_wind() {
        let record = decode("KJFK 121851Z 10SM M05/M10 A2992");
        assert_eq!(record.conditions.felt_temperature, None);
        assert_eq!(record.conditions.temperature, Some(-5.0));
    }

    #[test]
    fn one_line_source_is_malformed() {
        assert_eq!(
            MetarDecoder.decode_text("KJFK 121851Z 19005KT").unwrap_err(),
            ReportError::MalformedSource { lines: 1 }
        );
    }

    #[test]
    fn observation_day_before_update_rolls_month() {
        let record = MetarDecoder
            .decode_text("2024/03/01 00:10\nKJFK 292351Z 19005KT 10SM CLR 12/M03 A3012")
            .unwrap();
        assert_eq!(
            record.observed,
            Some(Utc.with_ymd_and_hms(2024, 2, 29, 23, 51, 0).unwrap())
        );
    }
}
