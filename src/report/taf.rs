//! TAF decoding.
//!
//! Same single-pass rule matching as [`crate::MetarDecoder`], with a cursor that points
//! at a period or at a change group inside a period. `FM[dd]hhmm` opens a new period;
//! `PROBnn`, `TEMPO` and `BECMG` open a change group under the current period. A change
//! group stays the write target until the next period or change marker.

use crate::report::error::ReportError;
use crate::report::grammar::{self, VisibilityGroup};
use crate::report::raw_report::RawReport;
use crate::report::rules::{ActiveRules, Consumption, GrammarRule};
use crate::report::tokenizer::{tokenize, Token};
use crate::types::forecast_record::{
    ChangeGroup, ChangeKind, ForecastConditions, ForecastPeriod, ForecastRecord,
    TemperatureExtreme, WindShear,
};
use crate::types::weather_record::{CloudLayer, Visibility, VisibilityQualifier, Wind};
use crate::units::convert::SpeedUnit;
use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveDateTime, Utc};
use log::debug;
use regex::Regex;
use std::sync::LazyLock;

macro_rules! pattern {
    ($name:ident, $re:expr) => {
        static $name: LazyLock<Regex> =
            LazyLock::new(|| Regex::new($re).expect("static pattern compiles"));
    };
}

pattern!(VALIDITY, r"^(\d{2})(\d{2})(\d{2})$");
pattern!(DAY_HOUR_RANGE, r"^(\d{2})(\d{2})/(\d{2})(\d{2})$");
pattern!(PERIOD, r"^FM(\d{2})?(\d{2})(\d{2})Z?$");
pattern!(CHANGE, r"^(?:PROB(\d{2})|TEMPO|BECMG)$");
pattern!(CHANGE_TIME, r"^(\d{2})(\d{2})?$");
pattern!(
    WIND_SHEAR,
    r"^WS(\d{3})/(\d{3})(\d{2,3})(KT|KTS|MPS|KMH|KPH|MPH)$"
);
pattern!(TEMPERATURE, r"^T([XN])(M)?(\d{2})/(\d{2})?(\d{2})Z$");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TafRule {
    Report,
    Modifier,
    Station,
    Issue,
    Validity,
    Period,
    Change,
    Wind,
    Visibility,
    Condition,
    Clouds,
    WindShear,
    Temperature,
}

impl GrammarRule for TafRule {
    fn consumption(self) -> Consumption {
        match self {
            TafRule::Period => Consumption::OpenPeriod,
            TafRule::Change => Consumption::OpenChange,
            TafRule::Condition | TafRule::Clouds | TafRule::Temperature => Consumption::Repeat,
            _ => Consumption::Once,
        }
    }
}

static TAF_RULES: [TafRule; 13] = [
    TafRule::Report,
    TafRule::Modifier,
    TafRule::Station,
    TafRule::Issue,
    TafRule::Validity,
    TafRule::Period,
    TafRule::Change,
    TafRule::Wind,
    TafRule::Visibility,
    TafRule::Condition,
    TafRule::Clouds,
    TafRule::WindShear,
    TafRule::Temperature,
];

const PERIOD_FIELDS: [TafRule; 5] = [
    TafRule::Wind,
    TafRule::Visibility,
    TafRule::Condition,
    TafRule::Clouds,
    TafRule::WindShear,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Target {
    Period(usize),
    Change(usize, usize),
}

#[derive(Debug, Clone, PartialEq)]
enum TafGroup {
    Report,
    Modifier(String),
    Station(String),
    Issue {
        day: Option<u32>,
        hour: u32,
        minute: u32,
    },
    Validity {
        raw: String,
        day: u32,
        start: u32,
        end_day: Option<u32>,
        end: u32,
    },
    Period(String),
    Change {
        kind: ChangeKind,
        probability: Option<u8>,
        from: Option<String>,
        to: Option<String>,
    },
    Wind(Wind),
    Visibility(VisibilityGroup),
    Condition(String),
    Clouds(CloudLayer),
    WindShear(WindShear),
    Temperature {
        high: bool,
        extreme: TemperatureExtreme,
    },
}

fn hour_of_day(hour: u32) -> bool {
    hour <= 24
}

fn day_of_month(day: u32) -> bool {
    (1..=31).contains(&day)
}

/// `ddhh/ddhh` as `(start day, start hour, end day, end hour)`.
fn decode_day_hour_range(text: &str) -> Option<(u32, u32, u32, u32)> {
    let caps = DAY_HOUR_RANGE.captures(text)?;
    let start_day: u32 = caps[1].parse().ok()?;
    let start: u32 = caps[2].parse().ok()?;
    let end_day: u32 = caps[3].parse().ok()?;
    let end: u32 = caps[4].parse().ok()?;
    (day_of_month(start_day) && day_of_month(end_day) && hour_of_day(start) && hour_of_day(end))
        .then_some((start_day, start, end_day, end))
}

/// `ddhhhh`, or `ddhh/ddhh` with an explicit end day.
fn decode_validity(text: &str) -> Option<TafGroup> {
    if let Some((day, start, end_day, end)) = decode_day_hour_range(text) {
        return Some(TafGroup::Validity {
            raw: text.to_string(),
            day,
            start,
            end_day: Some(end_day),
            end,
        });
    }
    let caps = VALIDITY.captures(text)?;
    let day: u32 = caps[1].parse().ok()?;
    let start: u32 = caps[2].parse().ok()?;
    let end: u32 = caps[3].parse().ok()?;
    (day_of_month(day) && hour_of_day(start) && hour_of_day(end)).then(|| TafGroup::Validity {
        raw: text.to_string(),
        day,
        start,
        end_day: None,
        end,
    })
}

fn decode_period(text: &str) -> Option<TafGroup> {
    let caps = PERIOD.captures(text)?;
    let day: Option<u32> = match caps.get(1) {
        Some(m) => Some(m.as_str().parse().ok()?),
        None => None,
    };
    let hour: u32 = caps[2].parse().ok()?;
    let minute: u32 = caps[3].parse().ok()?;
    (day.is_none_or(day_of_month) && hour_of_day(hour) && minute < 60)
        .then(|| TafGroup::Period(format!("{hour:02}:{minute:02}")))
}

/// Hours of a change window: `ddhh/ddhh`, `hhhh` or a lone `hh`.
///
/// A `hhhh` window never ends at `00` or on its start hour. Those tokens are
/// visibilities in meters (`0800`, `1500`).
fn decode_change_window(text: &str) -> Option<(u32, Option<u32>)> {
    if let Some((_, from, _, to)) = decode_day_hour_range(text) {
        return Some((from, Some(to)));
    }
    let caps = CHANGE_TIME.captures(text)?;
    let from: u32 = caps[1].parse().ok()?;
    let to: Option<u32> = match caps.get(2) {
        Some(m) => Some(m.as_str().parse().ok()?),
        None => None,
    };
    let window_end = |to: u32| hour_of_day(to) && to != 0 && to != from;
    (hour_of_day(from) && to.is_none_or(window_end)).then_some((from, to))
}

/// A change marker, plus the window after it when there is one.
fn match_change(tokens: &[Token<'_>], index: usize) -> Option<(TafGroup, usize)> {
    let text = tokens.get(index)?.text;
    let caps = CHANGE.captures(text)?;
    let (kind, probability) = match caps.get(1) {
        Some(p) => (ChangeKind::Prob, Some(p.as_str().parse().ok()?)),
        None if text == "TEMPO" => (ChangeKind::Tempo, None),
        None => (ChangeKind::Becmg, None),
    };
    let window = tokens
        .get(index + 1)
        .and_then(|t| decode_change_window(t.text));
    let (from, to, consumed) = match window {
        Some((from, to)) => (
            Some(format!("{from:02}:00")),
            to.map(|to| format!("{to:02}:00")),
            2,
        ),
        None => (None, None, 1),
    };
    Some((
        TafGroup::Change {
            kind,
            probability,
            from,
            to,
        },
        consumed,
    ))
}

fn decode_wind_shear(text: &str) -> Option<WindShear> {
    let caps = WIND_SHEAR.captures(text)?;
    let hundreds: f64 = caps[1].parse().ok()?;
    let unit: SpeedUnit = caps[4].parse().ok()?;
    Some(WindShear {
        height: hundreds * 100.0,
        degrees: caps[2].parse().ok()?,
        speed: unit.convert(caps[3].parse().ok()?, SpeedUnit::Knots),
    })
}

fn decode_extreme(text: &str) -> Option<TafGroup> {
    let caps = TEMPERATURE.captures(text)?;
    let value = grammar::signed(caps.get(2).is_some(), caps[3].parse().ok()?);
    let day = match caps.get(4) {
        Some(day) => Some(day.as_str().parse().ok()?),
        None => None,
    };
    Some(TafGroup::Temperature {
        high: &caps[1] == "X",
        extreme: TemperatureExtreme {
            value,
            day,
            hour: caps[5].parse().ok()?,
        },
    })
}

fn match_rule(rule: TafRule, tokens: &[Token<'_>], index: usize) -> Option<(TafGroup, usize)> {
    let text = tokens.get(index)?.text;
    let single = |group: Option<TafGroup>| group.map(|g| (g, 1));
    match rule {
        TafRule::Report => single((text == "TAF").then_some(TafGroup::Report)),
        TafRule::Modifier => single(
            matches!(text, "AMD" | "COR").then(|| TafGroup::Modifier(text.to_string())),
        ),
        TafRule::Station => {
            single(grammar::is_station(text).then(|| TafGroup::Station(text.to_string())))
        }
        TafRule::Issue => single(
            grammar::decode_day_time(text)
                .map(|(day, hour, minute)| TafGroup::Issue { day, hour, minute }),
        ),
        TafRule::Validity => single(decode_validity(text)),
        TafRule::Period => single(decode_period(text)),
        TafRule::Change => match_change(tokens, index),
        TafRule::Wind => single(grammar::decode_wind(text).map(TafGroup::Wind)),
        TafRule::Visibility => grammar::decode_visibility(tokens, index)
            .map(|(group, consumed)| (TafGroup::Visibility(group), consumed)),
        TafRule::Condition => single(grammar::decode_condition(text).map(TafGroup::Condition)),
        TafRule::Clouds => single(grammar::decode_clouds(text).map(TafGroup::Clouds)),
        TafRule::WindShear => single(decode_wind_shear(text).map(TafGroup::WindShear)),
        TafRule::Temperature => single(decode_extreme(text)),
    }
}

/// Validity window from the issue date and a `ddhhhh` or `ddhh/ddhh` group.
///
/// The start is placed in the issue month, or the next month when its day lies before
/// the issue day. An explicit end day lies in the start month, or the month after when
/// it is before the start day. Without one the end falls on the start day, or the day
/// after when the end hour is not after the start hour. Hour `24` is midnight of the
/// following day.
pub(crate) fn validity_window(
    issued: NaiveDate,
    day: u32,
    start_hour: u32,
    end_day: Option<u32>,
    end_hour: u32,
) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let mut month = NaiveDate::from_ymd_opt(issued.year(), issued.month(), 1)?;
    if day < issued.day() {
        month = month.checked_add_months(Months::new(1))?;
    }
    let start_date = NaiveDate::from_ymd_opt(month.year(), month.month(), day)?;
    let from = grammar::at_hour(start_date, start_hour, 0)?;
    let end_date = match end_day {
        Some(end_day) => {
            if end_day < day {
                month = month.checked_add_months(Months::new(1))?;
            }
            NaiveDate::from_ymd_opt(month.year(), month.month(), end_day)?
        }
        None if end_hour <= start_hour => start_date.succ_opt()?,
        None => start_date,
    };
    let to = grammar::at_hour(end_date, end_hour, 0)?;
    Some((from, to))
}

struct TafState {
    record: ForecastRecord,
    cursor: Option<Target>,
    reference: Option<NaiveDateTime>,
    validity_start_hour: Option<u32>,
}

impl TafState {
    fn new(reference: Option<NaiveDateTime>) -> Self {
        TafState {
            record: ForecastRecord {
                update: reference,
                ..ForecastRecord::default()
            },
            cursor: None,
            reference,
            validity_start_hour: None,
        }
    }

    fn open_period(&mut self, time: String) -> usize {
        self.record.periods.push(ForecastPeriod {
            time,
            conditions: ForecastConditions::default(),
            changes: Vec::new(),
        });
        let index = self.record.periods.len() - 1;
        self.cursor = Some(Target::Period(index));
        index
    }

    fn current_period(&mut self) -> usize {
        match self.cursor {
            Some(Target::Period(p) | Target::Change(p, _)) => p,
            None => {
                let hour = self.validity_start_hour.unwrap_or(0) % 24;
                self.open_period(format!("{hour:02}:00"))
            }
        }
    }

    fn target(&mut self) -> &mut ForecastConditions {
        let period = self.current_period();
        match self.cursor {
            Some(Target::Change(p, c)) => &mut self.record.periods[p].changes[c].conditions,
            _ => &mut self.record.periods[period].conditions,
        }
    }

    fn open_change(
        &mut self,
        kind: ChangeKind,
        probability: Option<u8>,
        from: Option<String>,
        to: Option<String>,
    ) {
        // PROBnn directly followed by TEMPO or BECMG describes a single group.
        if kind != ChangeKind::Prob {
            if let Some(Target::Change(p, c)) = self.cursor {
                let open = &mut self.record.periods[p].changes[c];
                if open.kind == ChangeKind::Prob && open.conditions.is_empty() {
                    open.kind = kind;
                    if from.is_some() {
                        open.from = from;
                        open.to = to;
                    }
                    return;
                }
            }
        }
        let period = self.current_period();
        let changes = &mut self.record.periods[period].changes;
        changes.push(ChangeGroup {
            kind,
            probability,
            from,
            to,
            conditions: ForecastConditions::default(),
        });
        self.cursor = Some(Target::Change(period, changes.len() - 1));
    }

    fn unparsed(&mut self, token: &Token<'_>) {
        debug!("Unparsed TAF group '{}' at {}", token.text, token.position);
        self.record.unparsed.push(token.text.to_string());
    }

    fn apply(&mut self, group: TafGroup, rules: &mut ActiveRules<TafRule>) {
        match group {
            TafGroup::Report => {}
            TafGroup::Modifier(modifier) => self.record.modifier = Some(modifier),
            TafGroup::Station(station) => self.record.station = station,
            TafGroup::Issue { day, hour, minute } => {
                self.record.issued = self
                    .reference
                    .and_then(|r| grammar::resolve_day_time(r, day, hour, minute));
            }
            TafGroup::Validity {
                raw,
                day,
                start,
                end_day,
                end,
            } => {
                let issue_date = self
                    .record
                    .issued
                    .map(|issued| issued.date_naive())
                    .or(self.reference.map(|r| r.date()));
                if let Some((from, to)) =
                    issue_date.and_then(|date| validity_window(date, day, start, end_day, end))
                {
                    self.record.valid_from = Some(from);
                    self.record.valid_to = Some(to);
                }
                self.record.valid_raw = Some(raw);
                self.validity_start_hour = Some(start);
                if self.record.periods.is_empty() {
                    self.open_period(format!("{:02}:00", start % 24));
                }
            }
            TafGroup::Period(time) => {
                self.open_period(time);
                rules.rearm(&PERIOD_FIELDS);
            }
            TafGroup::Change {
                kind,
                probability,
                from,
                to,
            } => {
                self.open_change(kind, probability, from, to);
                rules.rearm(&PERIOD_FIELDS);
            }
            TafGroup::Wind(wind) => self.target().wind = Some(wind),
            TafGroup::Visibility(VisibilityGroup::Value(visibility)) => {
                self.target().visibility = Some(visibility)
            }
            TafGroup::Visibility(VisibilityGroup::Cavok) => {
                let target = self.target();
                target.visibility = Some(Visibility {
                    value: 10.0,
                    qualifier: VisibilityQualifier::Beyond,
                });
                target.clouds = grammar::cavok_clouds();
                target.condition = Some("no significant weather".to_string());
            }
            TafGroup::Condition(phrase) => {
                let target = self.target();
                target.condition = Some(match target.condition.take() {
                    Some(existing) => format!("{existing}, {phrase}"),
                    None => phrase,
                });
            }
            TafGroup::Clouds(layer) => self.target().clouds.push(layer),
            TafGroup::WindShear(shear) => self.target().wind_shear = Some(shear),
            TafGroup::Temperature { high, extreme } => {
                if high {
                    self.record.temperature_high = Some(extreme);
                } else {
                    self.record.temperature_low = Some(extreme);
                }
            }
        }
    }
}

/// Decodes TAF bulletins into [`ForecastRecord`]s in canonical units.
///
/// Both the `ddhhhh`/`FMhhmm` and the `ddhh/ddhh`/`FMddhhmm` time forms are read.
///
/// # Examples
///
/// ```
/// use metar_weather::{RawReport, TafDecoder};
///
/// let raw = RawReport::new(
///     "2024/03/27 17:30\nTAF KJFK 271730Z 271818 19010KT P6SM SCT040\n FM2200 22015KT 5SM -RA BKN030",
/// )
/// .unwrap();
/// let forecast = TafDecoder.decode(&raw);
///
/// assert_eq!(forecast.station, "KJFK");
/// let times: Vec<&str> = forecast.periods.iter().map(|p| p.time.as_str()).collect();
/// assert_eq!(times, ["18:00", "22:00"]);
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct TafDecoder;

impl TafDecoder {
    pub fn decode(&self, raw: &RawReport) -> ForecastRecord {
        self.decode_body(&raw.body(), raw.updated())
    }

    /// # Errors
    ///
    /// Returns [`ReportError::MalformedSource`] when the text has fewer than two non-empty lines.
    pub fn decode_text(&self, text: &str) -> Result<ForecastRecord, ReportError> {
        Ok(self.decode(&RawReport::new(text)?))
    }

    pub fn decode_body(&self, body: &str, reference: Option<NaiveDateTime>) -> ForecastRecord {
        let tokens = tokenize(body);
        let mut state = TafState::new(reference);
        let mut rules = ActiveRules::new(&TAF_RULES);

        let mut index = 0;
        while index < tokens.len() {
            let matched = rules.iter().find_map(|rule| {
                match_rule(rule, &tokens, index).map(|(group, n)| (rule, group, n))
            });
            index += match matched {
                Some((rule, group, consumed)) => {
                    rules.matched(rule);
                    state.apply(group, &mut rules);
                    consumed
                }
                None => {
                    state.unparsed(&tokens[index]);
                    1
                }
            };
        }
        state.record
    }
}
