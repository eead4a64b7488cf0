//! Display rows for a decoded TAF.
//!
//! A [`ForecastRecord`] keeps change groups exactly as stated. For display, each change
//! group inherits whatever its period states and it does not, and a value identical to
//! the previous row's is left blank. The comparison restarts at every period.

use crate::types::forecast_record::{
    ChangeGroup, ChangeKind, ForecastConditions, ForecastRecord, WindShear,
};
use crate::types::weather_record::{CloudLayer, Visibility, Wind};
use serde::Serialize;

impl ChangeGroup {
    /// The group's conditions with unstated fields taken from its period.
    pub fn effective(&self, period: &ForecastConditions) -> ForecastConditions {
        let own = &self.conditions;
        ForecastConditions {
            wind: own.wind.clone().or_else(|| period.wind.clone()),
            visibility: own.visibility.or(period.visibility),
            condition: own.condition.clone().or_else(|| period.condition.clone()),
            clouds: if own.clouds.is_empty() {
                period.clouds.clone()
            } else {
                own.clouds.clone()
            },
            wind_shear: own.wind_shear.or(period.wind_shear),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastRow {
    /// Start time of the enclosing period.
    pub period: String,
    pub change: Option<ChangeKind>,
    pub probability: Option<u8>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub wind: Option<Wind>,
    pub visibility: Option<Visibility>,
    pub condition: Option<String>,
    pub clouds: Option<Vec<CloudLayer>>,
    pub wind_shear: Option<WindShear>,
}

fn changed<T: PartialEq + Clone>(value: Option<T>, previous: &Option<T>) -> Option<T> {
    match (&value, previous) {
        (Some(v), Some(p)) if v == p => None,
        _ => value,
    }
}

#[derive(Default)]
struct Previous {
    wind: Option<Wind>,
    visibility: Option<Visibility>,
    condition: Option<String>,
    clouds: Option<Vec<CloudLayer>>,
    wind_shear: Option<WindShear>,
}

impl Previous {
    fn row(&mut self, period: &str, conditions: ForecastConditions) -> ForecastRow {
        let clouds = (!conditions.clouds.is_empty()).then_some(conditions.clouds);
        let row = ForecastRow {
            period: period.to_string(),
            wind: changed(conditions.wind.clone(), &self.wind),
            visibility: changed(conditions.visibility, &self.visibility),
            condition: changed(conditions.condition.clone(), &self.condition),
            clouds: changed(clouds.clone(), &self.clouds),
            wind_shear: changed(conditions.wind_shear, &self.wind_shear),
            ..ForecastRow::default()
        };
        *self = Previous {
            wind: conditions.wind,
            visibility: conditions.visibility,
            condition: conditions.condition,
            clouds,
            wind_shear: conditions.wind_shear,
        };
        row
    }
}

/// Row-per-period and row-per-change-group rendering of a forecast.
///
/// # Examples
///
/// ```
/// use metar_weather::{ForecastView, TafDecoder};
///
/// let forecast = TafDecoder
///     .decode_text("2024/03/27 11:00\nTAF EGLL 271100Z 271212 24010KT 9999 SCT030 TEMPO 1518 4000 SHRA")
///     .unwrap();
/// let view = ForecastView::new(&forecast);
///
/// assert_eq!(view.rows.len(), 2);
/// // The TEMPO group keeps the period's wind, which is blanked as unchanged.
/// assert!(view.rows[1].wind.is_none());
/// assert_eq!(view.rows[1].visibility.unwrap().value, 4.0);
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ForecastView {
    pub rows: Vec<ForecastRow>,
}

impl ForecastView {
    pub fn new(record: &ForecastRecord) -> Self {
        let mut rows = Vec::new();
        for period in &record.periods {
            let mut previous = Previous::default();
            rows.push(previous.row(&period.time, period.conditions.clone()));
            for change in &period.changes {
                let mut row = previous.row(&period.time, change.effective(&period.conditions));
                row.change = Some(change.kind);
                row.probability = change.probability;
                row.from = change.from.clone();
                row.to = change.to.clone();
                rows.push(row);
            }
        }
        ForecastView { rows }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::taf::TafDecoder;

    fn view(body: &str) -> ForecastView {
        let forecast = TafDecoder
            .decode_text(&format!("2024/03/27 11:00\n{body}"))
            .unwrap();
        ForecastView::new(&forecast)
    }

    #[test]
    fn change_groups_inherit_and_dedup() {
        let view = view(
            "TAF EGLL 271100Z 271212 24010KT 9999 SCT030 BECMG 1416 30020KT TEMPO 1618 4000 SHRA",
        );
        assert_eq!(view.rows.len(), 3);

        let period = &view.rows[0];
        assert_eq!(period.change, None);
        assert_eq!(period.wind.as_ref().unwrap().degrees, Some(240));
        assert_eq!(period.visibility.unwrap().value, 10.0);
        assert_eq!(period.clouds.as_ref().unwrap().len(), 1);

        let becmg = &view.rows[1];
        assert_eq!(becmg.change, Some(ChangeKind::Becmg));
        assert_eq!(becmg.wind.as_ref().unwrap().degrees, Some(300));
        assert_eq!(becmg.visibility, None);
        assert_eq!(becmg.clouds, None);

        let tempo = &view.rows[2];
        assert_eq!(tempo.from.as_deref(), Some("16:00"));
        // Inherits the period's 240° wind, which differs from the BECMG row.
        assert_eq!(tempo.wind.as_ref().unwrap().degrees, Some(240));
        assert_eq!(tempo.visibility.unwrap().value, 4.0);
        assert_eq!(tempo.condition.as_deref(), Some("showers rain"));
    }

    #[test]
    fn memo_resets_at_each_period() {
        let view = view("TAF EGLL 271100Z 271212 24010KT 9999 FM1800 24010KT 9999");
        assert_eq!(view.rows.len(), 2);
        assert_eq!(view.rows[1].period, "18:00");
        assert!(view.rows[1].wind.is_some());
        assert!(view.rows[1].visibility.is_some());
    }

    #[test]
    fn effective_keeps_own_fields() {
        let period = ForecastConditions {
            condition: Some("mist".to_string()),
            ..ForecastConditions::default()
        };
        let change = ChangeGroup {
            kind: ChangeKind::Tempo,
            probability: None,
            from: None,
            to: None,
            conditions: ForecastConditions {
                condition: Some("fog".to_string()),
                ..ForecastConditions::default()
            },
        };
        assert_eq!(change.effective(&period).condition.as_deref(), Some("fog"));
    }
}
