use crate::geo::GeoIndex;
use crate::locations::error::LocateAirportError;
use crate::locations::LocationStore;
use crate::types::airport::AirportLocation;
use std::collections::HashMap;

/// A [`LocationStore`] over an in-memory list of airports.
///
/// # Examples
///
/// ```
/// use metar_weather::{InMemoryLocationStore, LocationStore};
///
/// let store = InMemoryLocationStore::from_json(
///     r#"[{"id":"KJFK","name":"New York/John F. Kennedy Intl","state":"NY",
///          "country":"United States","latitude":40.6333,"longitude":-73.7792,"elevation":9}]"#,
/// )
/// .unwrap();
///
/// assert_eq!(store.by_id("KJFK").unwrap().state.as_deref(), Some("NY"));
/// assert_eq!(store.search_by_name("kennedy", None, None).len(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct InMemoryLocationStore {
    airports: Vec<AirportLocation>,
    ids: HashMap<String, usize>,
    index: GeoIndex,
}

impl InMemoryLocationStore {
    pub fn new(airports: Vec<AirportLocation>) -> Self {
        let ids = airports
            .iter()
            .enumerate()
            .filter(|(_, airport)| airport.has_icao_id())
            .map(|(i, airport)| (airport.id.clone(), i))
            .collect();
        let index = GeoIndex::from_airports(&airports);
        InMemoryLocationStore {
            airports,
            ids,
            index,
        }
    }

    /// # Errors
    ///
    /// Returns [`LocateAirportError::AirportJson`] when `json` is not an array of airports.
    pub fn from_json(json: &str) -> Result<Self, LocateAirportError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn to_json(&self) -> Result<String, LocateAirportError> {
        Ok(serde_json::to_string(&self.airports)?)
    }

    pub fn len(&self) -> usize {
        self.airports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.airports.is_empty()
    }
}

fn matches_exactly(field: Option<&str>, wanted: Option<&str>) -> bool {
    match wanted {
        Some(wanted) => field.is_some_and(|f| f.eq_ignore_ascii_case(wanted)),
        None => true,
    }
}

impl LocationStore for InMemoryLocationStore {
    fn by_id(&self, id: &str) -> Option<AirportLocation> {
        self.ids
            .get(&id.to_ascii_uppercase())
            .map(|&i| self.airports[i].clone())
    }

    fn search_by_name(
        &self,
        name: &str,
        state: Option<&str>,
        country: Option<&str>,
    ) -> Vec<AirportLocation> {
        let needle = name.to_lowercase();
        let mut found: Vec<AirportLocation> = self
            .airports
            .iter()
            .filter(|a| a.name.to_lowercase().contains(&needle))
            .filter(|a| matches_exactly(a.state.as_deref(), state))
            .filter(|a| matches_exactly(Some(&a.country), country))
            .cloned()
            .collect();
        // Stable: list order is kept within each group.
        found.sort_by_key(|a| !a.has_icao_id());
        found
    }

    fn all_airports(&self) -> &[AirportLocation] {
        &self.airports
    }

    fn nearest(&self, latitude: f64, longitude: f64, limit: usize) -> Vec<AirportLocation> {
        self.index
            .nearest(latitude, longitude, limit)
            .into_iter()
            .filter_map(|neighbor| self.by_id(&neighbor.id))
            .collect()
    }
}
