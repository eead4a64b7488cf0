//! Airport metadata lookups.

pub mod airport_directory;
pub mod error;
pub mod nsd;
pub mod store;

use crate::geo::GeoIndex;
use crate::types::airport::AirportLocation;

/// Read access to airport metadata.
pub trait LocationStore: Send + Sync {
    fn by_id(&self, id: &str) -> Option<AirportLocation>;

    /// Case-insensitive substring search on the name, optionally narrowed to an exact
    /// state and country. Airports with an ICAO id sort before placeholder ids.
    fn search_by_name(
        &self,
        name: &str,
        state: Option<&str>,
        country: Option<&str>,
    ) -> Vec<AirportLocation>;

    fn all_airports(&self) -> &[AirportLocation];

    /// Up to `limit` airports closest to the given point, closest first.
    fn nearest(&self, latitude: f64, longitude: f64, limit: usize) -> Vec<AirportLocation> {
        GeoIndex::from_airports(self.all_airports())
            .nearest(latitude, longitude, limit)
            .into_iter()
            .filter_map(|neighbor| self.by_id(&neighbor.id))
            .collect()
    }
}
