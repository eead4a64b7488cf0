//! Time-limited storage of decoded records.

use crate::types::airport::AirportLocation;
use crate::types::forecast_record::ForecastRecord;
use crate::types::weather_record::WeatherRecord;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// What a cache entry holds, which decides how long it lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    Location,
    Weather,
    Forecast,
}

impl CacheKind {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(match self {
            CacheKind::Location => 900,
            CacheKind::Weather => 1800,
            CacheKind::Forecast => 7200,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub location: String,
    pub kind: CacheKind,
    /// Label of the units format the caller asked for.
    pub units: String,
    /// Requested forecast days.
    pub days: Option<u8>,
}

/// Records are stored in canonical units.
#[derive(Debug, Clone, PartialEq)]
pub enum CachedRecord {
    Location(AirportLocation),
    Weather(WeatherRecord),
    Forecast(ForecastRecord),
}

pub trait Cache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<CachedRecord>;
    fn put(&self, key: CacheKey, record: CachedRecord, ttl: Duration);
}

/// In-process [`Cache`]. Expired entries are dropped on lookup and on every insert.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<CacheKey, (Instant, CachedRecord)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map_or(0, |entries| entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Cache for MemoryCache {
    fn get(&self, key: &CacheKey) -> Option<CachedRecord> {
        let mut entries = self.entries.lock().ok()?;
        match entries.get(key) {
            Some((expires, record)) if *expires > Instant::now() => Some(record.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn put(&self, key: CacheKey, record: CachedRecord, ttl: Duration) {
        if let Ok(mut entries) = self.entries.lock() {
            let now = Instant::now();
            entries.retain(|_, (expires, _)| *expires > now);
            entries.insert(key, (now + ttl, record));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(kind: CacheKind) -> CacheKey {
        CacheKey {
            location: "KJFK".to_string(),
            kind,
            units: "s".to_string(),
            days: None,
        }
    }

    fn record() -> CachedRecord {
        CachedRecord::Weather(WeatherRecord {
            station: "KJFK".to_string(),
            ..WeatherRecord::default()
        })
    }

    #[test]
    fn ttls_per_kind() {
        assert_eq!(CacheKind::Location.ttl().as_secs(), 900);
        assert_eq!(CacheKind::Weather.ttl().as_secs(), 1800);
        assert_eq!(CacheKind::Forecast.ttl().as_secs(), 7200);
    }

    #[test]
    fn stores_until_expiry() {
        let cache = MemoryCache::new();
        cache.put(key(CacheKind::Weather), record(), Duration::from_secs(60));
        assert_eq!(cache.get(&key(CacheKind::Weather)), Some(record()));
        assert_eq!(cache.get(&key(CacheKind::Forecast)), None);

        cache.put(key(CacheKind::Forecast), record(), Duration::ZERO);
        assert_eq!(cache.get(&key(CacheKind::Forecast)), None);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn insert_evicts_expired_entries_of_other_keys() {
        let cache = MemoryCache::new();
        let stale = CacheKey {
            location: "EGLL".to_string(),
            ..key(CacheKind::Weather)
        };
        cache.put(stale, record(), Duration::ZERO);
        cache.put(key(CacheKind::Forecast), record(), Duration::from_secs(60));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key(CacheKind::Forecast)), Some(record()));
    }

    #[test]
    fn key_includes_units_and_days() {
        let cache = MemoryCache::new();
        cache.put(key(CacheKind::Forecast), record(), Duration::from_secs(60));
        let metric = CacheKey {
            units: "m".to_string(),
            ..key(CacheKind::Forecast)
        };
        let three_days = CacheKey {
            days: Some(3),
            ..key(CacheKind::Forecast)
        };
        assert_eq!(cache.get(&metric), None);
        assert_eq!(cache.get(&three_days), None);
    }
}
