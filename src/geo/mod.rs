//! Cartesian nearest-neighbour search over airport positions.
//!
//! Positions are projected onto a sphere of radius [`EARTH_RADIUS_KM`] and compared
//! by squared Euclidean distance, which orders points the same way great-circle
//! distance does.

use crate::types::airport::AirportLocation;
use ordered_float::OrderedFloat;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

pub const EARTH_RADIUS_KM: f64 = 6378.15;

/// Projects latitude/longitude in degrees onto `[x, y, z]` in km.
///
/// ```
/// use metar_weather::polar_to_cartesian;
///
/// let [x, y, z] = polar_to_cartesian(0.0, 0.0);
/// assert_eq!((x, y, z), (6378.15, 0.0, 0.0));
/// ```
pub fn polar_to_cartesian(latitude: f64, longitude: f64) -> [f64; 3] {
    let theta = latitude.to_radians();
    let lambda = longitude.to_radians();
    [
        EARTH_RADIUS_KM * lambda.cos() * theta.cos(),
        EARTH_RADIUS_KM * lambda.sin() * theta.cos(),
        EARTH_RADIUS_KM * theta.sin(),
    ]
}

#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub id: String,
    pub position: [f64; 3],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Neighbor {
    pub id: String,
    pub distance_squared: f64,
}

/// Whether distance accumulation may stop once a candidate is known to lose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Pruning {
    #[default]
    EarlyExit,
    Disabled,
}

// Max-heap entry: the top is the worst of the current k best.
struct Candidate<'a> {
    distance_squared: OrderedFloat<f64>,
    id: &'a str,
}

impl PartialEq for Candidate<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl Eq for Candidate<'_> {}
impl PartialOrd for Candidate<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for Candidate<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance_squared
            .cmp(&other.distance_squared)
            .then_with(|| self.id.cmp(other.id))
    }
}

fn squared_distance(a: &[f64; 3], b: &[f64; 3], bound: Option<f64>) -> Option<f64> {
    let mut sum = 0.0;
    for axis in 0..3 {
        let d = a[axis] - b[axis];
        sum += d * d;
        if bound.is_some_and(|worst| sum > worst) {
            return None;
        }
    }
    Some(sum)
}

/// Returns the `k` candidates closest to `query`, closest first, ties broken by ascending id.
///
/// With [`Pruning::EarlyExit`] a candidate's distance stops accumulating as soon as
/// it exceeds the current k-th best; the result is the same either way.
pub fn nearest(query: [f64; 3], candidates: &[GeoPoint], k: usize, pruning: Pruning) -> Vec<Neighbor> {
    if k == 0 {
        return vec![];
    }
    let mut heap: BinaryHeap<Candidate<'_>> = BinaryHeap::with_capacity(k + 1);

    for point in candidates {
        let bound = match (pruning, heap.len() == k) {
            (Pruning::EarlyExit, true) => heap.peek().map(|worst| worst.distance_squared.0),
            _ => None,
        };
        let Some(distance_squared) = squared_distance(&query, &point.position, bound) else {
            continue;
        };
        let candidate = Candidate {
            distance_squared: OrderedFloat(distance_squared),
            id: &point.id,
        };
        if heap.len() < k {
            heap.push(candidate);
        } else if heap.peek().is_some_and(|worst| candidate < *worst) {
            heap.pop();
            heap.push(candidate);
        }
    }

    heap.into_sorted_vec()
        .into_iter()
        .map(|c| Neighbor {
            id: c.id.to_string(),
            distance_squared: c.distance_squared.into_inner(),
        })
        .collect()
}

/// Airport positions ready for nearest-neighbour queries. Placeholder ids are left out.
#[derive(Debug, Clone, Default)]
pub struct GeoIndex {
    points: Vec<GeoPoint>,
}

impl GeoIndex {
    pub fn from_airports(airports: &[AirportLocation]) -> Self {
        GeoIndex {
            points: airports
                .iter()
                .filter(|a| a.has_icao_id())
                .map(|a| GeoPoint {
                    id: a.id.clone(),
                    position: a.position(),
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn nearest(&self, latitude: f64, longitude: f64, k: usize) -> Vec<Neighbor> {
        nearest(
            polar_to_cartesian(latitude, longitude),
            &self.points,
            k,
            Pruning::EarlyExit,
        )
    }
}
