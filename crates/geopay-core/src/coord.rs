//! Geographic primitives
//!
//! `Coordinate` is a WGS-84 point in decimal degrees. `PointOfInterest` is a
//! named, externally supplied location (a supplier hub) that the map marks.

use serde::{Deserialize, Serialize};

/// Mean earth radius in metres used for great-circle distances
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair in WGS-84 decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Finite and inside the [-90, 90] x [-180, 180] range
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lon.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lon)
    }

    /// Great-circle distance in metres (haversine)
    pub fn distance_m(&self, other: &Coordinate) -> f64 {
        haversine_m(self, other)
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// A named, fixed location to be marked on the map
///
/// The list is injected (configuration or fixture) and never mutated by the
/// location flow or the map view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    /// Stable unique identifier, also the marker key
    pub id: String,
    /// Display name shown in the marker popup
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl PointOfInterest {
    pub fn new(id: impl Into<String>, name: impl Into<String>, lat: f64, lon: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lat,
            lon,
        }
    }

    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

/// Haversine distance between two coordinates, in metres
pub fn haversine_m(a: &Coordinate, b: &Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}
