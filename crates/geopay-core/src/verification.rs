//! Proximity verification
//!
//! Checks whether a captured position is close enough to a supplier hub to
//! count as an on-site visit. Reports distances only; nothing is paid here.

use serde::{Deserialize, Serialize};

use crate::coord::{Coordinate, PointOfInterest};

/// Default on-site radius in metres
pub const DEFAULT_RADIUS_M: f64 = 20.0;

/// Distance from the captured position to one point of interest
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProximityCheck {
    pub poi_id: String,
    pub name: String,
    pub distance_m: f64,
    pub within_radius: bool,
}

/// Distances to every point, nearest first
pub fn verify(user: &Coordinate, pois: &[PointOfInterest], radius_m: f64) -> Vec<ProximityCheck> {
    let mut checks: Vec<ProximityCheck> = pois
        .iter()
        .map(|poi| {
            let distance_m = user.distance_m(&poi.coordinate());
            ProximityCheck {
                poi_id: poi.id.clone(),
                name: poi.name.clone(),
                distance_m,
                within_radius: distance_m <= radius_m,
            }
        })
        .collect();

    checks.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    checks
}

/// Closest point inside the radius, if any
pub fn nearest_verified(
    user: &Coordinate,
    pois: &[PointOfInterest],
    radius_m: f64,
) -> Option<ProximityCheck> {
    verify(user, pois, radius_m)
        .into_iter()
        .find(|check| check.within_radius)
}
