//! Geographic primitives — coordinates and geofence containment.
//!
//! Distances use the haversine great-circle formula on a spherical Earth,
//! which stays well within a meter of the ellipsoidal distance at the
//! geofence radii slots are configured with.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters (IUGG).
pub const EARTH_RADIUS_METERS: f64 = 6_371_008.8;

/// A WGS84 coordinate in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components are finite and within their ranges.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }

    /// Great-circle distance to `other` in meters.
    ///
    /// Returns `None` if either point is invalid.
    #[must_use]
    pub fn distance_to(&self, other: &GeoPoint) -> Option<f64> {
        if !self.is_valid() || !other.is_valid() {
            return None;
        }
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = (other.latitude - self.latitude).to_radians();
        let dlng = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().min(1.0).asin();
        Some(EARTH_RADIUS_METERS * c)
    }
}

impl std::fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.latitude, self.longitude)
    }
}

/// Whether `position` lies inside the circle of `radius_meters` around `center`.
///
/// Malformed coordinates or radius are reported as outside.
#[must_use]
pub fn contains(center: &GeoPoint, radius_meters: f64, position: &GeoPoint) -> bool {
    if !radius_meters.is_finite() || radius_meters <= 0.0 {
        return false;
    }
    center
        .distance_to(position)
        .is_some_and(|distance| distance <= radius_meters)
}
