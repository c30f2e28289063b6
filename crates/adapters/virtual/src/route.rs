//! Replayed location route standing in for a real location provider.

use std::sync::atomic::{AtomicUsize, Ordering};

use geoslot_domain::geo::GeoPoint;

/// Cycles through a fixed list of waypoints, one per poll.
pub struct RouteFeed {
    waypoints: Vec<GeoPoint>,
    cursor: AtomicUsize,
}

impl RouteFeed {
    /// Returns `None` for an empty route.
    #[must_use]
    pub fn new(waypoints: Vec<GeoPoint>) -> Option<Self> {
        if waypoints.is_empty() {
            return None;
        }
        Some(Self {
            waypoints,
            cursor: AtomicUsize::new(0),
        })
    }

    /// The next waypoint, wrapping around at the end of the route.
    pub fn next_position(&self) -> GeoPoint {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.waypoints.len();
        self.waypoints[index]
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }
}
