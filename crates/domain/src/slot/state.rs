//! Runtime state of a slot as seen by the scheduler.

use serde::{Deserialize, Serialize};

/// Conceptual per-slot state for a given calendar date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    /// Skipped entirely by the scheduler.
    Disabled,
    ArmedOutside,
    /// Inside the geofence and not yet executed on this date.
    ArmedInsideUnfired,
    ArmedInsideFiredToday,
}

/// A change in geofence membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeofenceTransition {
    Entered,
    Exited,
}

impl GeofenceTransition {
    /// Transition between two membership values, if they differ.
    #[must_use]
    pub fn between(was_inside: bool, now_inside: bool) -> Option<Self> {
        match (was_inside, now_inside) {
            (false, true) => Some(Self::Entered),
            (true, false) => Some(Self::Exited),
            _ => None,
        }
    }
}

/// Why a slot did not become a firing candidate on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    Disabled,
    Outside,
    InactiveDay,
    OutsideWindow,
    AlreadyExecutedToday,
    /// The tick is dated before the day the slot last executed.
    StaleTick,
    /// No position has been observed yet.
    NoPosition,
    /// The slot was deleted while the tick was running.
    Deleted,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::Disabled => "disabled",
            Self::Outside => "outside geofence",
            Self::InactiveDay => "inactive day",
            Self::OutsideWindow => "outside time window",
            Self::AlreadyExecutedToday => "already executed today",
            Self::StaleTick => "tick older than last execution",
            Self::NoPosition => "no position",
            Self::Deleted => "deleted",
        };
        f.write_str(text)
    }
}
