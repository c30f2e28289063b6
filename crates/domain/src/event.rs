//! Event — an immutable record of something that happened.
//!
//! Events are produced when slots are edited and when the scheduler observes
//! a geofence transition, fires a slot, is blocked by missing permissions,
//! sees an action fail, or schedules a reminder. They feed both the live
//! stream and the diagnostics log.

use serde::{Deserialize, Serialize};

use crate::id::{EventId, SlotId};
use crate::time::{Timestamp, now};

/// Kind of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    SlotCreated,
    SlotUpdated,
    SlotEnabledChanged,
    SlotDeleted,
    GeofenceEntered,
    GeofenceExited,
    /// The action list ran and the once-per-day lock was committed.
    SlotExecuted,
    /// A firing candidate was blocked because permissions are missing.
    PermissionBlocked,
    /// The action executor failed or timed out.
    ActionFailed,
    ReminderScheduled,
}

impl EventType {
    /// Stable text form, used for persistence.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SlotCreated => "slot_created",
            Self::SlotUpdated => "slot_updated",
            Self::SlotEnabledChanged => "slot_enabled_changed",
            Self::SlotDeleted => "slot_deleted",
            Self::GeofenceEntered => "geofence_entered",
            Self::GeofenceExited => "geofence_exited",
            Self::SlotExecuted => "slot_executed",
            Self::PermissionBlocked => "permission_blocked",
            Self::ActionFailed => "action_failed",
            Self::ReminderScheduled => "reminder_scheduled",
        }
    }
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown event type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event type {0:?}")]
pub struct UnknownEventType(pub String);

impl std::str::FromStr for EventType {
    type Err = UnknownEventType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "slot_created" => Ok(Self::SlotCreated),
            "slot_updated" => Ok(Self::SlotUpdated),
            "slot_enabled_changed" => Ok(Self::SlotEnabledChanged),
            "slot_deleted" => Ok(Self::SlotDeleted),
            "geofence_entered" => Ok(Self::GeofenceEntered),
            "geofence_exited" => Ok(Self::GeofenceExited),
            "slot_executed" => Ok(Self::SlotExecuted),
            "permission_blocked" => Ok(Self::PermissionBlocked),
            "action_failed" => Ok(Self::ActionFailed),
            "reminder_scheduled" => Ok(Self::ReminderScheduled),
            other => Err(UnknownEventType(other.to_string())),
        }
    }
}

/// An immutable record of something that happened to a slot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    pub slot_id: Option<SlotId>,
    pub timestamp: Timestamp,
    pub data: serde_json::Value,
}

impl Event {
    /// Create a new event stamped with the current time.
    #[must_use]
    pub fn new(event_type: EventType, slot_id: Option<SlotId>, data: serde_json::Value) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            slot_id,
            timestamp: now(),
            data,
        }
    }
}
