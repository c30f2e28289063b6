//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`GeoSlotError`] via `#[from]`.

/// Top-level error returned by services and ports.
#[derive(Debug, thiserror::Error)]
pub enum GeoSlotError {
    /// A domain invariant was violated (the slot configuration is invalid).
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// The requested record does not exist.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The persistence layer failed or is unreachable.
    #[error("storage error")]
    Storage(Box<dyn std::error::Error + Send + Sync>),
}

/// Rejected slot configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("a slot needs at least one action")]
    NoActions,

    #[error("radius must be a positive finite number of meters, got {0}")]
    InvalidRadius(f64),

    #[error("latitude {latitude} / longitude {longitude} is not a valid coordinate")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("time window must start before it ends ({start} >= {end})")]
    InvalidTimeWindow {
        start: chrono::NaiveTime,
        end: chrono::NaiveTime,
    },

    #[error("time of day out of range: {0} ms")]
    InvalidTimeOfDay(i64),

    #[error("active days must contain at least one weekday")]
    NoActiveDays,

    #[error("unknown weekday code {0:?}")]
    UnknownWeekday(String),

    #[error("invalid action parameter: {0}")]
    InvalidAction(String),
}

/// Lookup of a record that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// Failure reported by an action executor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    /// The device rejected or could not apply the action.
    #[error("action {action} failed: {reason}")]
    Failed { action: String, reason: String },

    /// The device is not reachable at all.
    #[error("device unavailable: {0}")]
    Unavailable(String),
}

/// Failure reported by a notification scheduler.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("notification could not be scheduled: {0}")]
pub struct NotificationError(pub String);
