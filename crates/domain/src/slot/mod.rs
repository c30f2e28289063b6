//! Slot — a location- and time-scoped automation rule.
//!
//! A slot fires its [`AutomationAction`]s when the device is inside the
//! slot's geofence during its daily [`TimeWindow`] on one of its
//! [`ActiveDays`], at most once per calendar date.
//!
//! The geofence membership flag and the once-per-day lock are runtime state
//! owned by the scheduler; user edits only touch the configuration fields.

mod action;
mod schedule;
mod state;

pub use action::{AutomationAction, contacts};
pub use schedule::{ActiveDays, TimeWindow};
pub use state::{GeofenceTransition, SkipReason, SlotState};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{GeoSlotError, ValidationError};
use crate::geo::{self, GeoPoint};
use crate::id::SlotId;

/// A persisted automation rule plus its runtime state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: SlotId,
    pub center: GeoPoint,
    pub radius_meters: f64,
    pub window: TimeWindow,
    /// Minutes before the window start at which to remind the user, `0` for none.
    pub remind_before_minutes: u32,
    pub actions: Vec<AutomationAction>,
    pub enabled: bool,
    pub active_days: ActiveDays,
    /// Last evaluated geofence membership. Only the scheduler writes it.
    pub is_inside_geofence: bool,
    /// The once-per-day lock: last date the slot fired.
    pub last_executed_day: Option<NaiveDate>,
}

impl Slot {
    /// Create a builder for constructing a [`Slot`].
    #[must_use]
    pub fn builder() -> SlotBuilder {
        SlotBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`GeoSlotError::Validation`] when:
    /// - the center is not a valid coordinate ([`ValidationError::InvalidCoordinate`])
    /// - the radius is not positive and finite ([`ValidationError::InvalidRadius`])
    /// - the window does not start before it ends ([`ValidationError::InvalidTimeWindow`])
    /// - the explicit day set is empty ([`ValidationError::NoActiveDays`])
    /// - `actions` is empty ([`ValidationError::NoActions`]) or one of them is invalid
    pub fn validate(&self) -> Result<(), GeoSlotError> {
        if !self.center.is_valid() {
            return Err(ValidationError::InvalidCoordinate {
                latitude: self.center.latitude,
                longitude: self.center.longitude,
            }
            .into());
        }
        if !self.radius_meters.is_finite() || self.radius_meters <= 0.0 {
            return Err(ValidationError::InvalidRadius(self.radius_meters).into());
        }
        self.window.validate()?;
        self.active_days.validate()?;
        if self.actions.is_empty() {
            return Err(ValidationError::NoActions.into());
        }
        for action in &self.actions {
            action.validate()?;
        }
        Ok(())
    }

    /// Whether `position` lies inside this slot's geofence.
    #[must_use]
    pub fn contains(&self, position: &GeoPoint) -> bool {
        geo::contains(&self.center, self.radius_meters, position)
    }

    /// Whether the slot recurs on `date`.
    #[must_use]
    pub fn is_active_on(&self, date: NaiveDate) -> bool {
        self.active_days.is_active_on(date)
    }

    /// Whether the time of day falls inside the daily window.
    #[must_use]
    pub fn in_window(&self, time: NaiveTime) -> bool {
        self.window.contains(time)
    }

    /// Whether the once-per-day lock is held for `date`.
    #[must_use]
    pub fn has_executed_on(&self, date: NaiveDate) -> bool {
        self.last_executed_day == Some(date)
    }

    /// Decide whether the slot may fire at `at` given its membership.
    ///
    /// # Errors
    ///
    /// Returns the first [`SkipReason`] that rules firing out.
    pub fn check_firing(&self, inside: bool, at: NaiveDateTime) -> Result<(), SkipReason> {
        if !self.enabled {
            return Err(SkipReason::Disabled);
        }
        if !inside {
            return Err(SkipReason::Outside);
        }
        if !self.is_active_on(at.date()) {
            return Err(SkipReason::InactiveDay);
        }
        if !self.in_window(at.time()) {
            return Err(SkipReason::OutsideWindow);
        }
        match self.last_executed_day {
            Some(day) if day == at.date() => Err(SkipReason::AlreadyExecutedToday),
            Some(day) if day > at.date() => Err(SkipReason::StaleTick),
            _ => Ok(()),
        }
    }

    /// Conceptual scheduler state on `date`.
    #[must_use]
    pub fn state_on(&self, date: NaiveDate) -> SlotState {
        match (self.enabled, self.is_inside_geofence) {
            (false, _) => SlotState::Disabled,
            (true, false) => SlotState::ArmedOutside,
            (true, true) if self.has_executed_on(date) => SlotState::ArmedInsideFiredToday,
            (true, true) => SlotState::ArmedInsideUnfired,
        }
    }

    /// When the reminder for `date` is due, if the slot has one that day.
    #[must_use]
    pub fn reminder_at(&self, date: NaiveDate) -> Option<NaiveDateTime> {
        if !self.is_active_on(date) {
            return None;
        }
        self.window
            .reminder_time(self.remind_before_minutes)
            .map(|time| date.and_time(time))
    }
}

/// Step-by-step builder for [`Slot`].
#[derive(Debug, Default)]
pub struct SlotBuilder {
    id: Option<SlotId>,
    center: Option<GeoPoint>,
    radius_meters: Option<f64>,
    window: Option<TimeWindow>,
    remind_before_minutes: u32,
    actions: Vec<AutomationAction>,
    enabled: Option<bool>,
    active_days: ActiveDays,
    is_inside_geofence: bool,
    last_executed_day: Option<NaiveDate>,
}

impl SlotBuilder {
    #[must_use]
    pub fn id(mut self, id: SlotId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn center(mut self, latitude: f64, longitude: f64) -> Self {
        self.center = Some(GeoPoint::new(latitude, longitude));
        self
    }

    #[must_use]
    pub fn radius_meters(mut self, radius: f64) -> Self {
        self.radius_meters = Some(radius);
        self
    }

    #[must_use]
    pub fn window(mut self, window: TimeWindow) -> Self {
        self.window = Some(window);
        self
    }

    #[must_use]
    pub fn remind_before_minutes(mut self, minutes: u32) -> Self {
        self.remind_before_minutes = minutes;
        self
    }

    #[must_use]
    pub fn action(mut self, action: AutomationAction) -> Self {
        self.actions.push(action);
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn active_days(mut self, days: ActiveDays) -> Self {
        self.active_days = days;
        self
    }

    #[must_use]
    pub fn inside_geofence(mut self, inside: bool) -> Self {
        self.is_inside_geofence = inside;
        self
    }

    #[must_use]
    pub fn last_executed_day(mut self, day: NaiveDate) -> Self {
        self.last_executed_day = Some(day);
        self
    }

    /// Consume the builder, validate, and return a [`Slot`].
    ///
    /// The window is required; days default to every day and the slot
    /// defaults to enabled.
    ///
    /// # Errors
    ///
    /// Returns [`GeoSlotError::Validation`] if required fields are missing or
    /// any invariant fails.
    pub fn build(self) -> Result<Slot, GeoSlotError> {
        let slot = Slot {
            id: self.id.unwrap_or_default(),
            center: self.center.ok_or(ValidationError::MissingField("center"))?,
            radius_meters: self
                .radius_meters
                .ok_or(ValidationError::MissingField("radius_meters"))?,
            window: self.window.ok_or(ValidationError::MissingField("window"))?,
            remind_before_minutes: self.remind_before_minutes,
            actions: self.actions,
            enabled: self.enabled.unwrap_or(true),
            active_days: self.active_days,
            is_inside_geofence: self.is_inside_geofence,
            last_executed_day: self.last_executed_day,
        };
        slot.validate()?;
        Ok(slot)
    }
}
