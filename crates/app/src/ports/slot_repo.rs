//! Slot repository port — the slot store.
//!
//! Besides plain CRUD, the store exposes the narrow mutators the scheduler
//! uses to commit geofence membership and the once-per-day lock. Reads must
//! reflect the latest committed mutation.

use std::future::Future;

use chrono::NaiveDate;
use geoslot_domain::error::GeoSlotError;
use geoslot_domain::id::SlotId;
use geoslot_domain::slot::Slot;

/// Repository for persisting and querying [`Slot`]s.
///
/// The mutators and `update`/`delete` return [`GeoSlotError::NotFound`] when
/// no slot with the given id exists.
pub trait SlotRepository {
    /// Create a new slot in storage.
    fn create(&self, slot: Slot) -> impl Future<Output = Result<Slot, GeoSlotError>> + Send;

    /// Get a slot by its unique identifier.
    fn get_by_id(
        &self,
        id: SlotId,
    ) -> impl Future<Output = Result<Option<Slot>, GeoSlotError>> + Send;

    /// Get all slots.
    fn get_all(&self) -> impl Future<Output = Result<Vec<Slot>, GeoSlotError>> + Send;

    /// Get all enabled slots.
    fn get_enabled(&self) -> impl Future<Output = Result<Vec<Slot>, GeoSlotError>> + Send;

    /// Replace an existing slot.
    fn update(&self, slot: Slot) -> impl Future<Output = Result<Slot, GeoSlotError>> + Send;

    /// Delete a slot by its unique identifier.
    fn delete(&self, id: SlotId) -> impl Future<Output = Result<(), GeoSlotError>> + Send;

    /// Record the geofence membership of a slot.
    fn set_inside_geofence(
        &self,
        id: SlotId,
        inside: bool,
    ) -> impl Future<Output = Result<(), GeoSlotError>> + Send;

    /// Commit the once-per-day lock of a slot.
    fn set_last_executed_day(
        &self,
        id: SlotId,
        day: NaiveDate,
    ) -> impl Future<Output = Result<(), GeoSlotError>> + Send;

    /// Toggle the enabled flag of a slot.
    fn set_enabled(
        &self,
        id: SlotId,
        enabled: bool,
    ) -> impl Future<Output = Result<(), GeoSlotError>> + Send;
}

impl<T: SlotRepository + Send + Sync> SlotRepository for std::sync::Arc<T> {
    fn create(&self, slot: Slot) -> impl Future<Output = Result<Slot, GeoSlotError>> + Send {
        (**self).create(slot)
    }

    fn get_by_id(
        &self,
        id: SlotId,
    ) -> impl Future<Output = Result<Option<Slot>, GeoSlotError>> + Send {
        (**self).get_by_id(id)
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Slot>, GeoSlotError>> + Send {
        (**self).get_all()
    }

    fn get_enabled(&self) -> impl Future<Output = Result<Vec<Slot>, GeoSlotError>> + Send {
        (**self).get_enabled()
    }

    fn update(&self, slot: Slot) -> impl Future<Output = Result<Slot, GeoSlotError>> + Send {
        (**self).update(slot)
    }

    fn delete(&self, id: SlotId) -> impl Future<Output = Result<(), GeoSlotError>> + Send {
        (**self).delete(id)
    }

    fn set_inside_geofence(
        &self,
        id: SlotId,
        inside: bool,
    ) -> impl Future<Output = Result<(), GeoSlotError>> + Send {
        (**self).set_inside_geofence(id, inside)
    }

    fn set_last_executed_day(
        &self,
        id: SlotId,
        day: NaiveDate,
    ) -> impl Future<Output = Result<(), GeoSlotError>> + Send {
        (**self).set_last_executed_day(id, day)
    }

    fn set_enabled(
        &self,
        id: SlotId,
        enabled: bool,
    ) -> impl Future<Output = Result<(), GeoSlotError>> + Send {
        (**self).set_enabled(id, enabled)
    }
}
