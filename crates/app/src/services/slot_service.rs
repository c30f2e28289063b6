//! Slot service — use-cases for managing slots.
//!
//! Edits only ever touch the configuration of a slot. Geofence membership
//! and the once-per-day lock belong to the scheduler.

use geoslot_domain::error::{GeoSlotError, NotFoundError};
use geoslot_domain::event::{Event, EventType};
use geoslot_domain::id::SlotId;
use geoslot_domain::slot::Slot;

use crate::ports::{EventPublisher, SlotRepository};

/// Application service for slot CRUD operations.
pub struct SlotService<R, P> {
    repo: R,
    publisher: P,
}

impl<R, P> SlotService<R, P>
where
    R: SlotRepository,
    P: EventPublisher,
{
    /// Create a new service backed by the given repository and event publisher.
    pub fn new(repo: R, publisher: P) -> Self {
        Self { repo, publisher }
    }

    /// Create a new slot after validating domain invariants.
    ///
    /// The slot starts outside its geofence and never executed, whatever the
    /// caller supplied for those fields.
    ///
    /// # Errors
    ///
    /// Returns [`GeoSlotError::Validation`] if invariants fail, or a
    /// storage error propagated from the repository.
    #[tracing::instrument(skip(self, slot), fields(slot_id = %slot.id))]
    pub async fn create_slot(&self, mut slot: Slot) -> Result<Slot, GeoSlotError> {
        slot.validate()?;
        slot.is_inside_geofence = false;
        slot.last_executed_day = None;
        let created = self.repo.create(slot).await?;
        self.notify(EventType::SlotCreated, &created).await;
        Ok(created)
    }

    /// Look up a slot by id, returning an error if not found.
    ///
    /// # Errors
    ///
    /// Returns [`GeoSlotError::NotFound`] when no slot with `id` exists,
    /// or a storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn get_slot(&self, id: SlotId) -> Result<Slot, GeoSlotError> {
        self.repo
            .get_by_id(id)
            .await?
            .ok_or_else(|| not_found(id).into())
    }

    /// Snapshot of all slots.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_slots(&self) -> Result<Vec<Slot>, GeoSlotError> {
        self.repo.get_all().await
    }

    /// Snapshot of the enabled slots.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn list_enabled(&self) -> Result<Vec<Slot>, GeoSlotError> {
        self.repo.get_enabled().await
    }

    /// Replace the configuration of an existing slot.
    ///
    /// Runtime state stays whatever the store currently holds.
    ///
    /// # Errors
    ///
    /// Returns [`GeoSlotError::Validation`] if invariants fail,
    /// [`GeoSlotError::NotFound`] if the slot does not exist, or a storage
    /// error from the repository.
    #[tracing::instrument(skip(self, slot), fields(slot_id = %slot.id))]
    pub async fn update_slot(&self, slot: Slot) -> Result<Slot, GeoSlotError> {
        slot.validate()?;
        let updated = self.repo.update(slot).await?;
        self.notify(EventType::SlotUpdated, &updated).await;
        Ok(updated)
    }

    /// Enable or disable a slot.
    ///
    /// # Errors
    ///
    /// Returns [`GeoSlotError::NotFound`] if the slot does not exist, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn set_enabled(&self, id: SlotId, enabled: bool) -> Result<Slot, GeoSlotError> {
        self.repo.set_enabled(id, enabled).await?;
        let slot = self.get_slot(id).await?;
        self.notify(EventType::SlotEnabledChanged, &slot).await;
        Ok(slot)
    }

    /// Delete a slot by id.
    ///
    /// # Errors
    ///
    /// Returns [`GeoSlotError::NotFound`] if the slot does not exist, or a
    /// storage error from the repository.
    #[tracing::instrument(skip(self))]
    pub async fn delete_slot(&self, id: SlotId) -> Result<(), GeoSlotError> {
        self.repo.delete(id).await?;
        let event = Event::new(EventType::SlotDeleted, Some(id), serde_json::json!({}));
        let _ = self.publisher.publish(event).await;
        Ok(())
    }

    async fn notify(&self, event_type: EventType, slot: &Slot) {
        let event = Event::new(
            event_type,
            Some(slot.id),
            serde_json::json!({ "enabled": slot.enabled }),
        );
        let _ = self.publisher.publish(event).await;
    }
}

fn not_found(id: SlotId) -> NotFoundError {
    NotFoundError {
        entity: "Slot",
        id: id.to_string(),
    }
}
