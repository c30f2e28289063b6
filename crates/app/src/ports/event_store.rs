//! Event store port — the diagnostics log.

use std::future::Future;

use geoslot_domain::error::GeoSlotError;
use geoslot_domain::event::Event;
use geoslot_domain::id::{EventId, SlotId};

/// Repository for persisting and querying [`Event`]s.
pub trait EventStore {
    /// Persist a new event.
    fn store(&self, event: Event) -> impl Future<Output = Result<Event, GeoSlotError>> + Send;

    /// Get an event by its unique identifier.
    fn get_by_id(
        &self,
        id: EventId,
    ) -> impl Future<Output = Result<Option<Event>, GeoSlotError>> + Send;

    /// Get the most recent events, ordered newest-first.
    fn get_recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Event>, GeoSlotError>> + Send;

    /// Find events for a specific slot, ordered newest-first.
    fn find_by_slot(
        &self,
        slot_id: SlotId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Event>, GeoSlotError>> + Send;
}

impl<T: EventStore + Send + Sync> EventStore for std::sync::Arc<T> {
    fn store(&self, event: Event) -> impl Future<Output = Result<Event, GeoSlotError>> + Send {
        (**self).store(event)
    }

    fn get_by_id(
        &self,
        id: EventId,
    ) -> impl Future<Output = Result<Option<Event>, GeoSlotError>> + Send {
        (**self).get_by_id(id)
    }

    fn get_recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Event>, GeoSlotError>> + Send {
        (**self).get_recent(limit)
    }

    fn find_by_slot(
        &self,
        slot_id: SlotId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Event>, GeoSlotError>> + Send {
        (**self).find_by_slot(slot_id, limit)
    }
}
