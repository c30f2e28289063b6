//! Shared application state for axum handlers.

use std::sync::Arc;

use geoslot_app::event_bus::InProcessEventBus;
use geoslot_app::ports::{
    ActionExecutor, EventPublisher, EventStore, NotificationScheduler, PermissionGate,
    SlotRepository,
};
use geoslot_app::scheduler::SlotScheduler;
use geoslot_app::services::slot_service::SlotService;

/// Scheduler type driven by the HTTP adapter: it shares the event store with
/// the diagnostics endpoints.
pub type Scheduler<R, P, ES, X, G, N> = SlotScheduler<R, Arc<ES>, P, X, G, N>;

/// Application state shared across all axum handlers.
///
/// Generic over the slot repository, event publisher, event store and the
/// device capabilities to avoid dynamic dispatch. `Clone` is implemented
/// manually so the underlying types themselves do not need to be `Clone`;
/// only the `Arc` wrappers are cloned.
pub struct AppState<R, P, ES, X, G, N> {
    /// Slot CRUD service.
    pub slot_service: Arc<SlotService<R, P>>,
    /// Scheduling engine fed by position updates and time ticks.
    pub scheduler: Arc<Scheduler<R, P, ES, X, G, N>>,
    /// Diagnostics log.
    pub event_store: Arc<ES>,
    /// Live event stream for SSE subscribers.
    pub event_bus: Arc<InProcessEventBus>,
}

impl<R, P, ES, X, G, N> Clone for AppState<R, P, ES, X, G, N> {
    fn clone(&self) -> Self {
        Self {
            slot_service: Arc::clone(&self.slot_service),
            scheduler: Arc::clone(&self.scheduler),
            event_store: Arc::clone(&self.event_store),
            event_bus: Arc::clone(&self.event_bus),
        }
    }
}

impl<R, P, ES, X, G, N> AppState<R, P, ES, X, G, N>
where
    R: SlotRepository + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    ES: EventStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: PermissionGate + Send + Sync + 'static,
    N: NotificationScheduler + Send + Sync + 'static,
{
    /// Create a new application state from pre-wrapped `Arc` services.
    ///
    /// The scheduler is shared with the background polling loop, hence the
    /// `Arc` arguments.
    pub fn from_arcs(
        slot_service: Arc<SlotService<R, P>>,
        scheduler: Arc<Scheduler<R, P, ES, X, G, N>>,
        event_store: Arc<ES>,
        event_bus: Arc<InProcessEventBus>,
    ) -> Self {
        Self {
            slot_service,
            scheduler,
            event_store,
            event_bus,
        }
    }
}
