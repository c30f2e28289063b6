//! JSON REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod events;
#[allow(clippy::missing_errors_doc)]
pub mod positions;
#[allow(clippy::missing_errors_doc)]
pub mod slots;
pub mod sse;

use std::str::FromStr;

use axum::Router;
use axum::routing::{get, post, put};

use geoslot_app::ports::{
    ActionExecutor, EventPublisher, EventStore, NotificationScheduler, PermissionGate,
    SlotRepository,
};
use geoslot_domain::id::{EventId, SlotId};

use crate::error::ApiError;
use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes<R, P, ES, X, G, N>() -> Router<AppState<R, P, ES, X, G, N>>
where
    R: SlotRepository + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    ES: EventStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: PermissionGate + Send + Sync + 'static,
    N: NotificationScheduler + Send + Sync + 'static,
{
    Router::new()
        // Slots
        .route(
            "/slots",
            get(slots::list::<R, P, ES, X, G, N>).post(slots::create::<R, P, ES, X, G, N>),
        )
        .route(
            "/slots/{id}",
            get(slots::get::<R, P, ES, X, G, N>)
                .put(slots::update::<R, P, ES, X, G, N>)
                .delete(slots::delete::<R, P, ES, X, G, N>),
        )
        .route(
            "/slots/{id}/enabled",
            put(slots::set_enabled::<R, P, ES, X, G, N>),
        )
        .route(
            "/slots/{id}/events",
            get(events::list_for_slot::<R, P, ES, X, G, N>),
        )
        // Scheduler inputs
        .route(
            "/positions",
            post(positions::update::<R, P, ES, X, G, N>),
        )
        .route("/ticks", post(positions::tick::<R, P, ES, X, G, N>))
        // Diagnostics
        .route("/events", get(events::list::<R, P, ES, X, G, N>))
        .route("/events/stream", get(sse::stream::<R, P, ES, X, G, N>))
        .route("/events/{id}", get(events::get::<R, P, ES, X, G, N>))
}

pub(crate) fn parse_slot_id(raw: &str) -> Result<SlotId, ApiError> {
    SlotId::from_str(raw).map_err(|_| ApiError::invalid_id("slot", raw))
}

pub(crate) fn parse_event_id(raw: &str) -> Result<EventId, ApiError> {
    EventId::from_str(raw).map_err(|_| ApiError::invalid_id("event", raw))
}
