//! JSON REST handlers for the diagnostics log.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use geoslot_app::ports::{
    ActionExecutor, EventPublisher, EventStore, NotificationScheduler, PermissionGate,
    SlotRepository,
};
use geoslot_domain::error::{GeoSlotError, NotFoundError};
use geoslot_domain::event::Event;

use crate::api::{parse_event_id, parse_slot_id};
use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_LIMIT: usize = 100;
const MAX_LIMIT: usize = 1000;

/// Query string of the list endpoints.
#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
}

impl ListQuery {
    fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)
    }
}

/// Possible responses from the list endpoints.
pub enum ListResponse {
    Ok(Json<Vec<Event>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<Event>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `GET /api/events` — most recent events, newest first.
pub async fn list<R, P, ES, X, G, N>(
    State(state): State<AppState<R, P, ES, X, G, N>>,
    Query(query): Query<ListQuery>,
) -> Result<ListResponse, ApiError>
where
    R: SlotRepository + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    ES: EventStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: PermissionGate + Send + Sync + 'static,
    N: NotificationScheduler + Send + Sync + 'static,
{
    let events = state.event_store.get_recent(query.limit()).await?;
    Ok(ListResponse::Ok(Json(events)))
}

/// `GET /api/slots/{id}/events` — events of one slot, newest first.
pub async fn list_for_slot<R, P, ES, X, G, N>(
    State(state): State<AppState<R, P, ES, X, G, N>>,
    Path(id): Path<String>,
    Query(query): Query<ListQuery>,
) -> Result<ListResponse, ApiError>
where
    R: SlotRepository + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    ES: EventStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: PermissionGate + Send + Sync + 'static,
    N: NotificationScheduler + Send + Sync + 'static,
{
    let slot_id = parse_slot_id(&id)?;
    let events = state
        .event_store
        .find_by_slot(slot_id, query.limit())
        .await?;
    Ok(ListResponse::Ok(Json(events)))
}

/// `GET /api/events/{id}` — get an event by ID.
pub async fn get<R, P, ES, X, G, N>(
    State(state): State<AppState<R, P, ES, X, G, N>>,
    Path(id): Path<String>,
) -> Result<GetResponse, ApiError>
where
    R: SlotRepository + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    ES: EventStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: PermissionGate + Send + Sync + 'static,
    N: NotificationScheduler + Send + Sync + 'static,
{
    let event_id = parse_event_id(&id)?;
    let event = state
        .event_store
        .get_by_id(event_id)
        .await?
        .ok_or_else(|| {
            ApiError::from(GeoSlotError::NotFound(NotFoundError {
                entity: "Event",
                id,
            }))
        })?;
    Ok(GetResponse::Ok(Json(event)))
}
