//! JSON REST handlers for slots.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use geoslot_app::ports::{
    ActionExecutor, EventPublisher, EventStore, NotificationScheduler, PermissionGate,
    SlotRepository,
};
use geoslot_domain::error::GeoSlotError;
use geoslot_domain::id::SlotId;
use geoslot_domain::slot::{ActiveDays, AutomationAction, Slot, TimeWindow};

use crate::api::parse_slot_id;
use crate::error::ApiError;
use crate::state::AppState;

/// Request body for creating or replacing a slot.
///
/// The window is given as milliseconds since midnight.
#[derive(Deserialize)]
pub struct SlotRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_meters: f64,
    pub start_millis: i64,
    pub end_millis: i64,
    #[serde(default)]
    pub remind_before_minutes: u32,
    pub actions: Vec<AutomationAction>,
    pub enabled: Option<bool>,
    #[serde(default)]
    pub active_days: ActiveDays,
}

impl SlotRequest {
    fn into_slot(self, id: SlotId, enabled_by_default: bool) -> Result<Slot, GeoSlotError> {
        let window = TimeWindow::from_millis(self.start_millis, self.end_millis)?;
        let mut builder = Slot::builder()
            .id(id)
            .center(self.latitude, self.longitude)
            .radius_meters(self.radius_meters)
            .window(window)
            .remind_before_minutes(self.remind_before_minutes)
            .enabled(self.enabled.unwrap_or(enabled_by_default))
            .active_days(self.active_days);
        for action in self.actions {
            builder = builder.action(action);
        }
        builder.build()
    }
}

/// Query string of the list endpoint.
#[derive(Deserialize)]
pub struct ListQuery {
    /// Only return enabled slots when `true`.
    #[serde(default)]
    pub enabled: bool,
}

/// Request body for enabling or disabling a slot.
#[derive(Deserialize)]
pub struct SetEnabledRequest {
    pub enabled: bool,
}

/// Possible responses from the list endpoint.
pub enum ListResponse {
    Ok(Json<Vec<Slot>>),
}

impl IntoResponse for ListResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the get and update endpoints.
pub enum GetResponse {
    Ok(Json<Slot>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Possible responses from the create endpoint.
pub enum CreateResponse {
    Created(Json<Slot>),
}

impl IntoResponse for CreateResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/slots[?enabled=true]` — snapshot of the slots.
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
    let slots = if query.enabled {
        state.slot_service.list_enabled().await?
    } else {
        state.slot_service.list_slots().await?
    };
    Ok(ListResponse::Ok(Json(slots)))
}

/// `GET /api/slots/{id}` — get a slot by ID.
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
    let slot_id = parse_slot_id(&id)?;
    let slot = state.slot_service.get_slot(slot_id).await?;
    Ok(GetResponse::Ok(Json(slot)))
}

/// `POST /api/slots` — create a new slot.
pub async fn create<R, P, ES, X, G, N>(
    State(state): State<AppState<R, P, ES, X, G, N>>,
    Json(req): Json<SlotRequest>,
) -> Result<CreateResponse, ApiError>
where
    R: SlotRepository + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    ES: EventStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: PermissionGate + Send + Sync + 'static,
    N: NotificationScheduler + Send + Sync + 'static,
{
    let slot = req.into_slot(SlotId::new(), true)?;
    let created = state.slot_service.create_slot(slot).await?;
    Ok(CreateResponse::Created(Json(created)))
}

/// `PUT /api/slots/{id}` — replace the configuration of a slot.
///
/// Leaving `enabled` out keeps the current flag.
pub async fn update<R, P, ES, X, G, N>(
    State(state): State<AppState<R, P, ES, X, G, N>>,
    Path(id): Path<String>,
    Json(req): Json<SlotRequest>,
) -> Result<GetResponse, ApiError>
where
    R: SlotRepository + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    ES: EventStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: PermissionGate + Send + Sync + 'static,
    N: NotificationScheduler + Send + Sync + 'static,
{
    let slot_id = parse_slot_id(&id)?;
    let current = state.slot_service.get_slot(slot_id).await?;
    let slot = req.into_slot(slot_id, current.enabled)?;
    let updated = state.slot_service.update_slot(slot).await?;
    Ok(GetResponse::Ok(Json(updated)))
}

/// `PUT /api/slots/{id}/enabled` — enable or disable a slot.
pub async fn set_enabled<R, P, ES, X, G, N>(
    State(state): State<AppState<R, P, ES, X, G, N>>,
    Path(id): Path<String>,
    Json(req): Json<SetEnabledRequest>,
) -> Result<GetResponse, ApiError>
where
    R: SlotRepository + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    ES: EventStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: PermissionGate + Send + Sync + 'static,
    N: NotificationScheduler + Send + Sync + 'static,
{
    let slot_id = parse_slot_id(&id)?;
    let slot = state.slot_service.set_enabled(slot_id, req.enabled).await?;
    Ok(GetResponse::Ok(Json(slot)))
}

/// `DELETE /api/slots/{id}` — delete a slot.
pub async fn delete<R, P, ES, X, G, N>(
    State(state): State<AppState<R, P, ES, X, G, N>>,
    Path(id): Path<String>,
) -> Result<DeleteResponse, ApiError>
where
    R: SlotRepository + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    ES: EventStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: PermissionGate + Send + Sync + 'static,
    N: NotificationScheduler + Send + Sync + 'static,
{
    let slot_id = parse_slot_id(&id)?;
    state.slot_service.delete_slot(slot_id).await?;
    Ok(DeleteResponse::NoContent)
}
