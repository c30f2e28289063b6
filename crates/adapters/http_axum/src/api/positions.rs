//! Scheduler inputs: position samples and time ticks.
//!
//! Both answer with the [`TickReport`] of the tick they triggered. Timestamps
//! are local wall-clock times; when omitted, the server clock is used.

use axum::Json;
use axum::extract::{Query, State};
use chrono::NaiveDateTime;
use serde::Deserialize;

use geoslot_app::ports::{
    ActionExecutor, EventPublisher, EventStore, NotificationScheduler, PermissionGate,
    SlotRepository,
};
use geoslot_app::scheduler::TickReport;
use geoslot_domain::geo::GeoPoint;

use crate::state::AppState;

/// Request body for a position sample.
#[derive(Deserialize)]
pub struct PositionRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub timestamp: Option<NaiveDateTime>,
}

/// Query string of a time tick.
#[derive(Deserialize)]
pub struct TickQuery {
    pub at: Option<NaiveDateTime>,
}

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// `POST /api/positions` — feed a position sample to the scheduler.
pub async fn update<R, P, ES, X, G, N>(
    State(state): State<AppState<R, P, ES, X, G, N>>,
    Json(req): Json<PositionRequest>,
) -> Json<TickReport>
where
    R: SlotRepository + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    ES: EventStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: PermissionGate + Send + Sync + 'static,
    N: NotificationScheduler + Send + Sync + 'static,
{
    let position = GeoPoint::new(req.latitude, req.longitude);
    let at = req.timestamp.unwrap_or_else(local_now);
    Json(state.scheduler.on_position_update(position, at).await)
}

/// `POST /api/ticks` — re-evaluate slots against the last known position.
pub async fn tick<R, P, ES, X, G, N>(
    State(state): State<AppState<R, P, ES, X, G, N>>,
    Query(query): Query<TickQuery>,
) -> Json<TickReport>
where
    R: SlotRepository + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    ES: EventStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: PermissionGate + Send + Sync + 'static,
    N: NotificationScheduler + Send + Sync + 'static,
{
    let at = query.at.unwrap_or_else(local_now);
    Json(state.scheduler.on_time_tick(at).await)
}
