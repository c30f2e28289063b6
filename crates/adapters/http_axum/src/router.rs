//! Axum router assembly.

use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;

use geoslot_app::ports::{
    ActionExecutor, EventPublisher, EventStore, NotificationScheduler, PermissionGate,
    SlotRepository,
};

use crate::state::AppState;

/// Build the top-level axum [`Router`].
///
/// Serves the API under `/api` and a liveness probe at `/health`.
/// Includes a [`TraceLayer`] that logs each HTTP request/response at the
/// `DEBUG` level using the `tracing` ecosystem.
pub fn build<R, P, ES, X, G, N>(state: AppState<R, P, ES, X, G, N>) -> Router
where
    R: SlotRepository + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    ES: EventStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: PermissionGate + Send + Sync + 'static,
    N: NotificationScheduler + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health_check))
        .nest("/api", crate::api::routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{send, test_state};
    use axum::http::{Method, StatusCode};

    #[tokio::test]
    async fn should_return_ok_when_health_check_called() {
        let (state, _) = test_state();
        let app = build(state);

        let response = send(&app, Method::GET, "/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn should_return_404_for_unknown_route() {
        let (state, _) = test_state();
        let app = build(state);

        let response = send(&app, Method::GET, "/api/nope", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
