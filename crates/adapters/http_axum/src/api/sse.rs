//! Server-Sent Events (SSE) stream of engine events.

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use geoslot_app::ports::{
    ActionExecutor, EventPublisher, EventStore, NotificationScheduler, PermissionGate,
    SlotRepository,
};

use crate::state::AppState;

/// `GET /api/events/stream` — live feed of slot and scheduler events.
///
/// Each domain event is sent as a JSON `data:` frame named after its event
/// type. A lagging subscriber silently misses the overwritten events.
pub async fn stream<R, P, ES, X, G, N>(
    State(state): State<AppState<R, P, ES, X, G, N>>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, std::convert::Infallible>>>
where
    R: SlotRepository + Send + Sync + 'static,
    P: EventPublisher + Send + Sync + 'static,
    ES: EventStore + Send + Sync + 'static,
    X: ActionExecutor + Send + Sync + 'static,
    G: PermissionGate + Send + Sync + 'static,
    N: NotificationScheduler + Send + Sync + 'static,
{
    let event_rx = state.event_bus.subscribe();
    let event_stream = BroadcastStream::new(event_rx).filter_map(|result| match result {
        Ok(event) => match serde_json::to_string(&event) {
            Ok(json) => Some(Ok(Event::default()
                .event(event.event_type.as_str())
                .data(json))),
            Err(err) => {
                tracing::warn!(%err, "failed to serialize event for SSE stream");
                None
            }
        },
        Err(BroadcastStreamRecvError::Lagged(n)) => {
            tracing::warn!(skipped = n, "SSE subscriber lagged, some events were dropped");
            None
        }
    });

    Sse::new(event_stream).keep_alive(KeepAlive::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_state;
    use geoslot_domain::event::{Event as DomainEvent, EventType};
    use geoslot_domain::id::SlotId;

    #[tokio::test]
    async fn should_subscribe_to_event_bus_when_stream_created() {
        let (state, _) = test_state();
        let event_bus = std::sync::Arc::clone(&state.event_bus);
        let mut rx = event_bus.subscribe();

        let _sse_response = stream(State(state)).await;

        let event = DomainEvent::new(
            EventType::GeofenceEntered,
            Some(SlotId::new()),
            serde_json::json!({}),
        );
        let event_id = event.id;
        event_bus.publish(event).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received.id, event_id);
        assert_eq!(received.event_type, EventType::GeofenceEntered);
    }
}
