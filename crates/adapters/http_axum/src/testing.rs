//! In-memory stubs and request helpers for the handler tests.

use std::collections::{BTreeSet, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use chrono::{NaiveDate, NaiveDateTime};
use http_body_util::BodyExt;
use tower::ServiceExt;

use geoslot_app::event_bus::InProcessEventBus;
use geoslot_app::ports::{
    ActionExecutor, EventStore, NotificationScheduler, PermissionGate, SlotRepository,
};
use geoslot_app::scheduler::{DeviceCapabilities, SlotScheduler};
use geoslot_app::services::slot_service::SlotService;
use geoslot_domain::error::{ActionError, GeoSlotError, NotFoundError, NotificationError};
use geoslot_domain::event::Event;
use geoslot_domain::id::{EventId, SlotId};
use geoslot_domain::permission::PermissionKind;
use geoslot_domain::slot::{AutomationAction, Slot};

use crate::state::AppState;

fn missing(id: SlotId) -> GeoSlotError {
    NotFoundError {
        entity: "Slot",
        id: id.to_string(),
    }
    .into()
}

#[derive(Default)]
pub struct StubSlotRepo(Mutex<HashMap<SlotId, Slot>>);

impl StubSlotRepo {
    fn mutate(&self, id: SlotId, f: impl FnOnce(&mut Slot)) -> Result<(), GeoSlotError> {
        let mut slots = self.0.lock().unwrap();
        let slot = slots.get_mut(&id).ok_or_else(|| missing(id))?;
        f(slot);
        Ok(())
    }
}

impl SlotRepository for StubSlotRepo {
    async fn create(&self, slot: Slot) -> Result<Slot, GeoSlotError> {
        self.0.lock().unwrap().insert(slot.id, slot.clone());
        Ok(slot)
    }
    async fn get_by_id(&self, id: SlotId) -> Result<Option<Slot>, GeoSlotError> {
        Ok(self.0.lock().unwrap().get(&id).cloned())
    }
    async fn get_all(&self) -> Result<Vec<Slot>, GeoSlotError> {
        Ok(self.0.lock().unwrap().values().cloned().collect())
    }
    async fn get_enabled(&self) -> Result<Vec<Slot>, GeoSlotError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.enabled)
            .cloned()
            .collect())
    }
    async fn update(&self, slot: Slot) -> Result<Slot, GeoSlotError> {
        let id = slot.id;
        self.mutate(id, |stored| {
            let inside = stored.is_inside_geofence;
            let day = stored.last_executed_day;
            *stored = slot;
            stored.is_inside_geofence = inside;
            stored.last_executed_day = day;
        })?;
        Ok(self.0.lock().unwrap()[&id].clone())
    }
    async fn delete(&self, id: SlotId) -> Result<(), GeoSlotError> {
        self.0
            .lock()
            .unwrap()
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| missing(id))
    }
    async fn set_inside_geofence(&self, id: SlotId, inside: bool) -> Result<(), GeoSlotError> {
        self.mutate(id, |slot| slot.is_inside_geofence = inside)
    }
    async fn set_last_executed_day(&self, id: SlotId, day: NaiveDate) -> Result<(), GeoSlotError> {
        self.mutate(id, |slot| slot.last_executed_day = Some(day))
    }
    async fn set_enabled(&self, id: SlotId, enabled: bool) -> Result<(), GeoSlotError> {
        self.mutate(id, |slot| slot.enabled = enabled)
    }
}

/// Keeps events in insertion order and lists them newest first.
#[derive(Default)]
pub struct StubEventStore(Mutex<Vec<Event>>);

impl EventStore for StubEventStore {
    async fn store(&self, event: Event) -> Result<Event, GeoSlotError> {
        self.0.lock().unwrap().push(event.clone());
        Ok(event)
    }
    async fn get_by_id(&self, id: EventId) -> Result<Option<Event>, GeoSlotError> {
        Ok(self.0.lock().unwrap().iter().find(|e| e.id == id).cloned())
    }
    async fn get_recent(&self, limit: usize) -> Result<Vec<Event>, GeoSlotError> {
        Ok(self.0.lock().unwrap().iter().rev().take(limit).cloned().collect())
    }
    async fn find_by_slot(&self, slot_id: SlotId, limit: usize) -> Result<Vec<Event>, GeoSlotError> {
        Ok(self
            .0
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|e| e.slot_id == Some(slot_id))
            .take(limit)
            .cloned()
            .collect())
    }
}

/// Counts action list runs; always succeeds.
#[derive(Default)]
pub struct StubDevice(AtomicUsize);

impl StubDevice {
    pub fn runs(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl ActionExecutor for StubDevice {
    async fn run(&self, _actions: &[AutomationAction]) -> Result<(), ActionError> {
        self.0.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl PermissionGate for StubDevice {
    fn missing_permissions(&self, _actions: &[AutomationAction]) -> BTreeSet<PermissionKind> {
        BTreeSet::new()
    }
}

impl NotificationScheduler for StubDevice {
    async fn schedule_one_shot(
        &self,
        _title: &str,
        _body: &str,
        _at: NaiveDateTime,
    ) -> Result<(), NotificationError> {
        Ok(())
    }
}

pub type TestState = AppState<
    Arc<StubSlotRepo>,
    Arc<InProcessEventBus>,
    StubEventStore,
    Arc<StubDevice>,
    Arc<StubDevice>,
    Arc<StubDevice>,
>;

pub fn test_state() -> (TestState, Arc<StubDevice>) {
    let repo = Arc::new(StubSlotRepo::default());
    let event_bus = Arc::new(InProcessEventBus::new(16));
    let event_store = Arc::new(StubEventStore::default());
    let device = Arc::new(StubDevice::default());

    let slot_service = SlotService::new(Arc::clone(&repo), Arc::clone(&event_bus));
    let scheduler = SlotScheduler::new(
        repo,
        Arc::clone(&event_store),
        Arc::clone(&event_bus),
        DeviceCapabilities {
            executor: Arc::clone(&device),
            gate: Arc::clone(&device),
            notifier: Arc::clone(&device),
        },
    );

    let state = AppState::from_arcs(
        Arc::new(slot_service),
        Arc::new(scheduler),
        event_store,
        event_bus,
    );
    (state, device)
}

pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
