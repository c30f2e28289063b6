//! In-memory port fakes shared by the unit tests of this crate.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::future::Future;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use geoslot_domain::error::{ActionError, GeoSlotError, NotFoundError, NotificationError};
use geoslot_domain::event::Event;
use geoslot_domain::id::{EventId, SlotId};
use geoslot_domain::permission::PermissionKind;
use geoslot_domain::slot::{AutomationAction, Slot, TimeWindow};

use crate::ports::{ActionExecutor, EventStore, NotificationScheduler, PermissionGate, SlotRepository};

/// Slot centered on (10, 10), 50 m radius, 09:00-10:00 every day, one DND action.
pub fn sample_slot() -> Slot {
    Slot::builder()
        .center(10.0, 10.0)
        .radius_meters(50.0)
        .window(
            TimeWindow::new(
                NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            )
            .unwrap(),
        )
        .action(AutomationAction::SetDnd { enabled: true })
        .build()
        .unwrap()
}

fn missing(id: SlotId) -> GeoSlotError {
    NotFoundError {
        entity: "Slot",
        id: id.to_string(),
    }
    .into()
}

fn unavailable() -> GeoSlotError {
    GeoSlotError::Storage("store offline".into())
}

#[derive(Default)]
pub struct InMemorySlotRepo {
    store: Mutex<HashMap<SlotId, Slot>>,
    offline: AtomicBool,
    failing_membership: Mutex<HashSet<SlotId>>,
    failing_lock: Mutex<HashSet<SlotId>>,
}

impl InMemorySlotRepo {
    pub fn with(slots: impl IntoIterator<Item = Slot>) -> Self {
        let repo = Self::default();
        {
            let mut store = repo.store.lock().unwrap();
            for slot in slots {
                store.insert(slot.id, slot);
            }
        }
        repo
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make `set_inside_geofence` fail for this slot only.
    pub fn fail_membership_writes(&self, id: SlotId) {
        self.failing_membership.lock().unwrap().insert(id);
    }

    /// Make `set_last_executed_day` fail for this slot only.
    pub fn fail_lock_writes(&self, id: SlotId) {
        self.failing_lock.lock().unwrap().insert(id);
    }

    pub fn snapshot(&self, id: SlotId) -> Slot {
        self.store.lock().unwrap().get(&id).cloned().unwrap()
    }

    fn check(&self) -> Result<(), GeoSlotError> {
        if self.offline.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            Ok(())
        }
    }

    fn mutate(&self, id: SlotId, f: impl FnOnce(&mut Slot)) -> Result<(), GeoSlotError> {
        self.check()?;
        let mut store = self.store.lock().unwrap();
        let slot = store.get_mut(&id).ok_or_else(|| missing(id))?;
        f(slot);
        Ok(())
    }
}

impl SlotRepository for InMemorySlotRepo {
    fn create(&self, slot: Slot) -> impl Future<Output = Result<Slot, GeoSlotError>> + Send {
        let result = self.check().map(|()| {
            self.store.lock().unwrap().insert(slot.id, slot.clone());
            slot
        });
        async { result }
    }

    fn get_by_id(
        &self,
        id: SlotId,
    ) -> impl Future<Output = Result<Option<Slot>, GeoSlotError>> + Send {
        let result = self
            .check()
            .map(|()| self.store.lock().unwrap().get(&id).cloned());
        async { result }
    }

    fn get_all(&self) -> impl Future<Output = Result<Vec<Slot>, GeoSlotError>> + Send {
        let result = self
            .check()
            .map(|()| self.store.lock().unwrap().values().cloned().collect());
        async { result }
    }

    fn get_enabled(&self) -> impl Future<Output = Result<Vec<Slot>, GeoSlotError>> + Send {
        let result = self.check().map(|()| {
            self.store
                .lock()
                .unwrap()
                .values()
                .filter(|s| s.enabled)
                .cloned()
                .collect()
        });
        async { result }
    }

    fn update(&self, slot: Slot) -> impl Future<Output = Result<Slot, GeoSlotError>> + Send {
        let id = slot.id;
        let result = self
            .mutate(id, |stored| {
                let inside = stored.is_inside_geofence;
                let day = stored.last_executed_day;
                *stored = slot;
                stored.is_inside_geofence = inside;
                stored.last_executed_day = day;
            })
            .map(|()| self.snapshot(id));
        async { result }
    }

    fn delete(&self, id: SlotId) -> impl Future<Output = Result<(), GeoSlotError>> + Send {
        let result = self.check().and_then(|()| {
            self.store
                .lock()
                .unwrap()
                .remove(&id)
                .map(|_| ())
                .ok_or_else(|| missing(id))
        });
        async { result }
    }

    fn set_inside_geofence(
        &self,
        id: SlotId,
        inside: bool,
    ) -> impl Future<Output = Result<(), GeoSlotError>> + Send {
        let result = if self.failing_membership.lock().unwrap().contains(&id) {
            Err(unavailable())
        } else {
            self.mutate(id, |slot| slot.is_inside_geofence = inside)
        };
        async { result }
    }

    fn set_last_executed_day(
        &self,
        id: SlotId,
        day: NaiveDate,
    ) -> impl Future<Output = Result<(), GeoSlotError>> + Send {
        let result = if self.failing_lock.lock().unwrap().contains(&id) {
            Err(unavailable())
        } else {
            self.mutate(id, |slot| slot.last_executed_day = Some(day))
        };
        async { result }
    }

    fn set_enabled(
        &self,
        id: SlotId,
        enabled: bool,
    ) -> impl Future<Output = Result<(), GeoSlotError>> + Send {
        let result = self.mutate(id, |slot| slot.enabled = enabled);
        async { result }
    }
}

#[derive(Default)]
pub struct InMemoryEventStore {
    events: Mutex<Vec<Event>>,
}

impl InMemoryEventStore {
    pub fn all(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl EventStore for InMemoryEventStore {
    fn store(&self, event: Event) -> impl Future<Output = Result<Event, GeoSlotError>> + Send {
        self.events.lock().unwrap().push(event.clone());
        async { Ok(event) }
    }

    fn get_by_id(
        &self,
        id: EventId,
    ) -> impl Future<Output = Result<Option<Event>, GeoSlotError>> + Send {
        let found = self
            .events
            .lock()
            .unwrap()
            .iter()
            .find(|e| e.id == id)
            .cloned();
        async { Ok(found) }
    }

    fn get_recent(
        &self,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Event>, GeoSlotError>> + Send {
        let recent: Vec<Event> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .rev()
            .take(limit)
            .cloned()
            .collect();
        async { Ok(recent) }
    }

    fn find_by_slot(
        &self,
        slot_id: SlotId,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<Event>, GeoSlotError>> + Send {
        let found: Vec<Event> = self
            .events
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|e| e.slot_id == Some(slot_id))
            .take(limit)
            .cloned()
            .collect();
        async { Ok(found) }
    }
}

/// Counts runs; can be told to fail or to take a while.
#[derive(Default)]
pub struct RecordingExecutor {
    runs: AtomicUsize,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
}

impl RecordingExecutor {
    pub fn runs(&self) -> usize {
        self.runs.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }
}

impl ActionExecutor for RecordingExecutor {
    fn run(
        &self,
        actions: &[AutomationAction],
    ) -> impl Future<Output = Result<(), ActionError>> + Send {
        let failing = self.failing.load(Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        let first = actions.first().map(ToString::to_string).unwrap_or_default();
        async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.runs.fetch_add(1, Ordering::SeqCst);
            if failing {
                Err(ActionError::Failed {
                    action: first,
                    reason: "device refused".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }
}

/// Grants whatever set it holds; everything by default.
pub struct FakeGate {
    granted: Mutex<BTreeSet<PermissionKind>>,
}

impl Default for FakeGate {
    fn default() -> Self {
        Self {
            granted: Mutex::new(
                [
                    PermissionKind::WriteSettings,
                    PermissionKind::DndAccess,
                    PermissionKind::SendSms,
                ]
                .into_iter()
                .collect(),
            ),
        }
    }
}

impl FakeGate {
    pub fn revoke(&self, kind: PermissionKind) {
        self.granted.lock().unwrap().remove(&kind);
    }

    pub fn grant(&self, kind: PermissionKind) {
        self.granted.lock().unwrap().insert(kind);
    }
}

impl PermissionGate for FakeGate {
    fn missing_permissions(&self, actions: &[AutomationAction]) -> BTreeSet<PermissionKind> {
        let granted = self.granted.lock().unwrap();
        actions
            .iter()
            .flat_map(|a| a.required_permissions().iter().copied())
            .filter(|kind| !granted.contains(kind))
            .collect()
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    scheduled: Mutex<Vec<(String, NaiveDateTime)>>,
}

impl RecordingNotifier {
    pub fn scheduled(&self) -> Vec<(String, NaiveDateTime)> {
        self.scheduled.lock().unwrap().clone()
    }
}

impl NotificationScheduler for RecordingNotifier {
    fn schedule_one_shot(
        &self,
        title: &str,
        _body: &str,
        at: NaiveDateTime,
    ) -> impl Future<Output = Result<(), NotificationError>> + Send {
        self.scheduled.lock().unwrap().push((title.to_string(), at));
        async { Ok(()) }
    }
}
