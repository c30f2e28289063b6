//! Slot scheduler — the geofence state engine.
//!
//! Each tick (a position update or a plain time tick) walks the enabled
//! slots. For every slot, inside a critical section keyed by its id, the
//! scheduler re-reads the slot, commits any membership change, decides
//! whether the slot is a firing candidate, consults the permission gate,
//! runs the actions with a bounded wait and commits the once-per-day lock.
//!
//! A slot that is inside, on an active day, within its window and not yet
//! executed today is a candidate on any tick. Entering the geofence is the
//! usual way to get there; a slot left unfired by a permission block or by
//! an early arrival becomes a candidate again on the next tick.

mod report;

pub use report::{SlotReport, TickOutcome, TickReport};

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use tokio::sync::Mutex as AsyncMutex;

use geoslot_domain::event::{Event, EventType};
use geoslot_domain::geo::GeoPoint;
use geoslot_domain::id::SlotId;
use geoslot_domain::slot::{GeofenceTransition, SkipReason, Slot};

use crate::ports::{
    ActionExecutor, EventPublisher, EventStore, NotificationScheduler, PermissionGate,
    SlotRepository,
};

/// Default bound on a single action list execution.
pub const DEFAULT_ACTION_TIMEOUT: Duration = Duration::from_secs(10);

const REMINDER_TITLE: &str = "Upcoming slot";

/// The device capabilities the scheduler drives.
pub struct DeviceCapabilities<X, G, N> {
    pub executor: X,
    pub gate: G,
    pub notifier: N,
}

/// Consumes position and time ticks and fires slots at most once per day.
pub struct SlotScheduler<R, S, P, X, G, N> {
    repo: R,
    events: S,
    publisher: P,
    device: DeviceCapabilities<X, G, N>,
    action_timeout: Duration,
    last_position: Mutex<Option<GeoPoint>>,
    slot_locks: Mutex<HashMap<SlotId, Arc<AsyncMutex<()>>>>,
    reminders: Mutex<HashSet<(SlotId, NaiveDate)>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<R, S, P, X, G, N> SlotScheduler<R, S, P, X, G, N>
where
    R: SlotRepository,
    S: EventStore,
    P: EventPublisher,
    X: ActionExecutor,
    G: PermissionGate,
    N: NotificationScheduler,
{
    /// Create a scheduler over the given store, diagnostics log, publisher
    /// and device.
    pub fn new(repo: R, events: S, publisher: P, device: DeviceCapabilities<X, G, N>) -> Self {
        Self {
            repo,
            events,
            publisher,
            device,
            action_timeout: DEFAULT_ACTION_TIMEOUT,
            last_position: Mutex::new(None),
            slot_locks: Mutex::new(HashMap::new()),
            reminders: Mutex::new(HashSet::new()),
        }
    }

    /// Set the bound on a single action list execution.
    #[must_use]
    pub fn with_action_timeout(mut self, timeout: Duration) -> Self {
        self.action_timeout = timeout;
        self
    }

    /// Last position received through [`Self::on_position_update`].
    pub fn last_position(&self) -> Option<GeoPoint> {
        *lock(&self.last_position)
    }

    /// Handle a position sample taken at local time `at`.
    pub async fn on_position_update(&self, position: GeoPoint, at: NaiveDateTime) -> TickReport {
        *lock(&self.last_position) = Some(position);
        self.tick(Some(position), at).await
    }

    /// Re-evaluate every enabled slot against the last known position.
    pub async fn on_time_tick(&self, at: NaiveDateTime) -> TickReport {
        let position = self.last_position();
        self.tick(position, at).await
    }

    async fn tick(&self, position: Option<GeoPoint>, at: NaiveDateTime) -> TickReport {
        let slots = match self.repo.get_enabled().await {
            Ok(slots) => slots,
            Err(err) => {
                tracing::warn!(error = ?err, "slot store unavailable, skipping tick");
                return TickReport::store_unavailable(at);
            }
        };
        self.prune_locks(&slots);

        let mut report = TickReport::new(at);
        for slot in &slots {
            report.slots.push(self.evaluate(slot.id, position, at).await);
        }
        report.reminders = self.schedule_reminders(&slots, at).await;
        report
    }

    #[tracing::instrument(skip(self, position), fields(slot_id = %id))]
    async fn evaluate(&self, id: SlotId, position: Option<GeoPoint>, at: NaiveDateTime) -> SlotReport {
        let slot_lock = self.slot_lock(id);
        let _guard = slot_lock.lock().await;

        let slot = match self.repo.get_by_id(id).await {
            Ok(Some(slot)) => slot,
            Ok(None) => return skipped(id, None, SkipReason::Deleted),
            Err(err) => {
                tracing::warn!(error = ?err, "could not read slot");
                return report(id, None, TickOutcome::StoreUnavailable);
            }
        };
        if !slot.enabled {
            return skipped(id, None, SkipReason::Disabled);
        }
        let Some(position) = position else {
            return skipped(id, None, SkipReason::NoPosition);
        };

        let inside = slot.contains(&position);
        let transition = GeofenceTransition::between(slot.is_inside_geofence, inside);
        if let Some(transition) = transition {
            if let Err(err) = self.repo.set_inside_geofence(id, inside).await {
                tracing::warn!(error = ?err, "could not commit geofence membership");
                return report(id, None, TickOutcome::StoreUnavailable);
            }
            tracing::info!(?transition, %position, "geofence membership changed");
            let event_type = match transition {
                GeofenceTransition::Entered => EventType::GeofenceEntered,
                GeofenceTransition::Exited => EventType::GeofenceExited,
            };
            self.record(Event::new(
                event_type,
                Some(id),
                serde_json::json!({
                    "latitude": position.latitude,
                    "longitude": position.longitude,
                    "at": at,
                }),
            ))
            .await;
        }

        let outcome = match slot.check_firing(inside, at) {
            Ok(()) => self.fire(&slot, at).await,
            Err(reason) => {
                tracing::debug!(%reason, "slot is not a firing candidate");
                TickOutcome::Skipped { reason }
            }
        };
        report(id, transition, outcome)
    }

    async fn fire(&self, slot: &Slot, at: NaiveDateTime) -> TickOutcome {
        let missing = self.device.gate.missing_permissions(&slot.actions);
        if !missing.is_empty() {
            tracing::warn!(?missing, "slot blocked by missing permissions");
            self.record(Event::new(
                EventType::PermissionBlocked,
                Some(slot.id),
                serde_json::json!({ "missing": missing }),
            ))
            .await;
            return TickOutcome::PermissionBlocked { missing };
        }

        let run = self.device.executor.run(&slot.actions);
        let failure = match tokio::time::timeout(self.action_timeout, run).await {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(err.to_string()),
            Err(_) => Some(format!(
                "actions timed out after {}ms",
                self.action_timeout.as_millis()
            )),
        };

        let today = at.date();
        if let Err(err) = self.repo.set_last_executed_day(slot.id, today).await {
            tracing::warn!(error = ?err, "could not commit execution lock");
            return TickOutcome::StoreUnavailable;
        }

        match failure {
            None => {
                tracing::info!(%today, actions = slot.actions.len(), "slot executed");
                self.record(Event::new(
                    EventType::SlotExecuted,
                    Some(slot.id),
                    serde_json::json!({ "day": today, "actions": slot.actions.len() }),
                ))
                .await;
                TickOutcome::Executed
            }
            Some(reason) => {
                tracing::warn!(%reason, "slot actions failed");
                self.record(Event::new(
                    EventType::ActionFailed,
                    Some(slot.id),
                    serde_json::json!({ "day": today, "reason": reason }),
                ))
                .await;
                TickOutcome::ExecutionFailed { reason }
            }
        }
    }

    /// Schedule today's reminder for slots whose reminder time has come but
    /// whose window has not opened yet. Each `(slot, date)` gets at most one.
    async fn schedule_reminders(&self, slots: &[Slot], at: NaiveDateTime) -> Vec<SlotId> {
        let today = at.date();
        lock(&self.reminders).retain(|(_, day)| *day >= today);

        let mut scheduled = Vec::new();
        for slot in slots {
            let Some(remind_at) = slot.reminder_at(today) else {
                continue;
            };
            if at < remind_at || at.time() >= slot.window.start {
                continue;
            }
            let key = (slot.id, today);
            let fresh = lock(&self.reminders).insert(key);
            if !fresh {
                continue;
            }

            let body = format!("Slot window {} starts soon", slot.window);
            match self
                .device
                .notifier
                .schedule_one_shot(REMINDER_TITLE, &body, remind_at)
                .await
            {
                Ok(()) => {
                    tracing::info!(slot_id = %slot.id, %remind_at, "reminder scheduled");
                    self.record(Event::new(
                        EventType::ReminderScheduled,
                        Some(slot.id),
                        serde_json::json!({ "at": remind_at }),
                    ))
                    .await;
                    scheduled.push(slot.id);
                }
                Err(err) => {
                    tracing::warn!(slot_id = %slot.id, error = %err, "could not schedule reminder");
                    lock(&self.reminders).remove(&key);
                }
            }
        }
        scheduled
    }

    async fn record(&self, event: Event) {
        if let Err(err) = self.publisher.publish(event.clone()).await {
            tracing::warn!(error = ?err, "could not publish event");
        }
        if let Err(err) = self.events.store(event).await {
            tracing::warn!(error = ?err, "could not append to diagnostics log");
        }
    }

    fn slot_lock(&self, id: SlotId) -> Arc<AsyncMutex<()>> {
        let mut locks = lock(&self.slot_locks);
        Arc::clone(locks.entry(id).or_default())
    }

    /// Drop idle locks of slots that are no longer enabled.
    fn prune_locks(&self, enabled: &[Slot]) {
        let ids: HashSet<SlotId> = enabled.iter().map(|slot| slot.id).collect();
        lock(&self.slot_locks)
            .retain(|id, slot_lock| ids.contains(id) || Arc::strong_count(slot_lock) > 1);
    }
}

fn report(slot_id: SlotId, transition: Option<GeofenceTransition>, outcome: TickOutcome) -> SlotReport {
    SlotReport {
        slot_id,
        transition,
        outcome,
    }
}

fn skipped(slot_id: SlotId, transition: Option<GeofenceTransition>, reason: SkipReason) -> SlotReport {
    report(slot_id, transition, TickOutcome::Skipped { reason })
}
