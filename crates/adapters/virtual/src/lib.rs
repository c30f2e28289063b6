//! # geoslot-adapter-virtual
//!
//! Simulated device used by the daemon and for demonstration purposes.
//!
//! ## Provided capabilities
//!
//! | Type | Port | Behaviour |
//! |------|------|-----------|
//! | [`VirtualDevice`] | `ActionExecutor` | Applies actions to an in-memory settings model, keeps an SMS outbox |
//! | [`StaticPermissionGate`] | `PermissionGate` | Grants a configurable set of permissions |
//! | [`TimerNotificationScheduler`] | `NotificationScheduler` | Delivers reminders from tokio timers |
//! | [`RouteFeed`] | — | Replays a list of waypoints, one per poll |
//!
//! ## Dependency rule
//!
//! Depends on `geoslot-app` (port traits) and `geoslot-domain` only.

mod device;
mod notifications;
mod permissions;
mod route;

pub use device::{DeviceSettings, SentMessage, VirtualDevice};
pub use notifications::{DeliveredNotification, TimerNotificationScheduler};
pub use permissions::StaticPermissionGate;
pub use route::RouteFeed;

use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
