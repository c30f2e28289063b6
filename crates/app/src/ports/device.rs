//! Device capability ports — what the scheduler asks of the device.
//!
//! The scheduler never performs a device operation itself: it asks the
//! [`PermissionGate`] what is missing, hands the action list to the
//! [`ActionExecutor`], and delegates reminders to the
//! [`NotificationScheduler`].

use std::collections::BTreeSet;
use std::future::Future;

use chrono::NaiveDateTime;
use geoslot_domain::error::{ActionError, NotificationError};
use geoslot_domain::permission::PermissionKind;
use geoslot_domain::slot::AutomationAction;

/// Runs an ordered action list on the device.
pub trait ActionExecutor {
    /// Run `actions` in order, stopping at the first failure.
    fn run(
        &self,
        actions: &[AutomationAction],
    ) -> impl Future<Output = Result<(), ActionError>> + Send;
}

/// Reports which system permissions an action list still lacks.
///
/// The query has no side effects; an empty set means firing is allowed.
pub trait PermissionGate {
    fn missing_permissions(&self, actions: &[AutomationAction]) -> BTreeSet<PermissionKind>;
}

/// Delivers one-shot reminder notifications.
pub trait NotificationScheduler {
    /// Schedule a notification to be shown at `at` (local wall-clock time).
    fn schedule_one_shot(
        &self,
        title: &str,
        body: &str,
        at: NaiveDateTime,
    ) -> impl Future<Output = Result<(), NotificationError>> + Send;
}

impl<T: ActionExecutor + Send + Sync> ActionExecutor for std::sync::Arc<T> {
    fn run(
        &self,
        actions: &[AutomationAction],
    ) -> impl Future<Output = Result<(), ActionError>> + Send {
        (**self).run(actions)
    }
}

impl<T: PermissionGate> PermissionGate for std::sync::Arc<T> {
    fn missing_permissions(&self, actions: &[AutomationAction]) -> BTreeSet<PermissionKind> {
        (**self).missing_permissions(actions)
    }
}

impl<T: NotificationScheduler + Send + Sync> NotificationScheduler for std::sync::Arc<T> {
    fn schedule_one_shot(
        &self,
        title: &str,
        body: &str,
        at: NaiveDateTime,
    ) -> impl Future<Output = Result<(), NotificationError>> + Send {
        (**self).schedule_one_shot(title, body, at)
    }
}
