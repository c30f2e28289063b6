//! Reminder delivery through tokio timers.

use std::sync::{Arc, Mutex};

use chrono::NaiveDateTime;
use tokio::runtime::Handle;

use geoslot_app::ports::NotificationScheduler;
use geoslot_domain::error::NotificationError;

use crate::lock;

/// A reminder that reached the (virtual) notification shade.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredNotification {
    pub title: String,
    pub body: String,
    pub at: NaiveDateTime,
}

/// Sleeps until the requested local time, then delivers.
///
/// A time already in the past is delivered right away.
pub struct TimerNotificationScheduler {
    clock: fn() -> NaiveDateTime,
    delivered: Arc<Mutex<Vec<DeliveredNotification>>>,
}

fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

impl Default for TimerNotificationScheduler {
    fn default() -> Self {
        Self::with_clock(local_now)
    }
}

impl TimerNotificationScheduler {
    /// Use `clock` as the source of the current local time.
    #[must_use]
    pub fn with_clock(clock: fn() -> NaiveDateTime) -> Self {
        Self {
            clock,
            delivered: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Notifications delivered so far, in delivery order.
    #[must_use]
    pub fn delivered(&self) -> Vec<DeliveredNotification> {
        lock(&self.delivered).clone()
    }
}

impl NotificationScheduler for TimerNotificationScheduler {
    async fn schedule_one_shot(
        &self,
        title: &str,
        body: &str,
        at: NaiveDateTime,
    ) -> Result<(), NotificationError> {
        let handle = Handle::try_current().map_err(|err| NotificationError(err.to_string()))?;
        let delay = (at - (self.clock)()).to_std().unwrap_or_default();
        let notification = DeliveredNotification {
            title: title.to_string(),
            body: body.to_string(),
            at,
        };
        let delivered = Arc::clone(&self.delivered);

        tracing::debug!(%at, ?delay, "reminder armed");
        handle.spawn(async move {
            tokio::time::sleep(delay).await;
            tracing::info!(
                title = %notification.title,
                body = %notification.body,
                "reminder delivered"
            );
            lock(&delivered).push(notification);
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::time::Duration;

    fn fixed_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 13)
            .unwrap()
            .and_hms_opt(8, 45, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn should_deliver_past_reminder_immediately() {
        let scheduler = TimerNotificationScheduler::with_clock(fixed_now);
        let at = fixed_now() - chrono::Duration::minutes(5);

        scheduler
            .schedule_one_shot("Upcoming slot", "starts at 09:00", at)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        let delivered = scheduler.delivered();
        assert_eq!(delivered.len(), 1);
        assert_eq!(delivered[0].title, "Upcoming slot");
        assert_eq!(delivered[0].at, at);
    }

    #[tokio::test]
    async fn should_hold_future_reminder_until_due() {
        let scheduler = TimerNotificationScheduler::with_clock(fixed_now);
        let at = fixed_now() + chrono::Duration::milliseconds(150);

        scheduler.schedule_one_shot("t", "b", at).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(scheduler.delivered().is_empty());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(scheduler.delivered().len(), 1);
    }
}
