//! Virtual device — applies actions to simulated system settings.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use geoslot_app::ports::ActionExecutor;
use geoslot_domain::error::ActionError;
use geoslot_domain::slot::{AutomationAction, contacts};

use crate::lock;

/// Highest volume index of the ring and media streams.
pub const MAX_VOLUME: u8 = 15;
/// Longest screen timeout the device accepts, 30 minutes.
pub const MAX_SCREEN_TIMEOUT_MS: u32 = 30 * 60 * 1000;

/// Snapshot of the simulated system settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceSettings {
    pub ring_volume: u8,
    pub media_volume: u8,
    pub brightness: u8,
    pub dnd: bool,
    pub dark_mode: bool,
    pub auto_rotate: bool,
    pub screen_timeout_ms: u32,
    pub night_light: bool,
    pub keep_screen_awake: bool,
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            ring_volume: 7,
            media_volume: 7,
            brightness: 128,
            dnd: false,
            dark_mode: false,
            auto_rotate: true,
            screen_timeout_ms: 30_000,
            night_light: false,
            keep_screen_awake: false,
        }
    }
}

/// A text message the device "sent".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub to: String,
    pub message: String,
}

/// A simulated phone that runs slot actions.
///
/// Actions are applied in order and the first rejected one aborts the
/// rest; settings changed before the failure stay changed.
pub struct VirtualDevice {
    settings: Mutex<DeviceSettings>,
    outbox: Mutex<Vec<SentMessage>>,
    available: AtomicBool,
}

impl Default for VirtualDevice {
    fn default() -> Self {
        Self {
            settings: Mutex::new(DeviceSettings::default()),
            outbox: Mutex::new(Vec::new()),
            available: AtomicBool::new(true),
        }
    }
}

impl VirtualDevice {
    /// Current settings.
    #[must_use]
    pub fn settings(&self) -> DeviceSettings {
        lock(&self.settings).clone()
    }

    /// Messages sent so far, oldest first.
    #[must_use]
    pub fn outbox(&self) -> Vec<SentMessage> {
        lock(&self.outbox).clone()
    }

    /// Simulate the device going away (or coming back).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn apply(&self, action: &AutomationAction) -> Result<(), ActionError> {
        let failed = |reason: &str| ActionError::Failed {
            action: action.to_string(),
            reason: reason.to_string(),
        };

        if let AutomationAction::SendSms {
            message,
            contacts_csv,
        } = action
        {
            let recipients: Vec<&str> = contacts(contacts_csv).collect();
            if let Some(bad) = recipients.iter().find(|number| !is_phone_number(number)) {
                return Err(failed(&format!("invalid phone number {bad:?}")));
            }
            let mut outbox = lock(&self.outbox);
            for to in recipients {
                tracing::info!(%to, "virtual sms sent");
                outbox.push(SentMessage {
                    to: to.to_string(),
                    message: message.clone(),
                });
            }
            return Ok(());
        }

        let mut settings = lock(&self.settings);
        match *action {
            AutomationAction::SetVolume { ring, media } => {
                if ring > MAX_VOLUME || media > MAX_VOLUME {
                    return Err(failed("volume out of range"));
                }
                settings.ring_volume = ring;
                settings.media_volume = media;
            }
            AutomationAction::SetBrightness { level } => settings.brightness = level,
            AutomationAction::SetDnd { enabled } => settings.dnd = enabled,
            AutomationAction::SetDarkMode { enabled } => settings.dark_mode = enabled,
            AutomationAction::SetAutoRotate { enabled } => settings.auto_rotate = enabled,
            AutomationAction::SetScreenTimeout { duration_ms } => {
                if duration_ms == 0 || duration_ms > MAX_SCREEN_TIMEOUT_MS {
                    return Err(failed("screen timeout out of range"));
                }
                settings.screen_timeout_ms = duration_ms;
            }
            AutomationAction::SetNightLight { enabled } => settings.night_light = enabled,
            AutomationAction::SetKeepScreenAwake { enabled } => {
                settings.keep_screen_awake = enabled;
            }
            AutomationAction::SendSms { .. } => {}
        }
        tracing::debug!(%action, "virtual action applied");
        Ok(())
    }
}

fn is_phone_number(raw: &str) -> bool {
    let digits = raw.strip_prefix('+').unwrap_or(raw);
    digits.len() >= 3 && digits.chars().all(|c| c.is_ascii_digit())
}

impl ActionExecutor for VirtualDevice {
    async fn run(&self, actions: &[AutomationAction]) -> Result<(), ActionError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(ActionError::Unavailable("virtual device is offline".to_string()));
        }
        for action in actions {
            self.apply(action)?;
        }
        Ok(())
    }
}
