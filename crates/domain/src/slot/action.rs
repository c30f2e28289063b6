//! Action — a device operation performed when a slot fires.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::permission::PermissionKind;

/// A device operation run by the action executor when a slot fires.
///
/// The scheduler treats actions as opaque; only the executor interprets
/// them. The permission requirements are declared here so the permission
/// gate can be consulted before anything runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AutomationAction {
    /// Send a text message to one or more contacts.
    SendSms {
        message: String,
        /// Semicolon separated phone numbers.
        contacts_csv: String,
    },
    /// Set ring and media stream volumes.
    SetVolume { ring: u8, media: u8 },
    /// Set screen brightness, `0..=255`.
    SetBrightness { level: u8 },
    /// Turn do-not-disturb on or off.
    SetDnd { enabled: bool },
    SetDarkMode { enabled: bool },
    SetAutoRotate { enabled: bool },
    /// Screen timeout in milliseconds.
    SetScreenTimeout { duration_ms: u32 },
    SetNightLight { enabled: bool },
    SetKeepScreenAwake { enabled: bool },
}

impl AutomationAction {
    /// Permissions that must be granted before this action can run.
    #[must_use]
    pub fn required_permissions(&self) -> &'static [PermissionKind] {
        match self {
            Self::SendSms { .. } => &[PermissionKind::SendSms],
            Self::SetBrightness { .. }
            | Self::SetAutoRotate { .. }
            | Self::SetScreenTimeout { .. } => &[PermissionKind::WriteSettings],
            Self::SetDnd { .. } => &[PermissionKind::DndAccess],
            Self::SetVolume { .. }
            | Self::SetDarkMode { .. }
            | Self::SetNightLight { .. }
            | Self::SetKeepScreenAwake { .. } => &[],
        }
    }

    /// Check parameter invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidAction`] when an SMS has no message
    /// or no recipient, or a screen timeout is zero.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match self {
            Self::SendSms {
                message,
                contacts_csv,
            } => {
                if message.trim().is_empty() {
                    return Err(ValidationError::InvalidAction(
                        "sms message is empty".to_string(),
                    ));
                }
                if contacts(contacts_csv).next().is_none() {
                    return Err(ValidationError::InvalidAction(
                        "sms has no recipient".to_string(),
                    ));
                }
                Ok(())
            }
            Self::SetScreenTimeout { duration_ms: 0 } => Err(ValidationError::InvalidAction(
                "screen timeout must be positive".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Iterate the non-empty, trimmed phone numbers of a contact list.
pub fn contacts(contacts_csv: &str) -> impl Iterator<Item = &str> {
    contacts_csv
        .split(';')
        .map(str::trim)
        .filter(|number| !number.is_empty())
}

impl std::fmt::Display for AutomationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SendSms { contacts_csv, .. } => {
                write!(f, "send_sms({})", contacts(contacts_csv).count())
            }
            Self::SetVolume { ring, media } => write!(f, "set_volume({ring}, {media})"),
            Self::SetBrightness { level } => write!(f, "set_brightness({level})"),
            Self::SetDnd { enabled } => write!(f, "set_dnd({enabled})"),
            Self::SetDarkMode { enabled } => write!(f, "set_dark_mode({enabled})"),
            Self::SetAutoRotate { enabled } => write!(f, "set_auto_rotate({enabled})"),
            Self::SetScreenTimeout { duration_ms } => {
                write!(f, "set_screen_timeout({duration_ms}ms)")
            }
            Self::SetNightLight { enabled } => write!(f, "set_night_light({enabled})"),
            Self::SetKeepScreenAwake { enabled } => write!(f, "set_keep_screen_awake({enabled})"),
        }
    }
}
