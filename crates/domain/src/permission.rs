//! System permissions that actions may require before they can run.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A system capability the user must grant for some actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionKind {
    /// Modify system settings (brightness, rotation, screen timeout).
    WriteSettings,
    /// Change the do-not-disturb policy.
    DndAccess,
    /// Send text messages.
    SendSms,
}

impl PermissionKind {
    /// Stable string form, used for configuration and storage.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WriteSettings => "write_settings",
            Self::DndAccess => "dnd_access",
            Self::SendSms => "send_sms",
        }
    }
}

impl std::fmt::Display for PermissionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown permission name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission {0:?}")]
pub struct UnknownPermission(pub String);

impl FromStr for PermissionKind {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "write_settings" => Ok(Self::WriteSettings),
            "dnd_access" => Ok(Self::DndAccess),
            "send_sms" => Ok(Self::SendSms),
            other => Err(UnknownPermission(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_parse_what_it_displays() {
        for kind in [
            PermissionKind::WriteSettings,
            PermissionKind::DndAccess,
            PermissionKind::SendSms,
        ] {
            assert_eq!(kind.to_string().parse::<PermissionKind>().unwrap(), kind);
        }
    }

    #[test]
    fn should_reject_unknown_permission() {
        assert_eq!(
            "camera".parse::<PermissionKind>(),
            Err(UnknownPermission("camera".to_string()))
        );
    }

    #[test]
    fn should_serialize_as_snake_case() {
        let json = serde_json::to_string(&PermissionKind::DndAccess).unwrap();
        assert_eq!(json, "\"dnd_access\"");
    }
}
