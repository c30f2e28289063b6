//! Permission gate backed by a mutable grant set.

use std::collections::BTreeSet;
use std::sync::Mutex;

use geoslot_app::ports::PermissionGate;
use geoslot_domain::permission::PermissionKind;
use geoslot_domain::slot::AutomationAction;

use crate::lock;

/// Grants exactly the permissions it was given; the user "toggles" them at
/// runtime through [`grant`](Self::grant) and [`revoke`](Self::revoke).
pub struct StaticPermissionGate {
    granted: Mutex<BTreeSet<PermissionKind>>,
}

impl StaticPermissionGate {
    pub fn new(granted: impl IntoIterator<Item = PermissionKind>) -> Self {
        Self {
            granted: Mutex::new(granted.into_iter().collect()),
        }
    }

    /// A gate that grants every permission.
    #[must_use]
    pub fn all() -> Self {
        Self::new([
            PermissionKind::WriteSettings,
            PermissionKind::DndAccess,
            PermissionKind::SendSms,
        ])
    }

    pub fn grant(&self, kind: PermissionKind) {
        tracing::info!(permission = %kind, "permission granted");
        lock(&self.granted).insert(kind);
    }

    pub fn revoke(&self, kind: PermissionKind) {
        tracing::info!(permission = %kind, "permission revoked");
        lock(&self.granted).remove(&kind);
    }

    /// Replace the whole grant set, logging each change.
    pub fn replace(&self, granted: impl IntoIterator<Item = PermissionKind>) {
        let next: BTreeSet<PermissionKind> = granted.into_iter().collect();
        let mut current = lock(&self.granted);
        for kind in next.difference(&current) {
            tracing::info!(permission = %kind, "permission granted");
        }
        for kind in current.difference(&next) {
            tracing::info!(permission = %kind, "permission revoked");
        }
        *current = next;
    }

    #[must_use]
    pub fn granted(&self) -> BTreeSet<PermissionKind> {
        lock(&self.granted).clone()
    }
}

impl PermissionGate for StaticPermissionGate {
    fn missing_permissions(&self, actions: &[AutomationAction]) -> BTreeSet<PermissionKind> {
        let granted = lock(&self.granted);
        actions
            .iter()
            .flat_map(|action| action.required_permissions().iter().copied())
            .filter(|kind| !granted.contains(kind))
            .collect()
    }
}
