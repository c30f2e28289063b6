//! What a single tick did, slot by slot.

use std::collections::BTreeSet;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use geoslot_domain::id::SlotId;
use geoslot_domain::permission::PermissionKind;
use geoslot_domain::slot::{GeofenceTransition, SkipReason};

/// Result of evaluating one slot on one tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TickOutcome {
    /// Not a firing candidate.
    Skipped { reason: SkipReason },
    /// A firing candidate held back; the lock was not consumed.
    PermissionBlocked { missing: BTreeSet<PermissionKind> },
    /// Actions ran and the lock was committed.
    Executed,
    /// Actions failed or timed out; the lock was committed anyway.
    ExecutionFailed { reason: String },
    /// The store failed; nothing is assumed to have changed.
    StoreUnavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotReport {
    pub slot_id: SlotId,
    /// Membership change committed on this tick, if any.
    pub transition: Option<GeofenceTransition>,
    pub outcome: TickOutcome,
}

/// Everything a tick observed and did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    pub at: NaiveDateTime,
    /// Set when the enabled slots could not be read at all.
    pub store_unavailable: bool,
    pub slots: Vec<SlotReport>,
    /// Slots whose reminder was scheduled on this tick.
    pub reminders: Vec<SlotId>,
}

impl TickReport {
    pub(crate) fn new(at: NaiveDateTime) -> Self {
        Self {
            at,
            store_unavailable: false,
            slots: Vec::new(),
            reminders: Vec::new(),
        }
    }

    pub(crate) fn store_unavailable(at: NaiveDateTime) -> Self {
        Self {
            store_unavailable: true,
            ..Self::new(at)
        }
    }

    /// Report entry for `slot_id`, if the slot was evaluated.
    #[must_use]
    pub fn get(&self, slot_id: SlotId) -> Option<&SlotReport> {
        self.slots.iter().find(|entry| entry.slot_id == slot_id)
    }

    /// Slots that executed on this tick.
    pub fn executed(&self) -> impl Iterator<Item = SlotId> + '_ {
        self.slots
            .iter()
            .filter(|entry| entry.outcome == TickOutcome::Executed)
            .map(|entry| entry.slot_id)
    }
}
