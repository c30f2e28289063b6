//! # geoslot-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** that adapters must implement (driven/outbound ports):
//!   - `SlotRepository` — CRUD and the scheduler's narrow mutators for slots
//!   - `EventStore` — append & query the diagnostics log
//!   - `EventPublisher` — live event stream
//!   - `ActionExecutor`, `PermissionGate`, `NotificationScheduler` — device capabilities
//! - Define **driving/inbound ports** as use-case structs:
//!   - `SlotService` — create, edit, enable/disable, list, delete slots
//!   - `SlotScheduler` — consume position and time ticks, fire slots once per day
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `geoslot-domain` only (plus `tokio::sync` and `tokio::time`).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod event_bus;
pub mod ports;
pub mod scheduler;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;
