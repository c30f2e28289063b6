//! # geoslot-domain
//!
//! Pure domain model for the geoslot slot scheduling engine.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Slots** (geofence + daily window + weekday recurrence + actions)
//! - Geofence containment on a spherical Earth
//! - Recurrence evaluation (active days, time windows, reminders)
//! - Define **Actions** and the **Permissions** they require
//! - Define **Events** (edits, transitions, firings, diagnostics)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod event;
pub mod geo;
pub mod permission;
pub mod slot;
