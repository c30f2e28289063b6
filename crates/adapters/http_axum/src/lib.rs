//! # geoslot-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** for slot management (`/api/slots`, …)
//! - Accept **position updates** and **time ticks** and hand them to the
//!   scheduler, answering with the tick report
//! - Expose the **diagnostics log** (`/api/events`) and a live
//!   **Server-Sent Events** stream of engine events
//! - Map application results and errors into HTTP responses
//!
//! ## Dependency rule
//! Depends on `geoslot-app` (for port traits and services) and `geoslot-domain`
//! (for domain types used in request/response mapping). Never leaks axum types
//! into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
mod testing;
