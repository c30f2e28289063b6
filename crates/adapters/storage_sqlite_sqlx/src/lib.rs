//! # geoslot-adapter-storage-sqlite-sqlx
//!
//! `SQLite` persistence adapter using [sqlx](https://docs.rs/sqlx).
//!
//! ## Responsibilities
//! - Implement the `SlotRepository` and `EventStore` ports defined in `geoslot-app`
//! - Manage `SQLite` connection pool lifecycle
//! - Run database migrations (using sqlx embedded migrations)
//! - Map between domain types and the persisted slot record layout
//!
//! ## Dependency rule
//! Depends on `geoslot-app` (for port traits) and `geoslot-domain` (for domain types).
//! The `app` and `domain` crates must never reference this adapter.

mod error;
mod event_store;
mod pool;
mod slot_repo;

pub use error::StorageError;
pub use event_store::SqliteEventStore;
pub use pool::{Config, Database};
pub use slot_repo::SqliteSlotRepository;
