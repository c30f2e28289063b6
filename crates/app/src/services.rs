//! Application services — use-cases exposed to driving adapters.

pub mod slot_service;
