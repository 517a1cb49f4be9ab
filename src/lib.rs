//! ENYARD Admin API Library
//!
//! Read-only query service over the employees, screen snapshots and activity
//! logs recorded by the ENYARD capture agent. The binary in `src/main.rs`
//! serves it over HTTP.

pub mod api;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
/// Backing store access
///
/// Connection pool, schema migration and every query the service runs.
pub mod store;
