//! Store module
//!
//! Read-only access to the SQLite database written by the capture agent:
//! employees, snapshots and log entries.

pub mod db;
pub mod error;
pub mod models;

pub use db::{EmployeeActivity, Store, StoreOptions};
pub use error::StoreError;
pub use models::{ArtifactRecord, Employee, LogEntry, Snapshot};

#[cfg(test)]
pub(crate) mod testing;
