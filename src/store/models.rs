//! Store data models
//!
//! Rows as the capture agent writes them. Timestamps are stored as Unix
//! seconds and serialized as RFC 3339 UTC strings.

use serde::Serialize;
use sqlx::FromRow;

/// A monitored employee
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Employee {
    /// Unique identifier assigned by the store
    pub id: i64,
    /// Display name as entered
    pub employee_name: String,
    /// Filesystem-safe form of the name
    pub safe_name: String,
    /// Where the agent writes this employee's artifacts
    pub folder_path: String,
    /// When the agent first saw this employee
    #[serde(with = "unix_rfc3339")]
    pub created_at: i64,
}

/// A captured screen snapshot, without its image bytes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Snapshot {
    /// Unique identifier
    pub id: i64,
    /// Owning employee
    pub employee_id: i64,
    /// Title of the active window at capture time
    pub window_title: String,
    /// Capture time
    #[serde(with = "unix_rfc3339")]
    pub captured_at: i64,
}

/// A log line emitted by the capture agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct LogEntry {
    /// Unique identifier
    pub id: i64,
    /// Owning employee
    pub employee_id: i64,
    /// Severity label (info, warning, error, ...)
    pub level: String,
    /// Message text
    pub message: String,
    /// Emission time
    #[serde(with = "unix_rfc3339")]
    pub created_at: i64,
}

/// Where a snapshot's bytes live. Never serialized to clients.
#[derive(Debug, Clone, FromRow)]
pub struct ArtifactRecord {
    /// Snapshot identifier
    pub id: i64,
    /// Path of a file-backed artifact
    pub filepath: Option<String>,
    /// Inline image bytes
    pub image_blob: Option<Vec<u8>>,
    /// Content type recorded by the agent, if any
    pub mime_type: Option<String>,
}

mod unix_rfc3339 {
    use chrono::{DateTime, SecondsFormat};
    use serde::Serializer;

    pub fn serialize<S: Serializer>(ts: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        match DateTime::from_timestamp(*ts, 0) {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
            None => serializer.serialize_i64(*ts),
        }
    }
}
