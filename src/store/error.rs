//! Store-specific error types
//!
//! Errors raised while talking to the backing database, classified by whether
//! a retry can help.

use thiserror::Error;

/// Errors that can occur while reading from the store
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached in time (connection, pool or timeout failure)
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    /// The store answered but the query failed
    #[error("Query failed: {0}")]
    Query(String),

    /// Schema migration could not be applied
    #[error("Migration failed: {0}")]
    Migration(String),
}

impl StoreError {
    /// Classify a sqlx error raised while running `context`
    pub fn from_sqlx(context: &str, err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
            | sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::Protocol(_) => StoreError::Unavailable(format!("{}: {}", context, err)),
            sqlx::Error::Database(db_err) if db_err.code().is_some_and(|c| is_busy_code(&c)) => {
                StoreError::Unavailable(format!("{}: {}", context, err))
            }
            _ => StoreError::Query(format!("{}: {}", context, err)),
        }
    }

    /// Whether the caller may retry the operation
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Unavailable(_))
    }
}

/// SQLITE_BUSY / SQLITE_LOCKED, including their extended codes
fn is_busy_code(code: &str) -> bool {
    const SQLITE_BUSY: i32 = 5;
    const SQLITE_LOCKED: i32 = 6;
    code.parse::<i32>()
        .map(|c| matches!(c & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_busy_and_locked_codes() {
        // Primary codes
        assert!(is_busy_code("5"));
        assert!(is_busy_code("6"));
        // SQLITE_BUSY_RECOVERY, SQLITE_BUSY_SNAPSHOT, SQLITE_LOCKED_SHAREDCACHE
        assert!(is_busy_code("261"));
        assert!(is_busy_code("517"));
        assert!(is_busy_code("262"));
        // SQLITE_CONSTRAINT_UNIQUE, SQLITE_ERROR, non-numeric
        assert!(!is_busy_code("2067"));
        assert!(!is_busy_code("1"));
        assert!(!is_busy_code("HY000"));
    }

    #[test]
    fn test_pool_timeout_is_transient() {
        let err = StoreError::from_sqlx("list employees", sqlx::Error::PoolTimedOut);
        assert!(err.is_transient());
        assert!(err.to_string().contains("list employees"));
    }

    #[test]
    fn test_row_not_found_is_not_transient() {
        let err = StoreError::from_sqlx("find snapshot", sqlx::Error::RowNotFound);
        assert!(!err.is_transient());
        match err {
            StoreError::Query(_) => {}
            other => panic!("Expected Query error, got: {:?}", other),
        }
    }
}
