//! Employee detail service
//!
//! Builds the bounded, recency-ordered view of one employee's snapshots and
//! log entries.

use crate::config::QueryConfig;
use crate::error::AppError;
use crate::services::limits::validate_limit;
use crate::store::{Employee, LogEntry, Snapshot, Store};
use serde::Serialize;
use tracing::debug;

/// Detail view for one employee
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmployeeDetail {
    /// The employee record; `null` when the identifier is unknown
    pub employee: Option<Employee>,
    /// At most `snaps_limit` snapshots, newest first
    pub snapshots: Vec<Snapshot>,
    /// At most `logs_limit` log entries, newest first
    pub logs: Vec<LogEntry>,
}

/// Employee detail service
pub struct DetailService;

impl DetailService {
    /// Get an employee's most recent snapshots and log entries
    ///
    /// # Arguments
    /// * `store` - Backing store
    /// * `employee_id` - Employee to describe
    /// * `snapshot_limit` - Upper bound on returned snapshots
    /// * `log_limit` - Upper bound on returned log entries
    /// * `policy` - Limit ceiling and unknown-employee handling
    ///
    /// # Returns
    /// * `Ok(EmployeeDetail)` - Empty lists for an unknown employee unless
    ///   `policy.strict_employee_lookup` is set
    /// * `Err(AppError::InvalidLimit)` - A limit is outside `1..=policy.max_limit`
    /// * `Err(AppError::EmployeeNotFound)` - Unknown employee under strict lookup
    /// * `Err(AppError::StoreUnavailable)` - Store unreachable or timed out
    pub async fn employee_detail(
        store: &Store,
        employee_id: i64,
        snapshot_limit: i64,
        log_limit: i64,
        policy: &QueryConfig,
    ) -> Result<EmployeeDetail, AppError> {
        let snapshot_limit = validate_limit("snaps_limit", snapshot_limit, policy.max_limit)?;
        let log_limit = validate_limit("logs_limit", log_limit, policy.max_limit)?;

        let activity = store
            .employee_activity(employee_id, snapshot_limit, log_limit)
            .await?;

        if activity.employee.is_none() && policy.strict_employee_lookup {
            return Err(AppError::EmployeeNotFound(employee_id.to_string()));
        }

        debug!(
            employee_id,
            known = activity.employee.is_some(),
            snapshots = activity.snapshots.len(),
            logs = activity.logs.len(),
            "Loaded employee detail"
        );

        Ok(EmployeeDetail {
            employee: activity.employee,
            snapshots: activity.snapshots,
            logs: activity.logs,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::store::testing::{seed_employee, seed_log, seed_snapshot, temp_store};

    fn policy() -> QueryConfig {
        Config::default().query
    }

    #[tokio::test]
    async fn test_sixty_snapshots_five_logs() {
        let (store, _temp_dir) = temp_store().await;
        let emp = seed_employee(&store, "Grace Hopper", "grace_hopper").await;
        for i in 0..60 {
            seed_snapshot(&store, emp, &format!("window {}", i), 10_000 + i).await;
        }
        for i in 0..5 {
            seed_log(&store, emp, "info", &format!("log {}", i), 20_000 + i).await;
        }

        let detail = DetailService::employee_detail(&store, emp, 50, 50, &policy())
            .await
            .unwrap();
        assert_eq!(detail.snapshots.len(), 50);
        assert_eq!(detail.logs.len(), 5);

        // The 50 most recent: captured_at 10_059 down to 10_010
        assert_eq!(detail.snapshots.first().unwrap().captured_at, 10_059);
        assert_eq!(detail.snapshots.last().unwrap().captured_at, 10_010);
        assert!(detail
            .snapshots
            .windows(2)
            .all(|w| w[0].captured_at >= w[1].captured_at));
    }

    #[tokio::test]
    async fn test_tested_default_limits() {
        let (store, _temp_dir) = temp_store().await;
        let emp = seed_employee(&store, "Linus", "linus").await;
        for i in 0..120 {
            seed_snapshot(&store, emp, "w", i).await;
        }
        for i in 0..60 {
            seed_log(&store, emp, "warning", "m", i).await;
        }

        for (snaps, logs) in [(10, 10), (25, 25), (50, 50), (100, 50)] {
            let detail = DetailService::employee_detail(&store, emp, snaps, logs, &policy())
                .await
                .unwrap();
            assert_eq!(detail.snapshots.len() as i64, snaps);
            assert_eq!(detail.logs.len() as i64, logs);
        }
    }

    #[tokio::test]
    async fn test_employee_without_snapshots() {
        let (store, _temp_dir) = temp_store().await;
        let emp = seed_employee(&store, "Quiet", "quiet").await;
        let detail = DetailService::employee_detail(&store, emp, 10, 10, &policy())
            .await
            .unwrap();
        assert!(detail.employee.is_some());
        assert!(detail.snapshots.is_empty());
        assert!(detail.logs.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_employee_is_lenient_by_default() {
        let (store, _temp_dir) = temp_store().await;
        let detail = DetailService::employee_detail(&store, 404, 10, 10, &policy())
            .await
            .unwrap();
        assert!(detail.employee.is_none());
        assert!(detail.snapshots.is_empty());
        assert!(detail.logs.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_employee_strict() {
        let (store, _temp_dir) = temp_store().await;
        let mut policy = policy();
        policy.strict_employee_lookup = true;
        match DetailService::employee_detail(&store, 404, 10, 10, &policy).await {
            Err(AppError::EmployeeNotFound(id)) => assert_eq!(id, "404"),
            other => panic!("Expected EmployeeNotFound, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_limits_always_rejected() {
        let (store, _temp_dir) = temp_store().await;
        let emp = seed_employee(&store, "Zero", "zero").await;
        for _ in 0..3 {
            let result = DetailService::employee_detail(&store, emp, 0, 0, &policy()).await;
            assert!(matches!(result, Err(AppError::InvalidLimit(_))));
        }
    }

    #[tokio::test]
    async fn test_limit_above_ceiling_rejected() {
        let (store, _temp_dir) = temp_store().await;
        let result = DetailService::employee_detail(&store, 1, 10, 501, &policy()).await;
        match result {
            Err(AppError::InvalidLimit(msg)) => assert!(msg.contains("logs_limit")),
            other => panic!("Expected InvalidLimit, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_detail_is_idempotent() {
        let (store, _temp_dir) = temp_store().await;
        let emp = seed_employee(&store, "Repeat", "repeat").await;
        seed_snapshot(&store, emp, "a", 1).await;
        seed_log(&store, emp, "error", "boom", 2).await;

        let first = DetailService::employee_detail(&store, emp, 10, 10, &policy())
            .await
            .unwrap();
        let second = DetailService::employee_detail(&store, emp, 10, 10, &policy())
            .await
            .unwrap();
        assert_eq!(first, second);
    }
}
