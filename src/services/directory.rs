//! Employee directory service

use crate::error::AppError;
use crate::store::{Employee, Store};
use tracing::debug;

/// Employee directory service
pub struct DirectoryService;

impl DirectoryService {
    /// List every known employee, ordered by identifier
    ///
    /// Fails as a whole when the store is unavailable; never returns a partial list.
    pub async fn list_employees(store: &Store) -> Result<Vec<Employee>, AppError> {
        let employees = store.list_employees().await?;
        debug!(count = employees.len(), "Listed employees");
        Ok(employees)
    }

    /// Look up an employee by filesystem-safe name
    pub async fn find_by_safe_name(store: &Store, safe_name: &str) -> Result<Employee, AppError> {
        store
            .find_employee_by_safe_name(safe_name)
            .await?
            .ok_or_else(|| AppError::EmployeeNotFound(safe_name.to_string()))
    }
}
