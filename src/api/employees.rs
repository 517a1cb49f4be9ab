//! Employee API handlers
//!
//! Directory listing and the per-employee detail view.

use crate::api::extract::{ApiPath, ApiQuery};
use crate::error::AppError;
use crate::services::limits::resolve_limit;
use crate::services::{DetailService, DirectoryService, EmployeeDetail};
use crate::state::AppState;
use crate::store::Employee;
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};

/// Employees list response
#[derive(Debug, Serialize)]
pub struct EmployeesListResponse {
    /// All known employees
    pub employees: Vec<Employee>,
}

/// Query parameters for the detail view
///
/// Kept raw so a non-integer limit is reported as an invalid limit.
#[derive(Debug, Default, Deserialize)]
pub struct DetailParams {
    /// Maximum snapshots to return
    pub snaps_limit: Option<String>,
    /// Maximum log entries to return
    pub logs_limit: Option<String>,
}

/// GET /employees - List all employees
pub async fn list_employees(
    State(state): State<AppState>,
) -> Result<Json<EmployeesListResponse>, AppError> {
    let employees = DirectoryService::list_employees(&state.store).await?;
    Ok(Json(EmployeesListResponse { employees }))
}

/// GET /employees/:employee_id - Recent snapshots and logs for one employee
pub async fn get_employee(
    State(state): State<AppState>,
    ApiPath(employee_id): ApiPath<i64>,
    ApiQuery(params): ApiQuery<DetailParams>,
) -> Result<Json<EmployeeDetail>, AppError> {
    let policy = &state.config.query;
    let snapshot_limit = resolve_limit(
        "snaps_limit",
        params.snaps_limit.as_deref(),
        policy.default_snaps_limit,
        policy.max_limit,
    )?;
    let log_limit = resolve_limit(
        "logs_limit",
        params.logs_limit.as_deref(),
        policy.default_logs_limit,
        policy.max_limit,
    )?;
    let detail = DetailService::employee_detail(
        &state.store,
        employee_id,
        snapshot_limit,
        log_limit,
        policy,
    )
    .await?;
    Ok(Json(detail))
}
