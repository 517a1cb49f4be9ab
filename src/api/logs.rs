//! Log API handlers

use crate::api::extract::ApiQuery;
use crate::error::AppError;
use crate::services::limits::resolve_limit;
use crate::state::AppState;
use crate::store::LogEntry;
use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};

/// Query parameters for listing log entries
#[derive(Debug, Default, Deserialize)]
pub struct ListLogsParams {
    /// Restrict to one employee
    pub employee_id: Option<i64>,
    /// Maximum entries to return
    pub limit: Option<String>,
}

/// Logs list response
#[derive(Debug, Serialize)]
pub struct LogsListResponse {
    /// Log entries, newest first
    pub logs: Vec<LogEntry>,
}

/// GET /logs - Recent log entries, optionally for one employee
pub async fn list_logs(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListLogsParams>,
) -> Result<Json<LogsListResponse>, AppError> {
    let max = state.config.query.max_limit;
    let limit = resolve_limit("limit", params.limit.as_deref(), max, max)?;
    let logs = state.store.recent_logs(params.employee_id, limit).await?;
    Ok(Json(LogsListResponse { logs }))
}
