//! Snapshot API handlers
//!
//! Snapshot listings and raw image delivery. Listings never embed image
//! bytes; clients fetch each image by identifier.

use crate::api::extract::{ApiPath, ApiQuery};
use crate::error::AppError;
use crate::services::limits::resolve_limit;
use crate::services::{Artifact, ArtifactBody, DirectoryService};
use crate::state::AppState;
use crate::store::{Employee, Snapshot};
use axum::{
    body::Body,
    extract::State,
    http::header,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tokio_util::io::ReaderStream;

/// Query parameters for listing snapshots
#[derive(Debug, Default, Deserialize)]
pub struct ListSnapshotsParams {
    /// Restrict to one employee
    pub employee_id: Option<i64>,
    /// Maximum snapshots to return
    pub limit: Option<String>,
}

/// Query parameter for per-employee listings
#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    /// Maximum snapshots to return
    pub limit: Option<String>,
}

/// Query parameters for `/download`
#[derive(Debug, Default, Deserialize)]
pub struct DownloadParams {
    /// Snapshot to download (preferred)
    pub snapshot_id: Option<i64>,
    /// File path under the snapshot root
    pub filepath: Option<String>,
}

/// Snapshots list response
#[derive(Debug, Serialize)]
pub struct SnapshotsListResponse {
    /// Snapshots, newest first
    pub snapshots: Vec<Snapshot>,
}

/// Snapshots for one employee, looked up by safe name
#[derive(Debug, Serialize)]
pub struct EmployeeSnapshotsResponse {
    /// The employee
    pub employee: Employee,
    /// Their snapshots, newest first
    pub snapshots: Vec<Snapshot>,
}

/// GET /snapshots - Recent snapshots, optionally for one employee
pub async fn list_snapshots(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<ListSnapshotsParams>,
) -> Result<Json<SnapshotsListResponse>, AppError> {
    let max = state.config.query.max_limit;
    let limit = resolve_limit("limit", params.limit.as_deref(), max, max)?;
    let snapshots = state
        .store
        .recent_snapshots(params.employee_id, limit)
        .await?;
    Ok(Json(SnapshotsListResponse { snapshots }))
}

/// GET /snapshots/by-safe-name/:safe_name - Snapshots for the employee with this safe name
pub async fn snapshots_by_safe_name(
    State(state): State<AppState>,
    ApiPath(safe_name): ApiPath<String>,
    ApiQuery(params): ApiQuery<LimitParams>,
) -> Result<Json<EmployeeSnapshotsResponse>, AppError> {
    let max = state.config.query.max_limit;
    let limit = resolve_limit("limit", params.limit.as_deref(), max, max)?;
    let employee = DirectoryService::find_by_safe_name(&state.store, &safe_name).await?;
    let snapshots = state
        .store
        .recent_snapshots(Some(employee.id), limit)
        .await?;
    Ok(Json(EmployeeSnapshotsResponse {
        employee,
        snapshots,
    }))
}

/// GET /snapshots/:snapshot_id/image - Raw image bytes
pub async fn snapshot_image(
    State(state): State<AppState>,
    ApiPath(snapshot_id): ApiPath<i64>,
) -> Result<Response, AppError> {
    let artifact = state.artifacts.resolve_snapshot(snapshot_id).await?;
    Ok(artifact_response(artifact))
}

/// GET /download - Raw image bytes by `snapshot_id` or `filepath`
pub async fn download_snapshot(
    State(state): State<AppState>,
    ApiQuery(params): ApiQuery<DownloadParams>,
) -> Result<Response, AppError> {
    let artifact = match (params.snapshot_id, params.filepath.as_deref()) {
        (Some(snapshot_id), _) => state.artifacts.resolve_snapshot(snapshot_id).await?,
        (None, Some(filepath)) => state.artifacts.resolve_path(filepath).await?,
        (None, None) => {
            return Err(AppError::InvalidRequest(
                "Provide snapshot_id or filepath".to_string(),
            ))
        }
    };
    Ok(artifact_response(artifact))
}

fn artifact_response(artifact: Artifact) -> Response {
    let disposition = format!(
        "inline; filename=\"{}\"",
        artifact.filename.replace(['"', '\\'], "_")
    );

    match artifact.body {
        ArtifactBody::Inline(bytes) => (
            [
                (header::CONTENT_TYPE, artifact.content_type),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            Body::from(bytes),
        )
            .into_response(),
        ArtifactBody::File { file, len } => (
            [
                (header::CONTENT_TYPE, artifact.content_type),
                (header::CONTENT_DISPOSITION, disposition),
                (header::CONTENT_LENGTH, len.to_string()),
            ],
            Body::from_stream(ReaderStream::new(file)),
        )
            .into_response(),
    }
}
