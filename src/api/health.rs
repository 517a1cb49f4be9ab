//! Health and index handlers

use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, response::Json};
use serde::Serialize;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok` when the store answers
    pub status: String,
    /// Crate version
    pub version: String,
}

/// Index response
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    /// Human-readable banner
    pub message: String,
    /// Available endpoints
    pub endpoints: Vec<&'static str>,
}

/// GET / - Service banner
pub async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "ENYARD admin API running".to_string(),
        endpoints: vec![
            "/employees",
            "/employees/{id}",
            "/snapshots",
            "/snapshots/by-safe-name/{safe_name}",
            "/snapshots/{id}/image",
            "/logs",
            "/download",
            "/health",
        ],
    })
}

/// GET /health - Check the store is reachable
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    state.store.ping().await?;
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
