//! API module
//!
//! HTTP handlers and the router that binds them.

pub mod employees;
pub mod extract;
pub mod health;
pub mod logs;
pub mod middleware;
pub mod snapshots;

use crate::state::AppState;
use axum::{
    http::{HeaderValue, Method},
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Build the application router with all routes and middleware
pub fn router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    Router::new()
        .route("/", get(health::index))
        .route("/health", get(health::health_check))
        // Directory and detail
        .route("/employees", get(employees::list_employees))
        .route("/employees/:employee_id", get(employees::get_employee))
        // Snapshots and artifacts
        .route("/snapshots", get(snapshots::list_snapshots))
        .route(
            "/snapshots/by-safe-name/:safe_name",
            get(snapshots::snapshots_by_safe_name),
        )
        .route(
            "/snapshots/:snapshot_id/image",
            get(snapshots::snapshot_image),
        )
        .route("/download", get(snapshots::download_snapshot))
        // Logs
        .route("/logs", get(logs::list_logs))
        // Middleware (request_id runs outermost, auth right before the handler)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_token,
        ))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                )
            }),
        )
        .layer(cors)
        .layer(axum::middleware::from_fn(middleware::request_id))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %o, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers(Any)
}
