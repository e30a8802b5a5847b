//! API route definitions.

use axum::{Json, Router, middleware, routing::get};
use serde::Serialize;

use crate::{AppState, error::ApiError, middleware::auth_middleware};
use splitledger_shared::AppError;

pub mod groups;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

async fn not_found() -> ApiError {
    AppError::NotFound("No such route".to_string()).into()
}

/// Creates the API router; every route except `/health` requires a bearer token.
#[allow(clippy::needless_pass_by_value)]
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(groups::routes())
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/health", get(health_check))
        .merge(protected_routes)
        .fallback(not_found)
}
