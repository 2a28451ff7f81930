//! Health check endpoints.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use clubdesk_core::RegistrationStore;
use serde::Serialize;

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Liveness check; does not touch dependencies.
pub async fn health_check() -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}

/// Readiness check response.
#[derive(Serialize)]
pub struct ReadinessResponse {
    /// Overall readiness.
    pub ready: bool,
    /// Backing store connectivity.
    pub store: bool,
}

/// Readiness check; pings the backing store so load balancers stop routing
/// to an instance that lost its database.
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<ReadinessResponse>) {
    let store = state.store.ping().await.is_ok();
    let status = if store {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (
        status,
        Json(ReadinessResponse {
            ready: store,
            store,
        }),
    )
}
