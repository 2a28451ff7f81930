//! Router configuration.

use crate::api::{events, payments, registrations};
use crate::health::{health_check, readiness_check};
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Builds the complete router: health checks plus the tenant-scoped API.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Event setup
        .route("/events", post(events::create_event))
        .route("/events/:id", get(events::get_event))
        // Admission and listings
        .route(
            "/events/:id/registrations",
            post(registrations::create_registration).get(registrations::list_registrations),
        )
        .route("/events/:id/waitlist", get(registrations::get_waitlist))
        // Registration lifecycle
        .route("/registrations/:id", get(registrations::get_registration))
        .route(
            "/registrations/:id/cancel",
            post(registrations::cancel_registration),
        )
        // Payment ledger
        .route(
            "/registrations/:id/payments",
            post(payments::record_payment).get(payments::list_payments),
        )
        // Refunds
        .route("/payments/:id/refunds", post(payments::process_refund));

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
