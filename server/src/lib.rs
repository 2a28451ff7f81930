//! HTTP service for the Clubdesk registration core.
//!
//! Exposes the registration, payment and refund operations over a JSON API:
//!
//! - `POST /api/events`, `GET /api/events/:id` — event setup
//! - `POST /api/events/:id/registrations` — admission (confirmed or
//!   waitlisted, capacity permitting)
//! - `GET /api/events/:id/registrations`, `GET /api/events/:id/waitlist`
//! - `GET /api/registrations/:id`, `POST /api/registrations/:id/cancel`
//! - `POST /api/registrations/:id/payments`,
//!   `GET /api/registrations/:id/payments`
//! - `POST /api/payments/:id/refunds`
//! - `GET /health`, `GET /ready`
//!
//! Every `/api` endpoint is tenant-scoped through the `X-Org-Id` header;
//! authorization of that tenant happens upstream and is trusted here.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod extract;
pub mod health;
pub mod metrics;
pub mod notify;
pub mod routes;
pub mod state;

pub use config::Config;
pub use routes::build_router;
pub use state::AppState;
