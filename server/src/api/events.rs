//! Event setup endpoints.
//!
//! A deliberately small admin surface: events and their pricing tiers are
//! the configuration the registration core runs against. The wider
//! platform owns the full event management screens.

use crate::error::ApiError;
use crate::extract::OrgContext;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use clubdesk_core::store::{NewEvent, NewTier};
use clubdesk_core::types::{Audience, Money, SportEvent};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to create an event.
#[derive(Debug, Deserialize)]
pub struct CreateEventRequest {
    /// Event name.
    pub name: String,
    /// When the event takes place.
    pub starts_at: DateTime<Utc>,
    /// Confirmed capacity; omit for unlimited.
    pub max_capacity: Option<u32>,
    /// Whether a waitlist opens at capacity.
    #[serde(default)]
    pub waitlist_enabled: bool,
    /// Waitlist capacity; omit for unlimited.
    pub max_waitlist_size: Option<u32>,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Pricing tiers.
    #[serde(default)]
    pub pricing_tiers: Vec<TierRequest>,
}

/// One pricing tier of a new event.
#[derive(Debug, Deserialize)]
pub struct TierRequest {
    /// Display label.
    pub label: String,
    /// Price in minor currency units.
    pub price: u64,
    /// Inclusive window start; omit for unbounded.
    pub effective_from: Option<DateTime<Utc>>,
    /// Exclusive window end; omit for unbounded.
    pub effective_to: Option<DateTime<Utc>>,
    /// Audience restriction; defaults to general.
    pub audience: Option<Audience>,
    /// Tie-break rank; higher wins. Defaults to 0.
    #[serde(default)]
    pub priority: i32,
}

/// Event details response.
#[derive(Debug, Serialize)]
pub struct EventResponse {
    /// Event id.
    pub id: Uuid,
    /// Event name.
    pub name: String,
    /// When the event takes place.
    pub starts_at: DateTime<Utc>,
    /// Confirmed capacity; `null` means unlimited.
    pub max_capacity: Option<u32>,
    /// Whether a waitlist opens at capacity.
    pub waitlist_enabled: bool,
    /// Waitlist capacity; `null` means unlimited.
    pub max_waitlist_size: Option<u32>,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Pricing tiers.
    pub pricing_tiers: Vec<TierResponse>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// One pricing tier in an event response.
#[derive(Debug, Serialize)]
pub struct TierResponse {
    /// Tier id.
    pub id: Uuid,
    /// Display label.
    pub label: String,
    /// Price in minor currency units.
    pub price: Money,
    /// Inclusive window start.
    pub effective_from: Option<DateTime<Utc>>,
    /// Exclusive window end.
    pub effective_to: Option<DateTime<Utc>>,
    /// Audience restriction.
    pub audience: Audience,
    /// Tie-break rank.
    pub priority: i32,
}

impl From<SportEvent> for EventResponse {
    fn from(event: SportEvent) -> Self {
        Self {
            id: *event.id.as_uuid(),
            name: event.name,
            starts_at: event.starts_at,
            max_capacity: event.max_capacity,
            waitlist_enabled: event.waitlist_enabled,
            max_waitlist_size: event.max_waitlist_size,
            currency: event.currency,
            pricing_tiers: event
                .pricing_tiers
                .into_iter()
                .map(|t| TierResponse {
                    id: *t.id.as_uuid(),
                    label: t.label,
                    price: t.price,
                    effective_from: t.effective_from,
                    effective_to: t.effective_to,
                    audience: t.audience,
                    priority: t.priority,
                })
                .collect(),
            created_at: event.created_at,
        }
    }
}

/// Create an event with its pricing tiers.
///
/// # Errors
///
/// `422 VALIDATION_ERROR` for inconsistent configuration.
pub async fn create_event(
    OrgContext(org_id): OrgContext,
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventResponse>), ApiError> {
    let event = NewEvent {
        name: request.name,
        starts_at: request.starts_at,
        max_capacity: request.max_capacity,
        waitlist_enabled: request.waitlist_enabled,
        max_waitlist_size: request.max_waitlist_size,
        currency: request.currency,
        pricing_tiers: request
            .pricing_tiers
            .into_iter()
            .map(|t| NewTier {
                label: t.label,
                price: Money::from_minor(t.price),
                effective_from: t.effective_from,
                effective_to: t.effective_to,
                audience: t.audience.unwrap_or(Audience::General),
                priority: t.priority,
            })
            .collect(),
    };

    let created = state.manager.create_event(org_id, event).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Fetch an event with its pricing tiers.
///
/// # Errors
///
/// `404 NOT_FOUND` when the event is missing or belongs to another tenant.
pub async fn get_event(
    OrgContext(org_id): OrgContext,
    Path(event_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<EventResponse>, ApiError> {
    let event = state
        .manager
        .event(org_id, clubdesk_core::types::EventId::from_uuid(event_id))
        .await?;
    Ok(Json(event.into()))
}
