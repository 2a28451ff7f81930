//! Registration endpoints: admission, lookup, listing and cancellation.
//!
//! Admission is an atomic capacity decision: a request ends up confirmed,
//! waitlisted (FIFO position) or refused with `409 CAPACITY_EXCEEDED`, and
//! a refusal leaves no row behind. Cancellation frees capacity and promotes
//! the waitlist head in the same transaction; it never refunds — refunds
//! are an explicit call on the payments API.

use crate::error::ApiError;
use crate::extract::OrgContext;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use clubdesk_core::store::{Page, RegistrationFilter};
use clubdesk_core::types::{
    Audience, EventId, Money, PaymentState, Registrant, RegistrantId, Registration,
    RegistrationId, RegistrationStatus,
};
use clubdesk_core::RegistrationError;
use metrics::counter;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

/// The person to register.
#[derive(Debug, Deserialize)]
pub struct RegistrantRequest {
    /// Platform identifier; generated when omitted (walk-in registrants).
    pub id: Option<Uuid>,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Audience group; defaults to general. Members see member-only tiers.
    pub audience: Option<Audience>,
}

/// Request to create a registration.
#[derive(Debug, Deserialize)]
pub struct CreateRegistrationRequest {
    /// Who to register.
    pub registrant: RegistrantRequest,
    /// Registration instant used for pricing and admission; defaults to
    /// the server clock.
    pub requested_at: Option<DateTime<Utc>>,
}

/// Response after an admission decision.
#[derive(Debug, Serialize)]
pub struct CreateRegistrationResponse {
    /// Created registration id.
    pub registration_id: Uuid,
    /// Admission outcome: `confirmed` or `waitlisted`.
    pub status: RegistrationStatus,
    /// FIFO position when waitlisted.
    pub waitlist_position: Option<u32>,
    /// Price snapshot in minor currency units.
    pub price: Money,
}

/// Full registration details.
#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    /// Registration id.
    pub id: Uuid,
    /// Event registered for.
    pub event_id: Uuid,
    /// Registrant details.
    pub registrant: RegistrantResponse,
    /// Lifecycle status.
    pub status: RegistrationStatus,
    /// Price snapshot in minor currency units.
    pub price: Money,
    /// Captured total in minor currency units.
    pub paid_amount: Money,
    /// Derived payment state.
    pub payment_state: PaymentState,
    /// FIFO position while waitlisted.
    pub waitlist_position: Option<u32>,
    /// When the request arrived.
    pub registered_at: DateTime<Utc>,
    /// When confirmed (admission or promotion).
    pub confirmed_at: Option<DateTime<Utc>>,
    /// When cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
    /// Caller-supplied cancellation reason.
    pub cancel_reason: Option<String>,
}

/// Registrant details in responses.
#[derive(Debug, Serialize)]
pub struct RegistrantResponse {
    /// Platform identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: Option<String>,
    /// Audience group.
    pub audience: Audience,
}

impl From<Registration> for RegistrationResponse {
    fn from(r: Registration) -> Self {
        let payment_state = r.payment_state();
        Self {
            id: *r.id.as_uuid(),
            event_id: *r.event_id.as_uuid(),
            registrant: RegistrantResponse {
                id: *r.registrant.id.as_uuid(),
                name: r.registrant.name,
                email: r.registrant.email,
                audience: r.registrant.audience,
            },
            status: r.status,
            price: r.price,
            paid_amount: r.paid_amount,
            payment_state,
            waitlist_position: r.waitlist_position,
            registered_at: r.registered_at,
            confirmed_at: r.confirmed_at,
            cancelled_at: r.cancelled_at,
            cancel_reason: r.cancel_reason,
        }
    }
}

/// Request to cancel a registration.
#[derive(Debug, Default, Deserialize)]
pub struct CancelRegistrationRequest {
    /// Optional cancellation reason, kept on the row.
    pub reason: Option<String>,
}

/// Response after a cancellation.
#[derive(Debug, Serialize)]
pub struct CancelRegistrationResponse {
    /// Cancelled registration id.
    pub registration_id: Uuid,
    /// Status after cancellation (always `cancelled`).
    pub status: RegistrationStatus,
    /// Waitlist head promoted into the freed slot, if any.
    pub promoted: Option<PromotedRegistration>,
}

/// Summary of a promotion triggered by a cancellation.
#[derive(Debug, Serialize)]
pub struct PromotedRegistration {
    /// Promoted registration id.
    pub registration_id: Uuid,
    /// When it was confirmed.
    pub confirmed_at: Option<DateTime<Utc>>,
}

/// Query parameters for listing registrations.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Keep only registrations in this status.
    pub status: Option<RegistrationStatus>,
    /// Page size; defaults to 50, capped at 200.
    pub limit: Option<u32>,
    /// Items to skip.
    pub offset: Option<u32>,
}

/// One page of registrations.
#[derive(Debug, Serialize)]
pub struct ListRegistrationsResponse {
    /// Page items, ordered by registration time.
    pub items: Vec<RegistrationResponse>,
    /// Total matching registrations.
    pub total: u64,
}

/// The waitlist of an event, in FIFO order.
#[derive(Debug, Serialize)]
pub struct WaitlistResponse {
    /// Queue entries, position 1 first.
    pub items: Vec<WaitlistEntry>,
}

/// One waitlist entry.
#[derive(Debug, Serialize)]
pub struct WaitlistEntry {
    /// Registration id.
    pub registration_id: Uuid,
    /// FIFO position, starting at 1.
    pub position: Option<u32>,
    /// Registrant display name.
    pub registrant_name: String,
    /// When the request arrived.
    pub registered_at: DateTime<Utc>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Register someone for an event.
///
/// Resolves the price for the registration instant, then runs the atomic
/// admission check.
///
/// # Errors
///
/// `404 NOT_FOUND`, `409 CAPACITY_EXCEEDED`, `422 PRICING_UNRESOLVED`.
pub async fn create_registration(
    OrgContext(org_id): OrgContext,
    Path(event_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<CreateRegistrationRequest>,
) -> Result<(StatusCode, Json<CreateRegistrationResponse>), ApiError> {
    let registrant = Registrant {
        id: request
            .registrant
            .id
            .map_or_else(RegistrantId::new, RegistrantId::from_uuid),
        name: request.registrant.name,
        email: request.registrant.email,
        audience: request.registrant.audience.unwrap_or(Audience::General),
    };
    let requested_at = request.requested_at.unwrap_or_else(Utc::now);

    let registration = match state
        .manager
        .create_registration(org_id, EventId::from_uuid(event_id), registrant, requested_at)
        .await
    {
        Ok(registration) => registration,
        Err(err) => {
            if matches!(err, RegistrationError::CapacityExceeded { .. }) {
                counter!("clubdesk_registrations_total", "outcome" => "refused").increment(1);
            }
            return Err(err.into());
        }
    };

    let outcome = match registration.status {
        RegistrationStatus::Waitlisted => "waitlisted",
        _ => "confirmed",
    };
    counter!("clubdesk_registrations_total", "outcome" => outcome).increment(1);

    Ok((
        StatusCode::CREATED,
        Json(CreateRegistrationResponse {
            registration_id: *registration.id.as_uuid(),
            status: registration.status,
            waitlist_position: registration.waitlist_position,
            price: registration.price,
        }),
    ))
}

/// Fetch one registration.
///
/// # Errors
///
/// `404 NOT_FOUND`.
pub async fn get_registration(
    OrgContext(org_id): OrgContext,
    Path(registration_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<RegistrationResponse>, ApiError> {
    let registration = state
        .manager
        .registration(org_id, RegistrationId::from_uuid(registration_id))
        .await?;
    Ok(Json(registration.into()))
}

/// Cancel a registration.
///
/// Cancellation is terminal: a second cancellation is `409 INVALID_STATE`.
/// The row is kept for financial history. Payments are untouched; refund
/// explicitly via the payments API.
///
/// # Errors
///
/// `404 NOT_FOUND`, `409 INVALID_STATE`.
pub async fn cancel_registration(
    OrgContext(org_id): OrgContext,
    Path(registration_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<CancelRegistrationRequest>,
) -> Result<Json<CancelRegistrationResponse>, ApiError> {
    let outcome = state
        .manager
        .cancel_registration(
            org_id,
            RegistrationId::from_uuid(registration_id),
            request.reason,
            Utc::now(),
        )
        .await?;

    counter!("clubdesk_cancellations_total").increment(1);
    if outcome.promoted.is_some() {
        counter!("clubdesk_promotions_total").increment(1);
    }

    Ok(Json(CancelRegistrationResponse {
        registration_id: *outcome.cancelled.id.as_uuid(),
        status: outcome.cancelled.status,
        promoted: outcome.promoted.map(|p| PromotedRegistration {
            registration_id: *p.id.as_uuid(),
            confirmed_at: p.confirmed_at,
        }),
    }))
}

/// List an event's registrations, filtered and paginated.
///
/// # Errors
///
/// `404 NOT_FOUND`.
pub async fn list_registrations(
    OrgContext(org_id): OrgContext,
    Path(event_id): Path<Uuid>,
    Query(query): Query<ListQuery>,
    State(state): State<AppState>,
) -> Result<Json<ListRegistrationsResponse>, ApiError> {
    let page = Page {
        limit: query.limit.unwrap_or(Page::DEFAULT_LIMIT),
        offset: query.offset.unwrap_or(0),
    };
    let result = state
        .manager
        .list_registrations(
            org_id,
            EventId::from_uuid(event_id),
            RegistrationFilter {
                status: query.status,
            },
            page,
        )
        .await?;

    Ok(Json(ListRegistrationsResponse {
        items: result.items.into_iter().map(Into::into).collect(),
        total: result.total,
    }))
}

/// Fetch an event's waitlist in FIFO order.
///
/// # Errors
///
/// `404 NOT_FOUND`.
pub async fn get_waitlist(
    OrgContext(org_id): OrgContext,
    Path(event_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<WaitlistResponse>, ApiError> {
    let queue = state
        .manager
        .waitlist(org_id, EventId::from_uuid(event_id))
        .await?;

    Ok(Json(WaitlistResponse {
        items: queue
            .into_iter()
            .map(|r| WaitlistEntry {
                registration_id: *r.id.as_uuid(),
                position: r.waitlist_position,
                registrant_name: r.registrant.name,
                registered_at: r.registered_at,
            })
            .collect(),
    }))
}
