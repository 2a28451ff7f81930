//! Payment ledger and refund endpoints.
//!
//! Payments arrive here as confirmed facts (the platform's gateway
//! integration settles the funds); this API appends them to the ledger and
//! keeps the registration's `paid_amount` reconciled. Refunds apply to one
//! specific payment and are bounded by that payment's refundable remainder.

use crate::error::ApiError;
use crate::extract::OrgContext;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use clubdesk_core::types::{
    Money, Payment, PaymentId, PaymentMethod, PaymentState, PaymentTxStatus, RegistrationId,
};
use metrics::counter;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request to record a confirmed payment.
#[derive(Debug, Deserialize)]
pub struct RecordPaymentRequest {
    /// Captured amount in minor currency units; must be positive and must
    /// not exceed the outstanding balance.
    pub amount: u64,
    /// Payment method; defaults to card.
    pub method: Option<PaymentMethod>,
    /// When the funds transfer took place; defaults to the server clock.
    pub payment_date: Option<DateTime<Utc>>,
}

/// Response after recording a payment.
#[derive(Debug, Serialize)]
pub struct RecordPaymentResponse {
    /// Appended payment id.
    pub payment_id: Uuid,
    /// Registration's captured total after this payment.
    pub paid_amount: Money,
    /// Remaining balance (`price − paid_amount`).
    pub outstanding: Money,
    /// Derived payment state: `pending`, `partial` or `paid`.
    pub payment_state: PaymentState,
}

/// One ledger row.
#[derive(Debug, Serialize)]
pub struct PaymentResponse {
    /// Payment id.
    pub id: Uuid,
    /// Registration the payment is for.
    pub registration_id: Uuid,
    /// Captured amount in minor currency units.
    pub amount: Money,
    /// Payment method.
    pub method: PaymentMethod,
    /// Transaction status.
    pub status: PaymentTxStatus,
    /// When the funds transfer took place.
    pub payment_date: DateTime<Utc>,
    /// Total refunded so far.
    pub refunded_amount: Money,
    /// When the most recent refund was applied.
    pub refunded_at: Option<DateTime<Utc>>,
    /// Latest refund reason.
    pub refund_reason: Option<String>,
    /// When the ledger recorded the row.
    pub recorded_at: DateTime<Utc>,
}

impl From<Payment> for PaymentResponse {
    fn from(p: Payment) -> Self {
        Self {
            id: *p.id.as_uuid(),
            registration_id: *p.registration_id.as_uuid(),
            amount: p.amount,
            method: p.method,
            status: p.status,
            payment_date: p.payment_date,
            refunded_amount: p.refunded_amount,
            refunded_at: p.refunded_at,
            refund_reason: p.refund_reason,
            recorded_at: p.recorded_at,
        }
    }
}

/// A registration's ledger.
#[derive(Debug, Serialize)]
pub struct ListPaymentsResponse {
    /// Ledger rows, oldest first.
    pub items: Vec<PaymentResponse>,
}

/// Request to refund part or all of one payment.
#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    /// Refund amount in minor currency units; bounded by the payment's
    /// refundable remainder.
    pub amount: u64,
    /// Refund reason, kept on the row.
    pub reason: Option<String>,
}

/// Response after a refund.
#[derive(Debug, Serialize)]
pub struct RefundResponse {
    /// Refunded payment id.
    pub payment_id: Uuid,
    /// Total refunded on this payment so far.
    pub refunded_amount: Money,
    /// Owning registration's captured total after the refund.
    pub new_paid_amount: Money,
    /// Derived payment state after the refund.
    pub payment_state: PaymentState,
}

// ============================================================================
// Handlers
// ============================================================================

/// Record a confirmed payment against a registration.
///
/// # Errors
///
/// `404 NOT_FOUND`, `409 INVALID_STATE` (cancelled registration),
/// `422 OVERPAYMENT_REJECTED`, `422 INVALID_AMOUNT`.
pub async fn record_payment(
    OrgContext(org_id): OrgContext,
    Path(registration_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<RecordPaymentRequest>,
) -> Result<(StatusCode, Json<RecordPaymentResponse>), ApiError> {
    let receipt = state
        .manager
        .record_payment(
            org_id,
            RegistrationId::from_uuid(registration_id),
            Money::from_minor(request.amount),
            request.method.unwrap_or(PaymentMethod::Card),
            request.payment_date.unwrap_or_else(Utc::now),
        )
        .await?;

    counter!("clubdesk_payments_total").increment(1);
    counter!("clubdesk_payment_minor_units_total").increment(request.amount);

    Ok((
        StatusCode::CREATED,
        Json(RecordPaymentResponse {
            payment_id: *receipt.payment.id.as_uuid(),
            paid_amount: receipt.paid_amount,
            outstanding: receipt.outstanding,
            payment_state: receipt.payment_state,
        }),
    ))
}

/// List a registration's ledger rows, oldest first.
///
/// # Errors
///
/// `404 NOT_FOUND`.
pub async fn list_payments(
    OrgContext(org_id): OrgContext,
    Path(registration_id): Path<Uuid>,
    State(state): State<AppState>,
) -> Result<Json<ListPaymentsResponse>, ApiError> {
    let rows = state
        .manager
        .payments(org_id, RegistrationId::from_uuid(registration_id))
        .await?;
    Ok(Json(ListPaymentsResponse {
        items: rows.into_iter().map(Into::into).collect(),
    }))
}

/// Refund part or all of one payment.
///
/// Does not cancel the registration or release capacity; cancellation is a
/// separate explicit call.
///
/// # Errors
///
/// `404 NOT_FOUND`, `409 INVALID_STATE` (uncaptured payment),
/// `422 REFUND_EXCEEDS_BALANCE`, `422 INVALID_AMOUNT`.
pub async fn process_refund(
    OrgContext(org_id): OrgContext,
    Path(payment_id): Path<Uuid>,
    State(state): State<AppState>,
    Json(request): Json<RefundRequest>,
) -> Result<Json<RefundResponse>, ApiError> {
    let outcome = state
        .manager
        .process_refund(
            org_id,
            PaymentId::from_uuid(payment_id),
            Money::from_minor(request.amount),
            request.reason,
            Utc::now(),
        )
        .await?;

    counter!("clubdesk_refunds_total").increment(1);
    counter!("clubdesk_refund_minor_units_total").increment(request.amount);

    Ok(Json(RefundResponse {
        payment_id: *outcome.payment.id.as_uuid(),
        refunded_amount: outcome.payment.refunded_amount,
        new_paid_amount: outcome.new_paid_amount,
        payment_state: outcome.payment_state,
    }))
}
