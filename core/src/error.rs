//! Error taxonomy for the registration core.
//!
//! Every rejection a caller can receive is one of the variants below, with
//! enough structure (kind plus offending entity id) to render a user-facing
//! message. Business-rule rejections are final and never retried; only
//! [`RegistrationError::Storage`] is transient and eligible for
//! caller-directed retry with backoff.

use crate::types::{EventId, Money, PaymentId, RegistrationId};
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result alias used throughout the registration core.
pub type Result<T> = std::result::Result<T, RegistrationError>;

/// Errors produced by registration, ledger and refund operations.
#[derive(Error, Debug)]
pub enum RegistrationError {
    /// Event missing, or not visible to the caller's organization.
    #[error("event {0} not found")]
    EventNotFound(EventId),

    /// Registration missing, or not visible to the caller's organization.
    #[error("registration {0} not found")]
    RegistrationNotFound(RegistrationId),

    /// Payment missing, or not visible to the caller's organization.
    #[error("payment {0} not found")]
    PaymentNotFound(PaymentId),

    /// Neither a confirmed slot nor a waitlist slot is available.
    #[error("event {event_id} has no remaining capacity or waitlist slots")]
    CapacityExceeded {
        /// The full event.
        event_id: EventId,
    },

    /// The registration's current status does not permit the operation.
    #[error("registration {id} is {status}: {reason}")]
    InvalidRegistrationState {
        /// The registration the operation targeted.
        id: RegistrationId,
        /// Its current status (stable string form).
        status: &'static str,
        /// What was attempted.
        reason: String,
    },

    /// The payment's current status does not permit the operation.
    #[error("payment {id} is {status}: {reason}")]
    InvalidPaymentState {
        /// The payment the operation targeted.
        id: PaymentId,
        /// Its current status (stable string form).
        status: &'static str,
        /// What was attempted.
        reason: String,
    },

    /// Recording the payment would push `paid_amount` past the price.
    #[error(
        "payment of {attempted} rejected for registration {registration_id}: \
         outstanding balance is {outstanding}"
    )]
    OverpaymentRejected {
        /// The registration the payment targeted.
        registration_id: RegistrationId,
        /// `price − paid_amount` at the time of the attempt.
        outstanding: Money,
        /// The rejected amount.
        attempted: Money,
    },

    /// The refund exceeds the payment's refundable remainder.
    #[error(
        "refund of {attempted} rejected for payment {payment_id}: \
         refundable remainder is {refundable}"
    )]
    RefundExceedsBalance {
        /// The payment the refund targeted.
        payment_id: PaymentId,
        /// `amount − refunded_amount` at the time of the attempt.
        refundable: Money,
        /// The rejected amount.
        attempted: Money,
    },

    /// No pricing tier covers the requested instant for the audience.
    #[error("no pricing tier of event {event_id} covers {at}")]
    PricingUnresolved {
        /// The event whose tiers were searched.
        event_id: EventId,
        /// The instant pricing was resolved for.
        at: DateTime<Utc>,
    },

    /// Payment or refund amounts must be strictly positive.
    #[error("amount must be positive")]
    InvalidAmount,

    /// Invalid input on an administrative operation (event configuration).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Transient backing-store failure (connectivity, lock timeout).
    #[error("storage error: {0}")]
    Storage(String),
}

impl RegistrationError {
    /// Whether the error is a transient storage failure the caller may
    /// retry with backoff. Business-rule rejections are never transient.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Storage(_))
    }
}
