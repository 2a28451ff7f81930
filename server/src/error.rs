//! Error mapping between the domain taxonomy and HTTP responses.
//!
//! Business-rule rejections map onto 4xx with a stable `code` the UI can
//! switch on; transient storage failures map onto 503 and are the only
//! responses a caller should retry.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use clubdesk_core::RegistrationError;
use serde::Serialize;
use std::fmt;

/// HTTP-facing error for all API handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Create a 400 Bad Request error (malformed input before it reaches
    /// the domain, e.g. a missing tenant header).
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            code: "BAD_REQUEST",
            message: message.into(),
        }
    }

    /// The stable machine-readable code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        let (status, code) = match &err {
            RegistrationError::EventNotFound(_)
            | RegistrationError::RegistrationNotFound(_)
            | RegistrationError::PaymentNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            RegistrationError::CapacityExceeded { .. } => {
                (StatusCode::CONFLICT, "CAPACITY_EXCEEDED")
            }
            RegistrationError::InvalidRegistrationState { .. }
            | RegistrationError::InvalidPaymentState { .. } => {
                (StatusCode::CONFLICT, "INVALID_STATE")
            }
            RegistrationError::OverpaymentRejected { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "OVERPAYMENT_REJECTED")
            }
            RegistrationError::RefundExceedsBalance { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "REFUND_EXCEEDS_BALANCE")
            }
            RegistrationError::PricingUnresolved { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "PRICING_UNRESOLVED")
            }
            RegistrationError::InvalidAmount => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_AMOUNT")
            }
            RegistrationError::Validation(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR")
            }
            RegistrationError::Storage(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "STORAGE_UNAVAILABLE")
            }
        };

        Self {
            status,
            code,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Stable code for client error handling.
    code: &'static str,
    /// Human-readable message with the offending entity id.
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(
                status = %self.status,
                code = self.code,
                message = %self.message,
                "request failed"
            );
        } else {
            tracing::debug!(
                status = %self.status,
                code = self.code,
                message = %self.message,
                "request rejected"
            );
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}
