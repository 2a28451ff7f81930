//! Business metrics for the registration core.
//!
//! # Exported metrics
//!
//! - `clubdesk_registrations_total{outcome}` - admissions by outcome
//!   (confirmed, waitlisted, refused)
//! - `clubdesk_cancellations_total` - registrations cancelled
//! - `clubdesk_promotions_total` - waitlist promotions
//! - `clubdesk_payments_total` - payments recorded
//! - `clubdesk_payment_minor_units_total` - captured amount, minor units
//! - `clubdesk_refunds_total` - refunds processed
//! - `clubdesk_refund_minor_units_total` - refunded amount, minor units

use metrics::describe_counter;

/// Registers metric descriptions; call once at startup, before any metric
/// is recorded.
pub fn register_business_metrics() {
    describe_counter!(
        "clubdesk_registrations_total",
        "Total admission outcomes (confirmed, waitlisted, refused)"
    );
    describe_counter!(
        "clubdesk_cancellations_total",
        "Total registrations cancelled"
    );
    describe_counter!(
        "clubdesk_promotions_total",
        "Total waitlist promotions into freed capacity"
    );
    describe_counter!("clubdesk_payments_total", "Total payments recorded");
    describe_counter!(
        "clubdesk_payment_minor_units_total",
        "Total captured payment amount in minor currency units"
    );
    describe_counter!("clubdesk_refunds_total", "Total refunds processed");
    describe_counter!(
        "clubdesk_refund_minor_units_total",
        "Total refunded amount in minor currency units"
    );

    tracing::info!("business metrics registered");
}
