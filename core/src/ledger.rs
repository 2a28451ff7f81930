//! Payment ledger rules.
//!
//! The ledger is an append-only set of payment rows per registration; the
//! registration's `paid_amount` is always the aggregate
//! `Σ (amount − refunded_amount)` over countable rows, recomputed under the
//! same lock as any mutation. Refunds are the only mutation a recorded
//! payment row can receive.

use crate::error::{RegistrationError, Result};
use crate::types::{Money, Payment, PaymentState, PaymentTxStatus, Registration};
use chrono::{DateTime, Utc};

/// Whether a payment row counts toward the registration's `paid_amount`.
///
/// Fully refunded rows still "count" — they contribute
/// `amount − refunded_amount = 0` — which keeps the aggregation rule a
/// single formula instead of a status special-case.
#[must_use]
pub const fn counts_toward_paid(status: PaymentTxStatus) -> bool {
    matches!(
        status,
        PaymentTxStatus::Paid | PaymentTxStatus::PartiallyRefunded | PaymentTxStatus::Refunded
    )
}

/// Recomputes a registration's `paid_amount` from its payment rows.
#[must_use]
pub fn paid_amount(payments: &[Payment]) -> Money {
    payments
        .iter()
        .filter(|p| counts_toward_paid(p.status))
        .fold(Money::ZERO, |acc, p| {
            acc.checked_add(p.amount.saturating_sub(p.refunded_amount))
                .unwrap_or(acc)
        })
}

/// Derives the registration-visible payment state from the totals.
#[must_use]
pub fn payment_state(paid: Money, price: Money) -> PaymentState {
    if paid.is_zero() && !price.is_zero() {
        PaymentState::Pending
    } else if paid < price {
        PaymentState::Partial
    } else {
        PaymentState::Paid
    }
}

/// Validates a payment before it is appended to the ledger.
///
/// `current_paid` must be the aggregate recomputed inside the same atomic
/// unit that appends the row.
///
/// # Errors
///
/// - [`RegistrationError::InvalidAmount`] when `amount` is zero
/// - [`RegistrationError::InvalidRegistrationState`] when the registration
///   is cancelled
/// - [`RegistrationError::OverpaymentRejected`] when the payment would push
///   `paid_amount` past the price snapshot
pub fn check_payment(
    registration: &Registration,
    current_paid: Money,
    amount: Money,
) -> Result<()> {
    if amount.is_zero() {
        return Err(RegistrationError::InvalidAmount);
    }

    if !registration.status.cancellable() {
        return Err(RegistrationError::InvalidRegistrationState {
            id: registration.id,
            status: registration.status.as_str(),
            reason: "cannot record a payment against a cancelled registration".to_string(),
        });
    }

    let would_be = current_paid
        .checked_add(amount)
        .ok_or(RegistrationError::InvalidAmount)?;
    if would_be > registration.price {
        return Err(RegistrationError::OverpaymentRejected {
            registration_id: registration.id,
            outstanding: registration.price.saturating_sub(current_paid),
            attempted: amount,
        });
    }

    Ok(())
}

/// Validates a refund against a specific payment row.
///
/// # Errors
///
/// - [`RegistrationError::InvalidAmount`] when `amount` is zero
/// - [`RegistrationError::InvalidPaymentState`] when the payment was never
///   captured (pending, processing, failed or cancelled rows)
/// - [`RegistrationError::RefundExceedsBalance`] when the refund exceeds
///   the payment's refundable remainder — this is also what rejects a
///   double-submitted refund once the first one consumed the remainder
pub fn check_refund(payment: &Payment, amount: Money) -> Result<()> {
    if amount.is_zero() {
        return Err(RegistrationError::InvalidAmount);
    }

    if !counts_toward_paid(payment.status) {
        return Err(RegistrationError::InvalidPaymentState {
            id: payment.id,
            status: payment.status.as_str(),
            reason: "only captured payments can be refunded".to_string(),
        });
    }

    let refundable = payment.refundable();
    if amount > refundable {
        return Err(RegistrationError::RefundExceedsBalance {
            payment_id: payment.id,
            refundable,
            attempted: amount,
        });
    }

    Ok(())
}

/// Applies a validated refund to a payment row.
///
/// Callers must run [`check_refund`] first, inside the same atomic unit.
pub fn apply_refund(payment: &mut Payment, amount: Money, reason: Option<String>, at: DateTime<Utc>) {
    payment.refunded_amount = payment
        .refunded_amount
        .checked_add(amount)
        .unwrap_or(payment.amount);
    payment.refunded_at = Some(at);
    if reason.is_some() {
        payment.refund_reason = reason;
    }
    payment.status = if payment.refunded_amount >= payment.amount {
        PaymentTxStatus::Refunded
    } else {
        PaymentTxStatus::PartiallyRefunded
    };
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::types::{
        Audience, EventId, OrgId, PaymentId, PaymentMethod, Registrant, RegistrantId,
        RegistrationId, RegistrationStatus,
    };
    use chrono::Utc;
    use proptest::prelude::*;

    fn registration(price: u64, paid: u64, status: RegistrationStatus) -> Registration {
        Registration {
            id: RegistrationId::new(),
            org_id: OrgId::new(),
            event_id: EventId::new(),
            registrant: Registrant {
                id: RegistrantId::new(),
                name: "Alex Keeper".to_string(),
                email: None,
                audience: Audience::General,
            },
            status,
            price: Money::from_minor(price),
            paid_amount: Money::from_minor(paid),
            waitlist_position: None,
            registered_at: Utc::now(),
            confirmed_at: Some(Utc::now()),
            cancelled_at: None,
            cancel_reason: None,
        }
    }

    fn payment(amount: u64, refunded: u64, status: PaymentTxStatus) -> Payment {
        Payment {
            id: PaymentId::new(),
            org_id: OrgId::new(),
            registration_id: RegistrationId::new(),
            amount: Money::from_minor(amount),
            method: PaymentMethod::Card,
            status,
            payment_date: Utc::now(),
            refunded_amount: Money::from_minor(refunded),
            refunded_at: None,
            refund_reason: None,
            recorded_at: Utc::now(),
        }
    }

    #[test]
    fn partial_then_rejected_then_paid() {
        // price 10000: 5000 → partial, 6000 → rejected, 5000 → paid.
        let reg = registration(10_000, 0, RegistrationStatus::Confirmed);

        check_payment(&reg, Money::ZERO, Money::from_minor(5_000)).unwrap();
        assert_eq!(
            payment_state(Money::from_minor(5_000), reg.price),
            PaymentState::Partial
        );

        let err =
            check_payment(&reg, Money::from_minor(5_000), Money::from_minor(6_000)).unwrap_err();
        match err {
            RegistrationError::OverpaymentRejected {
                outstanding,
                attempted,
                ..
            } => {
                assert_eq!(outstanding, Money::from_minor(5_000));
                assert_eq!(attempted, Money::from_minor(6_000));
            }
            other => panic!("expected OverpaymentRejected, got {other}"),
        }

        check_payment(&reg, Money::from_minor(5_000), Money::from_minor(5_000)).unwrap();
        assert_eq!(
            payment_state(Money::from_minor(10_000), reg.price),
            PaymentState::Paid
        );
    }

    #[test]
    fn zero_amount_and_cancelled_registration_reject() {
        let reg = registration(10_000, 0, RegistrationStatus::Confirmed);
        assert!(matches!(
            check_payment(&reg, Money::ZERO, Money::ZERO),
            Err(RegistrationError::InvalidAmount)
        ));

        let cancelled = registration(10_000, 0, RegistrationStatus::Cancelled);
        assert!(matches!(
            check_payment(&cancelled, Money::ZERO, Money::from_minor(100)),
            Err(RegistrationError::InvalidRegistrationState { .. })
        ));
    }

    #[test]
    fn refund_consumes_remainder_then_rejects_duplicate() {
        // amount 5000: refund 3000 → ok, second 3000 → rejected (2000 left).
        let mut p = payment(5_000, 0, PaymentTxStatus::Paid);

        check_refund(&p, Money::from_minor(3_000)).unwrap();
        apply_refund(&mut p, Money::from_minor(3_000), Some("overcharge".to_string()), Utc::now());
        assert_eq!(p.status, PaymentTxStatus::PartiallyRefunded);
        assert_eq!(p.refundable(), Money::from_minor(2_000));

        let err = check_refund(&p, Money::from_minor(3_000)).unwrap_err();
        match err {
            RegistrationError::RefundExceedsBalance { refundable, .. } => {
                assert_eq!(refundable, Money::from_minor(2_000));
            }
            other => panic!("expected RefundExceedsBalance, got {other}"),
        }

        check_refund(&p, Money::from_minor(2_000)).unwrap();
        apply_refund(&mut p, Money::from_minor(2_000), None, Utc::now());
        assert_eq!(p.status, PaymentTxStatus::Refunded);
        assert_eq!(p.refund_reason.as_deref(), Some("overcharge"));
        assert!(check_refund(&p, Money::from_minor(1)).is_err());
    }

    #[test]
    fn uncaptured_payments_cannot_be_refunded() {
        for status in [
            PaymentTxStatus::Pending,
            PaymentTxStatus::Processing,
            PaymentTxStatus::Failed,
            PaymentTxStatus::Cancelled,
        ] {
            let p = payment(5_000, 0, status);
            assert!(matches!(
                check_refund(&p, Money::from_minor(1_000)),
                Err(RegistrationError::InvalidPaymentState { .. })
            ));
        }
    }

    #[test]
    fn paid_amount_sums_unrefunded_remainders() {
        let payments = vec![
            payment(5_000, 0, PaymentTxStatus::Paid),
            payment(3_000, 1_000, PaymentTxStatus::PartiallyRefunded),
            payment(2_000, 2_000, PaymentTxStatus::Refunded),
            payment(9_999, 0, PaymentTxStatus::Failed),
        ];
        assert_eq!(paid_amount(&payments), Money::from_minor(7_000));
    }

    #[test]
    fn payment_state_boundaries() {
        let price = Money::from_minor(100);
        assert_eq!(payment_state(Money::ZERO, price), PaymentState::Pending);
        assert_eq!(payment_state(Money::from_minor(1), price), PaymentState::Partial);
        assert_eq!(payment_state(price, price), PaymentState::Paid);
        // A zero-price registration is trivially paid.
        assert_eq!(payment_state(Money::ZERO, Money::ZERO), PaymentState::Paid);
    }

    proptest! {
        /// Conservation: however payments and refunds interleave, the
        /// aggregate equals the sum of unrefunded remainders, each payment
        /// never refunds past its amount, and the total never exceeds the
        /// price when every step passed validation.
        #[test]
        fn ledger_conserves_amounts(
            price in 1_u64..500_000,
            ops in prop::collection::vec((1_u64..100_000, 0_u64..100_000), 1..30),
        ) {
            let reg = registration(price, 0, RegistrationStatus::Confirmed);
            let mut rows: Vec<Payment> = Vec::new();

            for (pay, refund) in ops {
                let current = paid_amount(&rows);
                let amount = Money::from_minor(pay);
                if check_payment(&reg, current, amount).is_ok() {
                    let mut row = payment(pay, 0, PaymentTxStatus::Paid);
                    row.registration_id = reg.id;
                    rows.push(row);
                }

                if let Some(last) = rows.last_mut() {
                    let refund = Money::from_minor(refund);
                    if check_refund(last, refund).is_ok() {
                        apply_refund(last, refund, None, Utc::now());
                    }
                }

                let total = paid_amount(&rows);
                prop_assert!(total <= reg.price, "paid_amount exceeded price");
                for row in &rows {
                    prop_assert!(row.refunded_amount <= row.amount, "over-refunded row");
                }
            }
        }
    }
}
