//! End-to-end behavior tests for the registration manager over the
//! in-memory store: admission, waitlist ordering, cancellation effects,
//! payments and refunds.
//!
//! Run with: `cargo test -p clubdesk-testing`

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

use chrono::{Duration, Utc};
use clubdesk_core::error::RegistrationError;
use clubdesk_core::store::{Page, RegistrationFilter};
use clubdesk_core::types::{
    Money, OrgId, PaymentMethod, PaymentState, PaymentTxStatus, RegistrationStatus,
};
use clubdesk_core::RegistrationManager;
use clubdesk_testing::fixtures::{flat_priced_event, registrant, tiered_event, windowed_tier};
use clubdesk_testing::{CollectingNotifier, InMemoryRegistrationStore, Signal};
use std::sync::Arc;

fn manager_with_notifier() -> (RegistrationManager, CollectingNotifier) {
    let store = InMemoryRegistrationStore::new();
    let notifier = CollectingNotifier::new();
    let manager = RegistrationManager::new(Arc::new(store), Arc::new(notifier.clone()));
    (manager, notifier)
}

fn manager() -> RegistrationManager {
    manager_with_notifier().0
}

#[tokio::test]
async fn admission_fills_capacity_then_waitlist_then_refuses() {
    // maxCapacity = 2, waitlist of 1: A and B confirm, C waitlists at
    // position 1, D is refused without a row.
    let (manager, notifier) = manager_with_notifier();
    let org = OrgId::new();
    let event = manager
        .create_event(org, flat_priced_event("Spring tournament", Some(2), true, Some(1), 2_500))
        .await
        .unwrap();
    let now = Utc::now();

    let a = manager
        .create_registration(org, event.id, registrant("Ada"), now)
        .await
        .unwrap();
    let b = manager
        .create_registration(org, event.id, registrant("Ben"), now)
        .await
        .unwrap();
    let c = manager
        .create_registration(org, event.id, registrant("Cleo"), now)
        .await
        .unwrap();

    assert_eq!(a.status, RegistrationStatus::Confirmed);
    assert_eq!(a.confirmed_at, Some(now));
    assert_eq!(b.status, RegistrationStatus::Confirmed);
    assert_eq!(c.status, RegistrationStatus::Waitlisted);
    assert_eq!(c.waitlist_position, Some(1));
    assert!(c.confirmed_at.is_none());

    let err = manager
        .create_registration(org, event.id, registrant("Dan"), now)
        .await
        .unwrap_err();
    assert!(matches!(err, RegistrationError::CapacityExceeded { .. }));

    // The refused request left no row behind.
    let all = manager
        .list_registrations(org, event.id, RegistrationFilter::default(), Page::default())
        .await
        .unwrap();
    assert_eq!(all.total, 3);

    assert_eq!(
        notifier.signals(),
        vec![
            Signal::Confirmed(a.id),
            Signal::Confirmed(b.id),
            Signal::Waitlisted(c.id, Some(1)),
        ]
    );
}

#[tokio::test]
async fn cancelling_confirmed_promotes_the_head() {
    let (manager, notifier) = manager_with_notifier();
    let org = OrgId::new();
    let event = manager
        .create_event(org, flat_priced_event("Spring tournament", Some(2), true, Some(1), 2_500))
        .await
        .unwrap();
    let now = Utc::now();

    let a = manager
        .create_registration(org, event.id, registrant("Ada"), now)
        .await
        .unwrap();
    manager
        .create_registration(org, event.id, registrant("Ben"), now)
        .await
        .unwrap();
    let c = manager
        .create_registration(org, event.id, registrant("Cleo"), now)
        .await
        .unwrap();
    notifier.clear();

    let outcome = manager
        .cancel_registration(org, a.id, Some("conflict".to_string()), Utc::now())
        .await
        .unwrap();

    assert_eq!(outcome.cancelled.status, RegistrationStatus::Cancelled);
    assert_eq!(outcome.cancelled.cancel_reason.as_deref(), Some("conflict"));
    let promoted = outcome.promoted.expect("head should be promoted");
    assert_eq!(promoted.id, c.id);
    assert_eq!(promoted.status, RegistrationStatus::Confirmed);
    assert_eq!(promoted.waitlist_position, None);

    let waitlist = manager.waitlist(org, event.id).await.unwrap();
    assert!(waitlist.is_empty());

    assert_eq!(
        notifier.signals(),
        vec![Signal::Cancelled(a.id), Signal::Promoted(c.id)]
    );
}

#[tokio::test]
async fn promotion_keeps_the_original_price_snapshot() {
    // Price goes up between registration and promotion; the promoted
    // registration keeps the price it registered at.
    let manager = manager();
    let org = OrgId::new();
    let now = Utc::now();
    let later = now + Duration::days(10);

    let mut event = tiered_event(
        "Autumn camp",
        Some(1),
        vec![
            windowed_tier("Early", 10_000, None, Some(later)),
            windowed_tier("Late", 15_000, Some(later), None),
        ],
    );
    event.max_waitlist_size = Some(5);
    let event = manager.create_event(org, event).await.unwrap();

    let a = manager
        .create_registration(org, event.id, registrant("Ada"), now)
        .await
        .unwrap();
    let b = manager
        .create_registration(org, event.id, registrant("Ben"), now)
        .await
        .unwrap();
    assert_eq!(b.status, RegistrationStatus::Waitlisted);
    assert_eq!(b.price, Money::from_minor(10_000));

    // Cancel once the late tier is in effect.
    let outcome = manager
        .cancel_registration(org, a.id, None, later + Duration::days(1))
        .await
        .unwrap();
    let promoted = outcome.promoted.unwrap();
    assert_eq!(promoted.id, b.id);
    assert_eq!(promoted.price, Money::from_minor(10_000));

    // A fresh registration in the late window pays the late price.
    let late = manager
        .create_registration(org, event.id, registrant("Cleo"), later + Duration::days(1))
        .await
        .unwrap();
    assert_eq!(late.status, RegistrationStatus::Waitlisted);
    assert_eq!(late.price, Money::from_minor(15_000));
}

#[tokio::test]
async fn cancelling_a_waitlisted_entry_closes_the_gap() {
    let manager = manager();
    let org = OrgId::new();
    let event = manager
        .create_event(org, flat_priced_event("Winter clinic", Some(1), true, None, 5_000))
        .await
        .unwrap();
    let now = Utc::now();

    manager
        .create_registration(org, event.id, registrant("Ada"), now)
        .await
        .unwrap();
    let mut queued = Vec::new();
    for name in ["Ben", "Cleo", "Dan", "Eve"] {
        queued.push(
            manager
                .create_registration(org, event.id, registrant(name), now)
                .await
                .unwrap(),
        );
    }
    assert_eq!(
        queued.iter().map(|r| r.waitlist_position).collect::<Vec<_>>(),
        vec![Some(1), Some(2), Some(3), Some(4)]
    );

    // Cancel Cleo (position 2): Dan and Eve shift down, Ben keeps 1.
    let outcome = manager
        .cancel_registration(org, queued[1].id, None, Utc::now())
        .await
        .unwrap();
    assert!(outcome.promoted.is_none());

    let waitlist = manager.waitlist(org, event.id).await.unwrap();
    let names: Vec<(&str, Option<u32>)> = waitlist
        .iter()
        .map(|r| (r.registrant.name.as_str(), r.waitlist_position))
        .collect();
    assert_eq!(
        names,
        vec![("Ben", Some(1)), ("Dan", Some(2)), ("Eve", Some(3))]
    );
}

#[tokio::test]
async fn cancelling_twice_is_an_invalid_state() {
    let manager = manager();
    let org = OrgId::new();
    let event = manager
        .create_event(org, flat_priced_event("Open training", None, false, None, 1_000))
        .await
        .unwrap();

    let a = manager
        .create_registration(org, event.id, registrant("Ada"), Utc::now())
        .await
        .unwrap();
    manager
        .cancel_registration(org, a.id, None, Utc::now())
        .await
        .unwrap();

    let err = manager
        .cancel_registration(org, a.id, None, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::InvalidRegistrationState { .. }
    ));
}

#[tokio::test]
async fn partial_payments_reconcile_to_paid() {
    // price 10000: 5000 → partial, 6000 → rejected, 5000 → paid.
    let manager = manager();
    let org = OrgId::new();
    let event = manager
        .create_event(org, flat_priced_event("Summer camp", None, false, None, 10_000))
        .await
        .unwrap();
    let reg = manager
        .create_registration(org, event.id, registrant("Ada"), Utc::now())
        .await
        .unwrap();

    let first = manager
        .record_payment(org, reg.id, Money::from_minor(5_000), PaymentMethod::Card, Utc::now())
        .await
        .unwrap();
    assert_eq!(first.payment_state, PaymentState::Partial);
    assert_eq!(first.paid_amount, Money::from_minor(5_000));

    let err = manager
        .record_payment(org, reg.id, Money::from_minor(6_000), PaymentMethod::Card, Utc::now())
        .await
        .unwrap_err();
    match err {
        RegistrationError::OverpaymentRejected { outstanding, .. } => {
            assert_eq!(outstanding, Money::from_minor(5_000));
        }
        other => panic!("expected OverpaymentRejected, got {other}"),
    }

    let second = manager
        .record_payment(org, reg.id, Money::from_minor(5_000), PaymentMethod::BankTransfer, Utc::now())
        .await
        .unwrap();
    assert_eq!(second.payment_state, PaymentState::Paid);
    assert_eq!(second.paid_amount, Money::from_minor(10_000));

    let stored = manager.registration(org, reg.id).await.unwrap();
    assert_eq!(stored.paid_amount, Money::from_minor(10_000));
    assert_eq!(stored.payment_state(), PaymentState::Paid);
}

#[tokio::test]
async fn refunds_are_bounded_per_payment() {
    // Refund 3000 of a 5000 payment, then an identical resubmission is
    // rejected: the remainder is only 2000.
    let manager = manager();
    let org = OrgId::new();
    let event = manager
        .create_event(org, flat_priced_event("Summer camp", None, false, None, 10_000))
        .await
        .unwrap();
    let reg = manager
        .create_registration(org, event.id, registrant("Ada"), Utc::now())
        .await
        .unwrap();

    let p1 = manager
        .record_payment(org, reg.id, Money::from_minor(5_000), PaymentMethod::Card, Utc::now())
        .await
        .unwrap()
        .payment;
    manager
        .record_payment(org, reg.id, Money::from_minor(5_000), PaymentMethod::Card, Utc::now())
        .await
        .unwrap();

    let refund = manager
        .process_refund(org, p1.id, Money::from_minor(3_000), Some("overcharge".to_string()), Utc::now())
        .await
        .unwrap();
    assert_eq!(refund.new_paid_amount, Money::from_minor(7_000));
    assert_eq!(refund.payment.status, PaymentTxStatus::PartiallyRefunded);
    assert_eq!(refund.payment_state, PaymentState::Partial);

    let err = manager
        .process_refund(org, p1.id, Money::from_minor(3_000), None, Utc::now())
        .await
        .unwrap_err();
    match err {
        RegistrationError::RefundExceedsBalance { refundable, .. } => {
            assert_eq!(refundable, Money::from_minor(2_000));
        }
        other => panic!("expected RefundExceedsBalance, got {other}"),
    }

    // The other payment's balance is untouched by the first one's refunds.
    let payments = manager.payments(org, reg.id).await.unwrap();
    assert_eq!(payments.len(), 2);
    assert_eq!(payments[1].refunded_amount, Money::ZERO);
}

#[tokio::test]
async fn refund_does_not_cancel_and_cancel_does_not_refund() {
    let manager = manager();
    let org = OrgId::new();
    let event = manager
        .create_event(org, flat_priced_event("Summer camp", Some(10), false, None, 4_000))
        .await
        .unwrap();
    let reg = manager
        .create_registration(org, event.id, registrant("Ada"), Utc::now())
        .await
        .unwrap();
    let payment = manager
        .record_payment(org, reg.id, Money::from_minor(4_000), PaymentMethod::Card, Utc::now())
        .await
        .unwrap()
        .payment;

    // Full refund: the registration stays confirmed.
    manager
        .process_refund(org, payment.id, Money::from_minor(4_000), None, Utc::now())
        .await
        .unwrap();
    let after_refund = manager.registration(org, reg.id).await.unwrap();
    assert_eq!(after_refund.status, RegistrationStatus::Confirmed);
    assert_eq!(after_refund.paid_amount, Money::ZERO);

    // Cancellation: the payment rows keep their refund bookkeeping.
    manager
        .cancel_registration(org, reg.id, None, Utc::now())
        .await
        .unwrap();
    let rows = manager.payments(org, reg.id).await.unwrap();
    assert_eq!(rows[0].status, PaymentTxStatus::Refunded);
    assert_eq!(rows[0].refunded_amount, Money::from_minor(4_000));
}

#[tokio::test]
async fn payments_on_cancelled_registrations_reject() {
    let manager = manager();
    let org = OrgId::new();
    let event = manager
        .create_event(org, flat_priced_event("Summer camp", None, false, None, 4_000))
        .await
        .unwrap();
    let reg = manager
        .create_registration(org, event.id, registrant("Ada"), Utc::now())
        .await
        .unwrap();
    manager
        .cancel_registration(org, reg.id, None, Utc::now())
        .await
        .unwrap();

    let err = manager
        .record_payment(org, reg.id, Money::from_minor(1_000), PaymentMethod::Cash, Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RegistrationError::InvalidRegistrationState { .. }
    ));
}

#[tokio::test]
async fn tenants_do_not_see_each_other() {
    let manager = manager();
    let org_a = OrgId::new();
    let org_b = OrgId::new();
    let event = manager
        .create_event(org_a, flat_priced_event("Club night", None, false, None, 1_500))
        .await
        .unwrap();
    let reg = manager
        .create_registration(org_a, event.id, registrant("Ada"), Utc::now())
        .await
        .unwrap();

    assert!(matches!(
        manager.event(org_b, event.id).await.unwrap_err(),
        RegistrationError::EventNotFound(_)
    ));
    assert!(matches!(
        manager.registration(org_b, reg.id).await.unwrap_err(),
        RegistrationError::RegistrationNotFound(_)
    ));
    assert!(matches!(
        manager
            .cancel_registration(org_b, reg.id, None, Utc::now())
            .await
            .unwrap_err(),
        RegistrationError::RegistrationNotFound(_)
    ));
}

#[tokio::test]
async fn listing_filters_and_paginates() {
    let manager = manager();
    let org = OrgId::new();
    let event = manager
        .create_event(org, flat_priced_event("Open day", Some(2), true, None, 0))
        .await
        .unwrap();

    let base = Utc::now();
    for (i, name) in ["Ada", "Ben", "Cleo", "Dan", "Eve"].iter().enumerate() {
        manager
            .create_registration(org, event.id, registrant(name), base + Duration::seconds(i as i64))
            .await
            .unwrap();
    }

    let confirmed = manager
        .list_registrations(
            org,
            event.id,
            RegistrationFilter {
                status: Some(RegistrationStatus::Confirmed),
            },
            Page::default(),
        )
        .await
        .unwrap();
    assert_eq!(confirmed.total, 2);

    let page = manager
        .list_registrations(
            org,
            event.id,
            RegistrationFilter::default(),
            Page { limit: 2, offset: 2 },
        )
        .await
        .unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].registrant.name, "Cleo");
    assert_eq!(page.items[1].registrant.name, "Dan");
}
