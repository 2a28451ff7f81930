//! Admission control.
//!
//! The pure capacity decision behind `createRegistration`. Store
//! implementations call [`decide`] inside their atomic unit, after
//! re-reading the confirmed count and waitlist size under the same
//! transaction that performs the insert.

use crate::error::{RegistrationError, Result};
use crate::types::SportEvent;

/// Outcome of an admission check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdmissionDecision {
    /// A capacity slot is free; admit as confirmed.
    Confirmed,
    /// Capacity is full but the waitlist has room.
    Waitlisted {
        /// Position to assign: one past the current tail.
        position: u32,
    },
}

/// Decides whether a new registration is confirmed, waitlisted, or refused.
///
/// `confirmed_count` and `waitlist_size` must be read inside the same
/// atomic unit that performs the insert; the decision relies on waitlist
/// positions being contiguous from 1, so the tail position equals
/// `waitlist_size`.
///
/// # Errors
///
/// [`RegistrationError::CapacityExceeded`] when neither a confirmed slot
/// nor a waitlist slot is available. No row must be created in that case.
pub fn decide(
    event: &SportEvent,
    confirmed_count: u32,
    waitlist_size: u32,
) -> Result<AdmissionDecision> {
    let has_capacity = event
        .max_capacity
        .is_none_or(|capacity| confirmed_count < capacity);
    if has_capacity {
        return Ok(AdmissionDecision::Confirmed);
    }

    let waitlist_open = event.waitlist_enabled
        && event
            .max_waitlist_size
            .is_none_or(|max| waitlist_size < max);
    if waitlist_open {
        return Ok(AdmissionDecision::Waitlisted {
            position: crate::waitlist::next_position(waitlist_size),
        });
    }

    Err(RegistrationError::CapacityExceeded { event_id: event.id })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{EventId, OrgId};
    use chrono::Utc;

    fn event(max_capacity: Option<u32>, waitlist_enabled: bool, max_waitlist: Option<u32>) -> SportEvent {
        SportEvent {
            id: EventId::new(),
            org_id: OrgId::new(),
            name: "Summer camp".to_string(),
            starts_at: Utc::now(),
            max_capacity,
            waitlist_enabled,
            max_waitlist_size: max_waitlist,
            currency: "EUR".to_string(),
            pricing_tiers: vec![],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn admits_below_capacity() {
        let e = event(Some(2), true, Some(1));
        assert_eq!(decide(&e, 0, 0).unwrap(), AdmissionDecision::Confirmed);
        assert_eq!(decide(&e, 1, 0).unwrap(), AdmissionDecision::Confirmed);
    }

    #[test]
    fn waitlists_at_capacity_then_refuses() {
        // maxCapacity = 2, maxWaitlistSize = 1: third request waitlists at
        // position 1, fourth is refused.
        let e = event(Some(2), true, Some(1));
        assert_eq!(
            decide(&e, 2, 0).unwrap(),
            AdmissionDecision::Waitlisted { position: 1 }
        );
        let err = decide(&e, 2, 1).unwrap_err();
        assert!(matches!(err, RegistrationError::CapacityExceeded { .. }));
    }

    #[test]
    fn unlimited_capacity_always_confirms() {
        let e = event(None, false, None);
        assert_eq!(decide(&e, 10_000, 0).unwrap(), AdmissionDecision::Confirmed);
    }

    #[test]
    fn full_event_without_waitlist_refuses() {
        let e = event(Some(1), false, None);
        let err = decide(&e, 1, 0).unwrap_err();
        assert!(matches!(err, RegistrationError::CapacityExceeded { .. }));
    }

    #[test]
    fn unlimited_waitlist_keeps_queueing() {
        let e = event(Some(1), true, None);
        assert_eq!(
            decide(&e, 1, 41).unwrap(),
            AdmissionDecision::Waitlisted { position: 42 }
        );
    }
}
