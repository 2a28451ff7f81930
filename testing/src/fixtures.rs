//! Builders for common test data.

use chrono::{DateTime, Utc};
use clubdesk_core::store::{NewEvent, NewTier};
use clubdesk_core::types::{Audience, Money, Registrant, RegistrantId};

/// A tier with no window bounds, open to everyone.
#[must_use]
pub fn open_tier(label: &str, price: u64) -> NewTier {
    NewTier {
        label: label.to_string(),
        price: Money::from_minor(price),
        effective_from: None,
        effective_to: None,
        audience: Audience::General,
        priority: 0,
    }
}

/// A general-audience tier with an explicit `[from, to)` window.
#[must_use]
pub fn windowed_tier(
    label: &str,
    price: u64,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
) -> NewTier {
    NewTier {
        label: label.to_string(),
        price: Money::from_minor(price),
        effective_from: from,
        effective_to: to,
        audience: Audience::General,
        priority: 0,
    }
}

/// An event with one flat-priced tier and the given capacity shape.
#[must_use]
pub fn flat_priced_event(
    name: &str,
    max_capacity: Option<u32>,
    waitlist_enabled: bool,
    max_waitlist_size: Option<u32>,
    price: u64,
) -> NewEvent {
    NewEvent {
        name: name.to_string(),
        starts_at: Utc::now() + chrono::Duration::days(30),
        max_capacity,
        waitlist_enabled,
        max_waitlist_size,
        currency: "EUR".to_string(),
        pricing_tiers: vec![open_tier("Standard", price)],
    }
}

/// An event with caller-supplied tiers.
#[must_use]
pub fn tiered_event(name: &str, max_capacity: Option<u32>, tiers: Vec<NewTier>) -> NewEvent {
    NewEvent {
        name: name.to_string(),
        starts_at: Utc::now() + chrono::Duration::days(30),
        max_capacity,
        waitlist_enabled: true,
        max_waitlist_size: None,
        currency: "EUR".to_string(),
        pricing_tiers: tiers,
    }
}

/// A general-audience registrant.
#[must_use]
pub fn registrant(name: &str) -> Registrant {
    Registrant {
        id: RegistrantId::new(),
        name: name.to_string(),
        email: Some(format!("{}@example.org", name.to_lowercase().replace(' ', "."))),
        audience: Audience::General,
    }
}

/// A member registrant (sees member-restricted tiers).
#[must_use]
pub fn member(name: &str) -> Registrant {
    Registrant {
        audience: Audience::Members,
        ..registrant(name)
    }
}
