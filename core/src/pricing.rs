//! Pricing resolution.
//!
//! Selects the applicable [`PricingTier`](crate::types::PricingTier) for a
//! registration instant. The result is snapshotted into the registration's
//! immutable `price`; later tier edits never retroactively change it.

use crate::error::{RegistrationError, Result};
use crate::types::{Audience, Money, SportEvent, TierId};
use chrono::{DateTime, Utc};

/// The winning tier of a resolution, snapshotted for the registration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedPrice {
    /// The tier that won the tie-break.
    pub tier_id: TierId,
    /// Its display label at resolution time.
    pub label: String,
    /// The price to snapshot, in minor units.
    pub price: Money,
}

/// Resolves the price for registering at `at` with the given audience.
///
/// Candidate tiers are those whose half-open `[effective_from,
/// effective_to)` window contains `at` and whose audience matches (general
/// tiers match everyone, member tiers match members). Ties break by:
///
/// 1. highest explicit `priority`
/// 2. narrowest window, approximated as the latest `effective_from`
///    (an unbounded start counts as the earliest possible)
/// 3. lowest price
///
/// Event configuration is expected to leave at most one winner after the
/// tie-break; a full tie resolves deterministically by tier id.
///
/// # Errors
///
/// [`RegistrationError::PricingUnresolved`] when no tier covers `at` for
/// the audience — an event with pricing must always have a tier covering
/// "now" for registration to be accepted.
pub fn resolve_price(
    event: &SportEvent,
    at: DateTime<Utc>,
    audience: Audience,
) -> Result<ResolvedPrice> {
    event
        .pricing_tiers
        .iter()
        .filter(|tier| tier.covers(at) && tier.applies_to(audience))
        .max_by(|a, b| {
            let a_from = a.effective_from.unwrap_or(DateTime::<Utc>::MIN_UTC);
            let b_from = b.effective_from.unwrap_or(DateTime::<Utc>::MIN_UTC);
            a.priority
                .cmp(&b.priority)
                .then_with(|| a_from.cmp(&b_from))
                .then_with(|| b.price.cmp(&a.price))
                .then_with(|| b.id.cmp(&a.id))
        })
        .map(|tier| ResolvedPrice {
            tier_id: tier.id,
            label: tier.label.clone(),
            price: tier.price,
        })
        .ok_or(RegistrationError::PricingUnresolved {
            event_id: event.id,
            at,
        })
}
