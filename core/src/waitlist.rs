//! Waitlist ordering rules.
//!
//! Per event, waitlisted registrations are keyed by `waitlist_position`,
//! strictly increasing from 1 with no gaps. Order is FIFO by arrival; there
//! is no reordering or priority skipping. Renumbering after a promotion or
//! removal must commit atomically with the status change that caused it —
//! the arithmetic lives here, the atomicity in the store.

/// Position assigned to the next registration joining the waitlist.
#[must_use]
pub const fn next_position(waitlist_size: u32) -> u32 {
    waitlist_size + 1
}

/// New position for `position` after the entry at `removed` left the list.
///
/// Entries before the removed one keep their position; entries after it
/// shift down by one to close the gap.
#[must_use]
pub const fn position_after_removal(position: u32, removed: u32) -> u32 {
    if position > removed { position - 1 } else { position }
}

/// Checks that a set of positions is exactly `{1, 2, …, k}`.
///
/// Used by tests and by the in-memory store's internal consistency checks;
/// the Postgres schema enforces the same shape with constraints.
#[must_use]
pub fn is_contiguous(positions: &[u32]) -> bool {
    let mut sorted = positions.to_vec();
    sorted.sort_unstable();
    sorted
        .iter()
        .enumerate()
        .all(|(index, &position)| position == u32::try_from(index + 1).unwrap_or(u32::MAX))
}
