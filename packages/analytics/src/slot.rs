//! Last-write-wins result slot.
//!
//! When aggregation runs off the caller's thread, results for consecutive
//! filters can finish out of order. Each filter change takes a ticket from
//! [`LatestResult::issue`] before computing; [`LatestResult::publish`]
//! accepts the result only if no newer ticket has already published.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one filter change. Later changes get larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// Holds the result for the most recent filter change that has finished.
#[derive(Debug)]
pub struct LatestResult<T> {
    next: AtomicU64,
    current: Mutex<Option<(Ticket, T)>>,
}

impl<T> Default for LatestResult<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> LatestResult<T> {
    /// An empty slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(0),
            current: Mutex::new(None),
        }
    }

    /// Takes a ticket for a new filter change.
    pub fn issue(&self) -> Ticket {
        Ticket(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Stores `value` unless a result for a newer ticket is already held.
    /// Returns `true` if `value` was stored.
    pub fn publish(&self, ticket: Ticket, value: T) -> bool {
        let mut current = self
            .current
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        if let Some((held, _)) = current.as_ref()
            && *held >= ticket
        {
            log::debug!("Dropping stale result {ticket:?}; holding {held:?}");
            return false;
        }

        *current = Some((ticket, value));
        true
    }

    /// The ticket of the stored result, if any.
    pub fn latest_ticket(&self) -> Option<Ticket> {
        self.current
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .map(|(ticket, _)| *ticket)
    }
}

impl<T: Clone> LatestResult<T> {
    /// A copy of the stored result, if any.
    pub fn latest(&self) -> Option<T> {
        self.current
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .as_ref()
            .map(|(_, value)| value.clone())
    }
}
