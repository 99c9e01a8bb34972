//! Ordering guard for overlapping event searches.

use serde::{Deserialize, Serialize};

/// Identifies one event search. Later searches get larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestTicket(u64);

impl RequestTicket {
    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Hands out tickets and remembers which results were applied
#[derive(Debug, Default)]
pub struct RequestSequencer {
    issued: u64,
    applied: Option<RequestTicket>,
}

impl RequestSequencer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ticket for a search that is about to start
    pub fn issue(&mut self) -> RequestTicket {
        self.issued += 1;
        RequestTicket(self.issued)
    }

    /// Record a finished search; false when a newer result was already applied.
    pub fn accept(&mut self, ticket: RequestTicket) -> bool {
        if self.applied.is_some_and(|applied| ticket < applied) {
            return false;
        }
        self.applied = Some(ticket);
        true
    }

    /// Whether `ticket` is the most recently issued one
    #[must_use]
    pub fn is_latest(&self, ticket: RequestTicket) -> bool {
        ticket.0 == self.issued
    }

    #[must_use]
    pub fn last_applied(&self) -> Option<RequestTicket> {
        self.applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tickets_increase() {
        let mut seq = RequestSequencer::new();
        let a = seq.issue();
        let b = seq.issue();
        assert!(b > a);
        assert!(seq.is_latest(b));
        assert!(!seq.is_latest(a));
    }

    #[test]
    fn test_older_result_rejected_after_newer() {
        let mut seq = RequestSequencer::new();
        let a = seq.issue();
        let b = seq.issue();

        assert!(seq.accept(b));
        assert!(!seq.accept(a));
        assert_eq!(seq.last_applied(), Some(b));
    }

    #[test]
    fn test_in_order_results_all_accepted() {
        let mut seq = RequestSequencer::new();
        let a = seq.issue();
        let b = seq.issue();

        assert!(seq.accept(a));
        assert!(seq.accept(b));
        // Same ticket twice is not older than itself
        assert!(seq.accept(b));
    }
}
