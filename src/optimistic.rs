//! Optimistic local state with explicit commit/rollback.
//!
//! Each mutation is stamped with a monotonically increasing sequence number.
//! A response is only allowed to change what the user sees if no newer
//! request has settled before it, so a slow response to an earlier toggle can
//! never undo the outcome of a later one.

/// Where a value stands relative to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    Synced,
    /// A request is in flight; the displayed value is ahead of the server.
    Pending,
    /// An older request failed while a newer one is still in flight.
    Reverting,
}

/// Handle for one in-flight mutation.
#[derive(Debug, Clone, PartialEq)]
pub struct Ticket<T> {
    seq: u64,
    value: T,
}

impl<T> Ticket<T> {
    pub fn seq(&self) -> u64 { self.seq }
    pub fn value(&self) -> &T { &self.value }
}

/// What settling a ticket did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    /// The server accepted the value.
    Committed,
    /// The displayed value went back to the last confirmed one.
    RolledBack,
    /// Failed, but a newer request is still in flight and will decide.
    Deferred,
    /// A newer request already settled; ignored.
    Stale,
}

#[derive(Debug, Clone)]
pub struct Optimistic<T> {
    value: T,
    confirmed: T,
    status: SyncStatus,
    issued: u64,
    settled: u64,
}

impl<T: Clone> Optimistic<T> {
    pub fn new(value: T) -> Self {
        Self { confirmed: value.clone(), value, status: SyncStatus::Synced, issued: 0, settled: 0 }
    }

    /// The value to display.
    pub fn value(&self) -> &T { &self.value }

    pub fn confirmed(&self) -> &T { &self.confirmed }

    pub fn status(&self) -> SyncStatus { self.status }

    pub fn in_flight(&self) -> bool { self.issued > self.settled }

    /// Show `next` immediately and hand out the ticket for its request.
    pub fn begin(&mut self, next: T) -> Ticket<T> {
        self.issued += 1;
        self.value = next.clone();
        self.status = SyncStatus::Pending;
        Ticket { seq: self.issued, value: next }
    }

    pub fn commit(&mut self, ticket: Ticket<T>) -> Settled {
        if ticket.seq <= self.settled {
            return Settled::Stale;
        }
        self.settled = ticket.seq;
        self.confirmed = ticket.value;
        if ticket.seq == self.issued {
            self.value = self.confirmed.clone();
            self.status = SyncStatus::Synced;
        } else {
            self.status = SyncStatus::Pending;
        }
        Settled::Committed
    }

    pub fn rollback(&mut self, ticket: Ticket<T>) -> Settled {
        if ticket.seq <= self.settled {
            return Settled::Stale;
        }
        self.settled = ticket.seq;
        if ticket.seq == self.issued {
            self.value = self.confirmed.clone();
            self.status = SyncStatus::Synced;
            Settled::RolledBack
        } else {
            self.status = SyncStatus::Reverting;
            Settled::Deferred
        }
    }

    /// Adopt a server-provided value outright. Every outstanding ticket becomes stale.
    pub fn reset(&mut self, value: T) {
        self.confirmed = value.clone();
        self.value = value;
        self.settled = self.issued;
        self.status = SyncStatus::Synced;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failed_mutation_restores_previous_value() {
        let mut s = Optimistic::new(true);
        let t = s.begin(false);
        assert_eq!(*s.value(), false);
        assert_eq!(s.status(), SyncStatus::Pending);
        assert_eq!(s.rollback(t), Settled::RolledBack);
        assert_eq!(*s.value(), true);
        assert_eq!(s.status(), SyncStatus::Synced);
        assert!(!s.in_flight());
    }

    #[test]
    fn committed_mutation_sticks() {
        let mut s = Optimistic::new(false);
        let t = s.begin(true);
        assert_eq!(s.commit(t), Settled::Committed);
        assert_eq!(*s.value(), true);
        assert_eq!(*s.confirmed(), true);
        assert_eq!(s.status(), SyncStatus::Synced);
    }

    #[test]
    fn late_response_of_superseded_request_is_ignored() {
        let mut s = Optimistic::new(false);
        let first = s.begin(true);
        let second = s.begin(false);
        assert_eq!(s.commit(second), Settled::Committed);
        assert_eq!(s.rollback(first.clone()), Settled::Stale);
        assert_eq!(s.commit(first), Settled::Stale);
        assert_eq!(*s.value(), false);
        assert_eq!(s.status(), SyncStatus::Synced);
    }

    #[test]
    fn older_failure_defers_to_newer_request() {
        let mut s = Optimistic::new(false);
        let first = s.begin(true);
        let second = s.begin(false);
        assert_eq!(s.rollback(first), Settled::Deferred);
        assert_eq!(s.status(), SyncStatus::Reverting);
        assert_eq!(*s.value(), false);
        assert_eq!(s.rollback(second), Settled::RolledBack);
        assert_eq!(*s.value(), false);
        assert_eq!(s.status(), SyncStatus::Synced);
    }

    #[test]
    fn older_success_updates_baseline_while_newer_is_pending() {
        let mut s = Optimistic::new(1);
        let first = s.begin(2);
        let second = s.begin(3);
        assert_eq!(s.commit(first), Settled::Committed);
        assert_eq!(*s.value(), 3);
        assert_eq!(s.status(), SyncStatus::Pending);
        // newer one fails: fall back to what the server last accepted
        assert_eq!(s.rollback(second), Settled::RolledBack);
        assert_eq!(*s.value(), 2);
    }

    #[test]
    fn reset_invalidates_outstanding_tickets() {
        let mut s = Optimistic::new("draft");
        let t = s.begin("published");
        s.reset("archived");
        assert_eq!(s.commit(t), Settled::Stale);
        assert_eq!(*s.value(), "archived");
    }
}
