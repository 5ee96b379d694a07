//! Request Sequencing
//!
//! Overlapping refreshes of the same endpoint may resolve out of order.
//! Each request takes a ticket; a response is admitted only if no newer
//! ticket for that endpoint has been admitted already, so the last
//! issued request wins rather than the last resolved one.

use std::cell::RefCell;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Widgets,
    Workload,
    Progress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub endpoint: Endpoint,
    pub seq: u64,
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    issued: u64,
    admitted: u64,
}

#[derive(Debug, Default)]
pub struct RequestSequencer {
    counters: RefCell<HashMap<Endpoint, Counters>>,
}

impl RequestSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, endpoint: Endpoint) -> Ticket {
        let mut counters = self.counters.borrow_mut();
        let entry = counters.entry(endpoint).or_default();
        entry.issued += 1;
        Ticket {
            endpoint,
            seq: entry.issued,
        }
    }

    /// True if no newer ticket for the endpoint has been admitted yet
    pub fn is_fresh(&self, ticket: Ticket) -> bool {
        let counters = self.counters.borrow();
        ticket.seq > counters.get(&ticket.endpoint).map_or(0, |c| c.admitted)
    }

    /// Record that the response for `ticket` was applied.
    /// False if it was already stale. Admitting a ticket retires every older one.
    pub fn admit(&self, ticket: Ticket) -> bool {
        let mut counters = self.counters.borrow_mut();
        let entry = counters.entry(ticket.endpoint).or_default();
        if ticket.seq > entry.admitted {
            entry.admitted = ticket.seq;
            true
        } else {
            false
        }
    }
}
