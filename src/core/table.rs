//! # Host table with an ordered expiry index.
//!
//! Holds at most one [`Host`] per name plus a `(deadline, name)` index sorted by
//! deadline, so the sweeper finds expired hosts and the next wake-up in
//! O(log n) instead of scanning the whole table.
//!
//! ## Rules
//! - `deadline = seen + ttl`; a host is expired when `deadline <= now`
//! - Every refresh moves the host's index entry (old deadline out, new one in)
//! - Hosts with equal deadlines expire in name order
//!
//! The table is not synchronized; [`Warden`](crate::Warden) owns it behind its lock.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use tokio::time::Instant;

use crate::events::Host;

/// Online hosts keyed by name.
#[derive(Debug)]
pub(crate) struct HostTable {
    ttl: Duration,
    hosts: HashMap<String, Host>,
    deadlines: BTreeSet<(Instant, String)>,
}

impl HostTable {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            hosts: HashMap::new(),
            deadlines: BTreeSet::new(),
        }
    }

    /// Refreshes an existing host. Returns `false` if the name is unknown.
    pub(crate) fn touch(&mut self, name: &str, address: &str) -> bool {
        let Some(host) = self.hosts.get_mut(name) else {
            return false;
        };
        self.deadlines.remove(&(host.seen + self.ttl, host.name.clone()));
        host.touch(address);
        self.deadlines.insert((host.seen + self.ttl, host.name.clone()));
        true
    }

    /// Inserts a host not present in the table.
    pub(crate) fn insert(&mut self, host: Host) {
        debug_assert!(!self.hosts.contains_key(&host.name));
        self.deadlines.insert((host.seen + self.ttl, host.name.clone()));
        self.hosts.insert(host.name.clone(), host);
    }

    /// Removes and returns the host with the earliest deadline if it is `<= now`.
    pub(crate) fn pop_expired(&mut self, now: Instant) -> Option<Host> {
        let first = self.deadlines.first()?;
        if first.0 > now {
            return None;
        }
        let (_, name) = self.deadlines.pop_first()?;
        self.hosts.remove(&name)
    }

    /// Earliest deadline among the remaining hosts.
    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.first().map(|(at, _)| *at)
    }

    /// Deep copy of every host (unordered).
    pub(crate) fn snapshot(&self) -> Vec<Host> {
        self.hosts.values().cloned().collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.hosts.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}
