//! # Subscriptions and transition matching.
//!
//! A [`Subscription`] binds an [`EventKind`] and an optional host filter to a
//! handler. [`Subscription::matches`] decides whether a transition fires it and
//! with which kind tag.
//!
//! ## Rules
//! ```text
//! kind         went online                                went offline
//! ───────────  ─────────────────────────────────────────  ─────────────────────────────────────────
//! Online       filter empty | host ∈ filter               never
//! OnlineAll    filter empty | host ∈ filter               never
//!                && filter ⊆ online ∪ {host}
//! Offline      never                                      filter empty | host ∈ filter
//! OfflineAll   never                                      filter empty: online = ∅ (tag: Offline)
//!                                                         else: host ∈ filter && filter ∩ online = ∅
//! ```
//!
//! `online` is always the snapshot of the **other** hosts: taken before insertion
//! on arrival, after removal on departure. Group triggers therefore fire only on
//! the transition that completes (all up) or breaks (all down) the group.
//!
//! An empty filter on `OfflineAll` watches the whole fleet: it fires when the
//! last host overall leaves, and that notification carries the `Offline` tag.

use std::collections::HashSet;

use crate::events::{EventKind, Host};
use crate::subscribers::handler::HandlerRef;

/// Registered interest in a class of transitions.
#[derive(Clone)]
pub struct Subscription {
    event: EventKind,
    hosts: HashSet<String>,
    handler: HandlerRef,
}

impl Subscription {
    /// Creates a subscription. An empty `hosts` set means "any host".
    pub fn new<I, S>(event: EventKind, hosts: I, handler: HandlerRef) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            event,
            hosts: hosts.into_iter().map(Into::into).collect(),
            handler,
        }
    }

    /// Event kind this subscription listens for.
    #[inline]
    pub fn event(&self) -> EventKind {
        self.event
    }

    /// Host filter (empty = any host).
    #[inline]
    pub fn hosts(&self) -> &HashSet<String> {
        &self.hosts
    }

    /// Handler fired on match.
    #[inline]
    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    /// Returns the kind tag to deliver if this subscription fires for the
    /// transition, `None` otherwise.
    pub fn matches(&self, went_online: bool, host: &Host, online: &[Host]) -> Option<EventKind> {
        let watched = self.hosts.contains(&host.name);
        let any = self.hosts.is_empty();

        if self.event.is_online() != went_online {
            return None;
        }

        let fires = match self.event {
            EventKind::Online | EventKind::Offline => any || watched,
            EventKind::OnlineAll => {
                any || (watched
                    && self
                        .hosts
                        .iter()
                        .all(|n| *n == host.name || online.iter().any(|h| h.name == *n)))
            }
            EventKind::OfflineAll if any => {
                return online.is_empty().then_some(EventKind::Offline);
            }
            EventKind::OfflineAll => {
                watched && !online.iter().any(|h| self.hosts.contains(&h.name))
            }
        };

        fires.then_some(self.event)
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("event", &self.event)
            .field("hosts", &self.hosts)
            .field("handler", &self.handler.name())
            .finish()
    }
}
