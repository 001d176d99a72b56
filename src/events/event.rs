//! # Host transition events delivered to handlers.
//!
//! The [`EventKind`] enum classifies what a subscription listens for:
//! - **Per-host triggers**: [`EventKind::Online`], [`EventKind::Offline`]
//! - **Group triggers**: [`EventKind::OnlineAll`], [`EventKind::OfflineAll`]
//!
//! The [`Event`] struct is what a handler actually receives: the kind, the host
//! that transitioned and a snapshot of the other hosts online at that moment.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//! Handlers run detached and may complete out of order; use `seq` to restore the
//! order in which transitions were emitted.
//!
//! ## Example
//! ```rust
//! use warden::EventKind;
//!
//! let kind: EventKind = "online-all".parse().unwrap();
//! assert_eq!(kind, EventKind::OnlineAll);
//! assert_eq!(kind.as_str(), "online-all");
//! assert!(kind.is_online());
//! ```

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use super::host::Host;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of host transitions a subscription can listen for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// A specific host went from absent to present.
    Online,
    /// The subscription's whole host set is now online at the same time.
    OnlineAll,
    /// A specific host expired.
    Offline,
    /// The subscription's whole host set is now offline, triggered by the last
    /// one of them leaving.
    OfflineAll,
}

impl EventKind {
    /// All kinds, in configuration order.
    pub const ALL: [EventKind; 4] = [
        EventKind::Online,
        EventKind::OnlineAll,
        EventKind::Offline,
        EventKind::OfflineAll,
    ];

    /// Stable textual name, as used in the configuration file.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Online => "online",
            EventKind::OnlineAll => "online-all",
            EventKind::Offline => "offline",
            EventKind::OfflineAll => "offline-all",
        }
    }

    /// True for the kinds that react to arrivals.
    #[inline]
    pub fn is_online(&self) -> bool {
        matches!(self, EventKind::Online | EventKind::OnlineAll)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when parsing an unknown event name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown event `{0}` (expected online, online-all, offline or offline-all)")]
pub struct UnknownEventKind(pub String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

/// Notification handed to a matched handler.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - `host`: snapshot of the host that transitioned
/// - `online`: snapshot of the **other** hosts online when the transition happened
#[derive(Debug, Clone)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Kind tag delivered to the handler.
    pub kind: EventKind,
    /// The host that transitioned.
    pub host: Host,
    /// Other hosts online at that moment (shared between handlers of one transition).
    pub online: Arc<[Host]>,
}

impl Event {
    /// Creates a new event with current timestamp and next sequence number.
    pub(crate) fn new(kind: EventKind, host: Host, online: Arc<[Host]>) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            host,
            online,
        }
    }

    /// Names of the other online hosts, in snapshot order.
    pub fn online_names(&self) -> impl Iterator<Item = &str> {
        self.online.iter().map(|h| h.name.as_str())
    }
}
