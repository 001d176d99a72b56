//! # Host snapshot.
//!
//! [`Host`] is the value type handed out by the registry: listing results,
//! handler payloads and online snapshots are all independent copies. Nothing
//! outside the host table ever holds a reference into it.

use chrono::{DateTime, SecondsFormat, Utc};
use tokio::time::Instant;

/// A host that is currently considered online.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
    /// Unique host name (opaque string, exactly as reported).
    pub name: String,
    /// Last address the heartbeat came from.
    pub address: String,
    /// Wall-clock time of the last heartbeat.
    pub last_heartbeat: DateTime<Utc>,
    /// Monotonic time of the last heartbeat, used for expiry.
    pub(crate) seen: Instant,
}

impl Host {
    /// Creates a host stamped with the current time.
    pub(crate) fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
            last_heartbeat: Utc::now(),
            seen: Instant::now(),
        }
    }

    /// Refreshes address and timestamps in place.
    pub(crate) fn touch(&mut self, address: impl Into<String>) {
        self.address = address.into();
        self.last_heartbeat = Utc::now();
        self.seen = Instant::now();
    }

    /// Last heartbeat formatted as RFC 3339 with second precision.
    pub fn last_heartbeat_rfc3339(&self) -> String {
        self.last_heartbeat
            .to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}
