//! # Expiry sweeper: removes silent hosts and reports them offline.
//!
//! A single long-lived task started by [`WardenBuilder::build`](crate::WardenBuilder::build).
//!
//! ## Cycle
//! ```text
//! loop {
//!   ├─► lock
//!   ├─► while earliest deadline <= now:
//!   │       pop host ─► snapshot(remaining) ─► dispatch(offline)
//!   ├─► next = earliest remaining deadline
//!   ├─► unlock
//!   └─► wait:
//!         ├─ Some(next) ─► sleep_until(next)
//!         ├─ None       ─► park until the first heartbeat lands in the empty table
//!         └─ cancelled  ─► exit
//! }
//! ```
//!
//! ## Rules
//! - Hosts are removed **one at a time**; each offline transition sees the table
//!   after its own removal, so group triggers fire once even when several hosts
//!   expire in the same cycle
//! - The wait is recomputed every cycle and never exceeds `ttl` while hosts exist
//! - A cycle has no fallible step; nothing inside it can stop the loop

use std::sync::Arc;

use tokio::time::{Instant, sleep_until};
use tracing::{debug, info};

use super::warden::{Shared, State};

/// Runs the sweep loop until the shared cancellation token fires.
pub(crate) async fn run(shared: Arc<Shared>) {
    debug!(ttl = ?shared.ttl, "sweeper started");

    loop {
        let next = sweep_once(&shared).await;

        match next {
            Some(at) => {
                tokio::select! {
                    biased;
                    _ = shared.token.cancelled() => break,
                    _ = sleep_until(at) => {}
                }
            }
            None => {
                tokio::select! {
                    biased;
                    _ = shared.token.cancelled() => break,
                    _ = shared.wake.notified() => {}
                }
            }
        }
    }

    debug!("sweeper stopped");
}

/// One sweep cycle; returns the next deadline, if any host remains.
pub(crate) async fn sweep_once(shared: &Shared) -> Option<Instant> {
    let mut guard = shared.state.lock().await;
    let State {
        table,
        subscriptions,
    } = &mut *guard;
    let now = Instant::now();

    while let Some(host) = table.pop_expired(now) {
        let online = table.snapshot();
        info!(host = %host.name, address = %host.address, online = online.len(), "host offline");
        shared
            .dispatcher
            .dispatch(subscriptions, false, &host, online);
    }

    table.next_deadline()
}
