//! # Detached, tracked fan-out of transitions to matching handlers.
//!
//! Provides [`Dispatcher`], which matches one transition against the registered
//! subscriptions and spawns one task per matched handler, without awaiting any
//! of them.
//!
//! ## Architecture
//! ```text
//! dispatch(went_online, host, online)
//!     │
//!     ├──► sub 1 matches? ──► tracker.spawn(handler1.on_event(ev))
//!     │                                └──► Err → warn, panic → error
//!     ├──► sub 2 matches? ──► (skip)
//!     └──► sub N matches? ──► tracker.spawn(handlerN.on_event(ev))
//! ```
//!
//! ## Rules
//! - **Registration order**: tasks are spawned in subscription order, completion order is unspecified
//! - **Non-blocking**: `dispatch()` returns immediately; it is safe to call under the registry lock
//! - **Isolation**: a failing or panicking handler doesn't affect others or the registry
//! - **Tracked**: every spawned task lives in a [`TaskTracker`] so shutdown can wait for it
//!
//! ## Panic handling
//! Handler futures run under `catch_unwind`; a panic is logged with the handler
//! name and the task ends normally.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a handler uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio_util::task::TaskTracker;
use tracing::{debug, error, warn};

use crate::events::{Event, Host};
use crate::subscribers::Subscription;

/// Matches transitions and spawns handler invocations.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    tracker: TaskTracker,
}

impl Dispatcher {
    /// Creates a dispatcher with its own task tracker.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tracker: TaskTracker::new(),
        }
    }

    /// Fans out one transition; returns how many handlers were spawned.
    ///
    /// `online` is the snapshot of the other online hosts. It is shared by all
    /// handlers fired for this transition.
    pub fn dispatch(
        &self,
        subscriptions: &[Subscription],
        went_online: bool,
        host: &Host,
        online: Vec<Host>,
    ) -> usize {
        let online: Arc<[Host]> = online.into();
        let mut fired = 0;

        for sub in subscriptions {
            let Some(kind) = sub.matches(went_online, host, &online) else {
                continue;
            };

            let event = Event::new(kind, host.clone(), Arc::clone(&online));
            let handler = Arc::clone(sub.handler());
            debug!(
                seq = event.seq,
                kind = %kind,
                host = %event.host.name,
                handler = handler.name(),
                "dispatching"
            );

            self.tracker.spawn(async move {
                let fut = handler.on_event(&event);
                match AssertUnwindSafe(fut).catch_unwind().await {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => {
                        warn!(
                            handler = handler.name(),
                            kind = %event.kind,
                            host = %event.host.name,
                            label = err.as_label(),
                            "handler failed: {err}"
                        );
                    }
                    Err(panic_err) => {
                        error!(
                            handler = handler.name(),
                            kind = %event.kind,
                            host = %event.host.name,
                            "handler panicked: {}",
                            panic_message(&*panic_err)
                        );
                    }
                }
            });
            fired += 1;
        }
        fired
    }

    /// Number of handler tasks still running.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    /// Closes the tracker and waits for every running handler to finish.
    ///
    /// Handlers spawned after this call are still tracked and awaited.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(any: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = any.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = any.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
