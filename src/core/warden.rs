//! # Warden: the heartbeat registry facade.
//!
//! The [`Warden`] owns the host table, the subscription list, the dispatcher's
//! task tracker and the expiry sweeper. Every table read or write and every
//! subscription walk happens under one `tokio::sync::Mutex`.
//!
//! ## Key responsibilities
//! - accept heartbeats and emit an online transition for unseen hosts
//! - answer listing queries with independent snapshots
//! - accept subscription registration (at startup, or later under the same lock)
//! - shut down the sweeper and wait (bounded by [`Config::grace`]) for handlers
//!
//! ## High-level architecture
//! ```text
//! HTTP listener ──► heartbeat(name, addr) ─┐
//!               ──► hosts()                ├──► Mutex<State { HostTable, Vec<Subscription> }>
//! startup       ──► register(..)           │              │
//! sweeper task  ──► sweep_once() ──────────┘              ▼
//!                                               Dispatcher::dispatch (spawn, never await)
//!                                                          │
//!                                              TaskTracker ├──► handler task
//!                                                          └──► handler task
//! Shutdown path:
//!   shutdown() ─► token.cancel() ─► join sweeper
//!              ─► timeout(grace, dispatcher.drain())
//!                    ├─ Ok       → Ok(())
//!                    └─ elapsed  → Err(RuntimeError::GraceExceeded { pending })
//! ```
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use warden::{Config, Event, EventKind, HandlerError, HandlerFn, Warden};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let warden = Warden::builder(Config::with_ttl(Duration::from_secs(30))).build();
//!
//!     let printer = HandlerFn::arc("printer", |ev: Event| async move {
//!         println!("{} {}", ev.kind, ev.host.name);
//!         Ok::<_, HandlerError>(())
//!     });
//!     warden.register(EventKind::Online, Vec::<String>::new(), printer).await;
//!
//!     warden.heartbeat("web1", "10.0.0.7").await;
//!     assert_eq!(warden.hosts().await.len(), 1);
//!
//!     warden.shutdown().await?;
//!     Ok(())
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, trace, warn};

use super::builder::WardenBuilder;
use super::config::Config;
use super::table::HostTable;
use crate::error::RuntimeError;
use crate::events::{EventKind, Host};
use crate::subscribers::{Dispatcher, HandlerRef, Subscription};

/// Everything guarded by the registry lock.
pub(crate) struct State {
    pub(crate) table: HostTable,
    pub(crate) subscriptions: Vec<Subscription>,
}

/// State shared between the facade and the sweeper task.
pub(crate) struct Shared {
    pub(crate) ttl: Duration,
    pub(crate) state: Mutex<State>,
    pub(crate) dispatcher: Dispatcher,
    /// Wakes a parked sweeper when the first host lands in an empty table.
    pub(crate) wake: Notify,
    pub(crate) token: CancellationToken,
}

/// Heartbeat registry and transition dispatcher.
pub struct Warden {
    cfg: Config,
    shared: Arc<Shared>,
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

impl Warden {
    /// Returns a builder for configuring the registry.
    pub fn builder(cfg: Config) -> WardenBuilder {
        WardenBuilder::new(cfg)
    }

    /// Creates the registry and starts its sweeper.
    ///
    /// Must be called from within a tokio runtime.
    pub(crate) fn start(cfg: Config, subscriptions: Vec<Subscription>) -> Self {
        let shared = Arc::new(Shared {
            ttl: cfg.ttl,
            state: Mutex::new(State {
                table: HostTable::new(cfg.ttl),
                subscriptions,
            }),
            dispatcher: Dispatcher::new(),
            wake: Notify::new(),
            token: CancellationToken::new(),
        });
        let sweeper = tokio::spawn(super::sweeper::run(Arc::clone(&shared)));

        Self {
            cfg,
            shared,
            sweeper: Mutex::new(Some(sweeper)),
        }
    }

    /// Heartbeat time-to-live.
    pub fn ttl(&self) -> Duration {
        self.cfg.ttl
    }

    /// Records a heartbeat from `name` seen at `address`.
    ///
    /// An unseen name becomes online and fires the online transition; a known
    /// name only gets its address and timestamp refreshed.
    pub async fn heartbeat(&self, name: &str, address: &str) {
        let mut guard = self.shared.state.lock().await;
        let State {
            table,
            subscriptions,
        } = &mut *guard;

        if table.touch(name, address) {
            trace!(host = name, address, "heartbeat");
            return;
        }

        let was_empty = table.is_empty();
        let online = table.snapshot();
        let host = Host::new(name, address);
        table.insert(host.clone());
        info!(host = name, address, online = online.len(), "host online");

        self.shared
            .dispatcher
            .dispatch(subscriptions, true, &host, online);

        if was_empty {
            self.shared.wake.notify_one();
        }
    }

    /// Returns a snapshot of every online host (unordered).
    pub async fn hosts(&self) -> Vec<Host> {
        self.shared.state.lock().await.table.snapshot()
    }

    /// Number of online hosts.
    pub async fn len(&self) -> usize {
        self.shared.state.lock().await.table.len()
    }

    /// True if no host is online.
    pub async fn is_empty(&self) -> bool {
        self.shared.state.lock().await.table.is_empty()
    }

    /// Appends a subscription. An empty `hosts` filter means "any host".
    ///
    /// Intended for startup, but safe at any time: it takes the same lock as
    /// heartbeats and the sweeper.
    pub async fn register<I, S>(&self, event: EventKind, hosts: I, handler: HandlerRef)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sub = Subscription::new(event, hosts, handler);
        info!(event = %sub.event(), hosts = ?sub.hosts(), handler = sub.handler().name(), "subscription registered");
        self.shared.state.lock().await.subscriptions.push(sub);
    }

    /// Number of handler invocations still running.
    pub fn in_flight(&self) -> usize {
        self.shared.dispatcher.in_flight()
    }

    /// Stops the sweeper and waits up to [`Config::grace`] for running handlers.
    ///
    /// Handlers still running when the grace period ends are abandoned.
    /// Calling it more than once is harmless.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.shared.token.cancel();

        if let Some(handle) = self.sweeper.lock().await.take() {
            if let Err(err) = handle.await {
                warn!("sweeper task ended abnormally: {err}");
            }
        }

        let grace = self.cfg.grace;
        match tokio::time::timeout(grace, self.shared.dispatcher.drain()).await {
            Ok(()) => {
                info!("all handlers finished");
                Ok(())
            }
            Err(_) => {
                let pending = self.shared.dispatcher.in_flight();
                warn!(?grace, pending, "grace exceeded; abandoning handlers");
                Err(RuntimeError::GraceExceeded { grace, pending })
            }
        }
    }
}

impl Drop for Warden {
    fn drop(&mut self) {
        self.shared.token.cancel();
    }
}

impl std::fmt::Debug for Warden {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Warden").field("cfg", &self.cfg).finish_non_exhaustive()
    }
}
