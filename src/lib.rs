//! # warden
//!
//! **Warden** is a heartbeat liveness monitor.
//!
//! Hosts announce themselves by posting heartbeats over HTTP. A host becomes
//! *online* with its first heartbeat and *offline* once no heartbeat arrived
//! for the configured TTL. Each transition is matched against registered
//! subscriptions, and every match runs its handler in a separate task so a
//! slow or failing handler never blocks the registry.
//!
//! ## Architecture
//! ```text
//!   POST /hosts/{name}        GET /hosts
//!          │                      │
//!          ▼                      ▼
//! ┌───────────────────────────────────────────────────────────────┐
//! │  Warden (registry facade)                                     │
//! │  - HostTable (hosts by name + deadline-ordered expiry index)  │
//! │  - Vec<Subscription> (event kind + host filter + handler)     │
//! │  - Dispatcher (TaskTracker for handler tasks)                 │
//! └──────┬──────────────────────────────┬─────────────────────────┘
//!        │ first heartbeat              │ deadline reached
//!        ▼                              ▼
//!   online transition             sweeper task: offline transition
//!        │                              │
//!        └──────────────┬───────────────┘
//!                       ▼
//!       Subscription::matches(went_online, host, online)
//!                       │
//!          ┌────────────┼────────────┐
//!          ▼            ▼            ▼
//!      handler       handler      handler      (one tokio task each)
//! ```
//!
//! ## Event kinds
//! | kind          | fires when                                                            |
//! |---------------|-----------------------------------------------------------------------|
//! | `online`      | a host in the filter (or any host) comes online                       |
//! | `online-all`  | a filtered host comes online and every filtered host is now online    |
//! | `offline`     | a host in the filter (or any host) goes offline                       |
//! | `offline-all` | a host goes offline and none of the filtered (or any) hosts remain    |
//!
//! ## Features
//! | Area              | Description                                          | Key types / traits                       |
//! |-------------------|------------------------------------------------------|------------------------------------------|
//! | **Registry**      | Heartbeats, listing, expiry and shutdown.            | [`Warden`], [`WardenBuilder`], [`Config`] |
//! | **Handlers**      | React to transitions.                                | [`Handler`], [`HandlerFn`], [`CommandHandler`], [`LogWriter`] |
//! | **Events**        | Transition payloads with host snapshots.             | [`Event`], [`EventKind`], [`Host`]       |
//! | **Errors**        | Typed errors for handlers, config and shutdown.      | [`HandlerError`], [`ConfigError`], [`RuntimeError`] |
//! | **Configuration** | TOML file with TTL, listener and notification blocks.| [`Settings`], [`Action`]                 |
//! | **HTTP**          | Plain-text heartbeat and listing endpoints.          | [`http::router`], [`http::serve`]        |
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use warden::{Config, Event, EventKind, HandlerError, HandlerFn, Subscription, Warden};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let alert = HandlerFn::arc("alert", |ev: Event| async move {
//!         println!("database tier down (last: {})", ev.host.name);
//!         Ok::<_, HandlerError>(())
//!     });
//!
//!     let warden = Warden::builder(Config::with_ttl(Duration::from_secs(30)))
//!         .with_subscription(Subscription::new(EventKind::OfflineAll, ["db1", "db2"], alert))
//!         .build();
//!
//!     warden.heartbeat("db1", "10.0.0.1").await;
//!     warden.heartbeat("db2", "10.0.0.2").await;
//!
//!     warden.shutdown().await?;
//!     Ok(())
//! }
//! ```
mod core;
mod error;
mod events;
mod settings;
mod subscribers;

pub mod http;

// ---- Public re-exports ----

pub use crate::core::{Config, ShutdownSignal, Warden, WardenBuilder, wait_for_shutdown_signal};
pub use error::{ConfigError, HandlerError, RuntimeError};
pub use events::{Event, EventKind, Host, UnknownEventKind};
pub use settings::{Action, Settings};
pub use subscribers::{
    CommandHandler, Dispatcher, Handler, HandlerFn, HandlerRef, LogWriter, Subscription,
};
