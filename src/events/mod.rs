//! Host transitions: data model.
//!
//! This module groups the values that flow out of the registry:
//!
//! ## Contents
//! - [`Host`] value snapshot of one online host
//! - [`EventKind`], [`Event`] transition classification and handler payload
//!
//! ## Quick reference
//! - **Producers**: `Warden::heartbeat` (arrivals) and the expiry sweeper (departures),
//!   both through the dispatcher.
//! - **Consumers**: user [`Handler`](crate::Handler)s, each invocation in its own task.

mod event;
mod host;

pub use event::{Event, EventKind, UnknownEventKind};
pub use host::Host;
