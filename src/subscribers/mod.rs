//! # Transition handlers and their dispatch.
//!
//! This module provides the [`Handler`] trait, built-in implementations and the
//! [`Dispatcher`] that decides which handlers fire for a host transition.
//!
//! ## Architecture
//! ```text
//! Warden (under lock) ── transition ──► Dispatcher::dispatch
//!                                           │  for each Subscription (registration order)
//!                                           │      matches(went_online, host, online)?
//!                                           │
//!                                           ├──► task ──► CommandHandler::on_event
//!                                           ├──► task ──► LogWriter::on_event
//!                                           └──► task ──► Custom::on_event
//! ```
//!
//! ## Handler types
//! - [`CommandHandler`] runs a shell command (the configured `exec` action)
//! - [`LogWriter`] logs transitions through `tracing`
//! - [`HandlerFn`] wraps a closure
//!
//! ## Implementing custom handlers
//! ```no_run
//! use warden::{Event, EventKind, Handler, HandlerError};
//! use async_trait::async_trait;
//!
//! struct Pager;
//!
//! #[async_trait]
//! impl Handler for Pager {
//!     async fn on_event(&self, event: &Event) -> Result<(), HandlerError> {
//!         if event.kind == EventKind::Offline {
//!             // page someone about event.host.name
//!         }
//!         Ok(())
//!     }
//! }
//! ```

mod command;
mod dispatcher;
mod handler;
mod handler_fn;
mod log;
mod subscription;

pub use command::CommandHandler;
pub use dispatcher::Dispatcher;
pub use handler::{Handler, HandlerRef};
pub use handler_fn::HandlerFn;
pub use log::LogWriter;
pub use subscription::Subscription;
