//! # Core handler trait
//!
//! `Handler` is the extension point for reacting to host transitions. The
//! dispatcher spawns one detached task per matched invocation, so a handler may
//! be slow (I/O, external commands) without stalling heartbeats or the sweep.
//!
//! ## Contract
//! - Invocations for different transitions may overlap and complete in any
//!   order; implementations must be idempotent and order-tolerant.
//! - The returned error is logged by the dispatcher and goes nowhere else.
//! - A panic is caught and logged; it does not affect other handlers.
//!
//! ## Example (skeleton)
//! ```rust
//! use async_trait::async_trait;
//! use warden::{Event, Handler, HandlerError};
//!
//! struct Audit;
//!
//! #[async_trait]
//! impl Handler for Audit {
//!     async fn on_event(&self, ev: &Event) -> Result<(), HandlerError> {
//!         let _ = (ev.kind, &ev.host.name);
//!         Ok(())
//!     }
//!     fn name(&self) -> &str { "audit" }
//! }
//! ```

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::events::Event;

/// Contract for transition handlers.
#[async_trait]
pub trait Handler: Send + Sync + 'static {
    /// Handle a single transition.
    async fn on_event(&self, event: &Event) -> Result<(), HandlerError>;

    /// Human-readable name (for logs).
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Shared handle to a handler.
pub type HandlerRef = Arc<dyn Handler>;
