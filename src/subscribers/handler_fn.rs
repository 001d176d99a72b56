//! # Function-backed handler (`HandlerFn`)
//!
//! [`HandlerFn`] wraps a closure `F: Fn(Event) -> Fut`, producing a fresh
//! future per invocation. The closure receives an owned [`Event`] so the future
//! can be `'static`; if shared state is needed, capture an `Arc<...>` explicitly.
//!
//! ## Example
//! ```rust
//! use warden::{Event, HandlerError, HandlerFn, HandlerRef};
//!
//! let h: HandlerRef = HandlerFn::arc("printer", |ev: Event| async move {
//!     println!("{} {}", ev.kind, ev.host.name);
//!     Ok::<_, HandlerError>(())
//! });
//!
//! assert_eq!(h.name(), "printer");
//! ```

use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::HandlerError;
use crate::events::Event;
use crate::subscribers::handler::Handler;

/// Function-backed handler implementation.
#[derive(Debug)]
pub struct HandlerFn<F> {
    name: Cow<'static, str>,
    f: F,
}

impl<F> HandlerFn<F> {
    /// Creates a new function-backed handler.
    ///
    /// Prefer [`HandlerFn::arc`] when you immediately need a [`HandlerRef`](crate::HandlerRef).
    pub fn new(name: impl Into<Cow<'static, str>>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }

    /// Creates the handler and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, f))
    }
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), HandlerError>> + Send + 'static,
{
    async fn on_event(&self, event: &Event) -> Result<(), HandlerError> {
        (self.f)(event.clone()).await
    }

    fn name(&self) -> &str {
        &self.name
    }
}
