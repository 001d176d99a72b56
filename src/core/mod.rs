//! Registry core: host table, expiry sweep and lifecycle.
//!
//! The public API from this module is [`Warden`] (the registry facade), its
//! [`WardenBuilder`] and the runtime [`Config`].
//!
//! Internal modules:
//! - [`table`]: host map plus deadline-ordered expiry index;
//! - [`sweeper`]: background task removing expired hosts;
//! - [`warden`]: the synchronized facade and shutdown;
//! - [`builder`]: registry construction with initial subscriptions;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod builder;
mod config;
mod shutdown;
mod sweeper;
mod table;
mod warden;

pub use builder::WardenBuilder;
pub use config::Config;
pub use shutdown::{ShutdownSignal, wait_for_shutdown_signal};
pub use warden::Warden;
