//! # Registry runtime configuration.
//!
//! Provides [`Config`] centralized settings for the [`Warden`](crate::Warden) runtime.
//! It is usually derived from the configuration file
//! ([`Settings::warden_config`](crate::Settings::warden_config)), but can be
//! built directly when embedding the registry.

use std::time::Duration;

/// Runtime configuration for the registry.
///
/// ## Field semantics
/// - `ttl`: how long a host stays online without a heartbeat
/// - `grace`: maximum wait for in-flight handlers during shutdown (`0s` = abandon immediately)
#[derive(Clone, Debug)]
pub struct Config {
    /// Heartbeat time-to-live.
    ///
    /// A host whose last heartbeat is `ttl` or more in the past is removed by
    /// the sweeper and reported offline.
    pub ttl: Duration,

    /// Maximum time to wait for running handlers on shutdown.
    ///
    /// Handlers still running after `grace` are abandoned and
    /// `RuntimeError::GraceExceeded` is returned.
    pub grace: Duration,
}

impl Config {
    /// Creates a configuration with the given TTL and the default grace.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            ttl,
            ..Self::default()
        }
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `ttl = 30s`
    /// - `grace = 10s`
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
            grace: Duration::from_secs(10),
        }
    }
}
