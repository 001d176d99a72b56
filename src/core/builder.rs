use std::sync::Arc;

use super::{config::Config, warden::Warden};
use crate::subscribers::Subscription;

/// Builder for constructing a [`Warden`] with its initial subscriptions.
pub struct WardenBuilder {
    cfg: Config,
    subscriptions: Vec<Subscription>,
}

impl WardenBuilder {
    /// Creates a new builder with the given configuration.
    pub fn new(cfg: Config) -> Self {
        Self {
            cfg,
            subscriptions: Vec::new(),
        }
    }

    /// Adds one subscription.
    ///
    /// Subscriptions fire in the order they were added.
    pub fn with_subscription(mut self, sub: Subscription) -> Self {
        self.subscriptions.push(sub);
        self
    }

    /// Adds several subscriptions, keeping their order.
    pub fn with_subscriptions(mut self, subs: impl IntoIterator<Item = Subscription>) -> Self {
        self.subscriptions.extend(subs);
        self
    }

    /// Builds the registry and starts its expiry sweeper.
    ///
    /// Must be called from within a tokio runtime.
    pub fn build(self) -> Arc<Warden> {
        Arc::new(Warden::start(self.cfg, self.subscriptions))
    }
}
