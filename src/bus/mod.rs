//! The command bus.
//!
//! [`CommandBus`] is the public facade: it parses published text, hands the
//! resulting [`Command`] to the [`SubscriptionRegistry`] actor, and derives
//! filtered subscriptions backed by relay tasks. [`Combinator`] merges
//! several subscriptions into one stream with a single teardown.

mod combinator;
mod registry;
mod relay;
mod types;

pub use combinator::{Combinator, Teardown};
pub use registry::{RegistryHandle, SubscriptionRegistry, WeakRegistryHandle};
pub use types::{Handoff, Predicate, RegistryEvent, Subscription, SubscriptionId};

use crate::config::BusConfig;
use crate::error::BusError;
use crate::metrics;
use questbus_proto::{Attributes, Command, Parser};
use registry::SUBSCRIPTION_CAPACITY;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, trace, warn};

/// Cloneable facade over the subscription registry.
///
/// Must be created inside a Tokio runtime: construction spawns the registry
/// actor, which lives until the last clone of the bus is dropped.
#[derive(Debug, Clone)]
pub struct CommandBus {
    registry: RegistryHandle,
    parser: Parser,
    relay_buffer: usize,
}

impl CommandBus {
    pub fn new(config: &BusConfig) -> Self {
        let registry =
            SubscriptionRegistry::spawn(config.delivery_timeout(), config.queue_capacity.max(1));
        Self {
            registry,
            parser: Parser::with_prefix(config.command_prefix),
            relay_buffer: config.relay_buffer.max(1),
        }
    }

    pub fn parser(&self) -> Parser {
        self.parser
    }

    /// Parse `text` and route it to the subscribers of its topic.
    ///
    /// Empty text produces no command and is dropped silently. The call
    /// returns once the command is queued; it never waits for delivery.
    pub async fn publish(&self, text: &str, sender_id: &str, attributes: Attributes) {
        let Some(parsed) = self.parser.parse(text) else {
            trace!(sender = %sender_id, "Ignoring empty text");
            metrics::record_ignored();
            return;
        };

        let command = Arc::new(Command::new(parsed, sender_id, attributes));
        trace!(topic = %command.topic(), sender = %sender_id, "Publishing command");

        if let Err(e) = self.registry.send(command).await {
            warn!(error = %e, sender = %sender_id, "Dropping command");
            return;
        }
        metrics::record_published();
    }

    /// Open a raw subscription on `topic`.
    ///
    /// If the registry has stopped the returned subscription is already
    /// closed.
    pub async fn subscribe(&self, topic: &str) -> Subscription {
        let (tx, rx) = mpsc::channel(SUBSCRIPTION_CAPACITY);
        let id = SubscriptionId::new();

        if let Err(e) = self.registry.create(topic.to_string(), id, tx).await {
            warn!(error = %e, topic = %topic, "Subscription not registered");
        }
        Subscription::new(id, topic.to_string(), rx)
    }

    /// Open a subscription on `topic` that only yields commands matching
    /// `predicate`.
    ///
    /// A relay task owns the underlying raw subscription. It stops, closing
    /// the returned stream and evicting the raw subscription, when `token`
    /// is cancelled, when the returned subscription is dropped, or when the
    /// registry evicts the raw subscription as dangling.
    pub async fn filtered_subscribe<F>(
        &self,
        topic: &str,
        predicate: F,
        token: CancellationToken,
    ) -> Subscription
    where
        F: Fn(&Command) -> bool + Send + Sync + 'static,
    {
        let raw = self.subscribe(topic).await;
        let (tx, rx) = mpsc::channel(self.relay_buffer);
        let filtered = Subscription::new(SubscriptionId::new(), topic.to_string(), rx);
        debug!(topic = %topic, raw = %raw.id(), filtered = %filtered.id(), "Filtered subscription");

        let relay = relay::run(
            raw,
            Box::new(predicate),
            tx,
            self.registry.downgrade(),
            token,
        );
        tokio::spawn(relay.instrument(crate::telemetry::relay(topic)));

        filtered
    }

    /// Remove a raw subscription from its topic. Evicting twice is harmless.
    pub async fn evict(&self, subscription: &Subscription) {
        let topic = subscription.topic().to_string();
        if let Err(e) = self.registry.evict(topic, subscription.id()).await {
            debug!(error = %e, "Eviction skipped");
        }
    }

    /// Point-in-time number of raw subscriptions on `topic`. Diagnostic only.
    pub async fn subscription_count(&self, topic: &str) -> Result<usize, BusError> {
        self.registry.count(topic.to_string()).await
    }
}
