//! Actor owning the topic -> subscribers map.
//!
//! # Architecture
//!
//! - **State Ownership**: `SubscriptionRegistry` is the only code that ever
//!   touches the map. It runs in its own Tokio task.
//! - **Message Passing**: create, send, evict and count arrive as
//!   [`RegistryEvent`]s on one queue, so they are applied strictly in order.
//! - **Bounded Wait**: a command counts as delivered once the subscriber has
//!   taken it off its channel. A subscriber that does not do so within the
//!   delivery timeout is dangling: the command is revoked and the subscriber
//!   evicted. The command is not retried.

use super::types::{Handoff, RegistryEvent, SubscriptionId};
use crate::error::BusError;
use crate::metrics::{self, EvictionReason};
use questbus_proto::{Command, Topic};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{Instrument, debug, trace, warn};

/// Capacity of each raw subscription channel. With one slot a send completes
/// as soon as the value is queued, and the following `reserve` only resolves
/// once the subscriber has taken it.
pub(crate) const SUBSCRIPTION_CAPACITY: usize = 1;

struct Subscriber {
    id: SubscriptionId,
    sender: mpsc::Sender<Handoff>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Taken,
    TimedOut,
    Closed,
}

/// The registry actor.
pub struct SubscriptionRegistry {
    topics: HashMap<Topic, Vec<Subscriber>>,
    delivery_timeout: Duration,
}

impl SubscriptionRegistry {
    pub fn new(delivery_timeout: Duration) -> Self {
        Self {
            topics: HashMap::new(),
            delivery_timeout,
        }
    }

    /// Spawn the actor and return a handle to it.
    ///
    /// The actor stops once every strong [`RegistryHandle`] is dropped,
    /// closing all remaining subscriptions.
    pub fn spawn(delivery_timeout: Duration, queue_capacity: usize) -> RegistryHandle {
        let (tx, rx) = mpsc::channel(queue_capacity);
        let actor = Self::new(delivery_timeout);

        tokio::spawn(
            async move {
                actor.run(rx).await;
            }
            .instrument(crate::telemetry::registry()),
        );

        RegistryHandle { tx }
    }

    /// The main actor loop.
    pub async fn run(mut self, mut rx: mpsc::Receiver<RegistryEvent>) {
        while let Some(event) = rx.recv().await {
            self.handle_event(event).await;
        }
        let remaining = self.close();
        debug!(remaining, "Registry stopped");
    }

    /// Drop every remaining subscriber, closing their streams. Returns how
    /// many there were.
    fn close(&mut self) -> usize {
        let remaining: usize = self.topics.drain().map(|(_, subs)| subs.len()).sum();
        metrics::record_unsubscribed(remaining);
        remaining
    }

    async fn handle_event(&mut self, event: RegistryEvent) {
        match event {
            RegistryEvent::Create { topic, id, sender } => {
                self.create(topic, id, sender);
            }
            RegistryEvent::Send { command } => {
                self.send(command).await;
            }
            RegistryEvent::Evict { topic, id } => {
                self.evict(&topic, id, EvictionReason::Requested);
            }
            RegistryEvent::Count { topic, reply_tx } => {
                let _ = reply_tx.send(self.count(&topic));
            }
        }
    }

    fn create(&mut self, topic: Topic, id: SubscriptionId, sender: mpsc::Sender<Handoff>) {
        trace!(topic = %topic, subscription = %id, "Subscription created");
        self.topics
            .entry(topic)
            .or_default()
            .push(Subscriber { id, sender });
        metrics::record_subscribed();
    }

    async fn send(&mut self, command: Arc<Command>) {
        let Some(subscribers) = self.topics.get(command.topic()) else {
            metrics::record_fanout(0);
            return;
        };

        let mut delivered = 0;
        let mut dangling = Vec::new();
        for subscriber in subscribers {
            match self.deliver(subscriber, &command).await {
                Delivery::Taken => delivered += 1,
                Delivery::TimedOut => {
                    warn!(
                        topic = %command.topic(),
                        subscription = %subscriber.id,
                        timeout = ?self.delivery_timeout,
                        "Dangling subscription: command not taken in time"
                    );
                    dangling.push((subscriber.id, EvictionReason::Timeout));
                }
                Delivery::Closed => {
                    debug!(
                        topic = %command.topic(),
                        subscription = %subscriber.id,
                        "Subscription receiver dropped"
                    );
                    dangling.push((subscriber.id, EvictionReason::Closed));
                }
            }
        }
        metrics::record_fanout(delivered);

        for (id, reason) in dangling {
            self.evict(command.topic(), id, reason);
        }
    }

    async fn deliver(&self, subscriber: &Subscriber, command: &Arc<Command>) -> Delivery {
        let handoff = Handoff::new(Arc::clone(command));
        let claim = handoff.claim_flag();
        let attempt = async {
            if subscriber.sender.send(handoff).await.is_err() {
                return Delivery::Closed;
            }
            // Capacity only comes back once the subscriber has received.
            match subscriber.sender.reserve().await {
                Ok(_permit) => Delivery::Taken,
                Err(_) => Delivery::Closed,
            }
        };

        match tokio::time::timeout(self.delivery_timeout, attempt).await {
            Ok(delivery) => delivery,
            // Still queued: take it back so the evicted subscriber never sees it.
            Err(_) if Handoff::revoke(&claim) => Delivery::TimedOut,
            // Received just as the wait ran out.
            Err(_) => Delivery::Taken,
        }
    }

    /// Remove the first subscriber matching `id`. Returns whether one was found.
    fn evict(&mut self, topic: &str, id: SubscriptionId, reason: EvictionReason) -> bool {
        let Some(subscribers) = self.topics.get_mut(topic) else {
            return false;
        };
        let Some(idx) = subscribers.iter().position(|s| s.id == id) else {
            return false;
        };

        // Dropping the sender closes the subscriber's stream.
        subscribers.remove(idx);
        if subscribers.is_empty() {
            self.topics.remove(topic);
        }

        debug!(topic = %topic, subscription = %id, reason = reason.as_str(), "Subscription evicted");
        metrics::record_eviction(reason);
        true
    }

    fn count(&self, topic: &str) -> usize {
        self.topics.get(topic).map_or(0, Vec::len)
    }
}

/// Cloneable handle for sending requests to the registry actor.
#[derive(Debug, Clone)]
pub struct RegistryHandle {
    tx: mpsc::Sender<RegistryEvent>,
}

impl RegistryHandle {
    pub async fn create(
        &self,
        topic: Topic,
        id: SubscriptionId,
        sender: mpsc::Sender<Handoff>,
    ) -> Result<(), BusError> {
        self.request(RegistryEvent::Create { topic, id, sender }).await
    }

    pub async fn send(&self, command: Arc<Command>) -> Result<(), BusError> {
        self.request(RegistryEvent::Send { command }).await
    }

    pub async fn evict(&self, topic: Topic, id: SubscriptionId) -> Result<(), BusError> {
        self.request(RegistryEvent::Evict { topic, id }).await
    }

    pub async fn count(&self, topic: Topic) -> Result<usize, BusError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.request(RegistryEvent::Count { topic, reply_tx }).await?;
        reply_rx.await.map_err(|_| BusError::NoReply)
    }

    /// A handle that does not keep the actor alive.
    pub fn downgrade(&self) -> WeakRegistryHandle {
        WeakRegistryHandle {
            tx: self.tx.downgrade(),
        }
    }

    async fn request(&self, event: RegistryEvent) -> Result<(), BusError> {
        self.tx
            .send(event)
            .await
            .map_err(|_| BusError::RegistryClosed)
    }
}

/// Registry handle held by relay tasks, which must not keep the registry
/// running on their own.
#[derive(Debug, Clone)]
pub struct WeakRegistryHandle {
    tx: mpsc::WeakSender<RegistryEvent>,
}

impl WeakRegistryHandle {
    pub fn upgrade(&self) -> Option<RegistryHandle> {
        self.tx.upgrade().map(|tx| RegistryHandle { tx })
    }
}
