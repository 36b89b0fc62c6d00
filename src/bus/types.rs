use futures_util::StreamExt;
use futures_util::stream::{self, BoxStream};
use questbus_proto::{Command, Topic};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, oneshot};
use uuid::Uuid;

/// Identity of one subscription, used to evict it from its topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl SubscriptionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// One command handed to one subscriber.
///
/// Taking it is a claim: the subscriber claims it on receipt, the registry
/// claims it back when the bounded wait runs out. Whoever claims first wins,
/// so a revoked command is never seen by the subscriber.
#[derive(Debug)]
pub struct Handoff {
    command: Arc<Command>,
    claimed: Arc<AtomicBool>,
}

impl Handoff {
    pub(crate) fn new(command: Arc<Command>) -> Self {
        Self {
            command,
            claimed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared flag the registry keeps to revoke this handoff.
    pub(crate) fn claim_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.claimed)
    }

    /// Take the command unless it was revoked.
    pub(crate) fn claim(self) -> Option<Arc<Command>> {
        (!self.claimed.swap(true, Ordering::AcqRel)).then_some(self.command)
    }

    /// Revoke through a flag from [`Handoff::claim_flag`]. Returns `false` if
    /// the subscriber already took the command.
    pub(crate) fn revoke(flag: &AtomicBool) -> bool {
        !flag.swap(true, Ordering::AcqRel)
    }
}

/// Predicate a filtered subscription applies to each command.
pub type Predicate = Box<dyn Fn(&Command) -> bool + Send + Sync>;

/// A live, topic-scoped stream of commands.
///
/// The stream ends (`recv` returns `None`) once the sending side is gone:
/// for a raw subscription that means the registry evicted it, for a filtered
/// one that its relay stopped.
#[derive(Debug)]
pub struct Subscription {
    id: SubscriptionId,
    topic: Topic,
    rx: mpsc::Receiver<Handoff>,
}

impl Subscription {
    pub(crate) fn new(id: SubscriptionId, topic: Topic, rx: mpsc::Receiver<Handoff>) -> Self {
        Self { id, topic, rx }
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Wait for the next command. Commands revoked by the registry are
    /// skipped.
    pub async fn recv(&mut self) -> Option<Arc<Command>> {
        while let Some(handoff) = self.rx.recv().await {
            if let Some(cmd) = handoff.claim() {
                return Some(cmd);
            }
        }
        None
    }

    /// Take a command if one is already waiting.
    pub fn try_recv(&mut self) -> Result<Arc<Command>, TryRecvError> {
        loop {
            if let Some(cmd) = self.rx.try_recv()?.claim() {
                return Ok(cmd);
            }
        }
    }

    /// Turn the subscription into a stream, for merging with others.
    pub fn into_stream(self) -> BoxStream<'static, Arc<Command>> {
        stream::unfold(self, |mut sub| async move {
            let cmd = sub.recv().await?;
            Some((cmd, sub))
        })
        .boxed()
    }
}

/// Requests served by the registry actor.
#[derive(Debug)]
pub enum RegistryEvent {
    /// Register a new subscriber at the end of a topic's list.
    Create {
        topic: Topic,
        id: SubscriptionId,
        sender: mpsc::Sender<Handoff>,
    },
    /// Deliver a command to every subscriber of its topic.
    Send { command: Arc<Command> },
    /// Remove a subscriber; no-op if it is already gone.
    Evict { topic: Topic, id: SubscriptionId },
    /// Report how many subscribers a topic has.
    Count {
        topic: Topic,
        reply_tx: oneshot::Sender<usize>,
    },
}
