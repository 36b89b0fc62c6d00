//! Relay task behind a filtered subscription.

use super::registry::WeakRegistryHandle;
use super::types::{Handoff, Predicate, Subscription};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// Why a relay stopped forwarding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RelayExit {
    Cancelled,
    OutputDropped,
    Evicted,
}

/// Forward commands from `raw` to `output` while `predicate` holds.
///
/// Runs until the token is cancelled, the consumer drops the filtered
/// subscription, or the registry evicts `raw`. On the first two the raw
/// subscription is evicted so the registry stops delivering to it.
pub(crate) async fn run(
    mut raw: Subscription,
    predicate: Predicate,
    output: mpsc::Sender<Handoff>,
    registry: WeakRegistryHandle,
    token: CancellationToken,
) -> RelayExit {
    let exit = loop {
        let cmd = tokio::select! {
            biased;
            _ = token.cancelled() => break RelayExit::Cancelled,
            _ = output.closed() => break RelayExit::OutputDropped,
            next = raw.recv() => match next {
                Some(cmd) => cmd,
                None => break RelayExit::Evicted,
            },
        };

        if !predicate(cmd.as_ref()) {
            trace!(sender = %cmd.sender_id(), "Command filtered out");
            continue;
        }

        tokio::select! {
            biased;
            _ = token.cancelled() => break RelayExit::Cancelled,
            sent = output.send(Handoff::new(cmd)) => {
                if sent.is_err() {
                    break RelayExit::OutputDropped;
                }
            }
        }
    };

    if exit != RelayExit::Evicted
        && let Some(registry) = registry.upgrade()
    {
        let _ = registry.evict(raw.topic().to_string(), raw.id()).await;
    }

    debug!(subscription = %raw.id(), ?exit, "Relay stopped");
    exit
}
