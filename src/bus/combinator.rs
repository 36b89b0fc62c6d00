//! Merging several subscriptions into one stream with a single teardown.
//!
//! A combinator task waits on all of its inputs and on its teardown token at
//! once. Items are forwarded in arrival order; teardown closes the output
//! exactly once and ends the task. Roles build their filtered inputs with
//! [`Teardown::child_token`] so one `destroy` also stops every relay feeding
//! the combinator.

use super::types::Subscription;
use futures_util::StreamExt;
use futures_util::stream::{BoxStream, SelectAll, select_all};
use questbus_proto::Command;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, warn};

/// Idempotent destroy signal shared by a combinator and its inputs.
#[derive(Debug, Clone, Default)]
pub struct Teardown {
    token: CancellationToken,
    destroyed: Arc<AtomicBool>,
}

impl Teardown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token for an input that should stop together with this teardown.
    pub fn child_token(&self) -> CancellationToken {
        self.token.child_token()
    }

    /// Fire the teardown. Returns `false` if it had already fired.
    pub fn destroy(&self) -> bool {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            debug!("Teardown already fired");
            return false;
        }
        self.token.cancel();
        true
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    /// Resolves once the teardown has fired.
    pub async fn destroyed(&self) {
        self.token.cancelled().await;
    }
}

/// Merged output of several subscriptions.
#[derive(Debug)]
pub struct Combinator {
    output: mpsc::Receiver<Arc<Command>>,
    teardown: Teardown,
}

impl Combinator {
    /// Spawn the forwarding task over `inputs`.
    pub fn spawn(inputs: Vec<Subscription>, teardown: Teardown) -> Self {
        // Single slot: the task hands items over one at a time, like the
        // subscriptions feeding it.
        let (tx, rx) = mpsc::channel(1);
        let span = crate::telemetry::combinator(inputs.len());
        let merged = select_all(inputs.into_iter().map(Subscription::into_stream));

        let token = teardown.token.clone();
        tokio::spawn(forward(merged, tx, token).instrument(span));

        Self {
            output: rx,
            teardown,
        }
    }

    /// Next merged command, or `None` once torn down.
    pub async fn recv(&mut self) -> Option<Arc<Command>> {
        self.output.recv().await
    }

    pub fn teardown(&self) -> &Teardown {
        &self.teardown
    }

    /// Shorthand for `teardown().destroy()`.
    pub fn destroy(&self) -> bool {
        self.teardown.destroy()
    }
}

async fn forward(
    mut merged: SelectAll<BoxStream<'static, Arc<Command>>>,
    output: mpsc::Sender<Arc<Command>>,
    token: CancellationToken,
) {
    loop {
        let cmd = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            next = merged.next() => match next {
                Some(cmd) => cmd,
                None => {
                    // Output stays open until teardown, even with nothing left to read.
                    warn!("All combinator inputs closed");
                    token.cancelled().await;
                    break;
                }
            },
        };

        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            sent = output.send(cmd) => {
                if sent.is_err() {
                    debug!("Combinator output dropped");
                    break;
                }
            }
        }
    }
    // `output` drops here: the one and only close of the merged stream.
}
