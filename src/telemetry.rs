//! Span constructors for bus and role tasks.
//!
//! Every long-lived task is spawned inside one of these spans so log lines
//! from relays and combinators carry the topic or role they belong to.

use tracing::{Span, info_span};

/// Span for the registry actor.
pub fn registry() -> Span {
    info_span!("registry")
}

/// Span for a filtered-subscription relay.
pub fn relay(topic: &str) -> Span {
    info_span!("relay", topic = %topic)
}

/// Span for a combinator task.
pub fn combinator(inputs: usize) -> Span {
    info_span!("combinator", inputs = inputs)
}

/// Span for a consumer role's handler task.
pub fn role(kind: &'static str, user_id: &str) -> Span {
    info_span!("role", kind = kind, user_id = %user_id)
}
