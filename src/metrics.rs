//! Prometheus metrics collection for questbus.
//!
//! Metrics live in a private registry and are exported on demand through
//! [`gather_metrics`]. Until [`init`] runs every recording helper is a no-op,
//! so library users that never initialise metrics pay nothing.
//!
//! - `questbus_commands_published_total` - commands accepted by the bus
//! - `questbus_commands_ignored_total` - publishes that parsed to nothing
//! - `questbus_deliveries_total` - commands taken by a subscriber
//! - `questbus_evictions_total{reason}` - subscriptions removed from the registry
//! - `questbus_active_subscriptions` - subscriptions currently registered
//! - `questbus_delivery_fanout` - subscribers reached per command
//! - `questbus_output_errors_total` - failed output writes

use prometheus::{
    Encoder, Histogram, HistogramOpts, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use std::sync::OnceLock;

/// Global Prometheus registry for all metrics.
pub static REGISTRY: OnceLock<Registry> = OnceLock::new();

pub fn registry() -> &'static Registry {
    REGISTRY.get_or_init(Registry::new)
}

// ========================================================================
// Counters (monotonic increasing)
// ========================================================================

/// Commands accepted by the bus and handed to the registry.
pub static COMMANDS_PUBLISHED: OnceLock<IntCounter> = OnceLock::new();

/// Publishes dropped because the text parsed to no command.
pub static COMMANDS_IGNORED: OnceLock<IntCounter> = OnceLock::new();

/// Successful deliveries to individual subscribers.
pub static DELIVERIES: OnceLock<IntCounter> = OnceLock::new();

/// Subscriptions removed from the registry, by reason.
pub static EVICTIONS: OnceLock<IntCounterVec> = OnceLock::new();

/// Output writes that failed.
pub static OUTPUT_ERRORS: OnceLock<IntCounter> = OnceLock::new();

// ========================================================================
// Gauges and histograms
// ========================================================================

/// Subscriptions currently registered across all topics.
pub static ACTIVE_SUBSCRIPTIONS: OnceLock<IntGauge> = OnceLock::new();

/// Subscribers reached per published command.
pub static DELIVERY_FANOUT: OnceLock<Histogram> = OnceLock::new();

/// Initialize the Prometheus metrics registry.
///
/// Safe to call more than once; only the first call registers anything.
pub fn init() {
    let r = registry();

    // Helper macro to register metric
    macro_rules! register {
        ($metric:ident, $init:expr) => {
            if $metric.get().is_none() {
                match $init {
                    Ok(m) => {
                        if let Err(e) = r.register(Box::new(m.clone())) {
                            tracing::warn!(error = %e, concat!("Failed to register metric ", stringify!($metric)));
                        }
                        let _ = $metric.set(m);
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, concat!("Failed to create metric ", stringify!($metric)));
                    }
                }
            }
        };
    }

    register!(COMMANDS_PUBLISHED, IntCounter::new("questbus_commands_published_total", "Commands accepted by the bus"));
    register!(COMMANDS_IGNORED, IntCounter::new("questbus_commands_ignored_total", "Publishes that parsed to no command"));
    register!(DELIVERIES, IntCounter::new("questbus_deliveries_total", "Commands taken by a subscriber"));
    register!(EVICTIONS, IntCounterVec::new(Opts::new("questbus_evictions_total", "Subscriptions removed from the registry"), &["reason"]));
    register!(OUTPUT_ERRORS, IntCounter::new("questbus_output_errors_total", "Failed output writes"));
    register!(ACTIVE_SUBSCRIPTIONS, IntGauge::new("questbus_active_subscriptions", "Subscriptions currently registered"));
    register!(DELIVERY_FANOUT, Histogram::with_opts(
        HistogramOpts::new("questbus_delivery_fanout", "Subscribers reached per published command")
            .buckets(vec![0.0, 1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0])));
}

/// Gather all metrics and encode them in Prometheus text format.
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = registry().gather();
    let mut buffer = vec![];
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode Prometheus metrics");
        return String::new();
    }
    match String::from_utf8(buffer) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "Prometheus metrics were not valid UTF-8");
            String::new()
        }
    }
}

// ============================================================================
// Helper functions for bus metric updates
// ============================================================================

/// Why a subscription left the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvictionReason {
    /// The subscriber did not take a command within the bounded wait.
    Timeout,
    /// The receiving half was dropped.
    Closed,
    /// A consumer asked for the subscription to be removed.
    Requested,
}

impl EvictionReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Closed => "closed",
            Self::Requested => "requested",
        }
    }
}

#[inline]
pub fn record_published() {
    if let Some(c) = COMMANDS_PUBLISHED.get() {
        c.inc();
    }
}

#[inline]
pub fn record_ignored() {
    if let Some(c) = COMMANDS_IGNORED.get() {
        c.inc();
    }
}

/// Record how many subscribers took a command.
#[inline]
pub fn record_fanout(delivered: usize) {
    if let Some(c) = DELIVERIES.get() {
        c.inc_by(delivered as u64);
    }
    if let Some(h) = DELIVERY_FANOUT.get() {
        h.observe(delivered as f64);
    }
}

#[inline]
pub fn record_subscribed() {
    if let Some(g) = ACTIVE_SUBSCRIPTIONS.get() {
        g.inc();
    }
}

#[inline]
pub fn record_eviction(reason: EvictionReason) {
    if let Some(c) = EVICTIONS.get() {
        c.with_label_values(&[reason.as_str()]).inc();
    }
    if let Some(g) = ACTIVE_SUBSCRIPTIONS.get() {
        g.dec();
    }
}

/// Subscriptions dropped without eviction, e.g. when the registry stops.
#[inline]
pub fn record_unsubscribed(count: usize) {
    if let Some(g) = ACTIVE_SUBSCRIPTIONS.get() {
        g.sub(count as i64);
    }
}

#[inline]
pub fn record_output_error() {
    if let Some(c) = OUTPUT_ERRORS.get() {
        c.inc();
    }
}
