//! Command bus configuration.

use serde::Deserialize;
use std::time::Duration;

use super::defaults::{
    default_command_prefix, default_delivery_timeout_ms, default_queue_capacity,
    default_relay_buffer,
};

/// Command bus tuning.
#[derive(Debug, Clone, Deserialize)]
pub struct BusConfig {
    /// Character marking a line as a command (default: `/`).
    #[serde(default = "default_command_prefix")]
    pub command_prefix: char,
    /// Milliseconds the registry waits for a subscriber to take a command
    /// before treating it as dangling (default: 20).
    #[serde(default = "default_delivery_timeout_ms")]
    pub delivery_timeout_ms: u64,
    /// Pending requests the registry queue holds before publishers wait
    /// (default: 128).
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
    /// Matching commands a filtered subscription buffers for a slow
    /// consumer (default: 32).
    #[serde(default = "default_relay_buffer")]
    pub relay_buffer: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            command_prefix: default_command_prefix(),
            delivery_timeout_ms: default_delivery_timeout_ms(),
            queue_capacity: default_queue_capacity(),
            relay_buffer: default_relay_buffer(),
        }
    }
}

impl BusConfig {
    /// The bounded delivery wait as a [`Duration`].
    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_millis(self.delivery_timeout_ms)
    }
}
