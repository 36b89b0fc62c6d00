//! Default value functions for configuration.
//!
//! Separated into its own module for clarity and reuse.

use questbus_proto::DEFAULT_PREFIX;

// =============================================================================
// Bus Defaults
// =============================================================================

pub fn default_command_prefix() -> char {
    DEFAULT_PREFIX
}

/// Bounded wait for a subscriber to take a command before it is evicted.
pub fn default_delivery_timeout_ms() -> u64 {
    20
}

pub fn default_queue_capacity() -> usize {
    128
}

pub fn default_relay_buffer() -> usize {
    32
}

// =============================================================================
// Player Defaults
// =============================================================================

pub fn default_quest_path() -> String {
    "quest.json".to_string()
}

pub fn default_wrong_answers_for_clue() -> u32 {
    3
}

// =============================================================================
// Console Defaults
// =============================================================================

pub fn default_player_command() -> String {
    "/philadelphia".to_string()
}

pub fn default_admin_command() -> String {
    "/adminsecret".to_string()
}

pub fn default_bot_name() -> String {
    "Quest Bot".to_string()
}
