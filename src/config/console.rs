//! Console driver configuration.

use serde::Deserialize;

use super::defaults::{default_admin_command, default_bot_name, default_player_command};

/// Console driver settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    /// Line that (re)starts the player role for its sender.
    #[serde(default = "default_player_command")]
    pub player_command: String,
    /// Line that (re)starts the admin role for its sender.
    #[serde(default = "default_admin_command")]
    pub admin_command: String,
    /// Display name attached to echoed bot output.
    #[serde(default = "default_bot_name")]
    pub bot_name: String,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            player_command: default_player_command(),
            admin_command: default_admin_command(),
            bot_name: default_bot_name(),
        }
    }
}
