//! Participant role configuration.

use serde::Deserialize;
use std::time::Duration;

use super::defaults::{default_quest_path, default_wrong_answers_for_clue};

/// Participant (player) settings.
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerSettings {
    /// Path to the quest content file (JSON).
    #[serde(default = "default_quest_path")]
    pub quest_path: String,
    /// Written to the player when the role starts (skipped if empty).
    #[serde(default)]
    pub intro_message: String,
    /// Written once the last mission is solved (skipped if empty).
    #[serde(default)]
    pub outro_message: String,
    /// Seconds to wait before the outro message.
    #[serde(default)]
    pub outro_delay_secs: u64,
    /// Wrong answers on one mission before its clue is revealed; 0 never
    /// reveals it (default: 3).
    #[serde(default = "default_wrong_answers_for_clue")]
    pub wrong_answers_for_clue: u32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            quest_path: default_quest_path(),
            intro_message: String::new(),
            outro_message: String::new(),
            outro_delay_secs: 0,
            wrong_answers_for_clue: default_wrong_answers_for_clue(),
        }
    }
}

impl PlayerSettings {
    pub fn outro_delay(&self) -> Duration {
        Duration::from_secs(self.outro_delay_secs)
    }
}
