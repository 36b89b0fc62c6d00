//! Line-oriented console driver.
//!
//! Each input line is `<sender-id> <text>`. Activation commands start roles;
//! everything else is published on the bus as that sender.

use crate::bus::CommandBus;
use crate::config::Config;
use crate::error::QuestError;
use crate::output::{EchoOutput, Output};
use crate::quest::Quest;
use crate::roles::{Admin, Player, PlayerConfig};
use questbus_proto::{Attributes, SENDER_NAME};
use std::sync::Arc;
use tracing::{debug, info};

/// Builds the output a role writes to for a given recipient.
pub type OutputFactory = Arc<dyn Fn(&str) -> Arc<dyn Output> + Send + Sync>;

/// Split a line into sender id and text. Blank lines and lines without
/// text yield `None`.
pub fn parse_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    let (sender, text) = line.split_once(char::is_whitespace)?;
    let text = text.trim_start();
    (!text.is_empty()).then_some((sender, text))
}

/// What a line did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Ignored,
    PlayerStarted(String),
    AdminStarted(String),
    Published,
}

pub struct ConsoleDriver {
    bus: CommandBus,
    config: Config,
    outputs: OutputFactory,
    player: Option<Player>,
    admin: Option<Admin>,
}

impl ConsoleDriver {
    /// Create a driver with its own bus. Must be called inside a Tokio
    /// runtime.
    pub fn new(config: Config, outputs: OutputFactory) -> Self {
        let bus = CommandBus::new(&config.bus);
        Self {
            bus,
            config,
            outputs,
            player: None,
            admin: None,
        }
    }

    pub fn bus(&self) -> &CommandBus {
        &self.bus
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn admin(&self) -> Option<&Admin> {
        self.admin.as_ref()
    }

    /// Handle one input line.
    ///
    /// Fails only when the player command is given and the quest content
    /// cannot be loaded; the previous player is left running in that case.
    pub async fn handle_line(&mut self, line: &str) -> Result<LineOutcome, QuestError> {
        let Some((sender, text)) = parse_line(line) else {
            debug!("Ignoring malformed line");
            return Ok(LineOutcome::Ignored);
        };

        if text == self.config.console.player_command {
            self.start_player(sender).await?;
            return Ok(LineOutcome::PlayerStarted(sender.to_string()));
        }
        if text == self.config.console.admin_command {
            self.start_admin(sender).await;
            return Ok(LineOutcome::AdminStarted(sender.to_string()));
        }

        let mut attributes = Attributes::new();
        attributes.insert(SENDER_NAME.to_string(), sender.to_string());
        self.bus.publish(text, sender, attributes).await;
        Ok(LineOutcome::Published)
    }

    async fn start_player(&mut self, sender: &str) -> Result<(), QuestError> {
        let quest = Quest::load(&self.config.player.quest_path)?;

        if let Some(previous) = self.player.take() {
            previous.destroy();
        }

        let output: Arc<dyn Output> = Arc::new(EchoOutput::new(
            (self.outputs)(sender),
            self.bus.clone(),
            sender,
            self.config.console.bot_name.clone(),
        ));
        let config = PlayerConfig::from_settings(sender, &self.config.player);
        self.player = Some(Player::spawn(config, &self.bus, quest, output).await);
        info!(sender = %sender, "Player activated");
        Ok(())
    }

    async fn start_admin(&mut self, sender: &str) {
        if let Some(previous) = self.admin.take() {
            previous.destroy();
        }

        let admin = Admin::spawn(sender, &self.bus, (self.outputs)(sender)).await;
        admin.greeting().await;
        self.admin = Some(admin);
        info!(sender = %sender, "Admin activated");
    }

    /// Destroy any running roles.
    pub fn shutdown(&mut self) {
        if let Some(player) = self.player.take() {
            player.destroy();
        }
        if let Some(admin) = self.admin.take() {
            admin.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_line_splits_sender() {
        assert_eq!(parse_line("42 /a forty two"), Some(("42", "/a forty two")));
        assert_eq!(parse_line("  7    hello  "), Some(("7", "hello")));
    }

    #[test]
    fn parse_line_rejects_incomplete() {
        assert_eq!(parse_line(""), None);
        assert_eq!(parse_line("   "), None);
        assert_eq!(parse_line("42"), None);
        assert_eq!(parse_line("42   "), None);
    }
}
