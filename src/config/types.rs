//! Core configuration types and loading.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

use super::bus::BusConfig;
use super::console::ConsoleConfig;
use super::player::PlayerSettings;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Top-level configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Command bus tuning.
    #[serde(default)]
    pub bus: BusConfig,
    /// Participant role settings.
    #[serde(default)]
    pub player: PlayerSettings,
    /// Console driver settings.
    #[serde(default)]
    pub console: ConsoleConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults when the file is absent.
    ///
    /// A file that exists but does not parse is still an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(&path) {
            Err(ConfigError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(
                    path = %path.as_ref().display(),
                    "Config file not found, using defaults"
                );
                Ok(Self::default())
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_is_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.bus.command_prefix, '/');
        assert_eq!(config.player.wrong_answers_for_clue, 3);
        assert_eq!(config.console.player_command, "/philadelphia");
        assert_eq!(config.console.admin_command, "/adminsecret");
    }

    #[test]
    fn load_full_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[bus]
delivery_timeout_ms = 40
relay_buffer = 8

[player]
quest_path = "content/quest.json"
intro_message = "Welcome, agent"
outro_message = "Well done"
outro_delay_secs = 2
wrong_answers_for_clue = 5

[console]
player_command = "/play"
bot_name = "Narrator"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.bus.delivery_timeout_ms, 40);
        assert_eq!(config.bus.relay_buffer, 8);
        assert_eq!(config.bus.queue_capacity, 128);
        assert_eq!(config.player.quest_path, "content/quest.json");
        assert_eq!(config.player.intro_message, "Welcome, agent");
        assert_eq!(config.player.outro_delay().as_secs(), 2);
        assert_eq!(config.player.wrong_answers_for_clue, 5);
        assert_eq!(config.console.player_command, "/play");
        assert_eq!(config.console.admin_command, "/adminsecret");
        assert_eq!(config.console.bot_name, "Narrator");
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.bus.delivery_timeout_ms, 20);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[bus\ncommand_prefix = ").unwrap();
        assert!(matches!(
            Config::load_or_default(file.path()),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn multi_char_prefix_is_rejected() {
        let result: Result<Config, _> = toml::from_str("[bus]\ncommand_prefix = \"//\"");
        assert!(result.is_err());
    }
}
