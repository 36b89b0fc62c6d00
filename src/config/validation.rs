//! Configuration validation.
//!
//! Validates configuration at startup to catch common errors early.

use super::Config;
use std::path::Path;
use thiserror::Error;

/// Validation errors for configuration.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("bus.command_prefix must not be whitespace")]
    WhitespacePrefix,
    #[error("bus.delivery_timeout_ms must be greater than zero")]
    ZeroDeliveryTimeout,
    #[error("bus.queue_capacity must be greater than zero")]
    ZeroQueueCapacity,
    #[error("bus.relay_buffer must be greater than zero")]
    ZeroRelayBuffer,
    #[error("console.{0} must not be empty")]
    EmptyActivationCommand(&'static str),
    #[error("console.player_command and console.admin_command must differ, both are '{0}'")]
    DuplicateActivationCommand(String),
    #[error("player.quest_path does not exist: {0}")]
    QuestNotFound(String),
}

/// Validate a configuration, returning all errors found.
pub fn validate(config: &Config) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    // Bus tuning
    if config.bus.command_prefix.is_whitespace() {
        errors.push(ValidationError::WhitespacePrefix);
    }
    if config.bus.delivery_timeout_ms == 0 {
        errors.push(ValidationError::ZeroDeliveryTimeout);
    }
    if config.bus.queue_capacity == 0 {
        errors.push(ValidationError::ZeroQueueCapacity);
    }
    if config.bus.relay_buffer == 0 {
        errors.push(ValidationError::ZeroRelayBuffer);
    }

    // Console activation commands
    let console = &config.console;
    if console.player_command.trim().is_empty() {
        errors.push(ValidationError::EmptyActivationCommand("player_command"));
    }
    if console.admin_command.trim().is_empty() {
        errors.push(ValidationError::EmptyActivationCommand("admin_command"));
    }
    if !console.player_command.is_empty() && console.player_command == console.admin_command {
        errors.push(ValidationError::DuplicateActivationCommand(
            console.player_command.clone(),
        ));
    }

    // Quest content
    if !Path::new(&config.player.quest_path).exists() {
        errors.push(ValidationError::QuestNotFound(config.player.quest_path.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_quest() -> (Config, tempfile::NamedTempFile) {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.player.quest_path = file.path().display().to_string();
        (config, file)
    }

    #[test]
    fn defaults_with_existing_quest_are_valid() {
        let (config, _file) = config_with_quest();
        assert_eq!(validate(&config), Ok(()));
    }

    #[test]
    fn reports_every_problem() {
        let mut config = Config::default();
        config.bus.command_prefix = ' ';
        config.bus.delivery_timeout_ms = 0;
        config.bus.relay_buffer = 0;
        config.console.admin_command = config.console.player_command.clone();
        config.player.quest_path = "/definitely/not/here.json".to_string();

        let errors = validate(&config).unwrap_err();
        assert!(errors.contains(&ValidationError::WhitespacePrefix));
        assert!(errors.contains(&ValidationError::ZeroDeliveryTimeout));
        assert!(errors.contains(&ValidationError::ZeroRelayBuffer));
        assert!(errors.contains(&ValidationError::DuplicateActivationCommand(
            "/philadelphia".to_string()
        )));
        assert!(errors.contains(&ValidationError::QuestNotFound(
            "/definitely/not/here.json".to_string()
        )));
        assert!(!errors.contains(&ValidationError::ZeroQueueCapacity));
    }

    #[test]
    fn empty_activation_command() {
        let (mut config, _file) = config_with_quest();
        config.console.player_command = "  ".to_string();
        let errors = validate(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![ValidationError::EmptyActivationCommand("player_command")]
        );
    }
}
