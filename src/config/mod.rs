//! Configuration loading and management.
//!
//! This module is split into logical submodules:
//! - [`types`]: the top-level [`Config`] and loading
//! - [`bus`]: command bus tuning (prefix, bounded wait, queue sizes)
//! - [`player`]: participant role settings and quest content path
//! - [`console`]: console driver activation commands and bot identity
//! - [`validation`]: startup checks that report every problem at once

mod bus;
mod console;
mod defaults;
mod player;
mod types;
mod validation;

pub use bus::BusConfig;
pub use console::ConsoleConfig;
pub use player::PlayerSettings;
pub use types::{Config, ConfigError};
pub use validation::{ValidationError, validate};
