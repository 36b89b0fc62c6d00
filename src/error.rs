//! Unified error handling for questbus.
//!
//! Nothing on the delivery path is fatal: empty input is dropped, slow
//! subscribers are evicted and output failures are logged by the caller.
//! The enums here cover the few surfaces that do report failure: registry
//! diagnostics and quest loading. Configuration errors live in
//! [`crate::config`] next to the types they describe.

use thiserror::Error;

// ============================================================================
// Bus Errors (registry requests)
// ============================================================================

/// Errors returned by requests that need an answer from the registry actor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BusError {
    /// The registry task has stopped; no further requests can be served.
    #[error("subscription registry is closed")]
    RegistryClosed,

    /// The registry dropped the reply channel without answering.
    #[error("subscription registry dropped the reply")]
    NoReply,
}

impl BusError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::RegistryClosed => "registry_closed",
            Self::NoReply => "no_reply",
        }
    }
}

// ============================================================================
// Quest Errors (content loading)
// ============================================================================

/// Errors raised while loading quest content.
#[derive(Debug, Error)]
pub enum QuestError {
    #[error("failed to read quest file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid quest JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("quest has no missions")]
    NoMissions,

    #[error("mission #{0} has no name")]
    UnnamedMission(usize),
}

impl QuestError {
    /// Get a static error code string for metrics labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Json(_) => "invalid_json",
            Self::NoMissions => "no_missions",
            Self::UnnamedMission(_) => "unnamed_mission",
        }
    }
}
