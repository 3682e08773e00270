//! Error codes for the flowboard engine.
//!
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! surfaced to the calling layer.

use core::fmt;

use serde::Serialize;

/// Centralized error codes for the flowboard engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum ErrorCode {
    // Resource Not Found
    /// Session id is unknown to the store
    SessionNotFound,
    /// Card is not on the board
    CardNotFound,
    /// Stage reference does not exist
    StageNotFound,
    /// Player id is not part of the roster
    PlayerNotFound,

    // Workflow Rejections
    /// Session was ended
    SessionEnded,
    /// Destination stage cannot take the card's effort
    CapacityExceeded,
    /// Scrum-Master pool is empty
    NoTokensAvailable,
    /// Card is not in the stage the operation requires
    WrongStage,
    /// Effort outside {1, 3, 5}
    InvalidEffort,
    /// Player ids or roles repeated in a roster
    InvalidRoster,

    // System Errors
    /// Resolution table or WIP accounting broken
    ContractViolation,
    /// Internal error
    Internal,
    /// Configuration error
    ConfigError,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SessionNotFound => "SESSION_NOT_FOUND",
            Self::CardNotFound => "CARD_NOT_FOUND",
            Self::StageNotFound => "STAGE_NOT_FOUND",
            Self::PlayerNotFound => "PLAYER_NOT_FOUND",

            Self::SessionEnded => "SESSION_ENDED",
            Self::CapacityExceeded => "CAPACITY_EXCEEDED",
            Self::NoTokensAvailable => "NO_TOKENS_AVAILABLE",
            Self::WrongStage => "WRONG_STAGE",
            Self::InvalidEffort => "INVALID_EFFORT",
            Self::InvalidRoster => "INVALID_ROSTER",

            Self::ContractViolation => "CONTRACT_VIOLATION",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl From<ErrorCode> for &'static str {
    fn from(code: ErrorCode) -> Self {
        code.as_str()
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
