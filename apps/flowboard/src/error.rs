use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::errors::domain::{DomainError, InvalidStateKind, NotFoundKind};
use crate::errors::ErrorCode;

/// Tagged failure handed to the calling layer.
#[derive(Debug, Clone, Serialize)]
pub struct FailureDetails {
    pub code: ErrorCode,
    pub detail: String,
    pub recoverable: bool,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AppError {
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Invalid state: {detail}")]
    InvalidState { code: ErrorCode, detail: String },
    #[error("Contract violation: {detail}")]
    ContractViolation { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::NotFound { code, .. } => *code,
            AppError::InvalidState { code, .. } => *code,
            AppError::ContractViolation { .. } => ErrorCode::ContractViolation,
            AppError::Config { .. } => ErrorCode::ConfigError,
            AppError::Internal { .. } => ErrorCode::Internal,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            AppError::NotFound { detail, .. }
            | AppError::InvalidState { detail, .. }
            | AppError::ContractViolation { detail }
            | AppError::Config { detail }
            | AppError::Internal { detail } => detail,
        }
    }

    /// `NotFound` and `InvalidState` are ordinary answers; everything else is
    /// a fault the calling layer should surface as an internal error.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            AppError::NotFound { .. } | AppError::InvalidState { .. }
        )
    }

    pub fn failure(&self) -> FailureDetails {
        FailureDetails {
            code: self.code(),
            detail: self.detail().to_string(),
            recoverable: self.is_recoverable(),
        }
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn invalid_state(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::InvalidState {
            code,
            detail: detail.into(),
        }
    }

    pub fn contract(detail: impl Into<String>) -> Self {
        Self::ContractViolation {
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound(kind, detail) => {
                let code = match kind {
                    NotFoundKind::Session => ErrorCode::SessionNotFound,
                    NotFoundKind::Card => ErrorCode::CardNotFound,
                    NotFoundKind::Stage => ErrorCode::StageNotFound,
                    NotFoundKind::Player => ErrorCode::PlayerNotFound,
                };
                AppError::not_found(code, detail)
            }
            DomainError::InvalidState(kind, detail) => {
                let code = match kind {
                    InvalidStateKind::SessionEnded => ErrorCode::SessionEnded,
                    InvalidStateKind::CapacityExceeded => ErrorCode::CapacityExceeded,
                    InvalidStateKind::NoTokensAvailable => ErrorCode::NoTokensAvailable,
                    InvalidStateKind::WrongStage => ErrorCode::WrongStage,
                    InvalidStateKind::InvalidEffort => ErrorCode::InvalidEffort,
                    InvalidStateKind::InvalidRoster => ErrorCode::InvalidRoster,
                };
                AppError::invalid_state(code, detail)
            }
            DomainError::ContractViolation(detail) => {
                error!(detail = %detail, "Engine contract violated");
                AppError::contract(detail)
            }
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(e: serde_json::Error) -> Self {
        AppError::internal(format!("json error: {e}"))
    }
}
