//! Domain-level error type used across the board engine and services.
//!
//! This error type is transport-agnostic. Services return
//! `Result<T, crate::error::AppError>` and convert from `DomainError`
//! using the provided `From<DomainError> for AppError` implementation.

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Domain-level not found entities
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Session,
    Card,
    Stage,
    Player,
}

/// Reasons a workflow rule refused to apply an operation
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvalidStateKind {
    /// Operation attempted on a session that was ended.
    SessionEnded,
    /// Destination stage cannot take the card's effort.
    CapacityExceeded,
    /// Scrum-Master pool has no tokens left to spend.
    NoTokensAvailable,
    /// Card is not where the operation expects it to be.
    WrongStage,
    /// Effort outside the story-point scale.
    InvalidEffort,
    /// Repeated player id or role at one table.
    InvalidRoster,
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Missing session, card, stage or player
    NotFound(NotFoundKind, String),
    /// Ended session or a workflow/capacity rule rejected the request
    InvalidState(InvalidStateKind, String),
    /// Engine bug: die outside 1..=6 or a broken board invariant
    ContractViolation(String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::InvalidState(kind, d) => write!(f, "invalid state {kind:?}: {d}"),
            DomainError::ContractViolation(d) => write!(f, "contract violation: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn invalid_state(kind: InvalidStateKind, detail: impl Into<String>) -> Self {
        Self::InvalidState(kind, detail.into())
    }
    pub fn contract(detail: impl Into<String>) -> Self {
        Self::ContractViolation(detail.into())
    }

    /// Expected, caller-visible outcomes. Contract violations are not.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, DomainError::ContractViolation(_))
    }
}
