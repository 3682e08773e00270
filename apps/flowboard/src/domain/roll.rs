//! Roll resolution: maps a die face, the card's stage and the mitigation
//! state to a movement outcome.
//!
//! | Die | Outcome              | Destination                                  |
//! |-----|----------------------|----------------------------------------------|
//! | 1   | Critical success     | Production                                   |
//! | 2-3 | Standard progress    | next stage (stays at Production)             |
//! | 4   | Scope creep          | ProductBacklog                               |
//! | 5   | Technical impediment | previous stage with a token, else Implementation |
//! | 6   | Critical failure     | Implementation with debt bonus, else SprintBacklog |
//!
//! The resolver never mutates the pool or the card. Consuming a token is the
//! orchestrator's job.

use serde::{Deserialize, Serialize};

use crate::domain::cards::Card;
use crate::domain::scrum_master::ScrumMasterPool;
use crate::domain::stage::Stage;
use crate::errors::domain::DomainError;

pub const DIE_FACES: std::ops::RangeInclusive<u8> = 1..=6;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    CriticalSuccess,
    StandardProgress,
    ScopeCreep,
    TechnicalImpediment,
    CriticalFailure,
}

impl OutcomeKind {
    pub fn from_die(die: u8) -> Result<Self, DomainError> {
        match die {
            1 => Ok(OutcomeKind::CriticalSuccess),
            2 | 3 => Ok(OutcomeKind::StandardProgress),
            4 => Ok(OutcomeKind::ScopeCreep),
            5 => Ok(OutcomeKind::TechnicalImpediment),
            6 => Ok(OutcomeKind::CriticalFailure),
            other => Err(DomainError::contract(format!(
                "die value {other} outside {DIE_FACES:?}"
            ))),
        }
    }

    pub fn is_revert(self) -> bool {
        self.revert_reason().is_some()
    }

    pub fn revert_reason(self) -> Option<RevertReason> {
        match self {
            OutcomeKind::CriticalSuccess | OutcomeKind::StandardProgress => None,
            OutcomeKind::ScopeCreep => Some(RevertReason::ScopeCreep),
            OutcomeKind::TechnicalImpediment => Some(RevertReason::TechnicalImpediment),
            OutcomeKind::CriticalFailure => Some(RevertReason::CriticalFailure),
        }
    }
}

/// Cause category recorded with every reverting event.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevertReason {
    ScopeCreep,
    TechnicalImpediment,
    CriticalFailure,
    /// Product owner rejected the card at PreDeployment.
    Rejected,
}

/// The parts of the session that influence resolution.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct MitigationState {
    pub tokens_available: u8,
    pub technical_debt_active: bool,
}

impl MitigationState {
    pub fn from_pool(pool: &ScrumMasterPool, current_turn: u32) -> Self {
        Self {
            tokens_available: pool.tokens_available,
            technical_debt_active: pool.is_debt_active(current_turn),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollOutcome {
    pub die: u8,
    pub kind: OutcomeKind,
    pub from: Stage,
    pub destination: Stage,
    /// Card effort for progress outcomes, 0 for reverts.
    pub effort_credited: u32,
    pub reverted: bool,
    pub effect: String,
    /// A Scrum-Master token could soften this outcome.
    pub can_mitigate: bool,
}

/// Resolve a die face for `card` sitting in `current`.
pub fn resolve(
    die: u8,
    card: &Card,
    current: Stage,
    mitigation: &MitigationState,
) -> Result<RollOutcome, DomainError> {
    let kind = OutcomeKind::from_die(die)?;
    let effort = card.effort.points();

    let (destination, can_mitigate, effect) = match kind {
        OutcomeKind::CriticalSuccess => (
            Stage::Production,
            false,
            "Critical success: shipped straight to production".to_string(),
        ),
        OutcomeKind::StandardProgress => {
            let to = current.next().unwrap_or(current);
            (to, false, format!("Standard progress: {current} -> {to}"))
        }
        OutcomeKind::ScopeCreep => (
            Stage::ProductBacklog,
            false,
            "Scope creep: card returns to the product backlog".to_string(),
        ),
        OutcomeKind::TechnicalImpediment => {
            if mitigation.tokens_available > 0 {
                let to = current.previous().unwrap_or(current);
                (
                    to,
                    true,
                    format!("Technical impediment: Scrum Master limits the setback to {to}"),
                )
            } else {
                (
                    Stage::Implementation,
                    false,
                    "Technical impediment: no Scrum Master available, back to implementation"
                        .to_string(),
                )
            }
        }
        OutcomeKind::CriticalFailure => {
            if mitigation.technical_debt_active {
                (
                    Stage::Implementation,
                    false,
                    "Critical failure: technical debt absorbs the blow, back to implementation"
                        .to_string(),
                )
            } else {
                (
                    Stage::SprintBacklog,
                    false,
                    "Critical failure: card returns to the sprint backlog".to_string(),
                )
            }
        }
    };

    let reverted = kind.is_revert();
    Ok(RollOutcome {
        die,
        kind,
        from: current,
        destination,
        effort_credited: if reverted { 0 } else { effort },
        reverted,
        effect,
        can_mitigate,
    })
}
