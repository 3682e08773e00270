use serde::Serialize;
use tracing::debug;

use super::{GameFlowService, MoveResult, PhaseAdvance, RollResult};
use crate::domain::intent::Intent;
use crate::domain::state::{PlayerId, SessionId};
use crate::error::AppError;

/// Typed result for each intent variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IntentOutcome {
    Moved(MoveResult),
    CapacityAllocated { player_id: PlayerId, points: u32 },
    Rolled(RollResult),
    TokenUsed { tokens_available: u8 },
    DebtAllocated { expires_at_turn: u32 },
    Phase(PhaseAdvance),
    Turn { turn: u32 },
}

impl GameFlowService {
    /// Single entry point for player intents.
    pub fn apply_intent(
        &self,
        session_id: SessionId,
        intent: Intent,
    ) -> Result<IntentOutcome, AppError> {
        debug!(session_id = %session_id, action = intent.action(), "Applying intent");
        match intent {
            Intent::PullToSprint { card_id } => self
                .pull_to_sprint(session_id, card_id)
                .map(IntentOutcome::Moved),
            Intent::AllocateCapacity { player_id, points } => self
                .allocate_capacity(session_id, player_id, points)
                .map(|points| IntentOutcome::CapacityAllocated { player_id, points }),
            Intent::RollDie { card_id, policy } => self
                .roll_for_card(session_id, card_id, policy)
                .map(IntentOutcome::Rolled),
            Intent::UseToken => self
                .use_token(session_id)
                .map(|tokens_available| IntentOutcome::TokenUsed { tokens_available }),
            Intent::AllocateDebt { effort } => self
                .allocate_technical_debt(session_id, effort)
                .map(|expires_at_turn| IntentOutcome::DebtAllocated { expires_at_turn }),
            Intent::AcceptCard { card_id } => self
                .accept_card(session_id, card_id)
                .map(IntentOutcome::Moved),
            Intent::RejectCard { card_id } => self
                .reject_card(session_id, card_id)
                .map(IntentOutcome::Moved),
            Intent::AdvancePhase => self.advance_phase(session_id).map(IntentOutcome::Phase),
            Intent::AdvanceTurn => self
                .advance_turn(session_id)
                .map(|turn| IntentOutcome::Turn { turn }),
        }
    }
}
