//! Closed set of player intents accepted by the orchestrator.

use serde::{Deserialize, Serialize};

use crate::domain::cards::CardId;
use crate::domain::state::PlayerId;

/// Whether to spend a Scrum-Master token when a roll is mitigable.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MitigationPolicy {
    /// Report eligibility only; the pool is left untouched.
    #[default]
    Never,
    /// Spend a token whenever the outcome is mitigable.
    WhenEligible,
}

impl MitigationPolicy {
    pub fn elects_to_spend(self) -> bool {
        matches!(self, MitigationPolicy::WhenEligible)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    /// ProductBacklog -> SprintBacklog, no die involved.
    PullToSprint { card_id: CardId },
    /// Commit effort points for a player this turn.
    AllocateCapacity { player_id: PlayerId, points: u32 },
    RollDie {
        card_id: CardId,
        #[serde(default)]
        policy: MitigationPolicy,
    },
    /// Spend a token outside a roll.
    UseToken,
    AllocateDebt { effort: u32 },
    /// PreDeployment -> Production.
    AcceptCard { card_id: CardId },
    /// PreDeployment -> ProductBacklog, logged as a revert.
    RejectCard { card_id: CardId },
    AdvancePhase,
    AdvanceTurn,
}

impl Intent {
    /// Stable action name for notifications and logs.
    pub fn action(&self) -> &'static str {
        match self {
            Intent::PullToSprint { .. } => "pull_to_sprint",
            Intent::AllocateCapacity { .. } => "allocate_capacity",
            Intent::RollDie { .. } => "roll_die",
            Intent::UseToken => "use_token",
            Intent::AllocateDebt { .. } => "allocate_debt",
            Intent::AcceptCard { .. } => "accept_card",
            Intent::RejectCard { .. } => "reject_card",
            Intent::AdvancePhase => "advance_phase",
            Intent::AdvanceTurn => "advance_turn",
        }
    }
}
