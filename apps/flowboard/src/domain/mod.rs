//! Domain layer: pure workflow logic types and helpers.

pub mod board;
pub mod cards;
pub mod dice;
pub mod intent;
pub mod metrics;
pub mod roll;
pub mod scrum_master;
pub mod snapshot;
pub mod stage;
pub mod state;
pub mod validation;

#[cfg(test)]
mod tests_metrics;
#[cfg(test)]
mod tests_props_roll;
#[cfg(test)]
mod tests_roll;

// Re-exports for ergonomics
pub use board::{Board, Placement, WipLimits};
pub use cards::{Card, CardId, Effort};
pub use dice::{DieSource, RandomDie, ScriptedDie};
pub use intent::{Intent, MitigationPolicy};
pub use metrics::{derive_metrics, MetricsSnapshot, Trend};
pub use roll::{resolve, MitigationState, OutcomeKind, RevertReason, RollOutcome};
pub use scrum_master::{DebtExpiry, ScrumMasterPool};
pub use stage::{Stage, STAGES};
pub use state::{GameSession, Phase, Player, PlayerId, Role, Roster, SessionId, SessionRules};
