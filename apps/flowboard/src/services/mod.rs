pub mod game_flow;
pub mod metrics;
pub mod sessions;

pub use game_flow::{
    GameFlowBuilder, GameFlowService, IntentOutcome, MoveResult, PhaseAdvance, RollResult,
};
pub use metrics::MetricsService;
pub use sessions::{SessionStore, SharedSession};
