#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod realtime;
pub mod services;
pub mod telemetry;

// Re-exports for public API
pub use config::GameConfig;
pub use domain::{
    Board, Card, CardId, DieSource, Effort, GameSession, Intent, MetricsSnapshot,
    MitigationPolicy, Phase, Player, RandomDie, RollOutcome, Roster, ScriptedDie, SessionId, Stage,
};
pub use error::AppError;
pub use errors::ErrorCode;
pub use realtime::{BoardNotification, BroadcastSink, NotificationSink, NullSink};
pub use services::{GameFlowService, IntentOutcome, MetricsService, SessionStore};

// Prelude for test convenience
pub mod prelude {
    pub use super::config::GameConfig;
    pub use super::domain::*;
    pub use super::error::*;
    pub use super::errors::{DomainError, ErrorCode};
    pub use super::realtime::*;
    pub use super::services::{GameFlowService, IntentOutcome, MetricsService, SessionStore};
}

#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    flowboard_test_support::logging::init();
}
