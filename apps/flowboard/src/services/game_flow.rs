//! Workflow orchestrator: applies intents to sessions held in the
//! [`SessionStore`].
//!
//! Every mutation runs against a working copy of the session under the
//! session's mutex and is committed only if it succeeds and the board
//! invariants still hold (see [`mutation`]).

mod intents;
mod lifecycle;
mod mutation;
mod player_actions;

use std::sync::Arc;

use crate::config::GameConfig;
use crate::domain::dice::{DieSource, RandomDie};
use crate::realtime::{NotificationSink, NullSink};
use crate::services::sessions::SessionStore;

pub use intents::IntentOutcome;
pub use lifecycle::PhaseAdvance;
pub use player_actions::{MoveResult, RollResult};

pub struct GameFlowService {
    store: Arc<SessionStore>,
    die: Arc<dyn DieSource>,
    sink: Arc<dyn NotificationSink>,
    config: GameConfig,
}

impl GameFlowService {
    pub fn builder() -> GameFlowBuilder {
        GameFlowBuilder::new()
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }
}

impl Default for GameFlowService {
    fn default() -> Self {
        GameFlowBuilder::new().build()
    }
}

/// Builder for [`GameFlowService`] (used in both tests and binaries).
pub struct GameFlowBuilder {
    config: GameConfig,
    store: Option<Arc<SessionStore>>,
    die: Option<Arc<dyn DieSource>>,
    sink: Option<Arc<dyn NotificationSink>>,
}

impl GameFlowBuilder {
    pub fn new() -> Self {
        Self {
            config: GameConfig::default(),
            store: None,
            die: None,
            sink: None,
        }
    }

    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_store(mut self, store: Arc<SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_die(mut self, die: Arc<dyn DieSource>) -> Self {
        self.die = Some(die);
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn NotificationSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn build(self) -> GameFlowService {
        let die: Arc<dyn DieSource> = match self.die {
            Some(die) => die,
            None => Arc::new(RandomDie::new(self.config.die_seed)),
        };
        let sink: Arc<dyn NotificationSink> = match self.sink {
            Some(sink) => sink,
            None => Arc::new(NullSink),
        };
        GameFlowService {
            store: self.store.unwrap_or_default(),
            die,
            sink,
            config: self.config,
        }
    }
}

impl Default for GameFlowBuilder {
    fn default() -> Self {
        Self::new()
    }
}
