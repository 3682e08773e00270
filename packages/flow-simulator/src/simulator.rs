//! In-memory session simulator.
//!
//! Drives one seeded session through the public orchestrator API: cards
//! arrive in the funnel, get pulled into the sprint, are rolled through the
//! pipeline and accepted at pre-deployment.

use std::sync::Arc;

use flowboard::domain::snapshot::BoardSnapshot;
use flowboard::domain::{CardId, Effort, MetricsSnapshot, RandomDie, SessionId, Stage};
use flowboard::{AppError, GameConfig, GameFlowService};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::debug;

use crate::types::Strategy;

const EFFORTS: [Effort; 3] = [Effort::ONE, Effort::THREE, Effort::FIVE];
/// Stages whose active cards are rolled each turn, downstream first so
/// capacity frees up before upstream cards try to move in.
const ROLLED_STAGES: [Stage; 4] = [
    Stage::Testing,
    Stage::Integration,
    Stage::Implementation,
    Stage::SprintBacklog,
];

#[derive(Debug, Default, Clone, Serialize)]
pub struct PlayStats {
    pub cards_created: u32,
    pub rolls: u32,
    pub reverts: u32,
    pub rejected_moves: u32,
    pub tokens_spent: u32,
    pub debt_allocations: u32,
    pub accepted: u32,
}

#[derive(Debug, Clone)]
pub struct SessionResult {
    pub session_no: u32,
    pub seed: u64,
    pub strategy: Strategy,
    pub turns: u32,
    pub stats: PlayStats,
    pub metrics: MetricsSnapshot,
}

pub struct Simulator {
    session_no: u32,
    seed: u64,
    turns: u32,
    arrivals: u32,
    strategy: Strategy,
    config: GameConfig,
}

impl Simulator {
    pub fn new(session_no: u32, seed: u64, config: GameConfig) -> Self {
        Self {
            session_no,
            seed,
            turns: 10,
            arrivals: 2,
            strategy: Strategy::Mitigating,
            config,
        }
    }

    pub fn with_turns(mut self, turns: u32) -> Self {
        self.turns = turns.max(1);
        self
    }

    pub fn with_arrivals(mut self, arrivals: u32) -> Self {
        self.arrivals = arrivals;
        self
    }

    pub fn with_strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Play a whole session. Recoverable rejections are counted, anything
    /// else aborts the run.
    pub fn simulate_session(&self) -> Result<SessionResult, AppError> {
        let service = GameFlowService::builder()
            .with_config(self.config.clone())
            .with_die(Arc::new(RandomDie::new(Some(self.seed))))
            .build();
        // Separate stream for arrivals so card sizes do not shift die faces
        let mut rng = StdRng::seed_from_u64(self.seed.rotate_left(17) ^ 0x5eed);
        let session_id = service.start_game(None).id;
        let mut stats = PlayStats::default();

        service.advance_phase(session_id)?;
        for _ in 0..self.turns {
            self.arrive(&service, session_id, &mut rng, &mut stats)?;
            if self.strategy.takes_debt() {
                self.top_up_debt(&service, session_id, &mut stats)?;
            }
            self.plan(&service, session_id, &mut stats)?;
            self.execute(&service, session_id, &mut stats)?;
            service.advance_turn(session_id)?;
        }
        service.end_game(session_id)?;

        let metrics = service.compute_metrics(session_id)?;
        debug!(
            session_no = self.session_no,
            score = metrics.accumulated_score,
            rolls = stats.rolls,
            "Session simulated"
        );
        Ok(SessionResult {
            session_no: self.session_no,
            seed: self.seed,
            strategy: self.strategy,
            turns: self.turns,
            stats,
            metrics,
        })
    }

    fn arrive(
        &self,
        service: &GameFlowService,
        session_id: SessionId,
        rng: &mut StdRng,
        stats: &mut PlayStats,
    ) -> Result<(), AppError> {
        for _ in 0..self.arrivals {
            let effort = EFFORTS[rng.random_range(0..EFFORTS.len())];
            stats.cards_created += 1;
            let title = format!("story {}", stats.cards_created);
            let card = service.create_card(session_id, &title, effort.into())?;
            service.move_card(session_id, card.id, Stage::Funnel, Stage::ProductBacklog)?;
        }
        Ok(())
    }

    fn top_up_debt(
        &self,
        service: &GameFlowService,
        session_id: SessionId,
        stats: &mut PlayStats,
    ) -> Result<(), AppError> {
        let snapshot = service.get_session(session_id)?;
        if !snapshot.pool.is_debt_active(snapshot.turn) {
            service.allocate_technical_debt(session_id, 1)?;
            stats.debt_allocations += 1;
        }
        Ok(())
    }

    /// Pull backlog cards into the sprint in arrival order while they fit.
    fn plan(
        &self,
        service: &GameFlowService,
        session_id: SessionId,
        stats: &mut PlayStats,
    ) -> Result<(), AppError> {
        let board = service.get_session(session_id)?.board;
        for card_id in card_ids(&board, Stage::ProductBacklog, true) {
            match service.pull_to_sprint(session_id, card_id) {
                Ok(_) => {}
                Err(e) if e.is_recoverable() => stats.rejected_moves += 1,
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn execute(
        &self,
        service: &GameFlowService,
        session_id: SessionId,
        stats: &mut PlayStats,
    ) -> Result<(), AppError> {
        let board = service.get_session(session_id)?.board;

        for card_id in card_ids(&board, Stage::PreDeployment, false) {
            service.accept_card(session_id, card_id)?;
            stats.accepted += 1;
        }

        let policy = self.strategy.policy();
        for stage in ROLLED_STAGES {
            for card_id in card_ids(&board, stage, false) {
                match service.roll_for_card(session_id, card_id, policy) {
                    Ok(result) => {
                        stats.rolls += 1;
                        if result.outcome.reverted {
                            stats.reverts += 1;
                        }
                        if result.mitigation_applied {
                            stats.tokens_spent += 1;
                        }
                    }
                    Err(e) if e.is_recoverable() => stats.rejected_moves += 1,
                    Err(e) => return Err(e),
                }
            }
        }
        Ok(())
    }
}

/// Active cards of a stage, plus its queue when `include_queue` is set.
fn card_ids(board: &BoardSnapshot, stage: Stage, include_queue: bool) -> Vec<CardId> {
    board
        .stage(stage)
        .map(|s| {
            let queued = if include_queue { s.queue.as_slice() } else { &[] };
            s.slots.iter().chain(queued).map(|c| c.id).collect()
        })
        .unwrap_or_default()
}
