use serde::Serialize;
use tracing::{debug, info};

use super::mutation::Mutation;
use super::GameFlowService;
use crate::domain::metrics::FlowSnapshot;
use crate::domain::snapshot::SessionSnapshot;
use crate::domain::state::{GameSession, Phase, Roster, SessionId};
use crate::error::AppError;

/// Result of `advance_phase`. `advanced == false` means the session was
/// already at Retrospective and nothing changed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseAdvance {
    pub advanced: bool,
    pub phase: Phase,
}

impl GameFlowService {
    /// Create a new session. `None` seats the default one-per-role roster.
    pub fn start_game(&self, roster: Option<Roster>) -> SessionSnapshot {
        let session = GameSession::new(roster.unwrap_or_default(), self.config.session_rules());
        let snapshot = SessionSnapshot::of(&session);
        let session_id = self.store.insert(session);
        info!(session_id = %session_id, players = snapshot.players.len(), "Game started");
        snapshot
    }

    pub fn get_session(&self, session_id: SessionId) -> Result<SessionSnapshot, AppError> {
        self.store.snapshot(session_id)
    }

    pub fn advance_phase(&self, session_id: SessionId) -> Result<PhaseAdvance, AppError> {
        self.run_mutation(session_id, "advance_phase", |session, _| {
            match session.phase.next() {
                Some(next) => {
                    debug!(session_id = %session.id, from = ?session.phase, to = ?next, "Phase advanced");
                    session.phase = next;
                    Ok(Mutation::changed(PhaseAdvance {
                        advanced: true,
                        phase: next,
                    }))
                }
                None => Ok(Mutation::unchanged(PhaseAdvance {
                    advanced: false,
                    phase: session.phase,
                })),
            }
        })
    }

    /// Close the current turn: record its flow snapshot, bump the counter,
    /// clear per-turn capacity and expire debt whose window has passed.
    /// The phase is left alone. Returns the new turn number.
    pub fn advance_turn(&self, session_id: SessionId) -> Result<u32, AppError> {
        self.run_mutation(session_id, "advance_turn", |session, _| {
            session
                .flow_history
                .push(FlowSnapshot::capture(session.turn, &session.board));
            session.turn += 1;
            for player in &mut session.players {
                player.allocated_capacity = 0;
            }
            if let Some(effort) = session.pool.expire_debt(session.turn) {
                info!(session_id = %session.id, turn = session.turn, effort, "Technical debt expired");
            }
            debug!(session_id = %session.id, turn = session.turn, "Turn advanced");
            Ok(Mutation::changed(session.turn))
        })
    }

    /// Mark the session inactive and release its notification channel. The
    /// record stays in the store so metrics remain readable.
    pub fn end_game(&self, session_id: SessionId) -> Result<(), AppError> {
        self.run_mutation(session_id, "end_game", |session, _| {
            session.active = false;
            info!(session_id = %session.id, turn = session.turn, "Game ended");
            Ok(Mutation::changed(()))
        })?;
        self.sink.close(session_id);
        Ok(())
    }
}
