//! Serializable views of the board and session, shared by notifications,
//! callers and the simulator.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::board::Board;
use crate::domain::cards::Card;
use crate::domain::scrum_master::ScrumMasterPool;
use crate::domain::stage::Stage;
use crate::domain::state::{GameSession, Phase, Player, SessionId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageSnapshot {
    pub stage: Stage,
    pub wip_limit: Option<u32>,
    pub occupied_effort: u32,
    pub slots: Vec<Card>,
    pub queue: Vec<Card>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub stages: Vec<StageSnapshot>,
}

impl BoardSnapshot {
    pub fn of(board: &Board) -> Self {
        let stages = board
            .lanes()
            .map(|lane| StageSnapshot {
                stage: lane.stage,
                wip_limit: lane.wip_limit,
                occupied_effort: lane.occupied_effort(),
                slots: lane.slots.clone(),
                queue: lane.queue.iter().cloned().collect(),
            })
            .collect();
        Self { stages }
    }

    pub fn stage(&self, stage: Stage) -> Option<&StageSnapshot> {
        self.stages.iter().find(|s| s.stage == stage)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: SessionId,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    pub active: bool,
    pub turn: u32,
    pub phase: Phase,
    pub players: Vec<Player>,
    pub pool: ScrumMasterPool,
    pub board: BoardSnapshot,
}

impl SessionSnapshot {
    pub fn of(session: &GameSession) -> Self {
        Self {
            id: session.id,
            created_at: session.created_at,
            active: session.active,
            turn: session.turn,
            phase: session.phase,
            players: session.players.clone(),
            pool: session.pool.clone(),
            board: BoardSnapshot::of(&session.board),
        }
    }
}
