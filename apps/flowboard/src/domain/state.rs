use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::board::{Board, WipLimits};
use crate::domain::cards::CardId;
use crate::domain::metrics::FlowSnapshot;
use crate::domain::roll::RevertReason;
use crate::domain::scrum_master::{DebtExpiry, ScrumMasterPool};
use crate::domain::stage::Stage;
use crate::errors::domain::{DomainError, InvalidStateKind, NotFoundKind};

pub type PlayerId = u8;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Sprint phases. Strictly forward within a session, no wraparound.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    SprintPlanning,
    Execution,
    SprintReview,
    Retrospective,
}

impl Phase {
    /// Following phase, or `None` at Retrospective.
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::SprintPlanning => Some(Phase::Execution),
            Phase::Execution => Some(Phase::SprintReview),
            Phase::SprintReview => Some(Phase::Retrospective),
            Phase::Retrospective => None,
        }
    }
}

/// Player roles, one per stage.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Stakeholder,
    ProductOwner,
    ScrumMaster,
    Developer,
    Integrator,
    Tester,
    ReleaseManager,
    Operations,
}

pub const ROLES: [Role; 8] = [
    Role::Stakeholder,
    Role::ProductOwner,
    Role::ScrumMaster,
    Role::Developer,
    Role::Integrator,
    Role::Tester,
    Role::ReleaseManager,
    Role::Operations,
];

impl Role {
    pub const fn home_stage(self) -> Stage {
        match self {
            Role::Stakeholder => Stage::Funnel,
            Role::ProductOwner => Stage::ProductBacklog,
            Role::ScrumMaster => Stage::SprintBacklog,
            Role::Developer => Stage::Implementation,
            Role::Integrator => Stage::Integration,
            Role::Tester => Stage::Testing,
            Role::ReleaseManager => Stage::PreDeployment,
            Role::Operations => Stage::Production,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Role::Stakeholder => "Stakeholder",
            Role::ProductOwner => "Product Owner",
            Role::ScrumMaster => "Scrum Master",
            Role::Developer => "Developer",
            Role::Integrator => "Integrator",
            Role::Tester => "Tester",
            Role::ReleaseManager => "Release Manager",
            Role::Operations => "Operations",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub role: Role,
    /// Effort points committed for the current turn.
    pub allocated_capacity: u32,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            allocated_capacity: 0,
        }
    }

    pub fn home_stage(&self) -> Stage {
        self.role.home_stage()
    }
}

/// Players seated at one table: ids are unique and no role is taken twice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster(Vec<Player>);

impl Roster {
    pub fn new(players: Vec<Player>) -> Result<Self, DomainError> {
        let mut ids = HashSet::new();
        let mut roles = HashSet::new();
        for player in &players {
            if !ids.insert(player.id) {
                return Err(DomainError::invalid_state(
                    InvalidStateKind::InvalidRoster,
                    format!("player id {} is seated twice", player.id),
                ));
            }
            if !roles.insert(player.role) {
                return Err(DomainError::invalid_state(
                    InvalidStateKind::InvalidRoster,
                    format!("role {} is taken twice", player.role.label()),
                ));
            }
        }
        Ok(Self(players))
    }

    pub fn players(&self) -> &[Player] {
        &self.0
    }

    pub fn into_players(self) -> Vec<Player> {
        self.0
    }
}

impl Default for Roster {
    /// One player per role, named after the role.
    fn default() -> Self {
        Self(
            ROLES
                .iter()
                .enumerate()
                .map(|(i, role)| Player::new(i as PlayerId, role.label(), *role))
                .collect(),
        )
    }
}

/// Appended every time a reverting outcome is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevertEvent {
    pub turn: u32,
    pub card: CardId,
    pub from: Stage,
    pub to: Stage,
    pub reason: RevertReason,
}

/// Static knobs a session is created with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionRules {
    pub wip_limits: WipLimits,
    pub scrum_master_tokens: u8,
    pub debt_duration_turns: u32,
    pub debt_expiry: DebtExpiry,
}

impl Default for SessionRules {
    fn default() -> Self {
        Self {
            wip_limits: WipLimits::default(),
            scrum_master_tokens: 3,
            debt_duration_turns: 2,
            debt_expiry: DebtExpiry::TurnBound,
        }
    }
}

/// One run of the game.
#[derive(Debug, Clone)]
pub struct GameSession {
    pub id: SessionId,
    pub created_at: OffsetDateTime,
    pub active: bool,
    /// 1-based, monotonically increasing.
    pub turn: u32,
    pub phase: Phase,
    pub board: Board,
    pub players: Vec<Player>,
    pub pool: ScrumMasterPool,
    pub revert_log: Vec<RevertEvent>,
    /// Board composition at the end of every finished turn.
    pub flow_history: Vec<FlowSnapshot>,
    pub rules: SessionRules,
}

impl GameSession {
    pub fn new(roster: Roster, rules: SessionRules) -> Self {
        Self {
            id: SessionId::new(),
            created_at: OffsetDateTime::now_utc(),
            active: true,
            turn: 1,
            phase: Phase::SprintPlanning,
            board: Board::new(rules.wip_limits),
            players: roster.into_players(),
            pool: ScrumMasterPool::new(rules.scrum_master_tokens, rules.debt_expiry),
            revert_log: Vec::new(),
            flow_history: Vec::new(),
            rules,
        }
    }

    /// Gate for every mutating operation.
    pub fn require_active(&self) -> Result<(), DomainError> {
        if self.active {
            Ok(())
        } else {
            Err(DomainError::invalid_state(
                InvalidStateKind::SessionEnded,
                format!("session {} has ended", self.id),
            ))
        }
    }

    pub fn player_mut(&mut self, player_id: PlayerId) -> Result<&mut Player, DomainError> {
        self.players
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or_else(|| {
                DomainError::not_found(NotFoundKind::Player, format!("player {player_id}"))
            })
    }
}
