//! Work items ("cards") that flow through the board.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::domain::stage::Stage;
use crate::errors::domain::{DomainError, InvalidStateKind, NotFoundKind};

/// Story points a card may be sized at.
pub const EFFORT_SCALE: [u8; 3] = [1, 3, 5];

/// Sortable card identifier (ULID, creation-ordered).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(Ulid);

impl CardId {
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for CardId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CardId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s)
            .map(CardId)
            .map_err(|e| DomainError::not_found(NotFoundKind::Card, format!("bad card id '{s}': {e}")))
    }
}

/// Effort in story points, restricted to {1, 3, 5}.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Effort(u8);

impl Effort {
    pub const ONE: Effort = Effort(1);
    pub const THREE: Effort = Effort(3);
    pub const FIVE: Effort = Effort(5);

    #[inline]
    pub const fn points(self) -> u32 {
        self.0 as u32
    }
}

impl TryFrom<u8> for Effort {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if EFFORT_SCALE.contains(&value) {
            Ok(Effort(value))
        } else {
            Err(DomainError::invalid_state(
                InvalidStateKind::InvalidEffort,
                format!("effort must be one of {EFFORT_SCALE:?}, got {value}"),
            ))
        }
    }
}

impl From<Effort> for u8 {
    fn from(effort: Effort) -> Self {
        effort.0
    }
}

/// A unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: CardId,
    pub title: String,
    pub effort: Effort,
    /// Stage currently owning the card (slots or queue).
    pub stage: Stage,
    /// Turn the card was created in.
    pub created_turn: u32,
    /// Incremented on every reverting outcome, never decremented.
    pub revert_count: u32,
    /// Turn the card first reached Production. Set once.
    pub completed_turn: Option<u32>,
    /// Turns elapsed from creation to first arrival in Production; 0 when
    /// shipped in the turn it was created. Set once.
    pub cycle_time: Option<u32>,
    pub technical_debt: bool,
}

impl Card {
    pub fn new(title: impl Into<String>, effort: Effort, created_turn: u32) -> Self {
        Self {
            id: CardId::new(),
            title: title.into(),
            effort,
            stage: Stage::Funnel,
            created_turn,
            revert_count: 0,
            completed_turn: None,
            cycle_time: None,
            technical_debt: false,
        }
    }

    /// Record the first arrival in Production. Later arrivals keep the
    /// original values.
    pub fn mark_completed(&mut self, turn: u32) {
        if self.completed_turn.is_none() {
            self.completed_turn = Some(turn);
            self.cycle_time = Some(turn.saturating_sub(self.created_turn));
        }
    }
}
