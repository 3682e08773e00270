//! Capacity and existence checks run before any board mutation.
//!
//! Capacity here is measured in effort points held in slots, not card count:
//! a stage with limit 3 takes one effort-3 card or three effort-1 cards.

use crate::domain::board::{Board, Placement};
use crate::domain::cards::{Card, CardId};
use crate::domain::stage::Stage;
use crate::errors::domain::{DomainError, InvalidStateKind, NotFoundKind};

pub fn check_capacity(stage: Stage, card: &Card, board: &Board) -> Result<(), DomainError> {
    let Some(limit) = board.wip_limit(stage) else {
        return Ok(());
    };
    let occupied = board.lane(stage).occupied_effort();
    let requested = card.effort.points();
    if occupied + requested <= limit {
        Ok(())
    } else {
        Err(DomainError::invalid_state(
            InvalidStateKind::CapacityExceeded,
            format!(
                "{stage} holds {occupied} of {limit} effort points; card {} needs {requested}",
                card.id
            ),
        ))
    }
}

pub fn check_card_exists(card_id: CardId, board: &Board) -> Result<(Stage, Placement), DomainError> {
    board.locate(card_id).ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Card, format!("card {card_id} is not on the board"))
    })
}
