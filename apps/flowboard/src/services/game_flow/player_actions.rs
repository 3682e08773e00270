use serde::Serialize;
use tracing::{debug, info};

use super::mutation::Mutation;
use super::GameFlowService;
use crate::domain::board::Placement;
use crate::domain::cards::{Card, CardId, Effort};
use crate::domain::dice::DieSource;
use crate::domain::intent::MitigationPolicy;
use crate::domain::roll::{resolve, MitigationState, OutcomeKind, RevertReason, RollOutcome};
use crate::domain::stage::Stage;
use crate::domain::state::{GameSession, PlayerId, RevertEvent, SessionId};
use crate::domain::validation::{check_capacity, check_card_exists};
use crate::error::AppError;
use crate::errors::domain::{DomainError, InvalidStateKind, NotFoundKind};

/// What a roll did to the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RollResult {
    pub outcome: RollOutcome,
    /// Card after the move.
    pub card: Card,
    pub placement: Placement,
    pub mitigation_applied: bool,
    pub tokens_available: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MoveResult {
    pub card: Card,
    pub from: Stage,
    pub to: Stage,
    pub placement: Placement,
}

impl GameFlowService {
    /// Add a new card to the Funnel.
    pub fn create_card(
        &self,
        session_id: SessionId,
        title: &str,
        effort: u8,
    ) -> Result<Card, AppError> {
        let effort = Effort::try_from(effort)?;
        let title = title.trim().to_string();
        self.run_mutation(session_id, "create_card", move |session, _| {
            let card = Card::new(title, effort, session.turn);
            session.board.place(Stage::Funnel, card.clone());
            debug!(session_id = %session.id, card_id = %card.id, "Card created");
            Ok(Mutation::changed(card))
        })
    }

    /// Draw a die face and apply it to `card_id`.
    pub fn roll_for_card(
        &self,
        session_id: SessionId,
        card_id: CardId,
        policy: MitigationPolicy,
    ) -> Result<RollResult, AppError> {
        self.run_mutation(session_id, "roll_die", move |session, die| {
            apply_roll(session, card_id, RollSource::Drawn(die), policy).map(Mutation::changed)
        })
    }

    /// Apply a known die face, e.g. when replaying a recorded game.
    pub fn roll_for_card_with(
        &self,
        session_id: SessionId,
        card_id: CardId,
        die_value: u8,
        policy: MitigationPolicy,
    ) -> Result<RollResult, AppError> {
        self.run_mutation(session_id, "roll_die", move |session, _| {
            apply_roll(session, card_id, RollSource::Fixed(die_value), policy)
                .map(Mutation::changed)
        })
    }

    /// Move a card directly, bypassing the die. `from` must be the card's
    /// current stage and `to` must have effort capacity.
    pub fn move_card(
        &self,
        session_id: SessionId,
        card_id: CardId,
        from: Stage,
        to: Stage,
    ) -> Result<MoveResult, AppError> {
        self.run_mutation(session_id, "move_card", move |session, _| {
            direct_move(session, card_id, from, to).map(Mutation::changed)
        })
    }

    /// Sprint-planning pull from ProductBacklog into SprintBacklog.
    pub fn pull_to_sprint(
        &self,
        session_id: SessionId,
        card_id: CardId,
    ) -> Result<MoveResult, AppError> {
        self.run_mutation(session_id, "pull_to_sprint", move |session, _| {
            direct_move(session, card_id, Stage::ProductBacklog, Stage::SprintBacklog)
                .map(Mutation::changed)
        })
    }

    /// Product owner accepts a card waiting in PreDeployment.
    pub fn accept_card(
        &self,
        session_id: SessionId,
        card_id: CardId,
    ) -> Result<MoveResult, AppError> {
        self.run_mutation(session_id, "accept_card", move |session, _| {
            direct_move(session, card_id, Stage::PreDeployment, Stage::Production)
                .map(Mutation::changed)
        })
    }

    /// Product owner rejects a card in PreDeployment; it goes back to the
    /// product backlog and counts as a revert.
    pub fn reject_card(
        &self,
        session_id: SessionId,
        card_id: CardId,
    ) -> Result<MoveResult, AppError> {
        self.run_mutation(session_id, "reject_card", move |session, _| {
            let (stage, _) = check_card_exists(card_id, &session.board)?;
            require_stage(card_id, stage, Stage::PreDeployment)?;
            let placement = session
                .board
                .move_card(card_id, stage, Stage::ProductBacklog)?;
            let card = record_revert(
                session,
                card_id,
                stage,
                Stage::ProductBacklog,
                RevertReason::Rejected,
            )?;
            info!(session_id = %session.id, card_id = %card_id, "Card rejected at pre-deployment");
            Ok(Mutation::changed(MoveResult {
                card,
                from: stage,
                to: Stage::ProductBacklog,
                placement,
            }))
        })
    }

    /// Spend a Scrum-Master token outside a roll. Returns tokens left.
    pub fn use_token(&self, session_id: SessionId) -> Result<u8, AppError> {
        self.run_mutation(session_id, "use_token", |session, _| {
            session.pool.spend_token().map(Mutation::changed)
        })
    }

    /// Switch on the technical-debt bonus until `turn + debt_duration_turns`.
    /// Returns the expiry turn.
    pub fn allocate_technical_debt(
        &self,
        session_id: SessionId,
        effort: u32,
    ) -> Result<u32, AppError> {
        self.run_mutation(session_id, "allocate_debt", move |session, _| {
            let turn = session.turn;
            let duration = session.rules.debt_duration_turns;
            session.pool.allocate_debt(effort, turn, duration);
            info!(
                session_id = %session.id,
                effort,
                expires_at_turn = session.pool.technical_debt_expires_at_turn,
                "Technical debt allocated"
            );
            Ok(Mutation::changed(session.pool.technical_debt_expires_at_turn))
        })
    }

    /// Record the effort a player commits to this turn.
    pub fn allocate_capacity(
        &self,
        session_id: SessionId,
        player_id: PlayerId,
        points: u32,
    ) -> Result<u32, AppError> {
        self.run_mutation(session_id, "allocate_capacity", move |session, _| {
            let player = session.player_mut(player_id)?;
            player.allocated_capacity = points;
            Ok(Mutation::changed(points))
        })
    }
}

enum RollSource<'a> {
    Drawn(&'a dyn DieSource),
    Fixed(u8),
}

/// Resolve, validate, move, then account for reverts, completion and
/// mitigation. Any error leaves the draft to be discarded.
fn apply_roll(
    session: &mut GameSession,
    card_id: CardId,
    source: RollSource<'_>,
    policy: MitigationPolicy,
) -> Result<RollResult, DomainError> {
    let (from, _) = check_card_exists(card_id, &session.board)?;
    let die = match source {
        RollSource::Drawn(die) => die.roll()?,
        RollSource::Fixed(value) => value,
    };

    let mitigation = MitigationState::from_pool(&session.pool, session.turn);
    let card = session
        .board
        .card(card_id)
        .ok_or_else(|| DomainError::contract(format!("card {card_id} located but not readable")))?;
    let outcome = resolve(die, card, from, &mitigation)?;

    // Progress must fit; reverts always land, overflowing into the queue.
    if !outcome.reverted && outcome.destination != from {
        check_capacity(outcome.destination, card, &session.board)?;
    }

    let placement = session
        .board
        .move_card(card_id, from, outcome.destination)?;

    let card = if let Some(reason) = outcome.kind.revert_reason() {
        let debt_absorbed =
            outcome.kind == OutcomeKind::CriticalFailure && mitigation.technical_debt_active;
        let mut card = record_revert(session, card_id, from, outcome.destination, reason)?;
        if debt_absorbed {
            card = mark_debt(session, card_id)?;
        }
        card
    } else {
        complete_if_in_production(session, card_id, outcome.destination)?
    };

    let mitigation_applied =
        outcome.can_mitigate && session.pool.has_token() && policy.elects_to_spend();
    if mitigation_applied {
        session.pool.spend_token()?;
    }

    info!(
        session_id = %session.id,
        card_id = %card_id,
        die,
        from = %from,
        to = %outcome.destination,
        reverted = outcome.reverted,
        mitigation_applied,
        "Roll applied"
    );

    Ok(RollResult {
        outcome,
        card,
        placement,
        mitigation_applied,
        tokens_available: session.pool.tokens_available,
    })
}

fn direct_move(
    session: &mut GameSession,
    card_id: CardId,
    from: Stage,
    to: Stage,
) -> Result<MoveResult, DomainError> {
    let (actual, _) = check_card_exists(card_id, &session.board)?;
    require_stage(card_id, actual, from)?;
    if from != to {
        let card = session.board.card(card_id).ok_or_else(|| {
            DomainError::contract(format!("card {card_id} located but not readable"))
        })?;
        check_capacity(to, card, &session.board)?;
    }
    let placement = session.board.move_card(card_id, from, to)?;
    let card = complete_if_in_production(session, card_id, to)?;
    debug!(session_id = %session.id, card_id = %card_id, from = %from, to = %to, "Card moved");
    Ok(MoveResult {
        card,
        from,
        to,
        placement,
    })
}

fn require_stage(card_id: CardId, actual: Stage, expected: Stage) -> Result<(), DomainError> {
    if actual == expected {
        Ok(())
    } else {
        Err(DomainError::invalid_state(
            InvalidStateKind::WrongStage,
            format!("card {card_id} is in {actual}, not {expected}"),
        ))
    }
}

fn card_mut(session: &mut GameSession, card_id: CardId) -> Result<&mut Card, DomainError> {
    session
        .board
        .card_mut(card_id)
        .ok_or_else(|| DomainError::not_found(NotFoundKind::Card, format!("card {card_id}")))
}

fn record_revert(
    session: &mut GameSession,
    card_id: CardId,
    from: Stage,
    to: Stage,
    reason: RevertReason,
) -> Result<Card, DomainError> {
    let turn = session.turn;
    let card = card_mut(session, card_id)?;
    card.revert_count += 1;
    let card = card.clone();
    session.revert_log.push(RevertEvent {
        turn,
        card: card_id,
        from,
        to,
        reason,
    });
    Ok(card)
}

fn mark_debt(session: &mut GameSession, card_id: CardId) -> Result<Card, DomainError> {
    let card = card_mut(session, card_id)?;
    card.technical_debt = true;
    Ok(card.clone())
}

fn complete_if_in_production(
    session: &mut GameSession,
    card_id: CardId,
    stage: Stage,
) -> Result<Card, DomainError> {
    let turn = session.turn;
    let card = card_mut(session, card_id)?;
    if stage == Stage::Production {
        card.mark_completed(turn);
    }
    Ok(card.clone())
}
