//! Board state: one lane per stage, each lane holding WIP-limited slots and
//! an unbounded FIFO overflow queue.
//!
//! A WIP limit counts effort points, so an effort-3 card takes a whole
//! limit-3 lane. Queued cards wait until their effort fits; promotion scans
//! the queue in arrival order and lets through every card that fits.
//!
//! Invariants (checked by [`Board::verify`]):
//! - `occupied_effort() <= wip_limit` for every bounded lane, which also
//!   keeps `slots.len() <= wip_limit`
//! - every card lives in exactly one lane, in exactly one of slots/queue
//! - a card's `stage` field names the lane that owns it

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::cards::{Card, CardId};
use crate::domain::stage::{Stage, STAGES};
use crate::errors::domain::{DomainError, NotFoundKind};

/// Per-stage WIP limits. `None` means unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WipLimits {
    limits: [Option<u32>; 8],
}

impl WipLimits {
    pub fn new(
        sprint_backlog: u32,
        implementation: u32,
        integration: u32,
        testing: u32,
        pre_deployment: u32,
    ) -> Self {
        let mut limits = [None; 8];
        limits[Stage::ProductBacklog.index()] = None;
        limits[Stage::SprintBacklog.index()] = Some(sprint_backlog);
        limits[Stage::Implementation.index()] = Some(implementation);
        limits[Stage::Integration.index()] = Some(integration);
        limits[Stage::Testing.index()] = Some(testing);
        limits[Stage::PreDeployment.index()] = Some(pre_deployment);
        Self { limits }
    }

    pub fn limit(&self, stage: Stage) -> Option<u32> {
        if stage.is_unbounded() {
            return None;
        }
        self.limits[stage.index()]
    }

    /// Override one stage. Funnel and Production stay unbounded.
    pub fn with_limit(mut self, stage: Stage, limit: Option<u32>) -> Self {
        if !stage.is_unbounded() {
            self.limits[stage.index()] = limit;
        }
        self
    }
}

impl Default for WipLimits {
    fn default() -> Self {
        Self::new(3, 3, 1, 2, 6)
    }
}

/// Where a placed card ended up.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    Slot,
    Queue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lane {
    pub stage: Stage,
    pub wip_limit: Option<u32>,
    pub slots: Vec<Card>,
    pub queue: VecDeque<Card>,
}

impl Lane {
    fn new(stage: Stage, wip_limit: Option<u32>) -> Self {
        Self {
            stage,
            wip_limit,
            slots: Vec::new(),
            queue: VecDeque::new(),
        }
    }

    /// True when the lane is unbounded or `card`'s effort fits next to the
    /// cards already in slots.
    #[inline]
    pub fn fits(&self, card: &Card) -> bool {
        match self.wip_limit {
            None => true,
            Some(limit) => self.occupied_effort() + card.effort.points() <= limit,
        }
    }

    /// Effort points held in slots. Queued cards do not count.
    pub fn occupied_effort(&self) -> u32 {
        self.slots.iter().map(|c| c.effort.points()).sum()
    }

    pub fn len(&self) -> usize {
        self.slots.len() + self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty() && self.queue.is_empty()
    }

    fn position(&self, card_id: CardId) -> Option<Placement> {
        if self.slots.iter().any(|c| c.id == card_id) {
            Some(Placement::Slot)
        } else if self.queue.iter().any(|c| c.id == card_id) {
            Some(Placement::Queue)
        } else {
            None
        }
    }

    fn take(&mut self, card_id: CardId) -> Option<Card> {
        if let Some(idx) = self.slots.iter().position(|c| c.id == card_id) {
            return Some(self.slots.remove(idx));
        }
        let idx = self.queue.iter().position(|c| c.id == card_id)?;
        self.queue.remove(idx)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    lanes: Vec<Lane>,
}

impl Board {
    pub fn new(limits: WipLimits) -> Self {
        let lanes = STAGES
            .iter()
            .map(|&stage| Lane::new(stage, limits.limit(stage)))
            .collect();
        Self { lanes }
    }

    #[inline]
    pub fn lane(&self, stage: Stage) -> &Lane {
        &self.lanes[stage.index()]
    }

    #[inline]
    fn lane_mut(&mut self, stage: Stage) -> &mut Lane {
        &mut self.lanes[stage.index()]
    }

    pub fn lanes(&self) -> impl Iterator<Item = &Lane> {
        self.lanes.iter()
    }

    pub fn wip_limit(&self, stage: Stage) -> Option<u32> {
        self.lane(stage).wip_limit
    }

    /// True when the stage is unbounded or the card's effort fits. Queues
    /// always accept, so this only says whether the card would be active.
    pub fn can_accept(&self, stage: Stage, card: &Card) -> bool {
        self.lane(stage).fits(card)
    }

    /// Put a card into a slot if its effort fits, or at the back of the
    /// queue. Never rejects.
    pub fn place(&mut self, stage: Stage, mut card: Card) -> Placement {
        card.stage = stage;
        let lane = self.lane_mut(stage);
        if lane.fits(&card) {
            lane.slots.push(card);
            Placement::Slot
        } else {
            lane.queue.push_back(card);
            Placement::Queue
        }
    }

    /// Remove a card and let the queue head into any freed slot.
    pub fn remove(&mut self, stage: Stage, card_id: CardId) -> Result<Card, DomainError> {
        let card = self.take(stage, card_id)?;
        self.promote(stage);
        Ok(card)
    }

    /// Move queued cards into slots, oldest first, skipping any whose effort
    /// does not fit yet. Returns the promoted card ids.
    pub fn promote(&mut self, stage: Stage) -> Vec<CardId> {
        let lane = self.lane_mut(stage);
        let mut promoted = Vec::new();
        let mut idx = 0;
        while idx < lane.queue.len() {
            if !lane.fits(&lane.queue[idx]) {
                idx += 1;
                continue;
            }
            if let Some(card) = lane.queue.remove(idx) {
                promoted.push(card.id);
                lane.slots.push(card);
            }
        }
        if !promoted.is_empty() {
            debug!(stage = %stage, promoted = promoted.len(), "Promoted queued cards");
        }
        promoted
    }

    /// Move a card between stages as one step: take from `from`, place into
    /// `to`, then promote `from`. Same-stage moves leave the card where it is.
    pub fn move_card(
        &mut self,
        card_id: CardId,
        from: Stage,
        to: Stage,
    ) -> Result<Placement, DomainError> {
        let current = self.lane(from).position(card_id).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Card, format!("card {card_id} not in {from}"))
        })?;
        if from == to {
            return Ok(current);
        }
        let card = self.take(from, card_id)?;
        let placement = self.place(to, card);
        self.promote(from);
        Ok(placement)
    }

    fn take(&mut self, stage: Stage, card_id: CardId) -> Result<Card, DomainError> {
        self.lane_mut(stage).take(card_id).ok_or_else(|| {
            DomainError::not_found(NotFoundKind::Card, format!("card {card_id} not in {stage}"))
        })
    }

    /// Stage and position of a card, searching every slot and queue.
    pub fn locate(&self, card_id: CardId) -> Option<(Stage, Placement)> {
        self.lanes
            .iter()
            .find_map(|lane| lane.position(card_id).map(|p| (lane.stage, p)))
    }

    pub fn card(&self, card_id: CardId) -> Option<&Card> {
        self.cards().find(|c| c.id == card_id)
    }

    pub fn card_mut(&mut self, card_id: CardId) -> Option<&mut Card> {
        self.lanes
            .iter_mut()
            .flat_map(|lane| lane.slots.iter_mut().chain(lane.queue.iter_mut()))
            .find(|c| c.id == card_id)
    }

    /// Every card on the board, in stage order, slots before queue.
    pub fn cards(&self) -> impl Iterator<Item = &Card> {
        self.lanes
            .iter()
            .flat_map(|lane| lane.slots.iter().chain(lane.queue.iter()))
    }

    pub fn card_count(&self) -> usize {
        self.lanes.iter().map(Lane::len).sum()
    }

    /// Check the board invariants. A failure here is an engine bug.
    pub fn verify(&self) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        for lane in &self.lanes {
            if let Some(limit) = lane.wip_limit {
                let occupied = lane.occupied_effort();
                if occupied > limit {
                    return Err(DomainError::contract(format!(
                        "{} holds {occupied} effort points over its limit {limit}",
                        lane.stage
                    )));
                }
            }
            for card in lane.slots.iter().chain(lane.queue.iter()) {
                if card.stage != lane.stage {
                    return Err(DomainError::contract(format!(
                        "card {} claims {} but sits in {}",
                        card.id, card.stage, lane.stage
                    )));
                }
                if !seen.insert(card.id) {
                    return Err(DomainError::contract(format!(
                        "card {} is owned twice",
                        card.id
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(WipLimits::default())
    }
}
