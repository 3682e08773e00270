//! Flow metrics derived on demand from a session. Nothing here is cached;
//! calling [`derive_metrics`] twice on an unchanged session gives equal
//! results.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::board::Board;
use crate::domain::cards::{Card, CardId};
use crate::domain::roll::RevertReason;
use crate::domain::stage::{Stage, STAGES};
use crate::domain::state::{GameSession, RevertEvent, SessionId};

/// Recent mean must beat the older mean by this factor to count as rising.
pub const TREND_UP: f64 = 1.1;
/// Recent mean below this factor of the older mean counts as falling.
pub const TREND_DOWN: f64 = 0.9;

/// Card count per stage at the end of a turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowSnapshot {
    pub turn: u32,
    pub counts: BTreeMap<Stage, usize>,
    pub total: usize,
}

impl FlowSnapshot {
    pub fn capture(turn: u32, board: &Board) -> Self {
        let counts: BTreeMap<Stage, usize> = STAGES
            .iter()
            .map(|&stage| (stage, board.lane(stage).len()))
            .collect();
        let total = counts.values().sum();
        Self {
            turn,
            counts,
            total,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VelocityPoint {
    pub turn: u32,
    pub effort: u32,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trend {
    Increasing,
    Decreasing,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevertAnalysis {
    /// Sum of every card's revert count.
    pub total_reverts: u32,
    /// Logged events grouped by cause.
    pub by_reason: BTreeMap<RevertReason, u32>,
    /// Logged events grouped by the stage the card was knocked out of.
    pub by_origin: BTreeMap<Stage, u32>,
    pub most_reverted: Option<(CardId, u32)>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub session_id: SessionId,
    pub turn: u32,
    pub velocity: Vec<VelocityPoint>,
    pub accumulated_score: u32,
    pub cycle_times: BTreeMap<CardId, u32>,
    pub average_cycle_time: Option<f64>,
    pub cumulative_flow: Vec<FlowSnapshot>,
    pub reverts: RevertAnalysis,
    pub trend: Trend,
}

pub fn derive_metrics(session: &GameSession, trend_window: usize) -> MetricsSnapshot {
    let cards: Vec<&Card> = session.board.cards().collect();
    let velocity = velocity_per_turn(&cards, session.turn);
    let cycle_times = cycle_times(&cards);
    let series: Vec<u32> = velocity.iter().map(|v| v.effort).collect();

    MetricsSnapshot {
        session_id: session.id,
        turn: session.turn,
        accumulated_score: accumulated_score(&session.board),
        average_cycle_time: average(cycle_times.values().copied()),
        cycle_times,
        cumulative_flow: cumulative_flow(&session.flow_history, &session.board, session.turn),
        reverts: analyze_reverts(&cards, &session.revert_log),
        trend: classify_trend(&series, trend_window),
        velocity,
    }
}

/// For each turn `1..=current_turn`, the effort of cards whose cycle time
/// equals that turn number. Unfinished cards and cards shipped in their
/// creation turn (cycle time 0) count nowhere.
pub fn velocity_per_turn(cards: &[&Card], current_turn: u32) -> Vec<VelocityPoint> {
    (1..=current_turn)
        .map(|turn| VelocityPoint {
            turn,
            effort: cards
                .iter()
                .filter(|c| c.cycle_time == Some(turn))
                .map(|c| c.effort.points())
                .sum(),
        })
        .collect()
}

/// Effort of everything currently in Production.
pub fn accumulated_score(board: &Board) -> u32 {
    let lane = board.lane(Stage::Production);
    lane.slots
        .iter()
        .chain(lane.queue.iter())
        .map(|c| c.effort.points())
        .sum()
}

pub fn cycle_times(cards: &[&Card]) -> BTreeMap<CardId, u32> {
    cards
        .iter()
        .filter_map(|c| c.cycle_time.map(|t| (c.id, t)))
        .collect()
}

/// Retained per-turn snapshots plus the live board for the current turn.
pub fn cumulative_flow(history: &[FlowSnapshot], board: &Board, current_turn: u32) -> Vec<FlowSnapshot> {
    let mut flow: Vec<FlowSnapshot> = history
        .iter()
        .filter(|s| s.turn < current_turn)
        .cloned()
        .collect();
    flow.push(FlowSnapshot::capture(current_turn, board));
    flow
}

pub fn analyze_reverts(cards: &[&Card], log: &[RevertEvent]) -> RevertAnalysis {
    let mut by_reason = BTreeMap::new();
    let mut by_origin = BTreeMap::new();
    for event in log {
        *by_reason.entry(event.reason).or_insert(0) += 1;
        *by_origin.entry(event.from).or_insert(0) += 1;
    }
    let most_reverted = cards
        .iter()
        .filter(|c| c.revert_count > 0)
        .max_by(|a, b| a.revert_count.cmp(&b.revert_count).then(b.id.cmp(&a.id)))
        .map(|c| (c.id, c.revert_count));

    RevertAnalysis {
        total_reverts: cards.iter().map(|c| c.revert_count).sum(),
        by_reason,
        by_origin,
        most_reverted,
    }
}

/// Compare the mean of the last `window` samples against the `window`
/// before them. Short series are always stable.
pub fn classify_trend(series: &[u32], window: usize) -> Trend {
    if series.len() < 2 {
        return Trend::Stable;
    }
    let w = window.min(series.len() / 2).max(1);
    let recent = &series[series.len() - w..];
    let older = &series[series.len() - 2 * w..series.len() - w];

    let recent_mean = average(recent.iter().copied()).unwrap_or(0.0);
    let older_mean = average(older.iter().copied()).unwrap_or(0.0);

    if recent_mean > older_mean * TREND_UP {
        Trend::Increasing
    } else if recent_mean < older_mean * TREND_DOWN {
        Trend::Decreasing
    } else {
        Trend::Stable
    }
}

fn average(values: impl Iterator<Item = u32>) -> Option<f64> {
    let (sum, n) = values.fold((0u64, 0u64), |(s, n), v| (s + v as u64, n + 1));
    (n > 0).then(|| sum as f64 / n as f64)
}
