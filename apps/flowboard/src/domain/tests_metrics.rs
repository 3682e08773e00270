use crate::domain::metrics::{
    analyze_reverts, cumulative_flow, derive_metrics, velocity_per_turn, FlowSnapshot, Trend,
};
use crate::domain::roll::RevertReason;
use crate::domain::state::{GameSession, RevertEvent, Roster, SessionRules};
use crate::domain::{Card, Effort, Stage};

fn session() -> GameSession {
    GameSession::new(Roster::default(), SessionRules::default())
}

fn shipped(effort: Effort, created: u32, completed: u32) -> Card {
    let mut card = Card::new("done", effort, created);
    card.mark_completed(completed);
    card
}

#[test]
fn empty_session_has_zeroed_metrics() {
    let s = session();
    let m = derive_metrics(&s, 3);
    assert_eq!(m.turn, 1);
    assert_eq!(m.accumulated_score, 0);
    assert_eq!(m.velocity.len(), 1);
    assert_eq!(m.velocity[0].effort, 0);
    assert!(m.cycle_times.is_empty());
    assert_eq!(m.average_cycle_time, None);
    assert_eq!(m.reverts.total_reverts, 0);
    assert_eq!(m.trend, Trend::Stable);
    assert_eq!(m.cumulative_flow.len(), 1);
}

#[test]
fn cycle_time_is_fixed_on_first_arrival() {
    let mut card = Card::new("c", Effort::THREE, 2);
    card.mark_completed(4);
    card.mark_completed(9);
    assert_eq!(card.completed_turn, Some(4));
    assert_eq!(card.cycle_time, Some(2));
}

#[test]
fn velocity_buckets_by_cycle_time() {
    let a = shipped(Effort::THREE, 1, 2); // cycle 1
    let b = shipped(Effort::FIVE, 1, 3); // cycle 2
    let c = shipped(Effort::ONE, 2, 4); // cycle 2
    let same_turn = shipped(Effort::ONE, 3, 3); // cycle 0, no bucket
    let pending = Card::new("wip", Effort::FIVE, 1);
    let cards = vec![&a, &b, &c, &same_turn, &pending];

    let v = velocity_per_turn(&cards, 3);
    let efforts: Vec<u32> = v.iter().map(|p| p.effort).collect();
    assert_eq!(efforts, vec![3, 6, 0]);
    assert_eq!(v[0].turn, 1);
}

#[test]
fn score_and_cycle_times_come_from_the_board() {
    let mut s = session();
    s.turn = 4;
    let a = shipped(Effort::THREE, 1, 2);
    let b = shipped(Effort::FIVE, 2, 4);
    let a_id = a.id;
    s.board.place(Stage::Production, a);
    s.board.place(Stage::Production, b);
    s.board.place(Stage::Testing, Card::new("wip", Effort::ONE, 1));

    let m = derive_metrics(&s, 3);
    assert_eq!(m.accumulated_score, 8);
    assert_eq!(m.cycle_times.len(), 2);
    assert_eq!(m.cycle_times[&a_id], 1);
    assert_eq!(m.average_cycle_time, Some(1.5));
}

#[test]
fn revert_analysis_groups_the_event_log() {
    let mut a = Card::new("a", Effort::ONE, 1);
    a.revert_count = 2;
    let mut b = Card::new("b", Effort::ONE, 1);
    b.revert_count = 1;
    let log = vec![
        RevertEvent {
            turn: 1,
            card: a.id,
            from: Stage::Testing,
            to: Stage::ProductBacklog,
            reason: RevertReason::ScopeCreep,
        },
        RevertEvent {
            turn: 2,
            card: a.id,
            from: Stage::Testing,
            to: Stage::Implementation,
            reason: RevertReason::TechnicalImpediment,
        },
        RevertEvent {
            turn: 2,
            card: b.id,
            from: Stage::PreDeployment,
            to: Stage::ProductBacklog,
            reason: RevertReason::ScopeCreep,
        },
    ];

    let r = analyze_reverts(&[&a, &b], &log);
    assert_eq!(r.total_reverts, 3);
    assert_eq!(r.by_reason[&RevertReason::ScopeCreep], 2);
    assert_eq!(r.by_reason[&RevertReason::TechnicalImpediment], 1);
    assert_eq!(r.by_origin[&Stage::Testing], 2);
    assert_eq!(r.most_reverted, Some((a.id, 2)));
}

#[test]
fn cumulative_flow_uses_retained_history_then_live_board() {
    let mut s = session();
    s.board.place(Stage::Funnel, Card::new("x", Effort::ONE, 1));
    let history = vec![FlowSnapshot::capture(1, &s.board)];
    s.board.place(Stage::Funnel, Card::new("y", Effort::ONE, 2));

    let flow = cumulative_flow(&history, &s.board, 2);
    assert_eq!(flow.len(), 2);
    assert_eq!(flow[0].total, 1);
    assert_eq!(flow[1].turn, 2);
    assert_eq!(flow[1].counts[&Stage::Funnel], 2);
    assert_eq!(flow[1].total, 2);
}

#[test]
fn derivation_is_idempotent() {
    let mut s = session();
    s.turn = 3;
    s.board.place(Stage::Production, shipped(Effort::FIVE, 1, 2));
    s.board.place(Stage::Integration, Card::new("i", Effort::THREE, 2));
    let first = derive_metrics(&s, 3);
    let second = derive_metrics(&s, 3);
    assert_eq!(first, second);
}
