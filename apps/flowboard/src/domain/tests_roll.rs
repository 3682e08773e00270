use crate::domain::roll::{resolve, MitigationState, OutcomeKind, RevertReason};
use crate::domain::{Card, Effort, Stage};
use crate::errors::domain::DomainError;

fn card(effort: Effort) -> Card {
    Card::new("roll", effort, 1)
}

fn with_tokens(tokens_available: u8) -> MitigationState {
    MitigationState {
        tokens_available,
        technical_debt_active: false,
    }
}

fn with_debt() -> MitigationState {
    MitigationState {
        tokens_available: 0,
        technical_debt_active: true,
    }
}

#[test]
fn die_one_ships_to_production_from_anywhere() {
    let c = card(Effort::FIVE);
    let out = resolve(1, &c, Stage::SprintBacklog, &with_tokens(0)).unwrap();
    assert_eq!(out.kind, OutcomeKind::CriticalSuccess);
    assert_eq!(out.destination, Stage::Production);
    assert_eq!(out.effort_credited, 5);
    assert!(!out.reverted);
    assert!(!out.can_mitigate);
}

#[test]
fn standard_progress_moves_one_stage() {
    let c = card(Effort::THREE);
    for die in [2, 3] {
        let out = resolve(die, &c, Stage::Implementation, &with_tokens(3)).unwrap();
        assert_eq!(out.kind, OutcomeKind::StandardProgress);
        assert_eq!(out.destination, Stage::Integration);
        assert_eq!(out.effort_credited, 3);
        assert!(!out.reverted);
    }
}

#[test]
fn standard_progress_stays_at_production() {
    let out = resolve(2, &card(Effort::ONE), Stage::Production, &with_tokens(0)).unwrap();
    assert_eq!(out.destination, Stage::Production);
    assert!(!out.reverted);
}

#[test]
fn scope_creep_returns_to_product_backlog() {
    let out = resolve(4, &card(Effort::FIVE), Stage::PreDeployment, &with_tokens(2)).unwrap();
    assert_eq!(out.kind, OutcomeKind::ScopeCreep);
    assert_eq!(out.destination, Stage::ProductBacklog);
    assert_eq!(out.effort_credited, 0);
    assert!(out.reverted);
    assert!(!out.can_mitigate);
    assert_eq!(out.kind.revert_reason(), Some(RevertReason::ScopeCreep));
}

#[test]
fn impediment_without_tokens_falls_back_to_implementation() {
    let out = resolve(5, &card(Effort::THREE), Stage::Testing, &with_tokens(0)).unwrap();
    assert_eq!(out.destination, Stage::Implementation);
    assert!(!out.can_mitigate);
    assert!(out.reverted);
}

#[test]
fn impediment_with_token_steps_back_once() {
    let out = resolve(5, &card(Effort::THREE), Stage::Testing, &with_tokens(1)).unwrap();
    assert_eq!(out.destination, Stage::Integration);
    assert!(out.can_mitigate);
    assert!(out.reverted);
    assert_eq!(out.effort_credited, 0);
}

#[test]
fn impediment_with_token_at_funnel_stays() {
    let out = resolve(5, &card(Effort::ONE), Stage::Funnel, &with_tokens(1)).unwrap();
    assert_eq!(out.destination, Stage::Funnel);
}

#[test]
fn critical_failure_without_debt_goes_to_sprint_backlog() {
    let out = resolve(6, &card(Effort::ONE), Stage::SprintBacklog, &with_tokens(3)).unwrap();
    assert_eq!(out.kind, OutcomeKind::CriticalFailure);
    assert_eq!(out.destination, Stage::SprintBacklog);
    assert!(out.reverted);
    // tokens never soften a critical failure
    assert!(!out.can_mitigate);
}

#[test]
fn critical_failure_with_debt_goes_to_implementation() {
    let out = resolve(6, &card(Effort::ONE), Stage::Testing, &with_debt()).unwrap();
    assert_eq!(out.destination, Stage::Implementation);
    assert!(out.reverted);
}

#[test]
fn out_of_range_die_is_contract_violation() {
    for die in [0, 7, 255] {
        let err = resolve(die, &card(Effort::ONE), Stage::Testing, &with_tokens(1)).unwrap_err();
        assert!(matches!(err, DomainError::ContractViolation(_)), "die={die}");
        assert!(!err.is_recoverable());
    }
}

#[test]
fn resolver_reports_source_stage() {
    let out = resolve(3, &card(Effort::ONE), Stage::Integration, &with_tokens(0)).unwrap();
    assert_eq!(out.from, Stage::Integration);
    assert_eq!(out.die, 3);
    assert!(!out.effect.is_empty());
}
