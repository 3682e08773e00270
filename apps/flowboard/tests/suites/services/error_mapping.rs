// The failure payload handed to callers for each error family.

use flowboard::domain::{CardId, MitigationPolicy};
use flowboard::errors::domain::{DomainError, InvalidStateKind};
use flowboard::{AppError, ErrorCode};
use flowboard_test_support::failure::assert_failure;

use crate::support::session_setup::start_with_faces;

#[test]
fn not_found_is_recoverable() {
    let t = start_with_faces(&[]);
    let err = t
        .service
        .roll_for_card(t.session_id, CardId::new(), MitigationPolicy::Never)
        .unwrap_err();
    let json = serde_json::to_value(err.failure()).unwrap();
    assert_failure(&json, "CARD_NOT_FOUND", true, Some("not on the board"));
}

#[test]
fn invalid_state_kinds_keep_their_codes() {
    let cases = [
        (InvalidStateKind::SessionEnded, ErrorCode::SessionEnded),
        (InvalidStateKind::CapacityExceeded, ErrorCode::CapacityExceeded),
        (InvalidStateKind::NoTokensAvailable, ErrorCode::NoTokensAvailable),
        (InvalidStateKind::WrongStage, ErrorCode::WrongStage),
        (InvalidStateKind::InvalidEffort, ErrorCode::InvalidEffort),
        (InvalidStateKind::InvalidRoster, ErrorCode::InvalidRoster),
    ];
    for (kind, code) in cases {
        let err: AppError = DomainError::invalid_state(kind, "nope").into();
        assert_eq!(err.code(), code);
        let json = serde_json::to_value(err.failure()).unwrap();
        assert_failure(&json, code.as_str(), true, Some("nope"));
    }
}

#[test]
fn contract_violation_is_not_recoverable() {
    let err: AppError = DomainError::contract("die value 9 outside 1..=6").into();
    assert_eq!(err.code(), ErrorCode::ContractViolation);
    let json = serde_json::to_value(err.failure()).unwrap();
    assert_failure(&json, "CONTRACT_VIOLATION", false, Some("die value 9"));
}

#[test]
fn stage_lookup_failure_maps_to_stage_not_found() {
    let err: AppError = "backlog-ish"
        .parse::<flowboard::domain::Stage>()
        .map_err(AppError::from)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::StageNotFound);
    assert!(matches!(err, AppError::NotFound { .. }));
}
