// Integration tests for rejected operations. A rejected call must leave the
// session exactly as it was.

use flowboard::domain::{CardId, Effort, MitigationPolicy, SessionId, Stage};
use flowboard::{AppError, ErrorCode};

use crate::support::session_setup::start_with_faces;

#[test]
fn unknown_session_is_not_found() {
    let t = start_with_faces(&[]);
    let err = t
        .service
        .roll_for_card(SessionId::new(), CardId::new(), MitigationPolicy::Never)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::SessionNotFound);
    assert!(err.is_recoverable());
}

#[test]
fn unknown_card_is_not_found_and_no_die_is_drawn() {
    let t = start_with_faces(&[2]);
    let err = t
        .service
        .roll_for_card(t.session_id, CardId::new(), MitigationPolicy::Never)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::CardNotFound);
    assert_eq!(t.die.remaining(), 1);
}

#[test]
fn capacity_rejection_leaves_board_untouched() -> Result<(), AppError> {
    // Integration holds one effort point; an effort-3 card cannot enter
    let t = start_with_faces(&[2]);
    let id = t.seed_card(Stage::Implementation, Effort::THREE);
    let before = t.service.get_session(t.session_id)?;

    let err = t
        .service
        .roll_for_card(t.session_id, id, MitigationPolicy::Never)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::CapacityExceeded);
    assert!(matches!(err, AppError::InvalidState { .. }));

    assert_eq!(t.service.get_session(t.session_id)?, before);
    assert_eq!(t.stage_of(id), Stage::Implementation);
    Ok(())
}

#[test]
fn direct_move_checks_effort_capacity() -> Result<(), AppError> {
    let t = start_with_faces(&[]);
    t.seed_card(Stage::SprintBacklog, Effort::THREE);
    let second = t.seed_card(Stage::ProductBacklog, Effort::THREE);

    let err = t.service.pull_to_sprint(t.session_id, second).unwrap_err();
    assert_eq!(err.code(), ErrorCode::CapacityExceeded);

    let small = t.seed_card(Stage::ProductBacklog, Effort::ONE);
    let err = t.service.pull_to_sprint(t.session_id, small).unwrap_err();
    assert_eq!(err.code(), ErrorCode::CapacityExceeded);
    Ok(())
}

#[test]
fn direct_move_requires_matching_source() {
    let t = start_with_faces(&[]);
    let id = t.seed_card(Stage::Testing, Effort::ONE);
    let err = t
        .service
        .move_card(t.session_id, id, Stage::Implementation, Stage::Integration)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::WrongStage);

    let err = t.service.accept_card(t.session_id, id).unwrap_err();
    assert_eq!(err.code(), ErrorCode::WrongStage);
    let err = t.service.reject_card(t.session_id, id).unwrap_err();
    assert_eq!(err.code(), ErrorCode::WrongStage);
}

#[test]
fn effort_outside_scale_is_rejected() {
    let t = start_with_faces(&[]);
    for effort in [0, 2, 4, 8] {
        let err = t
            .service
            .create_card(t.session_id, "odd", effort)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidEffort, "effort={effort}");
    }
}

#[test]
fn ended_session_rejects_every_mutation() -> Result<(), AppError> {
    let t = start_with_faces(&[2]);
    let id = t.seed_card(Stage::Testing, Effort::ONE);
    t.service.end_game(t.session_id)?;

    let errors = [
        t.service
            .roll_for_card(t.session_id, id, MitigationPolicy::Never)
            .unwrap_err(),
        t.service.advance_phase(t.session_id).unwrap_err(),
        t.service.advance_turn(t.session_id).unwrap_err(),
        t.service.allocate_technical_debt(t.session_id, 3).unwrap_err(),
        t.service.create_card(t.session_id, "late", 1).unwrap_err(),
        t.service.end_game(t.session_id).unwrap_err(),
    ];
    for err in errors {
        assert_eq!(err.code(), ErrorCode::SessionEnded);
        assert!(matches!(err, AppError::InvalidState { .. }));
    }
    assert_eq!(t.die.remaining(), 1);
    Ok(())
}

#[test]
fn tokens_run_out() -> Result<(), AppError> {
    let t = start_with_faces(&[]);
    assert_eq!(t.service.use_token(t.session_id)?, 2);
    assert_eq!(t.service.use_token(t.session_id)?, 1);
    assert_eq!(t.service.use_token(t.session_id)?, 0);
    let err = t.service.use_token(t.session_id).unwrap_err();
    assert_eq!(err.code(), ErrorCode::NoTokensAvailable);

    let pool = t.service.get_session(t.session_id)?.pool;
    assert_eq!(pool.tokens_used, 3);
    assert_eq!(pool.tokens_available, 0);
    Ok(())
}

#[test]
fn unknown_player_cannot_allocate_capacity() {
    let t = start_with_faces(&[]);
    let err = t
        .service
        .allocate_capacity(t.session_id, 42, 5)
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::PlayerNotFound);
}
