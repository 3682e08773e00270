// Integration tests for the intent entry point.

use flowboard::domain::{Effort, Intent, MitigationPolicy, Phase, Stage};
use flowboard::{AppError, ErrorCode, IntentOutcome};
use serde_json::json;

use crate::support::session_setup::start_with_faces;

#[test]
fn every_intent_variant_is_applied() -> Result<(), AppError> {
    let t = start_with_faces(&[2]);
    let backlog = t.seed_card(Stage::ProductBacklog, Effort::ONE);
    let testing = t.seed_card(Stage::Testing, Effort::ONE);
    let ready = t.seed_card(Stage::PreDeployment, Effort::THREE);
    let doubtful = t.seed_card(Stage::PreDeployment, Effort::ONE);
    let sid = t.session_id;

    let moved = t
        .service
        .apply_intent(sid, Intent::PullToSprint { card_id: backlog })?;
    assert!(matches!(moved, IntentOutcome::Moved(ref m) if m.to == Stage::SprintBacklog));

    let capacity = t.service.apply_intent(
        sid,
        Intent::AllocateCapacity {
            player_id: 2,
            points: 4,
        },
    )?;
    assert_eq!(
        capacity,
        IntentOutcome::CapacityAllocated {
            player_id: 2,
            points: 4
        }
    );

    let rolled = t.service.apply_intent(
        sid,
        Intent::RollDie {
            card_id: testing,
            policy: MitigationPolicy::Never,
        },
    )?;
    assert!(matches!(rolled, IntentOutcome::Rolled(ref r) if r.card.stage == Stage::PreDeployment));

    assert_eq!(
        t.service.apply_intent(sid, Intent::UseToken)?,
        IntentOutcome::TokenUsed {
            tokens_available: 2
        }
    );
    assert_eq!(
        t.service.apply_intent(sid, Intent::AllocateDebt { effort: 2 })?,
        IntentOutcome::DebtAllocated { expires_at_turn: 3 }
    );

    let accepted = t
        .service
        .apply_intent(sid, Intent::AcceptCard { card_id: ready })?;
    assert!(matches!(accepted, IntentOutcome::Moved(ref m) if m.to == Stage::Production));

    let rejected = t
        .service
        .apply_intent(sid, Intent::RejectCard { card_id: doubtful })?;
    assert!(matches!(rejected, IntentOutcome::Moved(ref m) if m.card.revert_count == 1));

    let phase = t.service.apply_intent(sid, Intent::AdvancePhase)?;
    assert!(matches!(phase, IntentOutcome::Phase(p) if p.phase == Phase::Execution));

    assert_eq!(
        t.service.apply_intent(sid, Intent::AdvanceTurn)?,
        IntentOutcome::Turn { turn: 2 }
    );
    t.assert_board_consistent();
    Ok(())
}

#[test]
fn intents_decode_from_tagged_json() -> Result<(), AppError> {
    let t = start_with_faces(&[3]);
    let id = t.seed_card(Stage::Implementation, Effort::ONE);

    let intent: Intent = serde_json::from_value(json!({
        "type": "roll_die",
        "card_id": id.to_string(),
    }))?;
    assert_eq!(
        intent,
        Intent::RollDie {
            card_id: id,
            policy: MitigationPolicy::Never
        }
    );

    let outcome = t.service.apply_intent(t.session_id, intent)?;
    let json = serde_json::to_value(&outcome)?;
    assert_eq!(json["type"], "rolled");
    assert_eq!(json["card"]["stage"], "integration");
    Ok(())
}

#[test]
fn unknown_intent_type_is_rejected_at_decode() {
    let decoded = serde_json::from_value::<Intent>(json!({ "type": "teleport" }));
    assert!(decoded.is_err());
}

#[test]
fn failed_intent_surfaces_the_service_error() {
    let t = start_with_faces(&[]);
    let err = t
        .service
        .apply_intent(t.session_id, Intent::AcceptCard {
            card_id: flowboard::domain::CardId::new(),
        })
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::CardNotFound);
}
