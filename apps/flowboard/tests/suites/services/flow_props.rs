// Property tests driving whole sessions with random intents.

use std::sync::Arc;

use flowboard::domain::{Intent, MitigationPolicy, ScriptedDie, STAGES};
use flowboard::GameFlowService;
use proptest::prelude::*;

use crate::common::proptest_prelude::proptest_prelude_config;

#[derive(Debug, Clone)]
enum Step {
    Create(u8),
    Roll { pick: usize, spend: bool },
    Move { pick: usize, to: usize },
    Debt,
    Turn,
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        2 => prop_oneof![Just(1u8), Just(3u8), Just(5u8)].prop_map(Step::Create),
        5 => (any::<usize>(), any::<bool>()).prop_map(|(pick, spend)| Step::Roll { pick, spend }),
        2 => (any::<usize>(), 0..STAGES.len()).prop_map(|(pick, to)| Step::Move { pick, to }),
        1 => Just(Step::Debt),
        1 => Just(Step::Turn),
    ]
}

proptest! {
    #![proptest_config(proptest_prelude_config())]

    /// Property: whatever is accepted or rejected, the stored board keeps
    /// its invariants and the token pool stays balanced.
    #[test]
    fn prop_random_sessions_stay_consistent(
        faces in prop::collection::vec(1u8..=6, 80),
        steps in prop::collection::vec(step(), 1..80),
    ) {
        let die = Arc::new(ScriptedDie::new(faces));
        let service = GameFlowService::builder().with_die(die).build();
        let sid = service.start_game(None).id;
        let mut cards = Vec::new();

        for step in steps {
            let _ = match step {
                Step::Create(effort) => service
                    .create_card(sid, "prop", effort)
                    .map(|card| cards.push(card.id)),
                Step::Roll { pick, spend } if !cards.is_empty() => {
                    let policy = if spend { MitigationPolicy::WhenEligible } else { MitigationPolicy::Never };
                    service
                        .apply_intent(sid, Intent::RollDie { card_id: cards[pick % cards.len()], policy })
                        .map(|_| ())
                }
                Step::Move { pick, to } if !cards.is_empty() => {
                    let id = cards[pick % cards.len()];
                    let from = service
                        .get_session(sid)
                        .unwrap()
                        .board
                        .stages
                        .iter()
                        .find(|s| s.slots.iter().chain(s.queue.iter()).any(|c| c.id == id))
                        .map(|s| s.stage)
                        .unwrap();
                    service.move_card(sid, id, from, STAGES[to]).map(|_| ())
                }
                Step::Debt => service.allocate_technical_debt(sid, 1).map(|_| ()),
                Step::Turn => service.advance_turn(sid).map(|_| ()),
                Step::Roll { .. } | Step::Move { .. } => Ok(()),
            };

            let shared = service.store().get(sid).unwrap();
            let session = shared.lock();
            prop_assert!(session.board.verify().is_ok());
            prop_assert_eq!(session.board.card_count(), cards.len());
            prop_assert_eq!(
                session.pool.tokens_available + session.pool.tokens_used,
                session.pool.tokens_total
            );
        }

        let first = service.compute_metrics(sid).unwrap();
        let second = service.compute_metrics(sid).unwrap();
        prop_assert_eq!(first, second);
    }
}
