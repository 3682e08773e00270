// Concurrent access: one writer per session, sessions independent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use flowboard::domain::{Effort, MitigationPolicy, RandomDie, Stage};
use flowboard::realtime::{BoardNotification, NotificationSink, NotifyError};
use flowboard::GameFlowService;

/// Stalls on its first delivery so a racing writer would overtake it.
#[derive(Default)]
struct StallingSink {
    stalled: AtomicBool,
    turns: Mutex<Vec<u32>>,
}

impl NotificationSink for StallingSink {
    fn notify(&self, notification: BoardNotification) -> Result<(), NotifyError> {
        if !self.stalled.swap(true, Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(50));
        }
        self.turns.lock().push(notification.turn);
        Ok(())
    }
}

#[test]
fn concurrent_rolls_on_one_session_keep_the_board_consistent() {
    let service = Arc::new(
        GameFlowService::builder()
            .with_die(Arc::new(RandomDie::new(Some(7))))
            .build(),
    );
    let session_id = service.start_game(None).id;
    let cards: Vec<_> = (0..12)
        .map(|i| {
            let card = service
                .create_card(session_id, &format!("card {i}"), 1)
                .unwrap();
            card.id
        })
        .collect();

    let handles: Vec<_> = (0..4)
        .map(|worker| {
            let service = Arc::clone(&service);
            let cards = cards.clone();
            thread::spawn(move || {
                for round in 0..50 {
                    let card_id = cards[(worker * 3 + round) % cards.len()];
                    // capacity rejections are expected answers
                    let _ = service.roll_for_card(
                        session_id,
                        card_id,
                        MitigationPolicy::WhenEligible,
                    );
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let shared = service.store().get(session_id).unwrap();
    let session = shared.lock();
    session.board.verify().unwrap();
    assert_eq!(session.board.card_count(), cards.len());
    let pool = &session.pool;
    assert_eq!(pool.tokens_available + pool.tokens_used, pool.tokens_total);
}

#[test]
fn sessions_progress_independently_in_parallel() {
    let service = Arc::new(GameFlowService::default());
    let ids: Vec<_> = (0..8).map(|_| service.start_game(None).id).collect();

    let handles: Vec<_> = ids
        .iter()
        .copied()
        .enumerate()
        .map(|(i, id)| {
            let service = Arc::clone(&service);
            thread::spawn(move || {
                for _ in 0..=i {
                    service.advance_turn(id).unwrap();
                }
                service.create_card(id, "solo", 3).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    for (i, id) in ids.iter().enumerate() {
        let snapshot = service.get_session(*id).unwrap();
        assert_eq!(snapshot.turn, i as u32 + 2);
        let funnel = snapshot.board.stage(Stage::Funnel).unwrap();
        assert_eq!(funnel.slots.len(), 1);
        assert_eq!(funnel.slots[0].effort, Effort::THREE);
    }
}

#[test]
fn notifications_arrive_in_commit_order() {
    let sink = Arc::new(StallingSink::default());
    let service = Arc::new(GameFlowService::builder().with_sink(sink.clone()).build());
    let session_id = service.start_game(None).id;

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let service = Arc::clone(&service);
            thread::spawn(move || service.advance_turn(session_id).unwrap())
        })
        .collect();
    let mut returned: Vec<u32> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    returned.sort_unstable();

    assert_eq!(returned, vec![2, 3]);
    assert_eq!(*sink.turns.lock(), vec![2, 3]);
}
