use tracing::{debug, warn};

use crate::domain::dice::DieSource;
use crate::domain::snapshot::BoardSnapshot;
use crate::domain::state::{GameSession, SessionId};
use crate::error::AppError;
use crate::errors::domain::DomainError;
use crate::realtime::{BoardNotification, NotifyError};
use crate::services::game_flow::GameFlowService;

/// Result of a mutation closure. `changed == false` commits nothing and
/// sends no notification.
#[derive(Debug)]
pub(super) struct Mutation<T> {
    pub value: T,
    pub changed: bool,
}

impl<T> Mutation<T> {
    pub fn changed(value: T) -> Self {
        Self {
            value,
            changed: true,
        }
    }

    pub fn unchanged(value: T) -> Self {
        Self {
            value,
            changed: false,
        }
    }
}

impl GameFlowService {
    /// Apply `mutation` to one session as a single step.
    ///
    /// The closure works on a draft copy while the session mutex is held.
    /// The draft replaces the live session only when the closure succeeds
    /// and the board invariants verify; otherwise the session is untouched.
    /// The notification goes out before the mutex is released, so
    /// subscribers see one session's boards in commit order.
    pub(super) fn run_mutation<T, F>(
        &self,
        session_id: SessionId,
        action: &'static str,
        mutation: F,
    ) -> Result<T, AppError>
    where
        F: FnOnce(&mut GameSession, &dyn DieSource) -> Result<Mutation<T>, DomainError>,
    {
        let shared = self.store.get(session_id)?;
        let mut live = shared.lock();
        live.require_active()?;

        let mut draft = live.clone();
        let Mutation { value, changed } = mutation(&mut draft, self.die.as_ref())?;
        if !changed {
            return Ok(value);
        }
        draft.board.verify()?;
        *live = draft;

        debug!(session_id = %session_id, action, turn = live.turn, "Mutation committed");
        self.publish(BoardNotification {
            session_id,
            action: action.to_string(),
            turn: live.turn,
            board: BoardSnapshot::of(&live.board),
        });
        Ok(value)
    }

    /// Fire-and-forget; delivery problems are logged, never returned.
    /// Runs under the session mutex.
    fn publish(&self, notification: BoardNotification) {
        let session_id = notification.session_id;
        let action = notification.action.clone();
        match self.sink.notify(notification) {
            Ok(()) => {}
            Err(NotifyError::NoSubscribers(_)) => {
                debug!(session_id = %session_id, action = %action, "No notification subscribers");
            }
            Err(err) => {
                warn!(session_id = %session_id, action = %action, error = %err, "Notification delivery failed");
            }
        }
    }
}
