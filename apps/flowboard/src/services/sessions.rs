//! Session store: owns every live and ended session for the process lifetime.
//!
//! Each session sits behind its own mutex so mutations on one session are
//! serialized while distinct sessions proceed in parallel.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;

use crate::domain::snapshot::SessionSnapshot;
use crate::domain::state::{GameSession, SessionId};
use crate::error::AppError;
use crate::errors::domain::{DomainError, NotFoundKind};

pub type SharedSession = Arc<Mutex<GameSession>>;

#[derive(Default)]
pub struct SessionStore {
    sessions: DashMap<SessionId, SharedSession>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: DashMap::new(),
        }
    }

    pub fn insert(&self, session: GameSession) -> SessionId {
        let id = session.id;
        self.sessions.insert(id, Arc::new(Mutex::new(session)));
        debug!(session_id = %id, live = self.sessions.len(), "Session stored");
        id
    }

    /// Handle to a session. The map shard lock is released before returning,
    /// so callers only ever hold the per-session mutex.
    pub fn get(&self, id: SessionId) -> Result<SharedSession, AppError> {
        self.sessions
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| {
                DomainError::not_found(NotFoundKind::Session, format!("session {id}")).into()
            })
    }

    pub fn snapshot(&self, id: SessionId) -> Result<SessionSnapshot, AppError> {
        let session = self.get(id)?;
        let guard = session.lock();
        Ok(SessionSnapshot::of(&guard))
    }

    pub fn contains(&self, id: SessionId) -> bool {
        self.sessions.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn active_ids(&self) -> Vec<SessionId> {
        self.sessions
            .iter()
            .filter(|entry| entry.value().lock().active)
            .map(|entry| *entry.key())
            .collect()
    }
}
