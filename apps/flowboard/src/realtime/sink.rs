use std::sync::Arc;

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::broadcast;

use crate::domain::snapshot::BoardSnapshot;
use crate::domain::state::SessionId;

/// Sent after every successful mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardNotification {
    pub session_id: SessionId,
    pub action: String,
    pub turn: u32,
    pub board: BoardSnapshot,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NotifyError {
    #[error("no subscribers for session {0}")]
    NoSubscribers(SessionId),
    #[error("notification channel for session {0} closed")]
    Closed(SessionId),
}

/// Fire-and-forget delivery. A failed delivery never undoes the mutation.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: BoardNotification) -> Result<(), NotifyError>;

    /// The session has ended; release whatever delivery state it holds.
    fn close(&self, _session_id: SessionId) {}
}

/// Drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl NotificationSink for NullSink {
    fn notify(&self, _notification: BoardNotification) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Per-session `tokio` broadcast channels.
pub struct BroadcastSink {
    channels: DashMap<SessionId, broadcast::Sender<Arc<BoardNotification>>>,
    capacity: usize,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: DashMap::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn subscribe(&self, session_id: SessionId) -> broadcast::Receiver<Arc<BoardNotification>> {
        self.channels
            .entry(session_id)
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .subscribe()
    }

    pub fn subscriber_count(&self, session_id: SessionId) -> usize {
        self.channels
            .get(&session_id)
            .map(|tx| tx.receiver_count())
            .unwrap_or(0)
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new(64)
    }
}

impl NotificationSink for BroadcastSink {
    fn notify(&self, notification: BoardNotification) -> Result<(), NotifyError> {
        let session_id = notification.session_id;
        let sent = match self.channels.get(&session_id) {
            Some(tx) => tx.send(Arc::new(notification)).map(|_| ()),
            None => return Err(NotifyError::NoSubscribers(session_id)),
        };
        if sent.is_err() {
            // every receiver is gone; forget the channel
            self.channels
                .remove_if(&session_id, |_, tx| tx.receiver_count() == 0);
            return Err(NotifyError::Closed(session_id));
        }
        Ok(())
    }

    /// Drop the channel; live receivers see `Closed` once drained.
    fn close(&self, session_id: SessionId) {
        self.channels.remove(&session_id);
    }
}
