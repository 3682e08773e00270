//! Read-only metrics over stored sessions.

use std::sync::Arc;

use tracing::debug;

use crate::domain::metrics::{derive_metrics, MetricsSnapshot};
use crate::domain::state::SessionId;
use crate::error::AppError;
use crate::services::game_flow::GameFlowService;
use crate::services::sessions::SessionStore;

/// Derives [`MetricsSnapshot`]s on demand. Works on ended sessions too.
pub struct MetricsService {
    store: Arc<SessionStore>,
    trend_window: usize,
}

impl MetricsService {
    pub fn new(store: Arc<SessionStore>, trend_window: usize) -> Self {
        Self {
            store,
            trend_window: trend_window.max(1),
        }
    }

    pub fn compute(&self, session_id: SessionId) -> Result<MetricsSnapshot, AppError> {
        let shared = self.store.get(session_id)?;
        let session = shared.lock();
        let metrics = derive_metrics(&session, self.trend_window);
        debug!(
            session_id = %session_id,
            turn = metrics.turn,
            score = metrics.accumulated_score,
            "Metrics derived"
        );
        Ok(metrics)
    }
}

impl GameFlowService {
    pub fn metrics(&self) -> MetricsService {
        MetricsService::new(Arc::clone(self.store()), self.config().trend_window)
    }

    pub fn compute_metrics(&self, session_id: SessionId) -> Result<MetricsSnapshot, AppError> {
        self.metrics().compute(session_id)
    }
}
