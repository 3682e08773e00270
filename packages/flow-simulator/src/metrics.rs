//! Per-session records written by the simulator.

use flowboard::domain::metrics::{FlowSnapshot, RevertAnalysis, VelocityPoint};
use flowboard::domain::Trend;
use serde::Serialize;

use crate::simulator::{PlayStats, SessionResult};
use crate::types::{MetricsLevel, Strategy};

/// One JSON line per simulated session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionMetrics {
    pub session_no: u32,
    pub seed: u64,
    pub timestamp: String,
    pub strategy: Strategy,
    pub turns: u32,
    pub duration_ms: f64,
    pub stats: PlayStats,
    pub accumulated_score: u32,
    pub average_cycle_time: Option<f64>,
    pub trend: Trend,
    pub velocity: Vec<VelocityPoint>,
    pub reverts: RevertAnalysis,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cumulative_flow: Option<Vec<FlowSnapshot>>,
}

/// Flat row for the CSV summary.
#[derive(Debug, Clone, Serialize)]
pub struct CsvSummaryRow {
    pub session_no: u32,
    pub seed: u64,
    pub strategy: Strategy,
    pub turns: u32,
    pub score: u32,
    pub avg_cycle_time: Option<f64>,
    pub trend: Trend,
    pub rolls: u32,
    pub reverts: u32,
    pub tokens_spent: u32,
    pub accepted: u32,
}

impl From<&SessionMetrics> for CsvSummaryRow {
    fn from(m: &SessionMetrics) -> Self {
        Self {
            session_no: m.session_no,
            seed: m.seed,
            strategy: m.strategy,
            turns: m.turns,
            score: m.accumulated_score,
            avg_cycle_time: m.average_cycle_time,
            trend: m.trend,
            rolls: m.stats.rolls,
            reverts: m.stats.reverts,
            tokens_spent: m.stats.tokens_spent,
            accepted: m.stats.accepted,
        }
    }
}

pub fn build_session_metrics(
    result: SessionResult,
    level: &MetricsLevel,
    duration_ms: f64,
) -> SessionMetrics {
    let timestamp = time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_else(|_| String::from("unknown"));
    let metrics = result.metrics;
    let cumulative_flow = match level {
        MetricsLevel::Basic => None,
        MetricsLevel::Detailed => Some(metrics.cumulative_flow),
    };

    SessionMetrics {
        session_no: result.session_no,
        seed: result.seed,
        timestamp,
        strategy: result.strategy,
        turns: result.turns,
        duration_ms,
        stats: result.stats,
        accumulated_score: metrics.accumulated_score,
        average_cycle_time: metrics.average_cycle_time,
        trend: metrics.trend,
        velocity: metrics.velocity,
        reverts: metrics.reverts,
        cumulative_flow,
    }
}
