//! Column topology: the fixed, totally ordered delivery pipeline.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::domain::{DomainError, NotFoundKind};

/// One of the eight pipeline positions. Declaration order is pipeline order.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Funnel,
    ProductBacklog,
    SprintBacklog,
    Implementation,
    Integration,
    Testing,
    PreDeployment,
    Production,
}

/// The canonical ordering of stages.
pub const STAGES: [Stage; 8] = [
    Stage::Funnel,
    Stage::ProductBacklog,
    Stage::SprintBacklog,
    Stage::Implementation,
    Stage::Integration,
    Stage::Testing,
    Stage::PreDeployment,
    Stage::Production,
];

impl Stage {
    /// 0-based position in the pipeline.
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn from_index(index: usize) -> Option<Stage> {
        STAGES.get(index).copied()
    }

    /// Adjacent later stage, or `None` at Production.
    #[inline]
    pub fn next(self) -> Option<Stage> {
        Stage::from_index(self.index() + 1)
    }

    /// Adjacent earlier stage, or `None` at Funnel.
    #[inline]
    pub fn previous(self) -> Option<Stage> {
        self.index().checked_sub(1).and_then(Stage::from_index)
    }

    /// Up to `k` earlier stages, nearest first, truncated at Funnel.
    pub fn previous_n(self, k: usize) -> Vec<Stage> {
        let start = self.index().saturating_sub(k);
        STAGES[start..self.index()].iter().rev().copied().collect()
    }

    /// Funnel and Production have no WIP limit.
    #[inline]
    pub const fn is_unbounded(self) -> bool {
        matches!(self, Stage::Funnel | Stage::Production)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Stage::Funnel => "funnel",
            Stage::ProductBacklog => "product_backlog",
            Stage::SprintBacklog => "sprint_backlog",
            Stage::Implementation => "implementation",
            Stage::Integration => "integration",
            Stage::Testing => "testing",
            Stage::PreDeployment => "pre_deployment",
            Stage::Production => "production",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace(['-', ' '], "_");
        STAGES
            .iter()
            .copied()
            .find(|stage| stage.as_str() == normalized)
            .ok_or_else(|| DomainError::not_found(NotFoundKind::Stage, format!("unknown stage '{s}'")))
    }
}
