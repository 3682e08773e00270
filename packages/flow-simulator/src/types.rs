//! Shared types for the simulator.

use clap::ValueEnum;
use flowboard::domain::MitigationPolicy;
use serde::Serialize;

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Jsonl,
    Json,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum MetricsLevel {
    Basic,
    Detailed,
}

/// How the simulated team plays its Scrum-Master tokens and debt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Never spends tokens, never takes on debt.
    Cautious,
    /// Spends a token on every mitigable roll.
    Mitigating,
    /// Mitigates and keeps the technical-debt bonus topped up.
    Indebted,
}

impl Strategy {
    pub fn policy(self) -> MitigationPolicy {
        match self {
            Strategy::Cautious => MitigationPolicy::Never,
            Strategy::Mitigating | Strategy::Indebted => MitigationPolicy::WhenEligible,
        }
    }

    pub fn takes_debt(self) -> bool {
        matches!(self, Strategy::Indebted)
    }
}
