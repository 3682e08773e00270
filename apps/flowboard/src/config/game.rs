//! Game configuration: WIP limits, Scrum-Master pool size, debt policy.
//!
//! Values come from `GameConfig::default()`, optionally overlaid by
//! environment variables (`FLOWBOARD_*`) or a JSON document.

use std::env;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::domain::board::WipLimits;
use crate::domain::scrum_master::DebtExpiry;
use crate::domain::stage::{Stage, STAGES};
use crate::domain::state::SessionRules;
use crate::error::AppError;

pub const ENV_PREFIX: &str = "FLOWBOARD_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub wip_limits: WipLimits,
    /// Tokens the Scrum Master starts with. Never replenished.
    pub scrum_master_tokens: u8,
    /// Turns the technical-debt bonus stays active after allocation.
    pub debt_duration_turns: u32,
    pub debt_expiry: DebtExpiry,
    /// Samples per window when classifying the velocity trend.
    pub trend_window: usize,
    /// Seed for the default die; `None` draws from OS entropy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub die_seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            wip_limits: WipLimits::default(),
            scrum_master_tokens: 3,
            debt_duration_turns: 2,
            debt_expiry: DebtExpiry::TurnBound,
            trend_window: 3,
            die_seed: None,
        }
    }
}

impl GameConfig {
    /// Defaults overlaid with `FLOWBOARD_*` environment variables.
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Defaults overlaid with whatever `lookup` returns for each known key.
    ///
    /// Recognised keys: `SM_TOKENS`, `DEBT_TURNS`, `DEBT_EXPIRY`
    /// (`turn_bound` | `sticky`), `TREND_WINDOW`, `DIE_SEED`, and
    /// `WIP_<STAGE>` (e.g. `WIP_TESTING`), all prefixed with `FLOWBOARD_`.
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, AppError> {
        let var = |name: &str| lookup(&format!("{ENV_PREFIX}{name}"));
        let mut config = Self::default();

        if let Some(raw) = var("SM_TOKENS") {
            config.scrum_master_tokens = parse_var("SM_TOKENS", &raw)?;
        }
        if let Some(raw) = var("DEBT_TURNS") {
            config.debt_duration_turns = parse_var("DEBT_TURNS", &raw)?;
        }
        if let Some(raw) = var("DEBT_EXPIRY") {
            config.debt_expiry = match raw.trim().to_ascii_lowercase().as_str() {
                "turn_bound" | "turn-bound" => DebtExpiry::TurnBound,
                "sticky" => DebtExpiry::Sticky,
                other => {
                    return Err(AppError::config(format!(
                        "{ENV_PREFIX}DEBT_EXPIRY must be 'turn_bound' or 'sticky', got '{other}'"
                    )))
                }
            };
        }
        if let Some(raw) = var("TREND_WINDOW") {
            let window: usize = parse_var("TREND_WINDOW", &raw)?;
            if window == 0 {
                return Err(AppError::config(format!(
                    "{ENV_PREFIX}TREND_WINDOW must be at least 1"
                )));
            }
            config.trend_window = window;
        }
        if let Some(raw) = var("DIE_SEED") {
            config.die_seed = Some(parse_var("DIE_SEED", &raw)?);
        }
        for stage in STAGES.iter().copied().filter(|s| !s.is_unbounded()) {
            let name = format!("WIP_{}", stage.as_str().to_ascii_uppercase());
            if let Some(raw) = var(&name) {
                let limit: u32 = parse_var(&name, &raw)?;
                config.wip_limits = config.wip_limits.with_limit(stage, Some(limit));
            }
        }
        Ok(config)
    }

    /// Defaults overlaid with the fields present in `json`.
    pub fn from_json(json: Option<&JsonValue>) -> Result<Self, AppError> {
        match json {
            None => Ok(Self::default()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| AppError::config(format!("invalid game config: {e}"))),
        }
    }

    pub fn session_rules(&self) -> SessionRules {
        SessionRules {
            wip_limits: self.wip_limits,
            scrum_master_tokens: self.scrum_master_tokens,
            debt_duration_turns: self.debt_duration_turns,
            debt_expiry: self.debt_expiry,
        }
    }

    pub fn wip_limit(&self, stage: Stage) -> Option<u32> {
        self.wip_limits.limit(stage)
    }
}

fn parse_var<T: FromStr>(name: &str, raw: &str) -> Result<T, AppError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| {
        AppError::config(format!("{ENV_PREFIX}{name}='{raw}' is invalid: {e}"))
    })
}
