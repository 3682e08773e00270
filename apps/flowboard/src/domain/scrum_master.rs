//! Scrum-Master mitigation pool and the technical-debt bonus.

use serde::{Deserialize, Serialize};

use crate::errors::domain::{DomainError, InvalidStateKind};

/// How the technical-debt flag is judged against the current turn.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtExpiry {
    /// Active while `current_turn <= expires_at_turn`.
    #[default]
    TurnBound,
    /// Active forever once set (expiry turn is recorded but never compared).
    Sticky,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrumMasterPool {
    pub tokens_total: u8,
    pub tokens_available: u8,
    pub tokens_used: u8,
    pub technical_debt_active: bool,
    /// Last turn the debt bonus applies to; 0 when never allocated.
    pub technical_debt_expires_at_turn: u32,
    /// Effort points recorded by the most recent debt allocation.
    pub technical_debt_effort: u32,
    pub debt_expiry: DebtExpiry,
}

impl ScrumMasterPool {
    pub fn new(tokens_total: u8, debt_expiry: DebtExpiry) -> Self {
        Self {
            tokens_total,
            tokens_available: tokens_total,
            tokens_used: 0,
            technical_debt_active: false,
            technical_debt_expires_at_turn: 0,
            technical_debt_effort: 0,
            debt_expiry,
        }
    }

    #[inline]
    pub fn has_token(&self) -> bool {
        self.tokens_available > 0
    }

    /// Spend one token. Never replenished within a run.
    pub fn spend_token(&mut self) -> Result<u8, DomainError> {
        if !self.has_token() {
            return Err(DomainError::invalid_state(
                InvalidStateKind::NoTokensAvailable,
                format!("all {} Scrum-Master tokens are spent", self.tokens_total),
            ));
        }
        self.tokens_available -= 1;
        self.tokens_used += 1;
        debug_assert_eq!(self.tokens_available + self.tokens_used, self.tokens_total);
        Ok(self.tokens_available)
    }

    pub fn allocate_debt(&mut self, effort: u32, current_turn: u32, duration_turns: u32) {
        self.technical_debt_active = true;
        self.technical_debt_effort = effort;
        self.technical_debt_expires_at_turn = current_turn.saturating_add(duration_turns);
    }

    /// Whether the debt bonus changes the critical-failure destination now.
    pub fn is_debt_active(&self, current_turn: u32) -> bool {
        if !self.technical_debt_active || self.technical_debt_expires_at_turn == 0 {
            return false;
        }
        match self.debt_expiry {
            DebtExpiry::TurnBound => current_turn <= self.technical_debt_expires_at_turn,
            DebtExpiry::Sticky => true,
        }
    }

    /// Drop the flag once its expiry turn has passed and return the effort
    /// that was recorded for it. No-op under `Sticky`.
    pub fn expire_debt(&mut self, current_turn: u32) -> Option<u32> {
        if self.debt_expiry == DebtExpiry::TurnBound
            && self.technical_debt_active
            && current_turn > self.technical_debt_expires_at_turn
        {
            self.technical_debt_active = false;
            return Some(self.technical_debt_effort);
        }
        None
    }
}
