//! Flat stake sizing.
//!
//! The stake is fixed once per session: a single win at the given odds
//! should contribute `1 / entries_per_period` of the period goal.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::types::PanelError;

/// Round a currency amount to cents, half to even.
pub fn round_cents(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven)
}

/// Stake and per-round amounts, fixed for the life of a session.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StakePlan {
    /// Payout multiplier for a primary outcome (e.g. 1.96).
    #[serde(with = "rust_decimal::serde::str")]
    pub odds: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub stake: Decimal,
    /// Net profit of a winning entry.
    #[serde(with = "rust_decimal::serde::str")]
    pub win_profit: Decimal,
    /// Amount lost on a losing entry (the flat stake).
    #[serde(with = "rust_decimal::serde::str")]
    pub loss_amount: Decimal,
}

impl StakePlan {
    /// Size the stake for a period goal.
    ///
    /// `stake = round((period_goal / entries) / (odds - 1), 2)`
    pub fn new(period_goal: Decimal, odds: Decimal, entries_per_period: u32) -> Result<Self, PanelError> {
        if odds <= Decimal::ONE {
            return Err(PanelError::InvalidConfiguration(format!(
                "odds must exceed 1, got {odds}"
            )));
        }
        if period_goal <= Decimal::ZERO {
            return Err(PanelError::InvalidConfiguration(format!(
                "period goal must be positive, got {period_goal}"
            )));
        }
        if entries_per_period == 0 {
            return Err(PanelError::InvalidConfiguration(
                "entries per period must be at least 1".to_string(),
            ));
        }

        let net_odds = odds - Decimal::ONE;
        let stake = round_cents(period_goal / Decimal::from(entries_per_period) / net_odds);
        let win_profit = round_cents(stake * net_odds);

        Ok(Self {
            odds,
            stake,
            win_profit,
            loss_amount: stake,
        })
    }

    /// What a winning entry pays back in total (stake + profit).
    pub fn total_return(&self) -> Decimal {
        self.stake + self.win_profit
    }

    /// Signed balance change for a settled entry.
    pub fn delta(&self, won: bool) -> Decimal {
        if won {
            self.win_profit
        } else {
            -self.loss_amount
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
