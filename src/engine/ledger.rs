//! Ledger: bankroll, period profit, and goal/stop-loss gating.
//!
//! Applies settled entries to the balance and period profit, keeps the
//! bankroll history, and locks the period once the goal or the stop loss
//! is crossed.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::SessionConfig;
use crate::strategy::staking::StakePlan;
use crate::types::{BalancePoint, BlockReason, GateState, LockReason, PanelError};

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// Setup-time parameters that shape the thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerRules {
    pub periods_per_day: u32,
    pub stop_loss_pct: Decimal,
    pub entries_per_period: u32,
}

impl Default for LedgerRules {
    fn default() -> Self {
        Self::from(&SessionConfig::default())
    }
}

impl From<&SessionConfig> for LedgerRules {
    fn from(cfg: &SessionConfig) -> Self {
        Self {
            periods_per_day: cfg.periods_per_day,
            stop_loss_pct: cfg.stop_loss_pct,
            entries_per_period: cfg.entries_per_period,
        }
    }
}

// ---------------------------------------------------------------------------
// Settlement
// ---------------------------------------------------------------------------

/// Result of settling one entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settlement {
    pub won: bool,
    pub delta: Decimal,
    pub balance: Decimal,
    pub period_profit: Decimal,
    /// Set when this settlement locked the period.
    pub locked: Option<LockReason>,
}

// ---------------------------------------------------------------------------
// Ledger
// ---------------------------------------------------------------------------

/// Money fields serialise as decimal strings so a saved session restores
/// exactly the thresholds it was set up with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(with = "rust_decimal::serde::str")]
    pub initial_balance: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub period_profit: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub daily_goal: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub period_goal: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub stop_loss: Decimal,
    pub stakes: StakePlan,
    pub gate: GateState,
    pub bank_history: Vec<BalancePoint>,
}

impl Ledger {
    /// Set up a fresh ledger. Thresholds and stake are fixed from here on.
    pub fn open(
        initial_balance: Decimal,
        daily_goal: Decimal,
        odds: Decimal,
        rules: &LedgerRules,
    ) -> Result<Self, PanelError> {
        if initial_balance <= Decimal::ZERO {
            return Err(PanelError::InvalidConfiguration(format!(
                "initial balance must be positive, got {initial_balance}"
            )));
        }
        if daily_goal <= Decimal::ZERO {
            return Err(PanelError::InvalidConfiguration(format!(
                "daily goal must be positive, got {daily_goal}"
            )));
        }
        if rules.periods_per_day == 0 {
            return Err(PanelError::InvalidConfiguration(
                "periods per day must be at least 1".to_string(),
            ));
        }

        let period_goal = daily_goal / Decimal::from(rules.periods_per_day);
        let stakes = StakePlan::new(period_goal, odds, rules.entries_per_period)?;

        Ok(Self {
            initial_balance,
            balance: initial_balance,
            period_profit: Decimal::ZERO,
            daily_goal,
            period_goal,
            stop_loss: initial_balance * rules.stop_loss_pct,
            stakes,
            gate: GateState::Open,
            bank_history: vec![BalancePoint::now(initial_balance)],
        })
    }

    pub fn is_locked(&self) -> bool {
        self.gate.is_locked()
    }

    /// Refuse ledger commands while locked.
    pub fn ensure_open(&self) -> Result<(), PanelError> {
        match self.gate {
            GateState::Open => Ok(()),
            GateState::Locked(reason) => Err(PanelError::Blocked(BlockReason::Locked(reason))),
        }
    }

    /// Evaluate the thresholds; lock the gate if one is crossed.
    /// Returns the reason only when this call performed the transition.
    pub fn check_limits(&mut self) -> Option<LockReason> {
        if self.gate.is_locked() {
            return None;
        }
        let reason = if self.period_profit >= self.period_goal {
            LockReason::GoalHit
        } else if self.period_profit <= -self.stop_loss {
            LockReason::StopLossHit
        } else {
            return None;
        };
        self.gate = GateState::Locked(reason);
        Some(reason)
    }

    /// Settle one entry at the fixed stake.
    pub fn settle(&mut self, won: bool) -> Result<Settlement, PanelError> {
        self.ensure_open()?;

        let delta = self.stakes.delta(won);
        self.balance += delta;
        self.period_profit += delta;
        self.bank_history.push(BalancePoint::now(self.balance));
        let locked = self.check_limits();

        Ok(Settlement {
            won,
            delta,
            balance: self.balance,
            period_profit: self.period_profit,
            locked,
        })
    }

    /// Start a new period: zero the period profit and reopen the gate.
    pub fn reopen(&mut self) {
        self.period_profit = Decimal::ZERO;
        self.gate = GateState::Open;
    }

    /// Restart the bankroll chart at the current balance.
    pub fn restart_history(&mut self) {
        self.bank_history = vec![BalancePoint::now(self.balance)];
    }

    /// Period profit as a fraction of the period goal, clamped to [0, 1].
    pub fn goal_progress(&self) -> f64 {
        if self.period_goal <= Decimal::ZERO {
            return 0.0;
        }
        (self.period_profit / self.period_goal)
            .to_f64()
            .unwrap_or(0.0)
            .clamp(0.0, 1.0)
    }

    /// Net result since setup.
    pub fn total_pnl(&self) -> Decimal {
        self.balance - self.initial_balance
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn make_ledger(balance: Decimal, daily_goal: Decimal) -> Ledger {
        Ledger::open(balance, daily_goal, dec!(1.96), &LedgerRules::default()).unwrap()
    }

    #[test]
    fn test_open_derives_thresholds() {
        let ledger = make_ledger(dec!(100), dec!(90));
        assert_eq!(ledger.period_goal, dec!(30));
        assert_eq!(ledger.stop_loss, dec!(10));
        assert_eq!(ledger.stakes.stake, dec!(3.12));
        assert_eq!(ledger.gate, GateState::Open);
        assert_eq!(ledger.bank_history.len(), 1);
        assert_eq!(ledger.bank_history[0].balance, dec!(100));
    }

    #[test]
    fn test_open_rejects_bad_input() {
        let rules = LedgerRules::default();
        assert!(Ledger::open(dec!(0), dec!(90), dec!(1.96), &rules).is_err());
        assert!(Ledger::open(dec!(100), dec!(-1), dec!(1.96), &rules).is_err());
        assert!(matches!(
            Ledger::open(dec!(100), dec!(90), dec!(1), &rules),
            Err(PanelError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_settle_win_and_loss() {
        let mut ledger = make_ledger(dec!(100), dec!(90));

        let s = ledger.settle(true).unwrap();
        assert_eq!(s.delta, dec!(3.00));
        assert_eq!(s.balance, dec!(103.00));
        assert!(s.locked.is_none());

        let s = ledger.settle(false).unwrap();
        assert_eq!(s.delta, dec!(-3.12));
        assert_eq!(s.balance, dec!(99.88));
        assert_eq!(s.period_profit, dec!(-0.12));
        assert_eq!(ledger.bank_history.len(), 3);
        assert_eq!(ledger.total_pnl(), dec!(-0.12));
    }

    #[test]
    fn test_goal_hit_locks() {
        let mut ledger = make_ledger(dec!(100), dec!(90));
        ledger.period_profit = dec!(28);

        let s = ledger.settle(true).unwrap();
        assert_eq!(s.period_profit, dec!(31));
        assert_eq!(s.locked, Some(LockReason::GoalHit));
        assert_eq!(ledger.gate, GateState::Locked(LockReason::GoalHit));
    }

    #[test]
    fn test_stop_loss_locks() {
        // period goal 52.8 → stake exactly 5.50
        let mut ledger = make_ledger(dec!(100), dec!(158.4));
        assert_eq!(ledger.stakes.stake, dec!(5.50));

        assert!(ledger.settle(false).unwrap().locked.is_none());
        let s = ledger.settle(false).unwrap();
        assert_eq!(s.period_profit, dec!(-11));
        assert_eq!(s.locked, Some(LockReason::StopLossHit));
    }

    #[test]
    fn test_settle_blocked_while_locked() {
        let mut ledger = make_ledger(dec!(100), dec!(90));
        ledger.period_profit = dec!(30);
        assert_eq!(ledger.check_limits(), Some(LockReason::GoalHit));
        // Already locked: no second transition.
        assert_eq!(ledger.check_limits(), None);

        let before = ledger.balance;
        let err = ledger.settle(true).unwrap_err();
        assert_eq!(err, PanelError::Blocked(BlockReason::Locked(LockReason::GoalHit)));
        assert_eq!(ledger.balance, before);
    }

    #[test]
    fn test_reopen_clears_profit_and_lock() {
        let mut ledger = make_ledger(dec!(100), dec!(90));
        ledger.period_profit = dec!(-12);
        ledger.check_limits();
        assert!(ledger.is_locked());

        ledger.reopen();
        assert_eq!(ledger.period_profit, Decimal::ZERO);
        assert!(!ledger.is_locked());
        assert_eq!(ledger.stakes.stake, dec!(3.12));
    }

    #[test]
    fn test_goal_progress_clamped() {
        let mut ledger = make_ledger(dec!(100), dec!(90));
        assert_eq!(ledger.goal_progress(), 0.0);
        ledger.period_profit = dec!(15);
        assert!((ledger.goal_progress() - 0.5).abs() < 1e-10);
        ledger.period_profit = dec!(45);
        assert_eq!(ledger.goal_progress(), 1.0);
        ledger.period_profit = dec!(-5);
        assert_eq!(ledger.goal_progress(), 0.0);
    }

    #[test]
    fn test_restart_history() {
        let mut ledger = make_ledger(dec!(100), dec!(90));
        ledger.settle(true).unwrap();
        ledger.settle(true).unwrap();
        ledger.restart_history();
        assert_eq!(ledger.bank_history.len(), 1);
        assert_eq!(ledger.bank_history[0].balance, dec!(106.00));
    }
}
