//! Period controller.
//!
//! Walks the fixed day sequence Morning → Afternoon → Evening → Closed.
//! Each rollover starts the next period with zero profit and an open gate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::ledger::Ledger;
use crate::types::{LockReason, Period};

/// Result of a rollover.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeriodChange {
    pub from: Period,
    pub to: Period,
    /// Profit the finished period closed with (zero before setup).
    pub closing_profit: Decimal,
    /// Lock the finished period ended under, if any.
    pub closed_locked: Option<LockReason>,
}

impl PeriodChange {
    /// Rolling over from `Closed` changes nothing but the counters.
    pub fn is_terminal(&self) -> bool {
        self.from == Period::Closed
    }
}

/// Advance `period` and reopen the ledger for the new period.
pub fn rollover(period: &mut Period, ledger: Option<&mut Ledger>) -> PeriodChange {
    let from = *period;
    *period = from.next();

    let (closing_profit, closed_locked) = match ledger {
        Some(ledger) => {
            let closing = (ledger.period_profit, ledger.gate.lock_reason());
            ledger.reopen();
            closing
        }
        None => (Decimal::ZERO, None),
    };

    PeriodChange {
        from,
        to: *period,
        closing_profit,
        closed_locked,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
