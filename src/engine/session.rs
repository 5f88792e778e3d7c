//! Session controller.
//!
//! Owns the session state and exposes one command handler per user action.
//! Each handler performs a single state transition and returns plain data;
//! the host re-renders from [`SessionController::snapshot`] afterwards.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::ledger::{Ledger, LedgerRules, Settlement};
use super::period::{rollover, PeriodChange};
use crate::config::AppConfig;
use crate::strategy::{Analysis, ClassifierMode, SignalEngine};
use crate::types::{BlockReason, GateState, Outcome, PanelError, Period};

/// Markers per row in the history grid.
pub const GRID_COLUMNS: usize = 9;
/// Rows kept in the history grid.
pub const GRID_ROWS: usize = 10;

// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------

/// A recorded result that followed an entry suggestion and still needs
/// to be settled as a win or a loss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRound {
    pub outcome: Outcome,
    /// The side the suggestion backed.
    pub backed: Outcome,
}

/// Everything one sitting knows. Serialisable so the host can persist it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Outcome log, oldest first. Append-only outside of resets.
    pub history: Vec<Outcome>,
    pub period: Period,
    /// `None` until setup.
    pub ledger: Option<Ledger>,
    pub previous_signal: Option<Outcome>,
    pub pending: Option<PendingRound>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            history: Vec::new(),
            period: Period::Morning,
            ledger: None,
            previous_signal: None,
            pending: None,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.ledger.is_some()
    }

    pub fn gate(&self) -> GateState {
        self.ledger.as_ref().map(|l| l.gate).unwrap_or_default()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Command results
// ---------------------------------------------------------------------------

/// Returned by `configure`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupSummary {
    pub balance: Decimal,
    pub daily_goal: Decimal,
    pub period_goal: Decimal,
    pub stop_loss: Decimal,
    pub odds: Decimal,
    pub stake: Decimal,
    pub win_profit: Decimal,
}

/// Returned by `record_outcome`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogMutation {
    pub outcome: Outcome,
    pub log_len: usize,
    /// The round followed an entry suggestion and awaits `settle`.
    pub awaiting_settlement: bool,
}

/// Returned by `settle`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettlementReport {
    #[serde(flatten)]
    pub settlement: Settlement,
    /// Outcome the settled suggestion backed (kept as the previous signal).
    pub backed: Option<Outcome>,
}

/// Full render model for the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    pub mode: ClassifierMode,
    pub currency: String,
    pub period: Period,
    pub configured: bool,
    pub ledger: Option<Ledger>,
    pub gate: GateState,
    /// Human-readable lock message, if the period is locked.
    pub lock_message: Option<String>,
    pub goal_progress: f64,
    pub history: Vec<Outcome>,
    pub previous_signal: Option<Outcome>,
    pub pending: Option<PendingRound>,
    pub analysis: Analysis,
    /// Rendered suggestion line.
    pub suggestion_text: Option<String>,
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

pub struct SessionController {
    session: Session,
    engine: SignalEngine,
    mode: ClassifierMode,
    rules: LedgerRules,
    default_odds: Decimal,
    currency: String,
}

impl SessionController {
    /// A fresh, unconfigured session.
    pub fn new(config: &AppConfig) -> Self {
        Self::with_session(config, Session::new())
    }

    /// Resume a previously saved session.
    pub fn with_session(config: &AppConfig, session: Session) -> Self {
        Self {
            session,
            engine: SignalEngine::from_config(&config.classifier, config.session.history_window),
            mode: config.classifier.mode,
            rules: LedgerRules::from(&config.session),
            default_odds: config.session.default_odds,
            currency: config.session.currency.clone(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn default_odds(&self) -> Decimal {
        self.default_odds
    }

    /// The adaptive (previous-signal) bookkeeping only runs in frequency mode.
    fn adaptive(&self) -> bool {
        self.mode == ClassifierMode::Frequency
    }

    fn ledger_mut(&mut self) -> Result<&mut Ledger, PanelError> {
        self.session.ledger.as_mut().ok_or(PanelError::NotConfigured)
    }

    // -- commands -------------------------------------------------------------

    /// One-time setup. Fails if already configured (reset first).
    pub fn configure(
        &mut self,
        initial_balance: Decimal,
        daily_goal: Decimal,
        odds: Decimal,
    ) -> Result<SetupSummary, PanelError> {
        if self.session.is_configured() {
            return Err(PanelError::InvalidConfiguration(
                "session already configured; reset first".to_string(),
            ));
        }

        let ledger = Ledger::open(initial_balance, daily_goal, odds, &self.rules)?;
        let summary = SetupSummary {
            balance: ledger.balance,
            daily_goal: ledger.daily_goal,
            period_goal: ledger.period_goal,
            stop_loss: ledger.stop_loss,
            odds: ledger.stakes.odds,
            stake: ledger.stakes.stake,
            win_profit: ledger.stakes.win_profit,
        };
        self.session.ledger = Some(ledger);
        Ok(summary)
    }

    /// Append one outcome to the log.
    pub fn record_outcome(&mut self, outcome: Outcome) -> Result<LogMutation, PanelError> {
        let ledger = self.session.ledger.as_ref().ok_or(PanelError::NotConfigured)?;
        ledger.ensure_open()?;
        if self.session.pending.is_some() {
            return Err(PanelError::Blocked(BlockReason::ResultPending));
        }

        // The suggestion standing before this result is what gets settled.
        let backed = if self.adaptive() {
            self.classify().suggestion.and_then(|s| s.side())
        } else {
            None
        };

        self.session.history.push(outcome);
        self.session.pending = backed.map(|backed| PendingRound { outcome, backed });

        Ok(LogMutation {
            outcome,
            log_len: self.session.history.len(),
            awaiting_settlement: self.session.pending.is_some(),
        })
    }

    /// Classify the current log and compose the suggestion.
    pub fn classify(&self) -> Analysis {
        let ledger = self.session.ledger.as_ref();
        self.engine.evaluate(
            &self.session.history,
            self.session.previous_signal,
            self.session.gate(),
            ledger.map(|l| &l.stakes),
        )
    }

    /// Settle an entry as won or lost.
    pub fn settle(&mut self, won: bool) -> Result<SettlementReport, PanelError> {
        // Only a pending entry names the suggested side; a manual settlement
        // leaves the previous signal alone.
        let backed = self.session.pending.map(|p| p.backed);

        let settlement = self.ledger_mut()?.settle(won)?;

        if backed.is_some() {
            self.session.previous_signal = backed;
        }
        self.session.pending = None;

        Ok(SettlementReport { settlement, backed })
    }

    /// Move to the next period.
    pub fn advance_period(&mut self) -> PeriodChange {
        let change = rollover(&mut self.session.period, self.session.ledger.as_mut());
        self.session.previous_signal = None;
        self.session.pending = None;
        change
    }

    /// Drop everything and return to pre-setup.
    pub fn reset_all(&mut self) {
        self.session = Session::new();
    }

    /// Clear the outcome log and restart the bankroll chart at the current
    /// balance. Ledger, period and gate are kept.
    pub fn clear_history(&mut self) {
        self.session.history.clear();
        self.session.pending = None;
        if let Some(ledger) = self.session.ledger.as_mut() {
            ledger.restart_history();
        }
    }

    // -- views ----------------------------------------------------------------

    pub fn snapshot(&self) -> SessionSnapshot {
        let analysis = self.classify();
        let gate = self.session.gate();
        SessionSnapshot {
            id: self.session.id,
            started_at: self.session.started_at,
            mode: self.mode,
            currency: self.currency.clone(),
            period: self.session.period,
            configured: self.session.is_configured(),
            ledger: self.session.ledger.clone(),
            gate,
            lock_message: gate.lock_reason().map(|r| r.to_string()),
            goal_progress: self
                .session
                .ledger
                .as_ref()
                .map(Ledger::goal_progress)
                .unwrap_or(0.0),
            history: self.session.history.clone(),
            previous_signal: self.session.previous_signal,
            pending: self.session.pending,
            suggestion_text: analysis.suggestion.as_ref().map(|s| s.to_string()),
            analysis,
        }
    }

    /// The log as display rows of `GRID_COLUMNS`, keeping the last `GRID_ROWS`.
    pub fn history_grid(&self) -> Vec<Vec<Outcome>> {
        history_rows(&self.session.history, GRID_COLUMNS, GRID_ROWS)
    }
}

/// Chunk `history` left to right into rows of `columns`, keeping the last `max_rows`.
pub fn history_rows(history: &[Outcome], columns: usize, max_rows: usize) -> Vec<Vec<Outcome>> {
    let rows: Vec<Vec<Outcome>> = history.chunks(columns.max(1)).map(<[Outcome]>::to_vec).collect();
    let skip = rows.len().saturating_sub(max_rows);
    rows.into_iter().skip(skip).collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
