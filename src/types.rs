//! Shared types for the Studio Panel.
//!
//! These types form the data model used across all modules.
//! They are kept free of engine logic so that the strategy, engine
//! and dashboard modules can depend on them without circular references.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// One recorded round result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    /// Primary outcome A (red).
    Home,
    /// Primary outcome B (blue).
    Away,
    Tie,
}

impl Outcome {
    /// All outcomes, in tie-break order for the frequency estimator.
    pub const ALL: [Outcome; 3] = [Outcome::Home, Outcome::Away, Outcome::Tie];

    /// Whether this is one of the two primary (bettable) outcomes.
    pub fn is_primary(&self) -> bool {
        !matches!(self, Outcome::Tie)
    }

    /// Marker used by the history grid.
    pub fn marker(&self) -> &'static str {
        match self {
            Outcome::Home => "🔴",
            Outcome::Away => "🔵",
            Outcome::Tie => "🟨",
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Home => write!(f, "HOME"),
            Outcome::Away => write!(f, "AWAY"),
            Outcome::Tie => write!(f, "TIE"),
        }
    }
}

/// Parse an outcome from its name or a common alias (case-insensitive).
impl std::str::FromStr for Outcome {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "home" | "h" | "red" | "a" | "🔴" => Ok(Outcome::Home),
            "away" | "v" | "blue" | "b" | "🔵" => Ok(Outcome::Away),
            "tie" | "t" | "draw" | "empate" | "gold" | "🟨" => Ok(Outcome::Tie),
            _ => Err(anyhow::anyhow!("Unknown outcome: {s}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Signal
// ---------------------------------------------------------------------------

/// A classifier's view of the next move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "outcome")]
pub enum Signal {
    /// Back this outcome next round.
    Back(Outcome),
    /// Sit out until the pattern resolves.
    Wait,
    /// No opinion.
    Unknown,
}

impl Signal {
    /// The outcome to back, if the signal names one.
    pub fn outcome(&self) -> Option<Outcome> {
        match self {
            Signal::Back(o) => Some(*o),
            _ => None,
        }
    }

    /// The primary outcome to back, ignoring ties and sentinels.
    pub fn primary(&self) -> Option<Outcome> {
        self.outcome().filter(Outcome::is_primary)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Back(o) => write!(f, "{o}"),
            Signal::Wait => write!(f, "WAIT"),
            Signal::Unknown => write!(f, "?"),
        }
    }
}

// ---------------------------------------------------------------------------
// Period
// ---------------------------------------------------------------------------

/// Daily phase. Each trading period carries its own goal and lock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    Morning,
    Afternoon,
    Evening,
    Closed,
}

impl Period {
    /// The fixed period sequence.
    pub const ALL: &'static [Period] = &[
        Period::Morning,
        Period::Afternoon,
        Period::Evening,
        Period::Closed,
    ];

    /// The period that follows this one. `Closed` is terminal.
    pub fn next(&self) -> Self {
        match self {
            Period::Morning => Period::Afternoon,
            Period::Afternoon => Period::Evening,
            Period::Evening | Period::Closed => Period::Closed,
        }
    }

    pub fn is_closed(&self) -> bool {
        *self == Period::Closed
    }
}

impl Default for Period {
    fn default() -> Self {
        Period::Morning
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Morning => write!(f, "Morning"),
            Period::Afternoon => write!(f, "Afternoon"),
            Period::Evening => write!(f, "Evening"),
            Period::Closed => write!(f, "Closed"),
        }
    }
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Which threshold locked the period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockReason {
    GoalHit,
    StopLossHit,
}

impl fmt::Display for LockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockReason::GoalHit => write!(f, "✅ Period goal reached"),
            LockReason::StopLossHit => write!(f, "❌ Stop loss reached"),
        }
    }
}

/// Ledger gate state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "reason")]
pub enum GateState {
    Open,
    Locked(LockReason),
}

impl GateState {
    pub fn is_locked(&self) -> bool {
        matches!(self, GateState::Locked(_))
    }

    pub fn lock_reason(&self) -> Option<LockReason> {
        match self {
            GateState::Locked(r) => Some(*r),
            GateState::Open => None,
        }
    }
}

impl Default for GateState {
    fn default() -> Self {
        GateState::Open
    }
}

impl fmt::Display for GateState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GateState::Open => write!(f, "🟢 OPEN"),
            GateState::Locked(r) => write!(f, "⛔ LOCKED ({r})"),
        }
    }
}

// ---------------------------------------------------------------------------
// Bank history
// ---------------------------------------------------------------------------

/// A balance snapshot for the bankroll chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalancePoint {
    pub timestamp: DateTime<Utc>,
    #[serde(with = "rust_decimal::serde::str")]
    pub balance: Decimal,
}

impl BalancePoint {
    pub fn now(balance: Decimal) -> Self {
        Self {
            timestamp: Utc::now(),
            balance,
        }
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Why a command was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockReason {
    Locked(LockReason),
    ResultPending,
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::Locked(r) => write!(f, "period locked: {r}"),
            BlockReason::ResultPending => write!(f, "a recorded result is awaiting settlement"),
        }
    }
}

/// Domain-specific error types for the panel.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PanelError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Blocked: {0}")]
    Blocked(BlockReason),

    #[error("Session not configured: set balance and daily goal first")]
    NotConfigured,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
