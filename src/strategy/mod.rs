//! Strategy engine: pattern classification, staking and entry suggestions.

pub mod frequency;
pub mod rules;
pub mod staking;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ClassifierConfig;
use crate::types::{GateState, Outcome, Signal};
use frequency::{Distribution, FrequencyClassifier};
use rules::RuleClassifier;
use staking::StakePlan;

// ---------------------------------------------------------------------------
// Classifier seam
// ---------------------------------------------------------------------------

/// Which classifier drives the suggestions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClassifierMode {
    /// Fixed priority rules over the last few outcomes.
    Rules,
    /// Empirical frequencies over a trailing window, with adaptive confidence.
    Frequency,
}

impl fmt::Display for ClassifierMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierMode::Rules => write!(f, "rules"),
            ClassifierMode::Frequency => write!(f, "frequency"),
        }
    }
}

/// Raw output of a classifier, before staking and gating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternReading {
    pub pattern: String,
    pub signal: Signal,
    /// 0–100.
    pub confidence: f64,
    /// 1–9 heuristic score of how "patterned" the recent window looks.
    pub manipulation_level: u8,
    pub alert: String,
    /// Only the frequency classifier fills this in.
    pub distribution: Option<Distribution>,
}

impl PatternReading {
    pub(crate) fn new(
        pattern: &str,
        signal: Signal,
        confidence: f64,
        manipulation_level: u8,
        alert: &str,
    ) -> Self {
        Self {
            pattern: pattern.to_string(),
            signal,
            confidence,
            manipulation_level,
            alert: alert.to_string(),
            distribution: None,
        }
    }
}

/// A pure classifier over the outcome log.
#[cfg_attr(test, mockall::automock)]
pub trait PatternClassifier: Send + Sync {
    /// Short identifier, e.g. "rules".
    fn name(&self) -> &'static str;

    /// Classify the log (oldest first). `previous_signal` is the outcome the
    /// last settled suggestion backed; classifiers may ignore it.
    fn classify(&self, history: &[Outcome], previous_signal: Option<Outcome>) -> PatternReading;

    /// Confidence at or above which a primary signal becomes an entry.
    fn entry_threshold(&self) -> f64;

    /// Lower bound of the "risky entry" band, if this classifier has one.
    fn risky_threshold(&self) -> Option<f64>;
}

// ---------------------------------------------------------------------------
// Suggestions
// ---------------------------------------------------------------------------

/// What the panel tells the player to do next.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Suggestion {
    Enter {
        side: Outcome,
        confidence: f64,
        stake: Decimal,
        win_profit: Decimal,
        total_return: Decimal,
    },
    /// Marginal confidence: the player may enter, without an implicit stop.
    Risky { signal: Signal, confidence: f64 },
    Wait,
    /// The period hit its goal or stop loss.
    Locked,
}

impl Suggestion {
    pub fn is_entry(&self) -> bool {
        matches!(self, Suggestion::Enter { .. })
    }

    /// The side an entry backs, if any.
    pub fn side(&self) -> Option<Outcome> {
        match self {
            Suggestion::Enter { side, .. } => Some(*side),
            _ => None,
        }
    }
}

impl fmt::Display for Suggestion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Suggestion::Enter {
                side,
                confidence,
                stake,
                win_profit,
                total_return,
            } => write!(
                f,
                "✅ Enter on {side} (confidence {confidence:.2}%) | stake {stake:.2} | profit if win {win_profit:.2} | total return {total_return:.2}"
            ),
            Suggestion::Risky { signal, confidence } => {
                write!(f, "⚠ Risky entry: {signal} ({confidence:.0}%)")
            }
            Suggestion::Wait => write!(f, "⏳ Wait for next signal"),
            Suggestion::Locked => write!(f, "⛔ Blocked - goal/stop reached"),
        }
    }
}

/// Classification plus the suggestion derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub mode: String,
    #[serde(flatten)]
    pub reading: PatternReading,
    /// `None` until the session has been set up (no stake to quote).
    pub suggestion: Option<Suggestion>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Runs the configured classifier and turns its reading into a suggestion.
///
/// Stateless: evaluate after every log or ledger mutation.
pub struct SignalEngine {
    classifier: Box<dyn PatternClassifier>,
}

impl SignalEngine {
    pub fn new(classifier: Box<dyn PatternClassifier>) -> Self {
        Self { classifier }
    }

    /// Build the engine for a configured mode.
    pub fn from_config(config: &ClassifierConfig, history_window: usize) -> Self {
        let classifier: Box<dyn PatternClassifier> = match config.mode {
            ClassifierMode::Rules => Box::new(RuleClassifier::new(
                config.rules_entry_threshold,
                config.rules_risky_threshold,
            )),
            ClassifierMode::Frequency => Box::new(FrequencyClassifier::new(
                history_window,
                config.frequency_entry_threshold,
                config.mismatch_penalty,
                config.penalty_floor,
            )),
        };
        Self::new(classifier)
    }

    pub fn mode_name(&self) -> &'static str {
        self.classifier.name()
    }

    /// Classify the log and compose a suggestion for the current gate.
    pub fn evaluate(
        &self,
        history: &[Outcome],
        previous_signal: Option<Outcome>,
        gate: GateState,
        stakes: Option<&StakePlan>,
    ) -> Analysis {
        let reading = self.classifier.classify(history, previous_signal);
        let suggestion = stakes.map(|plan| self.suggest(&reading, gate, plan));
        Analysis {
            mode: self.classifier.name().to_string(),
            reading,
            suggestion,
        }
    }

    /// Apply the entry thresholds to a reading.
    pub fn suggest(&self, reading: &PatternReading, gate: GateState, plan: &StakePlan) -> Suggestion {
        if gate.is_locked() {
            return Suggestion::Locked;
        }

        let confidence = reading.confidence;
        if confidence >= self.classifier.entry_threshold() {
            if let Some(side) = reading.signal.primary() {
                return Suggestion::Enter {
                    side,
                    confidence,
                    stake: plan.stake,
                    win_profit: plan.win_profit,
                    total_return: plan.total_return(),
                };
            }
        }

        match self.classifier.risky_threshold() {
            Some(low) if confidence >= low && confidence < self.classifier.entry_threshold() => {
                Suggestion::Risky {
                    signal: reading.signal,
                    confidence,
                }
            }
            _ => Suggestion::Wait,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LockReason;
    use rust_decimal_macros::dec;

    // ---- helpers -----------------------------------------------------------

    fn plan() -> StakePlan {
        // period goal 30 at 1.96 → stake 3.12, win 3.00
        StakePlan::new(dec!(30), dec!(1.96), 10).unwrap()
    }

    fn mock_engine(
        reading: PatternReading,
        entry: f64,
        risky: Option<f64>,
    ) -> SignalEngine {
        let mut mock = MockPatternClassifier::new();
        mock.expect_name().return_const("mock");
        mock.expect_classify()
            .returning(move |_, _| reading.clone());
        mock.expect_entry_threshold().return_const(entry);
        mock.expect_risky_threshold().return_const(risky);
        SignalEngine::new(Box::new(mock))
    }

    fn reading(signal: Signal, confidence: f64) -> PatternReading {
        PatternReading::new("test", signal, confidence, 1, "none")
    }

    // ---- tests -------------------------------------------------------------

    #[test]
    fn test_entry_carries_stake_and_return() {
        let engine = mock_engine(reading(Signal::Back(Outcome::Away), 80.0), 75.0, Some(60.0));
        let analysis = engine.evaluate(&[], None, GateState::Open, Some(&plan()));
        match analysis.suggestion {
            Some(Suggestion::Enter {
                side,
                stake,
                win_profit,
                total_return,
                ..
            }) => {
                assert_eq!(side, Outcome::Away);
                assert_eq!(stake, dec!(3.12));
                assert_eq!(win_profit, dec!(3.00));
                assert_eq!(total_return, dec!(6.12));
            }
            other => panic!("expected entry, got {other:?}"),
        }
        assert_eq!(analysis.mode, "mock");
    }

    #[test]
    fn test_locked_gate_suppresses_entry() {
        let engine = mock_engine(reading(Signal::Back(Outcome::Home), 95.0), 75.0, None);
        let analysis = engine.evaluate(
            &[],
            None,
            GateState::Locked(LockReason::GoalHit),
            Some(&plan()),
        );
        assert_eq!(analysis.suggestion, Some(Suggestion::Locked));
    }

    #[test]
    fn test_unconfigured_has_no_suggestion() {
        let engine = mock_engine(reading(Signal::Back(Outcome::Home), 95.0), 75.0, None);
        let analysis = engine.evaluate(&[], None, GateState::Open, None);
        assert!(analysis.suggestion.is_none());
        assert_eq!(analysis.reading.confidence, 95.0);
    }

    #[test]
    fn test_risky_band() {
        let engine = mock_engine(reading(Signal::Back(Outcome::Home), 70.0), 75.0, Some(60.0));
        let s = engine.suggest(&reading(Signal::Back(Outcome::Home), 70.0), GateState::Open, &plan());
        assert!(matches!(s, Suggestion::Risky { confidence, .. } if confidence == 70.0));
        assert!(format!("{s}").contains("Risky"));
    }

    #[test]
    fn test_no_risky_band_means_wait() {
        let engine = mock_engine(reading(Signal::Back(Outcome::Home), 55.0), 60.0, None);
        let s = engine.suggest(&reading(Signal::Back(Outcome::Home), 55.0), GateState::Open, &plan());
        assert_eq!(s, Suggestion::Wait);
    }

    #[test]
    fn test_tie_or_sentinel_never_enters() {
        let engine = mock_engine(reading(Signal::Back(Outcome::Tie), 90.0), 60.0, None);
        let p = plan();
        assert_eq!(
            engine.suggest(&reading(Signal::Back(Outcome::Tie), 90.0), GateState::Open, &p),
            Suggestion::Wait
        );
        assert_eq!(engine.suggest(&reading(Signal::Wait, 90.0), GateState::Open, &p), Suggestion::Wait);
        assert_eq!(engine.suggest(&reading(Signal::Unknown, 90.0), GateState::Open, &p), Suggestion::Wait);
    }

    #[test]
    fn test_from_config_selects_classifier() {
        let mut cfg = ClassifierConfig::default();
        assert_eq!(SignalEngine::from_config(&cfg, 18).mode_name(), "frequency");
        cfg.mode = ClassifierMode::Rules;
        assert_eq!(SignalEngine::from_config(&cfg, 18).mode_name(), "rules");
    }

    #[test]
    fn test_suggestion_display() {
        assert_eq!(format!("{}", Suggestion::Wait), "⏳ Wait for next signal");
        let enter = Suggestion::Enter {
            side: Outcome::Home,
            confidence: 80.0,
            stake: dec!(3.12),
            win_profit: dec!(3.00),
            total_return: dec!(6.12),
        };
        let text = format!("{enter}");
        assert!(text.contains("HOME"));
        assert!(text.contains("3.12"));
        assert!(text.contains("6.12"));
        assert!(enter.is_entry());
        assert_eq!(enter.side(), Some(Outcome::Home));
    }

    #[test]
    fn test_analysis_serializes_flat() {
        let engine = mock_engine(reading(Signal::Wait, 50.0), 75.0, Some(60.0));
        let analysis = engine.evaluate(&[], None, GateState::Open, Some(&plan()));
        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["pattern"], "test");
        assert_eq!(json["suggestion"]["action"], "wait");
    }
}
