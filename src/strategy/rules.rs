//! Rule-based pattern classifier.
//!
//! A fixed priority list of heuristics over the tail of the outcome log.
//! The first rule that matches wins; nothing here is learned or tuned.

use super::{PatternClassifier, PatternReading};
use crate::types::{Outcome, Signal};

const STREAK_LEN: usize = 4;
const ALTERNATION_LEN: usize = 5;
const REVERSAL_MIN_LEN: usize = 6;
const MIN_HISTORY: usize = 3;

const ALTERNATIONS: [[Outcome; ALTERNATION_LEN]; 2] = [
    [Outcome::Home, Outcome::Away, Outcome::Home, Outcome::Away, Outcome::Home],
    [Outcome::Away, Outcome::Home, Outcome::Away, Outcome::Home, Outcome::Away],
];

pub struct RuleClassifier {
    entry_threshold: f64,
    risky_threshold: f64,
}

impl RuleClassifier {
    pub fn new(entry_threshold: f64, risky_threshold: f64) -> Self {
        Self {
            entry_threshold,
            risky_threshold,
        }
    }
}

impl Default for RuleClassifier {
    fn default() -> Self {
        Self::new(75.0, 60.0)
    }
}

impl PatternClassifier for RuleClassifier {
    fn name(&self) -> &'static str {
        "rules"
    }

    fn classify(&self, history: &[Outcome], _previous_signal: Option<Outcome>) -> PatternReading {
        detect_pattern(history)
    }

    fn entry_threshold(&self) -> f64 {
        self.entry_threshold
    }

    fn risky_threshold(&self) -> Option<f64> {
        Some(self.risky_threshold)
    }
}

/// The primary outcome a streak is expected to break into.
/// A tie streak breaks into Home.
fn streak_breaker(last: Outcome) -> Outcome {
    match last {
        Outcome::Home => Outcome::Away,
        Outcome::Away | Outcome::Tie => Outcome::Home,
    }
}

fn all_same(tail: &[Outcome]) -> bool {
    tail.windows(2).all(|w| w[0] == w[1])
}

/// Classify the log, oldest first.
pub fn detect_pattern(history: &[Outcome]) -> PatternReading {
    let len = history.len();
    let last = match history.last() {
        Some(o) if len >= MIN_HISTORY => *o,
        _ => {
            return PatternReading::new(
                "insufficient pattern",
                Signal::Unknown,
                0.0,
                1,
                "neutral zone",
            )
        }
    };

    if len >= STREAK_LEN && all_same(&history[len - STREAK_LEN..]) {
        return PatternReading::new(
            "long streak",
            Signal::Back(streak_breaker(last)),
            80.0,
            2,
            "break imminent",
        );
    }

    if len >= ALTERNATION_LEN {
        let tail = &history[len - ALTERNATION_LEN..];
        if ALTERNATIONS.iter().any(|alt| alt.as_slice() == tail) {
            return PatternReading::new(
                "alternation",
                Signal::Back(last),
                70.0,
                3,
                "alternation break",
            );
        }
    }

    if last == Outcome::Tie {
        return PatternReading::new("strategic tie", Signal::Wait, 50.0, 4, "reset likely");
    }

    if len >= REVERSAL_MIN_LEN && history[len - 2] == last {
        // `last` is primary here: ties were handled above.
        return PatternReading::new(
            "reversal",
            Signal::Back(last),
            75.0,
            6,
            "reversal confirmed",
        );
    }

    PatternReading::new("undefined", Signal::Unknown, 50.0, 1, "neutral zone")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
