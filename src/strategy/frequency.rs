//! Frequency-based probability estimator.
//!
//! Counts outcomes over a trailing window, backs the most frequent one and
//! adapts the confidence to whether the previous signal agreed. A separate
//! "manipulation" heuristic labels how patterned the window looks.

use serde::{Deserialize, Serialize};

use super::{PatternClassifier, PatternReading};
use crate::types::{Outcome, Signal};

/// Minimum window size before the manipulation heuristic says anything.
const MIN_SAMPLES: usize = 6;
const RUN_LEN: usize = 5;
const RECENT_TIE_LEN: usize = 3;
const UNIFORM_PCT: f64 = 33.3;

// ---------------------------------------------------------------------------
// Distribution
// ---------------------------------------------------------------------------

/// Percentage of each outcome in the window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub home: f64,
    pub away: f64,
    pub tie: f64,
}

impl Default for Distribution {
    /// Used for an empty window.
    fn default() -> Self {
        Self {
            home: UNIFORM_PCT,
            away: UNIFORM_PCT,
            tie: UNIFORM_PCT,
        }
    }
}

impl Distribution {
    /// Empirical frequencies of `window`, in percent.
    pub fn from_window(window: &[Outcome]) -> Self {
        if window.is_empty() {
            return Self::default();
        }
        let n = window.len() as f64;
        let pct = |o: Outcome| window.iter().filter(|&&w| w == o).count() as f64 * 100.0 / n;
        Self {
            home: pct(Outcome::Home),
            away: pct(Outcome::Away),
            tie: pct(Outcome::Tie),
        }
    }

    pub fn get(&self, outcome: Outcome) -> f64 {
        match outcome {
            Outcome::Home => self.home,
            Outcome::Away => self.away,
            Outcome::Tie => self.tie,
        }
    }

    /// Most frequent outcome. Ties resolve in the order Home, Away, Tie.
    pub fn top(&self) -> (Outcome, f64) {
        let mut best = (Outcome::Home, self.home);
        for o in [Outcome::Away, Outcome::Tie] {
            if self.get(o) > best.1 {
                best = (o, self.get(o));
            }
        }
        best
    }

    pub fn total(&self) -> f64 {
        self.home + self.away + self.tie
    }
}

// ---------------------------------------------------------------------------
// Heuristics
// ---------------------------------------------------------------------------

/// The last `n` outcomes of `history` (all of it if shorter).
pub fn trailing_window(history: &[Outcome], n: usize) -> &[Outcome] {
    &history[history.len().saturating_sub(n)..]
}

/// Penalise confidence when the previous signal disagrees with the current
/// top prediction. Applied once per evaluation.
pub fn adaptive_confidence(
    raw: f64,
    previous_signal: Option<Outcome>,
    top: Outcome,
    penalty: f64,
    floor: f64,
) -> f64 {
    match previous_signal {
        Some(prev) if prev != top => (raw - penalty).max(floor),
        _ => raw,
    }
}

/// Manipulation level with its label and alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Manipulation {
    pub level: u8,
    pub label: &'static str,
    pub alert: &'static str,
}

/// Score how patterned the window looks.
pub fn manipulation_level(window: &[Outcome]) -> Manipulation {
    let len = window.len();
    if len < MIN_SAMPLES {
        return Manipulation {
            level: 1,
            label: "insufficient data",
            alert: "insufficient data",
        };
    }

    let run = &window[len - RUN_LEN..];
    if run.windows(2).all(|w| w[0] == w[1]) {
        return Manipulation {
            level: 7,
            label: "long streak",
            alert: "break imminent",
        };
    }

    let alternating = run.iter().all(Outcome::is_primary) && run.windows(2).all(|w| w[0] != w[1]);
    if alternating {
        return Manipulation {
            level: 4,
            label: "alternation",
            alert: "alternation break",
        };
    }

    if window[len - RECENT_TIE_LEN..].contains(&Outcome::Tie) {
        return Manipulation {
            level: 6,
            label: "strategic tie",
            alert: "reset likely",
        };
    }

    Manipulation {
        level: 3,
        label: "neutral zone",
        alert: "neutral zone",
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

pub struct FrequencyClassifier {
    window: usize,
    entry_threshold: f64,
    penalty: f64,
    floor: f64,
}

impl FrequencyClassifier {
    pub fn new(window: usize, entry_threshold: f64, penalty: f64, floor: f64) -> Self {
        Self {
            window,
            entry_threshold,
            penalty,
            floor,
        }
    }
}

impl Default for FrequencyClassifier {
    fn default() -> Self {
        Self::new(18, 60.0, 5.0, 40.0)
    }
}

impl PatternClassifier for FrequencyClassifier {
    fn name(&self) -> &'static str {
        "frequency"
    }

    fn classify(&self, history: &[Outcome], previous_signal: Option<Outcome>) -> PatternReading {
        let window = trailing_window(history, self.window);
        let distribution = Distribution::from_window(window);

        if window.is_empty() {
            let mut reading = PatternReading::new(
                "insufficient data",
                Signal::Unknown,
                0.0,
                1,
                "insufficient data",
            );
            reading.distribution = Some(distribution);
            return reading;
        }

        let (top, pct) = distribution.top();
        let confidence =
            adaptive_confidence(round2(pct), previous_signal, top, self.penalty, self.floor);
        let m = manipulation_level(window);

        let mut reading =
            PatternReading::new(m.label, Signal::Back(top), confidence, m.level, m.alert);
        reading.distribution = Some(distribution);
        reading
    }

    fn entry_threshold(&self) -> f64 {
        self.entry_threshold
    }

    fn risky_threshold(&self) -> Option<f64> {
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
