//! Configuration loading from TOML.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Every section has defaults, so a partial (or absent) file still
//! yields a usable configuration.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::strategy::ClassifierMode;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub session: SessionConfig,
    pub classifier: ClassifierConfig,
    pub dashboard: DashboardConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SessionConfig {
    /// Payout multiplier for the primary outcomes, used when setup omits odds.
    pub default_odds: Decimal,
    /// Number of trailing outcomes the frequency estimator reads.
    pub history_window: usize,
    /// Stop loss as a fraction of the balance at setup.
    pub stop_loss_pct: Decimal,
    /// The daily goal is split evenly over this many periods.
    pub periods_per_day: u32,
    /// Winning entries assumed to reach one period goal.
    pub entries_per_period: u32,
    pub currency: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_odds: dec!(1.96),
            history_window: 18,
            stop_loss_pct: dec!(0.10),
            periods_per_day: 3,
            entries_per_period: 10,
            currency: "R$".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ClassifierConfig {
    pub mode: ClassifierMode,
    /// Minimum confidence for an entry in rule-based mode.
    pub rules_entry_threshold: f64,
    /// Lower bound of the "risky entry" band in rule-based mode.
    pub rules_risky_threshold: f64,
    /// Minimum confidence for an entry in frequency mode.
    pub frequency_entry_threshold: f64,
    /// Confidence removed when the previous signal disagrees.
    pub mismatch_penalty: f64,
    /// Floor applied together with the mismatch penalty.
    pub penalty_floor: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            mode: ClassifierMode::Frequency,
            rules_entry_threshold: 75.0,
            rules_risky_threshold: 60.0,
            frequency_entry_threshold: 60.0,
            mismatch_penalty: 5.0,
            penalty_floor: 40.0,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DashboardConfig {
    pub enabled: bool,
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: 8501,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON file the session is saved to after each command. Unset = in-memory only.
    pub state_file: Option<String>,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &str) -> Result<Self> {
        if Path::new(path).exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.session.default_odds, dec!(1.96));
        assert_eq!(cfg.session.history_window, 18);
        assert_eq!(cfg.session.periods_per_day, 3);
        assert_eq!(cfg.classifier.mode, ClassifierMode::Frequency);
        assert_eq!(cfg.classifier.rules_entry_threshold, 75.0);
        assert!(cfg.storage.state_file.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg = AppConfig::from_toml(
            r#"
            [classifier]
            mode = "rules"

            [dashboard]
            port = 9000
            "#,
        )
        .unwrap();
        assert_eq!(cfg.classifier.mode, ClassifierMode::Rules);
        assert_eq!(cfg.classifier.frequency_entry_threshold, 60.0);
        assert_eq!(cfg.dashboard.port, 9000);
        assert!(cfg.dashboard.enabled);
        assert_eq!(cfg.session.stop_loss_pct, dec!(0.10));
    }

    #[test]
    fn test_decimal_fields_parse_from_floats() {
        let cfg = AppConfig::from_toml(
            r#"
            [session]
            default_odds = 2.05
            stop_loss_pct = 0.2
            "#,
        )
        .unwrap();
        assert_eq!(cfg.session.default_odds, dec!(2.05));
        assert_eq!(cfg.session.stop_loss_pct, dec!(0.2));
    }

    #[test]
    fn test_unknown_mode_rejected() {
        assert!(AppConfig::from_toml("[classifier]\nmode = \"martingale\"").is_err());
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let cfg = AppConfig::load_or_default("/tmp/studio_panel_missing_config_xyz.toml").unwrap();
        assert_eq!(cfg.dashboard.port, 8501);
        assert!(AppConfig::load("/tmp/studio_panel_missing_config_xyz.toml").is_err());
    }

    #[test]
    fn test_load_repo_config() {
        // Runs from the crate root under `cargo test`.
        if let Ok(cfg) = AppConfig::load("config.toml") {
            assert!(cfg.session.default_odds > Decimal::ONE);
            assert!(cfg.session.history_window > 0);
        }
    }
}
