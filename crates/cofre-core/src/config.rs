//! Engine configuration
//!
//! Config is loaded with a two-layer resolution:
//! 1. Check for override in data dir (~/.local/share/cofre/config/cofre.toml)
//! 2. Fall back to embedded defaults (compiled into binary)
//!
//! Keys missing from an override keep their default value.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/cofre.toml");

/// Savings policy
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetConfig {
    /// Share of income committed to savings (the 25% rule)
    pub savings_rate: Decimal,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            savings_rate: Decimal::new(25, 2),
        }
    }
}

/// Classifier escalation settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassifierConfig {
    /// Oracle answers must report strictly more than this
    pub oracle_min_confidence: f64,
    pub oracle_timeout_secs: u64,
    /// Escalate messages whose keyword confidence is below this
    pub escalate_below_confidence: Option<f64>,
}

impl ClassifierConfig {
    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            oracle_min_confidence: 0.7,
            oracle_timeout_secs: 10,
            escalate_below_confidence: None,
        }
    }
}

/// Alert thresholds
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertConfig {
    pub max_alerts: usize,
    pub daily_warning_ratio: Decimal,
    pub trend_multiplier: Decimal,
    pub category_warning_ratio: Decimal,
    pub savings_near_miss_ratio: Decimal,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            max_alerts: 6,
            daily_warning_ratio: Decimal::new(8, 1),
            trend_multiplier: Decimal::new(15, 1),
            category_warning_ratio: Decimal::new(8, 1),
            savings_near_miss_ratio: Decimal::new(1, 1),
        }
    }
}

/// Full engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EngineConfig {
    pub budget: BudgetConfig,
    pub classifier: ClassifierConfig,
    pub alerts: AlertConfig,
}

impl EngineConfig {
    /// Load from the default override location, else the embedded defaults
    pub fn load() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Self::embedded(),
        }
    }

    /// Load from an explicit path. A missing file yields the embedded defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Self::embedded();
        }
        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;
        Self::from_toml(&content)
    }

    pub fn embedded() -> Result<Self> {
        Self::from_toml(DEFAULT_CONFIG)
    }

    /// Parse TOML and apply it on top of the built-in defaults
    pub fn from_toml(content: &str) -> Result<Self> {
        let raw: RawConfig = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

        let mut config = EngineConfig::default();

        if let Some(budget) = raw.budget {
            if let Some(rate) = budget.savings_rate {
                config.budget.savings_rate = ratio("budget.savings_rate", rate)?;
            }
        }

        if let Some(classifier) = raw.classifier {
            if let Some(min) = classifier.oracle_min_confidence {
                check_unit("classifier.oracle_min_confidence", min)?;
                config.classifier.oracle_min_confidence = min;
            }
            if let Some(secs) = classifier.oracle_timeout_secs {
                if secs == 0 {
                    return Err(Error::Config(
                        "classifier.oracle_timeout_secs must be at least 1".into(),
                    ));
                }
                config.classifier.oracle_timeout_secs = secs;
            }
            if let Some(below) = classifier.escalate_below_confidence {
                check_unit("classifier.escalate_below_confidence", below)?;
                config.classifier.escalate_below_confidence = Some(below);
            }
        }

        if let Some(alerts) = raw.alerts {
            if let Some(max) = alerts.max_alerts {
                if max == 0 {
                    return Err(Error::Config("alerts.max_alerts must be at least 1".into()));
                }
                config.alerts.max_alerts = max;
            }
            if let Some(r) = alerts.daily_warning_ratio {
                config.alerts.daily_warning_ratio = ratio("alerts.daily_warning_ratio", r)?;
            }
            if let Some(m) = alerts.trend_multiplier {
                if m <= 0.0 {
                    return Err(Error::Config(
                        "alerts.trend_multiplier must be positive".into(),
                    ));
                }
                config.alerts.trend_multiplier = to_decimal("alerts.trend_multiplier", m)?;
            }
            if let Some(r) = alerts.category_warning_ratio {
                config.alerts.category_warning_ratio = ratio("alerts.category_warning_ratio", r)?;
            }
            if let Some(r) = alerts.savings_near_miss_ratio {
                config.alerts.savings_near_miss_ratio =
                    ratio("alerts.savings_near_miss_ratio", r)?;
            }
        }

        Ok(config)
    }
}

/// Default override config path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::data_local_dir().map(|d| d.join("cofre").join("config").join("cofre.toml"))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    budget: Option<RawBudget>,
    classifier: Option<RawClassifier>,
    alerts: Option<RawAlerts>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawBudget {
    savings_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawClassifier {
    oracle_min_confidence: Option<f64>,
    oracle_timeout_secs: Option<u64>,
    escalate_below_confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawAlerts {
    max_alerts: Option<usize>,
    daily_warning_ratio: Option<f64>,
    trend_multiplier: Option<f64>,
    category_warning_ratio: Option<f64>,
    savings_near_miss_ratio: Option<f64>,
}

fn check_unit(key: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::Config(format!(
            "{} must be between 0 and 1, got {}",
            key, value
        )));
    }
    Ok(())
}

fn ratio(key: &str, value: f64) -> Result<Decimal> {
    check_unit(key, value)?;
    to_decimal(key, value)
}

// Go through the shortest decimal representation so 0.1 stays 0.1
fn to_decimal(key: &str, value: f64) -> Result<Decimal> {
    Decimal::from_str(&value.to_string())
        .map_err(|e| Error::Config(format!("{} is not a valid decimal: {}", key, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_embedded_matches_defaults() {
        let config = EngineConfig::embedded().unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.budget.savings_rate, dec!(0.25));
        assert_eq!(config.alerts.max_alerts, 6);
        assert_eq!(config.classifier.oracle_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_partial_override_keeps_defaults() {
        let config = EngineConfig::from_toml(
            r#"
            [budget]
            savings_rate = 0.3

            [alerts]
            max_alerts = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.budget.savings_rate, dec!(0.3));
        assert_eq!(config.alerts.max_alerts, 3);
        assert_eq!(config.alerts.trend_multiplier, dec!(1.5));
        assert!(config.classifier.escalate_below_confidence.is_none());
    }

    #[test]
    fn test_rejects_out_of_range_rate() {
        let err = EngineConfig::from_toml("[budget]\nsavings_rate = 1.5").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_rejects_zero_max_alerts() {
        assert!(EngineConfig::from_toml("[alerts]\nmax_alerts = 0").is_err());
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(EngineConfig::from_toml("[budget]\nsavings = 0.2").is_err());
    }

    #[test]
    fn test_missing_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let config = EngineConfig::from_file(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }
}
