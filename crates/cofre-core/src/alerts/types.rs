//! Alert types

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// How urgent an alert is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Worth knowing
    Low,
    /// Heading toward a limit
    Medium,
    /// A limit has been crossed
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }

    /// Numeric priority for sorting (higher = more urgent)
    pub fn priority(&self) -> u8 {
        match self {
            Severity::Low => 1,
            Severity::Medium => 2,
            Severity::High => 3,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// What an alert is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertType {
    DailyExceeded,
    DailyWarning,
    MonthlyTrend,
    BudgetExceeded,
    BudgetWarning,
    SavingsShortfall,
    SavingsNearMiss,
}

impl AlertType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertType::DailyExceeded => "daily_exceeded",
            AlertType::DailyWarning => "daily_warning",
            AlertType::MonthlyTrend => "monthly_trend",
            AlertType::BudgetExceeded => "budget_exceeded",
            AlertType::BudgetWarning => "budget_warning",
            AlertType::SavingsShortfall => "savings_shortfall",
            AlertType::SavingsNearMiss => "savings_near_miss",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ranked, user-facing alert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub alert_type: AlertType,
    pub message: String,
    pub severity: Severity,
}

impl Alert {
    pub fn new(alert_type: AlertType, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            alert_type,
            message: message.into(),
            severity,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::High.priority() > Severity::Medium.priority());
        assert!(Severity::Medium.priority() > Severity::Low.priority());
    }

    #[test]
    fn test_severity_from_str() {
        assert_eq!("high".parse::<Severity>(), Ok(Severity::High));
        assert!("urgent".parse::<Severity>().is_err());
    }

    #[test]
    fn test_alert_serializes_snake_case() {
        let alert = Alert::new(AlertType::SavingsNearMiss, Severity::Medium, "x");
        let json = serde_json::to_value(&alert).unwrap();
        assert_eq!(json["alert_type"], "savings_near_miss");
        assert_eq!(json["severity"], "medium");
    }
}
