//! Alert Engine - runs every registered source and ranks the results

use crate::budget::BudgetCalculator;
use crate::config::AlertConfig;
use crate::period::Period;
use crate::Result;

use super::sources::{CategoryBudgetAlerts, DailySpendingAlerts, SavingsTargetAlerts};
use super::types::Alert;

/// What a source is asked to evaluate
pub struct AlertContext<'a> {
    pub calculator: &'a BudgetCalculator,
    pub owner_id: i64,
    pub period: Period,
    pub config: &'a AlertConfig,
}

/// A producer of alerts for one owner and month
pub trait AlertSource: Send + Sync {
    /// Identifier used in logs
    fn name(&self) -> &'static str;

    fn evaluate(&self, ctx: &AlertContext<'_>) -> Result<Vec<Alert>>;
}

/// Collects alerts from every source, highest severity first
pub struct AlertEngine {
    sources: Vec<Box<dyn AlertSource>>,
    config: AlertConfig,
}

impl Default for AlertEngine {
    fn default() -> Self {
        Self::new(AlertConfig::default())
    }
}

impl AlertEngine {
    /// Engine with the built-in sources (daily, category budgets, savings)
    pub fn new(config: AlertConfig) -> Self {
        let mut engine = Self::empty(config);

        // Registration order is the order within a severity tier
        engine.register(Box::new(DailySpendingAlerts));
        engine.register(Box::new(CategoryBudgetAlerts));
        engine.register(Box::new(SavingsTargetAlerts));

        engine
    }

    /// Engine with no sources registered
    pub fn empty(config: AlertConfig) -> Self {
        Self {
            sources: vec![],
            config,
        }
    }

    pub fn register(&mut self, source: Box<dyn AlertSource>) {
        self.sources.push(source);
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|s| s.name()).collect()
    }

    /// Run every source, rank by severity and cap at `max_alerts`
    ///
    /// A failing source is logged and contributes nothing.
    pub fn all_alerts(
        &self,
        calculator: &BudgetCalculator,
        owner_id: i64,
        period: &Period,
    ) -> Vec<Alert> {
        let ctx = AlertContext {
            calculator,
            owner_id,
            period: *period,
            config: &self.config,
        };

        let mut alerts = vec![];
        for source in &self.sources {
            match source.evaluate(&ctx) {
                Ok(found) => {
                    tracing::debug!(
                        source = source.name(),
                        count = found.len(),
                        "Alert source evaluated"
                    );
                    alerts.extend(found);
                }
                Err(e) => {
                    tracing::warn!(
                        source = source.name(),
                        error = %e,
                        "Alert source failed"
                    );
                }
            }
        }

        // Stable: generation order survives within a tier
        alerts.sort_by_key(|a| std::cmp::Reverse(a.severity.priority()));
        alerts.truncate(self.config.max_alerts);
        alerts
    }
}
