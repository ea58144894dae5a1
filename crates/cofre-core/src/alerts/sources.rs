//! Built-in alert sources
//!
//! Each source pulls what it needs through the [`BudgetCalculator`] and turns
//! it into alerts with a pure function, so the thresholds can be tested
//! without a database.

use rust_decimal::Decimal;

use crate::budget::{DailyBudgetStatus, MonthlySummary};
use crate::config::AlertConfig;
use crate::error::Result;
use crate::models::{BudgetAlertLevel, BudgetStatus};

use super::engine::{AlertContext, AlertSource};
use super::types::{Alert, AlertType, Severity};

/// Today's spend against today's allowance, plus the month-end trend
pub struct DailySpendingAlerts;

impl AlertSource for DailySpendingAlerts {
    fn name(&self) -> &'static str {
        "daily_spending"
    }

    fn evaluate(&self, ctx: &AlertContext<'_>) -> Result<Vec<Alert>> {
        let status = ctx
            .calculator
            .daily_budget_status(ctx.owner_id, &ctx.period)?;
        Ok(daily_alerts(&status, ctx.config))
    }
}

pub fn daily_alerts(status: &DailyBudgetStatus, config: &AlertConfig) -> Vec<Alert> {
    let mut alerts = Vec::new();

    if let Some(ref today) = status.current_day {
        if today.spend > Decimal::ZERO {
            let effective = status
                .today_allowance
                .unwrap_or(status.daily_allowance)
                .max(Decimal::ZERO);

            if today.spend > effective {
                alerts.push(Alert::new(
                    AlertType::DailyExceeded,
                    Severity::High,
                    format!(
                        "Spent {} today, over today's allowance of {}",
                        today.spend.round_dp(2),
                        effective.round_dp(2)
                    ),
                ));
            } else if today.spend >= effective * config.daily_warning_ratio {
                alerts.push(Alert::new(
                    AlertType::DailyWarning,
                    Severity::Medium,
                    format!(
                        "Spent {} today, {} left of today's allowance",
                        today.spend.round_dp(2),
                        (effective - today.spend).round_dp(2)
                    ),
                ));
            }
        }
    }

    if status.remaining_days > 0
        && status.remaining_budget_for_month > Decimal::ZERO
        && status.adjusted_daily_average_for_remaining_days
            > status.daily_allowance * config.trend_multiplier
    {
        alerts.push(Alert::new(
            AlertType::MonthlyTrend,
            Severity::Medium,
            format!(
                "Spending is below pace: {} per day is available for the remaining {} days",
                status.adjusted_daily_average_for_remaining_days.round_dp(2),
                status.remaining_days
            ),
        ));
    }

    alerts
}

/// Category budgets that are near or over their limit
pub struct CategoryBudgetAlerts;

impl AlertSource for CategoryBudgetAlerts {
    fn name(&self) -> &'static str {
        "category_budgets"
    }

    fn evaluate(&self, ctx: &AlertContext<'_>) -> Result<Vec<Alert>> {
        let statuses = ctx.calculator.budget_statuses(
            ctx.owner_id,
            &ctx.period,
            ctx.config.category_warning_ratio,
        )?;
        Ok(budget_alerts(&statuses))
    }
}

pub fn budget_alerts(statuses: &[BudgetStatus]) -> Vec<Alert> {
    statuses
        .iter()
        .filter_map(|status| {
            let category = &status.budget.category;
            match status.alert_level {
                BudgetAlertLevel::Exceeded => Some(Alert::new(
                    AlertType::BudgetExceeded,
                    Severity::High,
                    format!(
                        "{} budget exceeded: spent {} of {}",
                        category,
                        status.spent.round_dp(2),
                        status.budget.monthly_limit.round_dp(2)
                    ),
                )),
                BudgetAlertLevel::Warning => Some(Alert::new(
                    AlertType::BudgetWarning,
                    Severity::Medium,
                    format!(
                        "{} budget at {}%: {} left",
                        category,
                        status.usage_percentage.round_dp(0),
                        status.remaining.round_dp(2)
                    ),
                )),
                BudgetAlertLevel::Safe => None,
            }
        })
        .collect()
}

/// Savings compared with the target share of income
pub struct SavingsTargetAlerts;

impl AlertSource for SavingsTargetAlerts {
    fn name(&self) -> &'static str {
        "savings_target"
    }

    fn evaluate(&self, ctx: &AlertContext<'_>) -> Result<Vec<Alert>> {
        let summary = ctx.calculator.monthly_summary(ctx.owner_id, &ctx.period)?;
        Ok(savings_alerts(&summary, ctx.config))
    }
}

pub fn savings_alerts(summary: &MonthlySummary, config: &AlertConfig) -> Vec<Alert> {
    let gap = summary.savings_vs_target;

    if gap < Decimal::ZERO {
        vec![Alert::new(
            AlertType::SavingsShortfall,
            Severity::High,
            format!(
                "Savings are {} below the {} target",
                (-gap).round_dp(2),
                summary.savings_target.round_dp(2)
            ),
        )]
    } else if gap < summary.savings_target * config.savings_near_miss_ratio {
        vec![Alert::new(
            AlertType::SavingsNearMiss,
            Severity::Medium,
            format!(
                "Savings are only {} above the {} target",
                gap.round_dp(2),
                summary.savings_target.round_dp(2)
            ),
        )]
    } else {
        Vec::new()
    }
}
