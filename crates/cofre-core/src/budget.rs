//! Monthly budget calculations
//!
//! Everything here is derived on demand from the transactions of one owner
//! in one [`Period`]. The pure functions (`summarize`, `daily_status`,
//! `budget_statuses`) do the arithmetic; [`BudgetCalculator`] fetches the
//! data and pins the date that counts as "today".

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::config::BudgetConfig;
use crate::db::Database;
use crate::error::Result;
use crate::models::{Budget, BudgetAlertLevel, BudgetStatus, Transaction, TransactionKind};
use crate::period::Period;

/// Totals for one owner and month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySummary {
    pub period: Period,
    pub total_income: Decimal,
    pub total_fixed_expense: Decimal,
    pub total_variable_expense: Decimal,
    /// Fixed plus variable
    pub total_expense: Decimal,
    pub total_savings: Decimal,
    pub savings_target: Decimal,
    /// Negative when savings fall short of the target
    pub savings_vs_target: Decimal,
    pub final_balance: Decimal,
    /// Income left after fixed expenses and the savings target (may be negative)
    pub available_for_variable: Decimal,
    pub suggested_daily_average: Decimal,
    pub days_in_month: u32,
    pub transaction_count: usize,
    /// Informational notes, not ranked alerts
    pub alerts: Vec<String>,
}

/// Where a day sits relative to today
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPosition {
    Past,
    Today,
    Future,
}

impl DayPosition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Past => "past",
            Self::Today => "today",
            Self::Future => "future",
        }
    }
}

/// One row of the daily ledger
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayStatus {
    pub day: u32,
    pub date: NaiveDate,
    /// Variable expenses dated on this day
    pub spend: Decimal,
    pub allowance: Decimal,
    /// Carry-over up to and including this day
    pub cumulative_balance: Decimal,
    pub position: DayPosition,
    pub is_today: bool,
    pub exceeded: bool,
}

/// Day-by-day view of variable spending against the flat daily allowance
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyBudgetStatus {
    pub summary: MonthlySummary,
    pub days: Vec<DayStatus>,
    pub daily_allowance: Decimal,
    pub total_variable_spent: Decimal,
    pub remaining_budget_for_month: Decimal,
    /// Days after today within the month
    pub remaining_days: u32,
    pub adjusted_daily_average_for_remaining_days: Decimal,
    pub current_day: Option<DayStatus>,
    /// Allowance plus the carry-over accumulated before today
    pub today_allowance: Option<Decimal>,
}

/// Build the monthly summary from a set of transactions
///
/// Transactions dated outside `period` are ignored.
pub fn summarize(
    period: &Period,
    transactions: &[Transaction],
    savings_rate: Decimal,
) -> MonthlySummary {
    let mut income = Decimal::ZERO;
    let mut fixed = Decimal::ZERO;
    let mut variable = Decimal::ZERO;
    let mut savings = Decimal::ZERO;
    let mut count = 0;

    for tx in transactions.iter().filter(|t| period.contains(t.occurred_on)) {
        count += 1;
        match tx.kind {
            TransactionKind::Income => income += tx.amount,
            TransactionKind::FixedExpense => fixed += tx.amount,
            TransactionKind::VariableExpense => variable += tx.amount,
            TransactionKind::Savings => savings += tx.amount,
        }
    }

    let total_expense = fixed + variable;
    let savings_target = income * savings_rate;
    let final_balance = income - total_expense - savings;
    let available_for_variable = income - fixed - savings_target;
    let days_in_month = period.days_in_month();
    let suggested_daily_average = if days_in_month == 0 {
        Decimal::ZERO
    } else {
        available_for_variable / Decimal::from(days_in_month)
    };
    let savings_vs_target = savings - savings_target;

    let mut alerts = Vec::new();
    if savings_vs_target < Decimal::ZERO {
        alerts.push(format!(
            "Savings of {} are {} short of the {} target",
            savings.round_dp(2),
            (-savings_vs_target).round_dp(2),
            savings_target.round_dp(2)
        ));
    }
    if available_for_variable < Decimal::ZERO {
        alerts.push(format!(
            "Fixed expenses and the savings target exceed income by {}",
            (-available_for_variable).round_dp(2)
        ));
    }
    if variable > available_for_variable {
        alerts.push(format!(
            "Variable spending of {} exceeds the {} available",
            variable.round_dp(2),
            available_for_variable.round_dp(2)
        ));
    }

    MonthlySummary {
        period: *period,
        total_income: income,
        total_fixed_expense: fixed,
        total_variable_expense: variable,
        total_expense,
        total_savings: savings,
        savings_target,
        savings_vs_target,
        final_balance,
        available_for_variable,
        suggested_daily_average,
        days_in_month,
        transaction_count: count,
        alerts,
    }
}

/// Walk every day of the summary's month and track the running carry-over
pub fn daily_status(
    summary: MonthlySummary,
    transactions: &[Transaction],
    today: NaiveDate,
) -> DailyBudgetStatus {
    let period = summary.period;
    let allowance = summary.suggested_daily_average;

    let mut spend_by_day = vec![Decimal::ZERO; period.days_in_month() as usize];
    for tx in transactions.iter().filter(|t| {
        t.kind == TransactionKind::VariableExpense && period.contains(t.occurred_on)
    }) {
        let idx = tx.occurred_on.day0() as usize;
        if let Some(slot) = spend_by_day.get_mut(idx) {
            *slot += tx.amount;
        }
    }

    let mut days = Vec::with_capacity(spend_by_day.len());
    let mut cumulative = Decimal::ZERO;
    let mut today_allowance = None;

    for (date, spend) in period.first_day().iter_days().zip(spend_by_day) {
        let position = match date.cmp(&today) {
            std::cmp::Ordering::Less => DayPosition::Past,
            std::cmp::Ordering::Equal => DayPosition::Today,
            std::cmp::Ordering::Greater => DayPosition::Future,
        };
        let is_today = position == DayPosition::Today;
        if is_today {
            today_allowance = Some(allowance + cumulative);
        }

        cumulative += allowance - spend;
        days.push(DayStatus {
            day: date.day(),
            date,
            spend,
            allowance,
            cumulative_balance: cumulative,
            position,
            is_today,
            exceeded: spend > allowance,
        });
    }

    let total_variable_spent: Decimal = days.iter().map(|d| d.spend).sum();
    let remaining_budget_for_month = summary.available_for_variable - total_variable_spent;
    let remaining_days = remaining_days(&period, today);
    let adjusted_daily_average_for_remaining_days =
        remaining_budget_for_month / Decimal::from(remaining_days.max(1));
    let current_day = days.iter().find(|d| d.is_today).cloned();

    debug!(
        period = %period,
        spent = %total_variable_spent,
        remaining_days,
        "Daily budget status computed"
    );

    DailyBudgetStatus {
        summary,
        days,
        daily_allowance: allowance,
        total_variable_spent,
        remaining_budget_for_month,
        remaining_days,
        adjusted_daily_average_for_remaining_days,
        current_day,
        today_allowance,
    }
}

/// All days for a future month, none for a past one
fn remaining_days(period: &Period, today: NaiveDate) -> u32 {
    if period.contains(today) {
        period.days_in_month() - today.day()
    } else if period.last_day() < today {
        0
    } else {
        period.days_in_month()
    }
}

/// Join budgets with the committed spend in their category and month
///
/// Committed spend counts fixed and variable expenses; category names match
/// case-insensitively.
pub fn budget_statuses(
    budgets: &[Budget],
    transactions: &[Transaction],
    warning_ratio: Decimal,
) -> Vec<BudgetStatus> {
    budgets
        .iter()
        .map(|budget| {
            let category = budget.category.to_lowercase();
            let spent: Decimal = transactions
                .iter()
                .filter(|t| t.kind.is_expense())
                .filter(|t| {
                    t.occurred_on.month() == budget.month && t.occurred_on.year() == budget.year
                })
                .filter(|t| t.category.to_lowercase() == category)
                .map(|t| t.amount)
                .sum();

            let limit = budget.monthly_limit;
            let (usage_percentage, alert_level) = if limit <= Decimal::ZERO {
                let level = if spent > Decimal::ZERO {
                    BudgetAlertLevel::Exceeded
                } else {
                    BudgetAlertLevel::Safe
                };
                (Decimal::ZERO, level)
            } else {
                let level = if spent >= limit {
                    BudgetAlertLevel::Exceeded
                } else if spent >= limit * warning_ratio {
                    BudgetAlertLevel::Warning
                } else {
                    BudgetAlertLevel::Safe
                };
                (spent / limit * Decimal::ONE_HUNDRED, level)
            };

            BudgetStatus {
                budget: budget.clone(),
                spent,
                remaining: limit - spent,
                usage_percentage,
                alert_level,
            }
        })
        .collect()
}

/// Fetches an owner's transactions and runs the budget arithmetic
#[derive(Clone)]
pub struct BudgetCalculator {
    db: Database,
    savings_rate: Decimal,
    today: NaiveDate,
}

impl BudgetCalculator {
    pub fn new(db: Database, config: &BudgetConfig, today: NaiveDate) -> Self {
        Self {
            db,
            savings_rate: config.savings_rate,
            today,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn monthly_summary(&self, owner_id: i64, period: &Period) -> Result<MonthlySummary> {
        let transactions = self.db.list_transactions_for_period(owner_id, period)?;
        Ok(summarize(period, &transactions, self.savings_rate))
    }

    pub fn daily_budget_status(&self, owner_id: i64, period: &Period) -> Result<DailyBudgetStatus> {
        let transactions = self.db.list_transactions_for_period(owner_id, period)?;
        let summary = summarize(period, &transactions, self.savings_rate);
        Ok(daily_status(summary, &transactions, self.today))
    }

    pub fn budget_statuses(
        &self,
        owner_id: i64,
        period: &Period,
        warning_ratio: Decimal,
    ) -> Result<Vec<BudgetStatus>> {
        let budgets = self.db.list_budgets(owner_id, period)?;
        if budgets.is_empty() {
            return Ok(Vec::new());
        }
        let transactions = self.db.list_transactions_for_period(owner_id, period)?;
        Ok(budget_statuses(&budgets, &transactions, warning_ratio))
    }
}
