//! Data models for Cofre

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::period::Period;

/// Transaction kind. Every transaction has exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money received (salary, freelance, dividends)
    Income,
    /// Recurring commitments (rent, utilities, insurance)
    FixedExpense,
    /// Day-to-day discretionary spending
    VariableExpense,
    /// Money put aside or invested
    Savings,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::FixedExpense => "fixed_expense",
            Self::VariableExpense => "variable_expense",
            Self::Savings => "savings",
        }
    }

    /// Human-readable label for reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Income => "Income",
            Self::FixedExpense => "Fixed expense",
            Self::VariableExpense => "Variable expense",
            Self::Savings => "Savings",
        }
    }

    pub fn all() -> &'static [TransactionKind] {
        &[
            Self::Income,
            Self::FixedExpense,
            Self::VariableExpense,
            Self::Savings,
        ]
    }

    /// Fixed and variable expenses count against category budgets
    pub fn is_expense(&self) -> bool {
        matches!(self, Self::FixedExpense | Self::VariableExpense)
    }
}

impl std::str::FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "renda" => Ok(Self::Income),
            "fixed_expense" | "fixed" | "fixa" | "despesa_fixa" => Ok(Self::FixedExpense),
            "variable_expense" | "variable" | "variavel" | "despesa_variavel" => {
                Ok(Self::VariableExpense)
            }
            "savings" | "economia" => Ok(Self::Savings),
            _ => Err(format!("Unknown transaction kind: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a transaction was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DetectedBy {
    /// Entered or imported by the user
    #[default]
    Manual,
    /// Keyword rules
    Rule,
    /// External language model
    Oracle,
}

impl DetectedBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Rule => "rule",
            Self::Oracle => "oracle",
        }
    }
}

impl std::str::FromStr for DetectedBy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "rule" => Ok(Self::Rule),
            "oracle" => Ok(Self::Oracle),
            _ => Err(format!("Unknown detection source: {}", s)),
        }
    }
}

impl std::fmt::Display for DetectedBy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A persisted transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    pub owner_id: i64,
    pub kind: TransactionKind,
    /// Always positive; the kind carries the direction
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    pub occurred_on: NaiveDate,
    pub detected_by: DetectedBy,
    /// Raw message the transaction was classified from
    pub original_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A transaction to be persisted
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub owner_id: i64,
    pub kind: TransactionKind,
    pub amount: Decimal,
    pub category: String,
    pub description: String,
    pub occurred_on: NaiveDate,
    pub detected_by: DetectedBy,
    pub original_message: Option<String>,
    /// Dedupe key for CSV imports
    pub import_hash: Option<String>,
}

impl NewTransaction {
    /// Manually entered transaction with no source message
    pub fn manual(
        owner_id: i64,
        kind: TransactionKind,
        amount: Decimal,
        category: &str,
        description: &str,
        occurred_on: NaiveDate,
    ) -> Self {
        Self {
            owner_id,
            kind,
            amount,
            category: category.to_string(),
            description: description.to_string(),
            occurred_on,
            detected_by: DetectedBy::Manual,
            original_message: None,
            import_hash: None,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure_positive(self.amount, "transaction amount")?;
        if self.category.trim().is_empty() {
            return Err(Error::InvalidData("Category must not be empty".into()));
        }
        Ok(())
    }
}

/// Partial edit of a transaction. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub kind: Option<TransactionKind>,
    pub description: Option<String>,
    pub occurred_on: Option<NaiveDate>,
}

impl TransactionUpdate {
    pub fn is_empty(&self) -> bool {
        self.amount.is_none()
            && self.category.is_none()
            && self.kind.is_none()
            && self.description.is_none()
            && self.occurred_on.is_none()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(amount) = self.amount {
            ensure_positive(amount, "transaction amount")?;
        }
        if let Some(ref category) = self.category {
            if category.trim().is_empty() {
                return Err(Error::InvalidData("Category must not be empty".into()));
            }
        }
        Ok(())
    }
}

/// Monthly spending limit for one category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: i64,
    pub owner_id: i64,
    pub category: String,
    pub monthly_limit: Decimal,
    pub month: u32,
    pub year: i32,
    pub created_at: DateTime<Utc>,
}

impl Budget {
    pub fn period(&self) -> Result<Period> {
        Period::new(self.month, self.year)
    }
}

/// Budget consumption level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetAlertLevel {
    Safe,
    Warning,
    Exceeded,
}

impl BudgetAlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Safe => "safe",
            Self::Warning => "warning",
            Self::Exceeded => "exceeded",
        }
    }
}

impl std::fmt::Display for BudgetAlertLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A budget joined with what has been spent against it
#[derive(Debug, Clone, Serialize)]
pub struct BudgetStatus {
    pub budget: Budget,
    /// Fixed plus variable expenses in the budget's category
    pub spent: Decimal,
    /// Negative when over the limit
    pub remaining: Decimal,
    pub usage_percentage: Decimal,
    pub alert_level: BudgetAlertLevel,
}

/// A savings goal with a target amount and optional deadline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialGoal {
    pub id: i64,
    pub owner_id: i64,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub deadline: Option<NaiveDate>,
    pub category: Option<String>,
    /// 1 (lowest) to 5 (highest)
    pub priority: u8,
    pub created_at: DateTime<Utc>,
}

impl FinancialGoal {
    pub fn progress_percentage(&self) -> Decimal {
        if self.target_amount <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        self.current_amount / self.target_amount * Decimal::ONE_HUNDRED
    }

    pub fn remaining_amount(&self) -> Decimal {
        (self.target_amount - self.current_amount).max(Decimal::ZERO)
    }

    pub fn is_completed(&self) -> bool {
        self.current_amount >= self.target_amount
    }

    /// Days until the deadline, floored at zero. `None` without a deadline.
    pub fn days_remaining(&self, today: NaiveDate) -> Option<i64> {
        self.deadline
            .map(|deadline| (deadline - today).num_days().max(0))
    }
}

/// A goal to be persisted
#[derive(Debug, Clone)]
pub struct NewGoal {
    pub owner_id: i64,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub deadline: Option<NaiveDate>,
    pub category: Option<String>,
    pub priority: u8,
}

impl NewGoal {
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidData("Goal name must not be empty".into()));
        }
        ensure_positive(self.target_amount, "goal target")?;
        ensure_progress(self.current_amount)?;
        if !(1..=5).contains(&self.priority) {
            return Err(Error::InvalidData(format!(
                "Goal priority must be between 1 and 5, got {}",
                self.priority
            )));
        }
        Ok(())
    }
}

pub(crate) fn ensure_progress(amount: Decimal) -> Result<()> {
    if amount < Decimal::ZERO {
        return Err(Error::InvalidAmount(format!(
            "goal progress must not be negative, got {}",
            amount
        )));
    }
    if amount > max_amount() {
        return Err(Error::InvalidAmount(format!(
            "goal progress must not exceed {}, got {}",
            max_amount(),
            amount
        )));
    }
    Ok(())
}

/// Largest amount accepted anywhere (one quadrillion)
///
/// Keeps a month of sums far below `Decimal::MAX`.
pub fn max_amount() -> Decimal {
    Decimal::from(1_000_000_000_000_000_i64)
}

/// Whether an amount may be stored
pub fn is_valid_amount(amount: Decimal) -> bool {
    amount > Decimal::ZERO && amount <= max_amount()
}

pub(crate) fn ensure_positive(amount: Decimal, what: &str) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::InvalidAmount(format!(
            "{} must be positive, got {}",
            what, amount
        )));
    }
    if amount > max_amount() {
        return Err(Error::InvalidAmount(format!(
            "{} must not exceed {}, got {}",
            what,
            max_amount(),
            amount
        )));
    }
    Ok(())
}
