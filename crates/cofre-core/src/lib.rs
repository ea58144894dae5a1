//! Cofre Core Library
//!
//! Shared functionality for the Cofre personal budget tool:
//! - Message classification (amount, category, kind) with keyword rules
//! - Optional oracle escalation to a local or hosted language model
//! - Monthly summaries, a daily allowance ledger and category budgets
//! - Ranked budget alerts
//! - Database access and migrations (SQLite, optional SQLCipher)
//! - CSV/JSON export and CSV import
//! - Prompt library for customizable oracle prompts

pub mod ai;
pub mod alerts;
pub mod budget;
pub mod categories;
pub mod classifier;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod intake;
pub mod models;
pub mod period;
pub mod prompts;

/// Test utilities including mock Ollama server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{
    MockOracle, OllamaBackend, OpenAICompatibleBackend, OracleClassification, OracleClient,
    OracleInfo, TextClassifierOracle,
};
pub use alerts::{Alert, AlertEngine, AlertSource, AlertType, Severity};
pub use budget::{BudgetCalculator, DailyBudgetStatus, DayPosition, DayStatus, MonthlySummary};
pub use categories::{CategoryMatch, CategoryRule, CategoryTable};
pub use classifier::{Classification, Classifier};
pub use config::{AlertConfig, BudgetConfig, ClassifierConfig, EngineConfig};
pub use db::{Database, TransactionFilter};
pub use error::{Error, Result};
pub use export::{ExportFormat, ImportStats, RejectedRow};
pub use intake::{Intake, RecordOutcome};
pub use models::{
    Budget, BudgetAlertLevel, BudgetStatus, DetectedBy, FinancialGoal, NewGoal, NewTransaction,
    Transaction, TransactionKind, TransactionUpdate,
};
pub use period::Period;
pub use prompts::{Prompt, PromptId, PromptInfo, PromptLibrary};
