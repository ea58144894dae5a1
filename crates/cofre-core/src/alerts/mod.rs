//! Alert Engine - ranked budget alerts
//!
//! A pluggable set of sources inspects one owner's month and reports what
//! deserves attention. Results are ranked high → medium → low and capped.
//!
//! ## Built-in sources
//!
//! - **Daily spending** - today's spend against today's allowance, plus the
//!   month-end trend
//! - **Category budgets** - per-category limits near or past their cap
//! - **Savings target** - savings compared with the target share of income
//!
//! ## Usage
//!
//! ```rust,ignore
//! use cofre_core::alerts::AlertEngine;
//! use cofre_core::budget::BudgetCalculator;
//!
//! let calculator = BudgetCalculator::new(db, &config.budget, today);
//! let engine = AlertEngine::new(config.alerts.clone());
//! let alerts = engine.all_alerts(&calculator, owner_id, &period);
//! ```

pub mod engine;
pub mod sources;
pub mod types;

pub use engine::{AlertContext, AlertEngine, AlertSource};
pub use sources::{CategoryBudgetAlerts, DailySpendingAlerts, SavingsTargetAlerts};
pub use types::{Alert, AlertType, Severity};
