//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `budgets` - Category budget commands (set, list, delete)
//! - `config` - Effective configuration display
//! - `core` - Init and shared utilities (open_db, config, parsing, formatting)
//! - `goals` - Savings goal commands
//! - `import` - CSV import and CSV/JSON export
//! - `prompts` - Prompt library management commands
//! - `record` - Message intake (record, classify)
//! - `reports` - Monthly summary, daily ledger and alerts
//! - `transactions` - Transaction commands (list, edit, delete)

pub mod budgets;
pub mod config;
pub mod core;
pub mod goals;
pub mod import;
pub mod prompts;
pub mod record;
pub mod reports;
pub mod transactions;

// Re-export command functions for main.rs
pub use budgets::*;
pub use config::*;
pub use core::*;
pub use goals::*;
pub use import::*;
pub use prompts::*;
pub use record::*;
pub use reports::*;
pub use transactions::*;

/// Truncate a string to a maximum number of characters, adding "..." if truncated
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
