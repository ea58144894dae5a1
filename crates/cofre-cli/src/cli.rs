//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Cofre - Personal budget assistant
#[derive(Parser)]
#[command(name = "cofre")]
#[command(about = "Record money messages and keep a monthly budget on track", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Database path
    #[arg(long, default_value = "cofre.db", global = true)]
    pub db: PathBuf,

    /// Owner (user) id the command acts on
    #[arg(long, default_value = "1", global = true)]
    pub owner: i64,

    /// Engine config file (defaults to the data dir override, then built-in values)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable database encryption (not recommended for production)
    ///
    /// By default, the database is encrypted using SQLCipher.
    /// Set COFRE_DB_KEY environment variable with your passphrase.
    /// Use --no-encrypt only for development or testing.
    #[arg(long, global = true)]
    pub no_encrypt: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Month selector shared by reporting commands
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct PeriodArgs {
    /// Month (1-12), defaults to the current month
    #[arg(long)]
    pub month: Option<u32>,

    /// Year, defaults to the current year
    #[arg(long)]
    pub year: Option<i32>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database
    Init,

    /// Record a transaction from a free-form message
    ///
    /// Example: cofre record "R$ 45,50 almoço"
    Record {
        /// Message words (joined with spaces)
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,

        /// Date of the transaction (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },

    /// Show how a message would be classified, without recording it
    Classify {
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },

    /// Manage transactions (list, edit, delete)
    Transactions {
        #[command(subcommand)]
        action: Option<TransactionsAction>,
    },

    /// Manage monthly category budgets
    Budgets {
        #[command(subcommand)]
        action: Option<BudgetsAction>,
    },

    /// Monthly summary: totals, savings target and variable allowance
    Summary {
        #[command(flatten)]
        period: PeriodArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Day-by-day allowance ledger for a month
    Daily {
        #[command(flatten)]
        period: PeriodArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ranked budget alerts for a month
    Alerts {
        #[command(flatten)]
        period: PeriodArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage savings goals
    Goals {
        #[command(subcommand)]
        action: Option<GoalsAction>,
    },

    /// Export transactions
    Export {
        /// Output format: csv or json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,

        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Import transactions from a CSV file in the export layout
    Import {
        /// CSV file to import
        file: PathBuf,
    },

    /// Manage oracle prompts (list, show, path)
    Prompts {
        #[command(subcommand)]
        action: Option<PromptsAction>,
    },

    /// Print the effective engine configuration
    Config,
}

#[derive(Subcommand)]
pub enum TransactionsAction {
    /// List transactions
    List {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: i64,

        /// Search description, category and original message
        #[arg(short, long)]
        search: Option<String>,

        /// Filter by category
        #[arg(short, long)]
        category: Option<String>,

        /// Filter by kind: income, fixed_expense, variable_expense, savings
        #[arg(short, long)]
        kind: Option<String>,

        #[command(flatten)]
        period: PeriodArgs,

        /// Sort field: date, amount, description
        #[arg(long, default_value = "date")]
        sort: String,

        /// Sort ascending instead of descending
        #[arg(long)]
        asc: bool,
    },

    /// Edit a transaction
    Edit {
        /// Transaction ID
        id: i64,

        /// New amount
        #[arg(long)]
        amount: Option<String>,

        /// New category
        #[arg(long)]
        category: Option<String>,

        /// New kind: income, fixed_expense, variable_expense, savings
        #[arg(long)]
        kind: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// New date (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,
    },

    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum BudgetsAction {
    /// Set (or replace) the monthly limit for a category
    Set {
        /// Category name
        category: String,

        /// Monthly limit
        limit: String,

        #[command(flatten)]
        period: PeriodArgs,
    },

    /// List budgets with their current usage
    List {
        #[command(flatten)]
        period: PeriodArgs,
    },

    /// Delete a budget
    Delete {
        /// Budget ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum GoalsAction {
    /// Add a savings goal
    Add {
        /// Goal name
        name: String,

        /// Target amount
        target: String,

        /// Amount already saved
        #[arg(long, default_value = "0")]
        current: String,

        /// Deadline (YYYY-MM-DD)
        #[arg(long)]
        deadline: Option<String>,

        /// Related category
        #[arg(long)]
        category: Option<String>,

        /// Priority from 1 (low) to 5 (high)
        #[arg(long, default_value = "3")]
        priority: u8,
    },

    /// List goals
    List {
        /// Include completed goals
        #[arg(long)]
        all: bool,
    },

    /// Set the amount saved so far
    Progress {
        /// Goal ID
        id: i64,

        /// Current amount saved
        amount: String,
    },

    /// Delete a goal
    Delete {
        /// Goal ID
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum PromptsAction {
    /// List all available prompts and their override status
    List,

    /// Show the content of a specific prompt
    Show {
        /// Prompt ID (e.g., classify_message)
        prompt_id: String,
    },

    /// Show the path where prompt overrides should be placed
    Path,
}
