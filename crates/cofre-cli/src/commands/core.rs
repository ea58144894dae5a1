//! Core command implementations and shared utilities
//!
//! This module contains:
//! - `open_db` - Shared utility to open the database
//! - `load_config` / `build_classifier` - Engine setup shared by commands
//! - parsing and formatting helpers for dates, amounts and periods
//! - `cmd_init` - Initialize the database

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use cofre_core::{Classifier, ClassifierConfig, Database, EngineConfig, OracleClient, Period};
use rust_decimal::Decimal;

use crate::cli::PeriodArgs;

/// Open database with encryption by default, or unencrypted if --no-encrypt
pub fn open_db(db_path: &Path, no_encrypt: bool) -> Result<Database> {
    let path_str = db_path
        .to_str()
        .with_context(|| format!("Database path is not valid UTF-8: {}", db_path.display()))?;
    if no_encrypt {
        Database::new_unencrypted(path_str).context("Failed to open database (unencrypted)")
    } else {
        Database::new(path_str).context("Failed to open database")
    }
}

/// Explicit config file if given, else the data dir override, else defaults
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    match path {
        Some(path) => EngineConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => EngineConfig::load().context("Failed to load config"),
    }
}

/// Keyword classifier, with the oracle from the environment when configured
pub fn build_classifier(config: &ClassifierConfig) -> Classifier {
    let classifier = Classifier::new(config.clone());
    match OracleClient::from_env() {
        Some(client) => {
            let info = client.info();
            tracing::debug!(backend = info.backend, model = %info.model, "Oracle enabled");
            classifier.with_oracle(Arc::new(client))
        }
        None => classifier,
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn parse_date(raw: &str, flag: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .with_context(|| format!("Invalid {} date format (use YYYY-MM-DD)", flag))
}

/// Accepts `45.50`, `45,50` and `1.234,56`
pub fn parse_amount(raw: &str) -> Result<Decimal> {
    let cleaned = raw.trim().trim_start_matches("R$").trim();
    let normalized = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned.to_string()
    };
    Decimal::from_str(&normalized).with_context(|| format!("Invalid amount: {}", raw))
}

/// Resolve --month/--year against today's month
pub fn resolve_period(args: PeriodArgs, today: NaiveDate) -> Result<Period> {
    Period::or_current(args.month, args.year, today).context("Invalid --month/--year")
}

/// Only when --month or --year was given
pub fn explicit_period(args: PeriodArgs, today: NaiveDate) -> Result<Option<Period>> {
    if args.month.is_none() && args.year.is_none() {
        return Ok(None);
    }
    resolve_period(args, today).map(Some)
}

/// Two fraction digits, currency prefixed
pub fn format_money(amount: Decimal) -> String {
    if amount.is_sign_negative() && !amount.is_zero() {
        format!("-R$ {:.2}", amount.abs())
    } else {
        format!("R$ {:.2}", amount)
    }
}

pub fn cmd_init(db_path: &Path, no_encrypt: bool) -> Result<()> {
    println!("🔧 Initializing database at {}...", db_path.display());

    let _db = open_db(db_path, no_encrypt)?;

    if no_encrypt {
        println!("   ⚠️  Encryption: DISABLED (--no-encrypt)");
    } else {
        println!("   🔒 Encryption: ENABLED");
    }

    println!("✅ Database initialized successfully!");
    println!();
    println!("Next steps:");
    println!("  1. Record a transaction: cofre record \"R$ 45,50 almoço\"");
    println!("  2. Set a budget: cofre budgets set Food 600");
    println!("  3. Check the month: cofre summary");

    Ok(())
}
