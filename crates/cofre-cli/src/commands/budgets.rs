//! Category budget command implementations

use anyhow::{Context, Result};
use chrono::NaiveDate;
use cofre_core::{BudgetAlertLevel, BudgetCalculator, Database, EngineConfig, Period};

use super::{format_money, parse_amount, truncate};

pub fn cmd_budgets_set(
    db: &Database,
    owner_id: i64,
    category: &str,
    limit: &str,
    period: &Period,
) -> Result<i64> {
    let limit = parse_amount(limit)?;
    let id = db
        .upsert_budget(owner_id, category, limit, period)
        .context("Failed to save budget")?;

    println!(
        "✅ Budget for {} in {}: {} (id {})",
        category.trim(),
        period,
        format_money(limit),
        id
    );

    Ok(id)
}

pub fn cmd_budgets_list(
    db: &Database,
    config: &EngineConfig,
    owner_id: i64,
    period: &Period,
    today: NaiveDate,
) -> Result<()> {
    let calculator = BudgetCalculator::new(db.clone(), &config.budget, today);
    let statuses = calculator.budget_statuses(
        owner_id,
        period,
        config.alerts.category_warning_ratio,
    )?;

    if statuses.is_empty() {
        println!("No budgets for {}. Set one with:", period);
        println!("  cofre budgets set Food 600");
        return Ok(());
    }

    println!();
    println!("🎯 Budgets for {}", period);
    println!("   ─────────────────────────────────────────────────────────────────────");
    println!(
        "   {:>4} │ {:20} │ {:>12} │ {:>12} │ {:>12} │ {:>6}",
        "ID", "Category", "Limit", "Spent", "Remaining", "Used"
    );

    for status in &statuses {
        let marker = match status.alert_level {
            BudgetAlertLevel::Exceeded => "🔴",
            BudgetAlertLevel::Warning => "🟡",
            BudgetAlertLevel::Safe => "🟢",
        };
        println!(
            "   {:>4} │ {:20} │ {:>12} │ {:>12} │ {:>12} │ {:>5.1}% {}",
            status.budget.id,
            truncate(&status.budget.category, 20),
            format_money(status.budget.monthly_limit),
            format_money(status.spent),
            format_money(status.remaining),
            status.usage_percentage,
            marker
        );
    }

    Ok(())
}

pub fn cmd_budgets_delete(db: &Database, id: i64) -> Result<()> {
    let budget = db
        .get_budget(id)?
        .ok_or_else(|| anyhow::anyhow!("Budget {} not found", id))?;

    db.delete_budget(id)?;

    println!(
        "🗑️  Deleted {} budget for {:02}/{}",
        budget.category, budget.month, budget.year
    );

    Ok(())
}
