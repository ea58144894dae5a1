//! Report command implementations

use anyhow::Result;
use chrono::NaiveDate;
use cofre_core::{
    AlertEngine, BudgetCalculator, Database, DayPosition, EngineConfig, Period, Severity,
};
use rust_decimal::Decimal;

use super::format_money;

pub fn cmd_summary(
    db: &Database,
    config: &EngineConfig,
    owner_id: i64,
    period: &Period,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let calculator = BudgetCalculator::new(db.clone(), &config.budget, today);
    let summary = calculator.monthly_summary(owner_id, period)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!();
    println!("📊 Monthly Summary for {}", summary.period);
    println!("   ─────────────────────────────────────────────");

    if summary.transaction_count == 0 {
        println!("   No transactions recorded in this month.");
        return Ok(());
    }

    println!("   Income:              {:>14}", format_money(summary.total_income));
    println!(
        "   Fixed expenses:      {:>14}",
        format_money(summary.total_fixed_expense)
    );
    println!(
        "   Variable expenses:   {:>14}",
        format_money(summary.total_variable_expense)
    );
    println!("   Savings:             {:>14}", format_money(summary.total_savings));
    println!("   ─────────────────────────────────────────────");
    println!("   Final balance:       {:>14}", format_money(summary.final_balance));
    println!();
    println!(
        "   Savings target:      {:>14}  ({}% of income)",
        format_money(summary.savings_target),
        (config.budget.savings_rate * Decimal::ONE_HUNDRED).normalize()
    );
    println!(
        "   Savings vs target:   {:>14}",
        format_money(summary.savings_vs_target)
    );
    println!(
        "   Available variable:  {:>14}",
        format_money(summary.available_for_variable)
    );
    println!(
        "   Daily average:       {:>14}  over {} days",
        format_money(summary.suggested_daily_average),
        summary.days_in_month
    );
    println!("   Transactions:        {:>14}", summary.transaction_count);

    if !summary.alerts.is_empty() {
        println!();
        for note in &summary.alerts {
            println!("   💡 {}", note);
        }
    }

    Ok(())
}

pub fn cmd_daily(
    db: &Database,
    config: &EngineConfig,
    owner_id: i64,
    period: &Period,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let calculator = BudgetCalculator::new(db.clone(), &config.budget, today);
    let status = calculator.daily_budget_status(owner_id, period)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!("📅 Daily Budget for {}", period);
    println!(
        "   Daily allowance: {}   Spent: {}   Left: {}",
        format_money(status.daily_allowance),
        format_money(status.total_variable_spent),
        format_money(status.remaining_budget_for_month)
    );
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   {:>10} │ {:>12} │ {:>12} │ {:>14}",
        "Date", "Spent", "Allowance", "Carry-over"
    );

    for day in &status.days {
        let marker = match (day.position, day.exceeded) {
            (DayPosition::Today, _) => "◀ today",
            (DayPosition::Past, true) => "🔴",
            _ => "",
        };
        println!(
            "   {:>10} │ {:>12} │ {:>12} │ {:>14} {}",
            day.date,
            format_money(day.spend),
            format_money(day.allowance),
            format_money(day.cumulative_balance),
            marker
        );
    }

    println!();
    if let Some(allowance) = status.today_allowance {
        println!("   Can spend today: {}", format_money(allowance));
    }
    if status.remaining_days > 0 {
        println!(
            "   To stay on budget: {} per day for the next {} days",
            format_money(status.adjusted_daily_average_for_remaining_days),
            status.remaining_days
        );
    }

    Ok(())
}

pub fn cmd_alerts(
    db: &Database,
    config: &EngineConfig,
    owner_id: i64,
    period: &Period,
    today: NaiveDate,
    json: bool,
) -> Result<()> {
    let calculator = BudgetCalculator::new(db.clone(), &config.budget, today);
    let engine = AlertEngine::new(config.alerts.clone());
    let alerts = engine.all_alerts(&calculator, owner_id, period);

    if json {
        println!("{}", serde_json::to_string_pretty(&alerts)?);
        return Ok(());
    }

    if alerts.is_empty() {
        println!("✅ No alerts for {}. Your spending looks good!", period);
        return Ok(());
    }

    println!();
    println!("🔔 Alerts for {}", period);
    println!("   ─────────────────────────────────────────────");

    for alert in &alerts {
        let icon = match alert.severity {
            Severity::High => "🔴",
            Severity::Medium => "🟡",
            Severity::Low => "🔵",
        };
        println!("   {} {}", icon, alert.message);
    }

    Ok(())
}
